use super::{coerce_number, is_numeric};
use crate::errors::{AppError, AppResult};
use csv::StringRecord;
use std::io::Read;
use std::path::Path;

/// Pick the series column: the first field, in declared header order, whose
/// first-row value is numeric. Header order is the contract here, so a file
/// with `open,close` always charts `open`.
pub fn select_column(headers: &StringRecord, first_row: &StringRecord) -> AppResult<usize> {
    headers
        .iter()
        .enumerate()
        .find(|(idx, _)| first_row.get(*idx).is_some_and(is_numeric))
        .map(|(idx, _)| idx)
        .ok_or(AppError::NoNumericColumn)
}

/// Read a CSV document (header row first) and extract the selected column as
/// a series. Cells are trimmed and blank rows skipped. Zero data rows is not
/// an error: it yields an empty series.
pub fn series_from_csv<R: Read>(reader: R) -> AppResult<Vec<f64>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = rdr.headers()?.clone();

    let mut rows: Vec<StringRecord> = Vec::new();
    for record in rdr.records() {
        let record = record?;
        if record.iter().all(str::is_empty) {
            continue;
        }
        rows.push(record);
    }

    let Some(first_row) = rows.first() else {
        return Ok(Vec::new());
    };

    let col = select_column(&headers, first_row)?;
    tracing::debug!(
        column = headers.get(col).unwrap_or_default(),
        rows = rows.len(),
        "csv series column selected"
    );

    Ok(rows
        .iter()
        .filter_map(|r| r.get(col).and_then(coerce_number))
        .collect())
}

/// Read and parse a CSV file from disk.
pub async fn load_csv_file(path: &Path) -> AppResult<Vec<f64>> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| AppError::Csv(format!("{}: {e}", path.display())))?;
    let series = series_from_csv(bytes.as_slice())?;
    tracing::info!(path = %path.display(), n = series.len(), "csv loaded");
    Ok(series)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(fields: &[&str]) -> StringRecord {
        StringRecord::from(fields.to_vec())
    }

    #[test]
    fn test_selects_first_numeric_field() {
        let headers = record(&["date", "price"]);
        let row = record(&["2021-01-01", "101.2"]);
        assert_eq!(select_column(&headers, &row), Ok(1));
    }

    #[test]
    fn test_declared_order_wins() {
        let headers = record(&["symbol", "open", "close"]);
        let row = record(&["BTC", "100.0", "101.0"]);
        assert_eq!(select_column(&headers, &row), Ok(1));
    }

    #[test]
    fn test_no_numeric_field_fails() {
        let headers = record(&["date", "symbol"]);
        let row = record(&["2021-01-01", "BTC"]);
        assert_eq!(select_column(&headers, &row), Err(AppError::NoNumericColumn));
    }

    #[test]
    fn test_short_first_row_is_not_numeric() {
        let headers = record(&["date", "price"]);
        let row = record(&["2021-01-01"]);
        assert_eq!(select_column(&headers, &row), Err(AppError::NoNumericColumn));
    }

    #[test]
    fn test_series_extraction_filters_bad_cells() {
        let data = "date,price\n2021-01-01,101.2\n2021-01-02,n/a\n2021-01-03,\n2021-01-04, 99.5 \n";
        let series = series_from_csv(data.as_bytes()).unwrap();
        assert_eq!(series, vec![101.2, 99.5]);
    }

    #[test]
    fn test_short_rows_contribute_nothing() {
        let data = "date,price\n2021-01-01,101.2\n2021-01-02\n2021-01-03,99.5\n";
        assert_eq!(series_from_csv(data.as_bytes()).unwrap(), vec![101.2, 99.5]);
    }

    #[test]
    fn test_blank_lines_skipped() {
        let data = "ret\n0.01\n\n-0.02\n\n";
        assert_eq!(series_from_csv(data.as_bytes()).unwrap(), vec![0.01, -0.02]);
    }

    #[test]
    fn test_zero_rows_is_empty_not_error() {
        let data = "date,price\n";
        assert_eq!(series_from_csv(data.as_bytes()).unwrap(), Vec::<f64>::new());
    }

    #[test]
    fn test_all_text_csv_fails() {
        let data = "date,symbol\n2021-01-01,BTC\n";
        assert_eq!(series_from_csv(data.as_bytes()), Err(AppError::NoNumericColumn));
    }

    #[test]
    fn test_column_chosen_from_first_row_only() {
        // second column is numeric only from row two on, so the first row decides
        let data = "a,b\nx,\n1,2\n3,4\n";
        assert_eq!(series_from_csv(data.as_bytes()), Err(AppError::NoNumericColumn));
    }

    #[tokio::test]
    async fn test_load_csv_file() {
        let path = std::env::temp_dir().join(format!("volscope_csv_{}.csv", std::process::id()));
        tokio::fs::write(&path, "date,close\n2024-01-01,100\n2024-01-02,101.5\n")
            .await
            .unwrap();
        let series = load_csv_file(&path).await.unwrap();
        let _ = tokio::fs::remove_file(&path).await;
        assert_eq!(series, vec![100.0, 101.5]);
    }

    #[tokio::test]
    async fn test_missing_file_is_csv_error() {
        let path = std::env::temp_dir().join("volscope_definitely_missing.csv");
        let err = load_csv_file(&path).await.unwrap_err();
        assert!(matches!(err, AppError::Csv(_)));
    }
}
