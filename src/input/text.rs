use super::coerce_number;

#[inline]
fn is_separator(c: char) -> bool {
    c == ',' || c == ';' || c.is_whitespace()
}

/// Parse free text into an ordered series of finite numbers.
/// Any run of commas, semicolons or whitespace separates tokens. Tokens that
/// are not finite numbers are dropped without error; empty input gives an
/// empty series.
pub fn parse_series(text: &str) -> Vec<f64> {
    text.split(is_separator)
        .filter(|t| !t.is_empty())
        .filter_map(coerce_number)
        .collect()
}

/// Text echo of a series, as written back into the input field after a CSV import.
pub fn join_series(series: &[f64]) -> String {
    series
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(",")
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_mixed_tokens_are_filtered() {
        assert_eq!(parse_series("0.01, -0.02, abc, , 3"), vec![0.01, -0.02, 3.0]);
    }

    #[test]
    fn test_all_separators() {
        assert_eq!(parse_series("1;2\t3\n4  ,;5"), vec![1.0, 2.0, 3.0, 4.0, 5.0]);
    }

    #[test]
    fn test_empty_input() {
        assert!(parse_series("").is_empty());
        assert!(parse_series(" ,;; \n").is_empty());
    }

    #[test]
    fn test_non_finite_tokens_dropped() {
        assert_eq!(parse_series("NaN, 1, Infinity, -inf, 2"), vec![1.0, 2.0]);
    }

    #[test]
    fn test_join_then_parse_keeps_values() {
        let series = vec![101.2, 99.75, -0.004];
        assert_eq!(join_series(&series), "101.2,99.75,-0.004");
        assert_eq!(parse_series(&join_series(&series)), series);
    }

    proptest! {
        #[test]
        fn parse_never_yields_non_finite(text in ".{0,200}") {
            let series = parse_series(&text);
            prop_assert!(series.iter().all(|v| v.is_finite()));
        }

        #[test]
        fn parse_keeps_every_finite_number(values in proptest::collection::vec(-1.0e6..1.0e6_f64, 0..50)) {
            let text = values.iter().map(|v| v.to_string()).collect::<Vec<_>>().join(" ; ");
            prop_assert_eq!(parse_series(&text), values);
        }
    }
}
