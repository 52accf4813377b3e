use crate::state::{Mode, ViewEvent};
use crate::view::chart::ChartView;
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::{mpsc, watch};

pub const HELP: &str = "\
commands:
  returns | prices | mode <returns|prices>   switch interpretation
  text <numbers...>                          replace the series text (comma, space or ; separated)
  lambda <x>                                 set the EWMA decay
  load <path.csv>                            import the first numeric CSV column
  calc                                       send the series for estimation
  show | json                                print the current view
  help | quit";

/// One parsed console line.
#[derive(Debug, Clone)]
pub enum Command {
    Event(ViewEvent),
    Show,
    Json,
    Help,
    Quit,
}

pub fn parse_command(line: &str) -> Result<Command, String> {
    let line = line.trim();
    let (verb, rest) = match line.split_once(char::is_whitespace) {
        Some((v, r)) => (v, r.trim()),
        None => (line, ""),
    };

    let cmd = match verb.to_ascii_lowercase().as_str() {
        "returns" | "prices" => Command::Event(ViewEvent::ToggleMode(verb.parse::<Mode>()?)),
        "mode" => Command::Event(ViewEvent::ToggleMode(rest.parse::<Mode>()?)),
        "text" | "set" => Command::Event(ViewEvent::EditText(rest.to_string())),
        "lambda" => Command::Event(ViewEvent::EditLambda(rest.to_string())),
        "load" | "csv" => {
            if rest.is_empty() {
                return Err("load needs a file path".into());
            }
            Command::Event(ViewEvent::UploadCsv(PathBuf::from(rest)))
        }
        "calc" | "calculate" => Command::Event(ViewEvent::Calculate),
        "show" => Command::Show,
        "json" => Command::Json,
        "help" | "?" => Command::Help,
        "quit" | "exit" => Command::Quit,
        "" => return Err("empty command".into()),
        other => return Err(format!("unknown command: {other}")),
    };
    Ok(cmd)
}

/// Read commands from stdin and forward view events to the controller.
/// Returns on `quit` or end of input.
pub async fn run_console_input(events_tx: mpsc::Sender<ViewEvent>, view_rx: watch::Receiver<ChartView>) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    println!("{HELP}");

    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                tracing::error!(error = %e, "stdin read failed");
                break;
            }
        };
        if line.trim().is_empty() {
            continue;
        }

        match parse_command(&line) {
            Ok(Command::Event(event)) => {
                if events_tx.send(event).await.is_err() {
                    tracing::error!("controller channel closed, console input shutting down");
                    return;
                }
            }
            Ok(Command::Show) => print!("{}", view_rx.borrow().render_text()),
            Ok(Command::Json) => match serde_json::to_string_pretty(&*view_rx.borrow()) {
                Ok(json) => println!("{json}"),
                Err(e) => tracing::warn!(error = %e, "view serialization failed"),
            },
            Ok(Command::Help) => println!("{HELP}"),
            Ok(Command::Quit) => break,
            Err(msg) => println!("{msg}\n{HELP}"),
        }
    }

    let _ = events_tx.send(ViewEvent::Shutdown).await;
}

/// Print the view every time the controller publishes a changed one.
/// Returns once the sender is gone and the last view has been printed,
/// with the number of views printed.
pub async fn run_printer(mut view_rx: watch::Receiver<ChartView>) -> usize {
    print!("{}", view_rx.borrow_and_update().render_text());
    let mut printed = 1;
    while view_rx.changed().await.is_ok() {
        let text = view_rx.borrow_and_update().render_text();
        print!("{text}");
        printed += 1;
    }
    printed
}
