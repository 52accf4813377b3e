use crate::errors::AppError;
use crate::estimator::client::EstimationClient;
use crate::estimator::request::{build_request, parse_lambda};
use crate::estimator::types::Estimate;
use crate::input::csv_column::load_csv_file;
use crate::input::text::{join_series, parse_series};
use crate::state::{Effect, Effects, Phase, ViewEvent, ViewState};
use crate::view::chart::ChartView;
use tokio::sync::{mpsc, watch};

/// Controller loop. Owns the view state; effects run as spawned tasks whose
/// completions come back through the same channel. After `Shutdown` the loop
/// keeps draining until no effect is in flight, then returns the final state.
pub async fn run_controller(
    mut view: ViewState,
    client: EstimationClient,
    events_tx: mpsc::Sender<ViewEvent>,
    mut rx: mpsc::Receiver<ViewEvent>,
    view_tx: watch::Sender<ChartView>,
) -> ViewState {
    tracing::info!(api = client.base_url(), "controller started");

    let mut in_flight: usize = 0;
    let mut shutting_down = false;

    while let Some(event) = rx.recv().await {
        match &event {
            ViewEvent::Shutdown => shutting_down = true,
            ViewEvent::CsvLoaded { .. } | ViewEvent::EstimateReady { .. } => {
                in_flight = in_flight.saturating_sub(1);
            }
            _ => {}
        }

        for effect in view.handle(event) {
            in_flight += 1;
            spawn_effect(effect, client.clone(), events_tx.clone());
        }

        let projected = ChartView::project(&view);
        view_tx.send_if_modified(|current| {
            if *current == projected {
                false
            } else {
                *current = projected;
                true
            }
        });

        if shutting_down && in_flight == 0 {
            break;
        }
    }

    tracing::info!("controller shutting down");
    view
}

fn spawn_effect(effect: Effect, client: EstimationClient, tx: mpsc::Sender<ViewEvent>) {
    tokio::spawn(async move {
        let event = match effect {
            Effect::LoadCsv { token, path } => ViewEvent::CsvLoaded {
                token,
                result: load_csv_file(&path).await,
            },
            Effect::RequestEstimate { token, request } => ViewEvent::EstimateReady {
                token,
                result: client.estimate(&request).await,
            },
        };
        if tx.send(event).await.is_err() {
            tracing::debug!("controller gone, completion dropped");
        }
    });
}

impl ViewState {
    /// Apply one event. Pure state transition: no IO happens here, the caller
    /// executes the returned effects and feeds their completions back in.
    pub fn handle(&mut self, event: ViewEvent) -> Effects {
        let mut effects = Effects::new();

        match event {
            ViewEvent::EditText(text) => {
                self.text_input = text;
                self.error = None;
            }

            ViewEvent::ToggleMode(mode) => {
                if mode != self.mode {
                    tracing::info!(mode = %mode, "mode changed");
                }
                self.mode = mode;
                self.error = None;
            }

            ViewEvent::EditLambda(text) => {
                self.lambda_input = text;
                self.error = None;
            }

            ViewEvent::UploadCsv(path) => {
                self.error = None;
                let token = self.issue_token();
                self.latest_csv = Some(token);
                tracing::info!(token, path = %path.display(), "csv upload started");
                effects.push(Effect::LoadCsv { token, path });
            }

            ViewEvent::Calculate => self.start_calculation(&mut effects),

            ViewEvent::Shutdown => {}

            ViewEvent::CsvLoaded { token, result } => {
                if self.latest_csv != Some(token) {
                    tracing::debug!(token, "discarding stale csv result");
                    return effects;
                }
                self.latest_csv = None;
                match result {
                    Ok(series) => {
                        self.text_input = join_series(&series);
                        self.series = series;
                        self.error = None;
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "csv import failed");
                        self.error = Some(e);
                    }
                }
            }

            ViewEvent::EstimateReady { token, result } => {
                if self.latest_calc != Some(token) {
                    tracing::debug!(token, "discarding stale estimate");
                    return effects;
                }
                self.latest_calc = None;
                self.phase = Phase::Idle;
                match result {
                    Ok(estimate) => {
                        tracing::info!(
                            available = estimate.is_available(),
                            hist_vol = ?estimate.hist_vol,
                            ewma_vol = ?estimate.ewma_vol,
                            "estimate received"
                        );
                        self.estimate = estimate;
                        self.error = None;
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "estimation failed");
                        self.estimate = Estimate::unavailable();
                        self.error = Some(e);
                    }
                }
            }
        }

        effects
    }

    fn start_calculation(&mut self, effects: &mut Effects) {
        let series = parse_series(&self.text_input);
        if series.is_empty() {
            self.error = Some(AppError::EmptySeries);
            return;
        }

        let lambda = match parse_lambda(&self.lambda_input) {
            Ok(l) => l,
            Err(e) => {
                self.error = Some(e);
                return;
            }
        };

        let request = match build_request(self.mode, &series, lambda) {
            Ok(r) => r,
            Err(e) => {
                self.error = Some(e);
                return;
            }
        };

        self.series = series;
        self.estimate = Estimate::unavailable();
        self.error = None;
        self.phase = Phase::Calculating;

        let token = self.issue_token();
        self.latest_calc = Some(token);
        tracing::info!(token, mode = %self.mode, n = self.series.len(), lambda, "calculation started");
        effects.push(Effect::RequestEstimate { token, request });
    }
}
