use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use slabpack::engine::progress::{Progress, ProgressCallback};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::warn;

const SPINNER_TICK: Duration = Duration::from_millis(80);
const SPINNER_TEMPLATE: &str = "{spinner:.green} {prefix:.bold} {msg}";
const BAR_TEMPLATE: &str = "{prefix:.bold:<18} [{bar:40.green/white}] {pos}/{len} {msg}";

struct DisplayState {
    bar: ProgressBar,
    /// Label of the phase currently running; becomes the bar prefix.
    phase: &'static str,
}

impl DisplayState {
    fn apply(&mut self, event: Progress) {
        match event {
            Progress::PhaseStart { name } => {
                self.phase = name;
                self.bar.reset();
                self.bar.set_length(0);
                self.bar.set_style(spinner_style());
                self.bar.set_prefix(name);
                self.bar.set_message("");
                self.bar.enable_steady_tick(SPINNER_TICK);
            }
            Progress::TaskStart { total_steps } => {
                self.bar.disable_steady_tick();
                self.bar.reset();
                self.bar.set_style(bar_style());
                self.bar.set_prefix(self.phase);
                self.bar.set_length(total_steps);
                self.bar.set_message("molecules placed");
            }
            Progress::TaskIncrement => self.bar.inc(1),
            Progress::TaskFinish => {
                if let Some(len) = self.bar.length() {
                    self.bar.set_position(len);
                }
                self.bar.finish();
            }
            Progress::TaskAbort { reason } => {
                self.bar.disable_steady_tick();
                self.bar.abandon_with_message(format!("failed: {reason}"));
            }
            Progress::PhaseFinish => {
                self.bar.disable_steady_tick();
                self.bar.finish_with_message(format!("{} done", self.phase));
            }
            Progress::Message(text) if self.bar.is_finished() => self.bar.set_message(text),
            Progress::Message(text) => self.bar.println(format!("  {text}")),
        }
    }
}

/// Draws generation progress on stderr: a spinner per phase, a bar while
/// molecule centers are being accepted.
#[derive(Clone)]
pub struct CliProgressHandler {
    state: Arc<Mutex<DisplayState>>,
}

impl CliProgressHandler {
    pub fn new() -> Self {
        Self::with_draw_target(ProgressDrawTarget::stderr())
    }

    fn with_draw_target(target: ProgressDrawTarget) -> Self {
        let bar = ProgressBar::with_draw_target(Some(0), target).with_style(spinner_style());
        bar.finish_and_clear();
        Self {
            state: Arc::new(Mutex::new(DisplayState { bar, phase: "" })),
        }
    }

    pub fn get_callback(&self) -> ProgressCallback<'static> {
        let state = Arc::clone(&self.state);
        Box::new(move |event: Progress| match state.lock() {
            Ok(mut guard) => guard.apply(event),
            Err(_) => warn!("Progress display lock was poisoned; dropping event."),
        })
    }
}

impl Default for CliProgressHandler {
    fn default() -> Self {
        Self::new()
    }
}

fn spinner_style() -> ProgressStyle {
    ProgressStyle::with_template(SPINNER_TEMPLATE).unwrap_or_else(|_| ProgressStyle::default_spinner())
}

fn bar_style() -> ProgressStyle {
    ProgressStyle::with_template(BAR_TEMPLATE)
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("=> ")
}
