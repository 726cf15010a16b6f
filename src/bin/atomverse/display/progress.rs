use std::io::{self, Write};
use std::time::{Duration, Instant};

use indicatif::{ProgressBar, ProgressStyle};

/// Numbered step reporter on stderr; silent unless interactive.
pub struct Progress {
    spinner: Option<StepSpinner>,
}

struct StepSpinner {
    bar: Option<ProgressBar>,
    start: Instant,
    step: u8,
    total_steps: u8,
    step_start: Instant,
}

impl Progress {
    pub fn new(interactive: bool, total_steps: u8) -> Self {
        let now = Instant::now();
        Self {
            spinner: interactive.then(|| StepSpinner {
                bar: None,
                start: now,
                step: 0,
                total_steps,
                step_start: now,
            }),
        }
    }

    pub fn step(&mut self, description: &str) {
        let Some(s) = self.spinner.as_mut() else {
            return;
        };
        s.clear();
        s.step += 1;
        s.step_start = Instant::now();

        let bar = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner().template("  {spinner:.cyan} {msg}") {
            bar.set_style(style.tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"));
        }
        bar.enable_steady_tick(Duration::from_millis(80));
        bar.set_message(format!("[{}/{}] {}...", s.step, s.total_steps, description));
        s.bar = Some(bar);
    }

    pub fn complete_step<S: AsRef<str>>(&mut self, description: &str, substeps: &[S]) {
        let Some(s) = self.spinner.as_mut() else {
            return;
        };
        s.clear();

        let mut stderr = io::stderr().lock();
        let _ = writeln!(
            stderr,
            "  \x1b[32m✓\x1b[0m {:<44} {:>5.1}s",
            description,
            s.step_start.elapsed().as_secs_f64()
        );
        for substep in substeps {
            let _ = writeln!(stderr, "      \x1b[2m·\x1b[0m {}", substep.as_ref());
        }
    }

    pub fn finish(mut self) {
        if let Some(mut s) = self.spinner.take() {
            s.clear();
            print_footer(s.start.elapsed());
        }
    }
}

impl StepSpinner {
    fn clear(&mut self) {
        if let Some(bar) = self.bar.take() {
            bar.finish_and_clear();
        }
    }
}

fn print_footer(elapsed: Duration) {
    let mut stderr = io::stderr().lock();

    let _ = writeln!(stderr);
    let _ = writeln!(
        stderr,
        "  \x1b[2m╺━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━╸\x1b[0m"
    );
    let _ = writeln!(
        stderr,
        "  \x1b[32m✓\x1b[0m Done {:>45}",
        format!("Total: {:.2}s", elapsed.as_secs_f64())
    );
    let _ = writeln!(stderr);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn silent_progress_ignores_every_call() {
        let mut progress = Progress::new(false, 2);
        progress.step("Reading universe");
        progress.complete_step("Reading universe", &["Parse XYZ"]);
        assert!(progress.spinner.is_none());
        progress.finish();
    }
}
