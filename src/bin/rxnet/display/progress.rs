use std::io::{self, Write};
use std::time::{Duration, Instant};

use indicatif::{ProgressBar, ProgressStyle};

/// Numbered step reporter: a spinner per step on terminals, silent otherwise.
pub struct Progress {
    interactive: bool,
    bar: Option<ProgressBar>,
    started: Instant,
    step_started: Instant,
    step: usize,
    total_steps: usize,
}

impl Progress {
    pub fn new(interactive: bool, total_steps: usize) -> Self {
        let now = Instant::now();
        Self {
            interactive,
            bar: None,
            started: now,
            step_started: now,
            step: 0,
            total_steps,
        }
    }

    pub fn step(&mut self, description: &str) {
        self.clear();
        self.step += 1;
        self.step_started = Instant::now();
        if !self.interactive {
            return;
        }

        let style = ProgressStyle::default_spinner()
            .template("  {spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏");
        let bar = ProgressBar::new_spinner().with_style(style);
        bar.enable_steady_tick(Duration::from_millis(80));
        bar.set_message(format!(
            "[{}/{}] {}...",
            self.step, self.total_steps, description
        ));
        self.bar = Some(bar);
    }

    /// Replaces the spinner with a check mark, the step time and one line per detail.
    pub fn complete_step(&mut self, description: &str, details: &[String]) {
        self.clear();
        if !self.interactive {
            return;
        }

        let mut stderr = io::stderr().lock();
        let _ = writeln!(
            stderr,
            "  \x1b[32m✓\x1b[0m {:<44} {:>5.1}s",
            description,
            self.step_started.elapsed().as_secs_f64()
        );
        for detail in details {
            let _ = writeln!(stderr, "      \x1b[2m·\x1b[0m {}", detail);
        }
    }

    pub fn finish(mut self, headline: &str) {
        self.clear();
        if !self.interactive {
            return;
        }

        let mut stderr = io::stderr().lock();
        let _ = writeln!(stderr);
        let _ = writeln!(stderr, "  \x1b[2m╺{}╸\x1b[0m", "━".repeat(54));
        let _ = writeln!(stderr);
        let _ = writeln!(
            stderr,
            "  \x1b[32m✓\x1b[0m {:<30} {:>20}",
            headline,
            format!("Total: {:.2}s", self.started.elapsed().as_secs_f64())
        );
        let _ = writeln!(stderr);
    }

    fn clear(&mut self) {
        if let Some(bar) = self.bar.take() {
            bar.finish_and_clear();
        }
    }
}
