//! Progress reporting side channel.
//!
//! Observers see `(iteration, current score)` after every iteration. They
//! cannot touch the allocation, and a failing observer never fails a run.

use std::io::Write;

/// Receives progress notifications from the search loop.
pub trait ProgressObserver {
    /// Called after iteration `iteration` (1-based) with the current score.
    fn on_iteration(&mut self, iteration: usize, score: u64);

    /// Called once when the search reaches its end.
    fn on_finish(&mut self) {}
}

/// Observer that ignores everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct Silent;

impl ProgressObserver for Silent {
    fn on_iteration(&mut self, _iteration: usize, _score: u64) {}
}

const BAR_LENGTH: usize = 50;
const UPDATES: usize = 10;
const GREEN: &str = "\x1b[92m";
const RESET: &str = "\x1b[0m";

/// Terminal progress bar, redrawn in place ten times per run.
///
/// ```text
/// [=========================-------------------------] 50 %	 [current score 76667]
/// ```
///
/// The score is shown in green when it improved since the previous redraw.
#[derive(Debug)]
pub struct ProgressPrinter<W: Write> {
    out: W,
    total: usize,
    interval: usize,
    last_score: Option<u64>,
}

impl<W: Write> ProgressPrinter<W> {
    /// Creates a printer for a run of `total` iterations.
    pub fn new(out: W, total: usize) -> Self {
        let interval = if total == 0 {
            1
        } else {
            total / total.min(UPDATES)
        };
        Self {
            out,
            total,
            interval,
            last_score: None,
        }
    }

    /// Consumes the printer and returns the writer.
    pub fn into_inner(self) -> W {
        self.out
    }

    fn render(&self, count: usize, score: u64) -> String {
        let ratio = count as f64 / self.total as f64;
        let filled = ((BAR_LENGTH as f64 * ratio).round() as usize).min(BAR_LENGTH);
        let percent = (ratio * 1000.0).round() / 10.0;

        let mut bar = String::with_capacity(BAR_LENGTH + 16);
        bar.push('[');
        if filled > 0 {
            bar.push_str(GREEN);
            bar.push_str(&"=".repeat(filled));
            bar.push_str(RESET);
        }
        bar.push_str(&"-".repeat(BAR_LENGTH - filled));
        bar.push(']');

        let improved = self.last_score.is_some_and(|last| last < score);
        let color = if improved { GREEN } else { RESET };
        format!("\r{bar} {percent:2.0} %\t [current score {color}{score}{RESET}]")
    }
}

impl<W: Write> ProgressObserver for ProgressPrinter<W> {
    fn on_iteration(&mut self, iteration: usize, score: u64) {
        if self.total == 0 || iteration % self.interval != 0 {
            return;
        }
        let line = self.render(iteration, score);
        let _ = self.out.write_all(line.as_bytes());
        let _ = self.out.flush();
        self.last_score = Some(score);
    }

    fn on_finish(&mut self) {
        if self.last_score.is_none() {
            return;
        }
        let _ = writeln!(self.out);
        let _ = self.out.flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn output(p: ProgressPrinter<Vec<u8>>) -> String {
        String::from_utf8(p.into_inner()).unwrap()
    }

    #[test]
    fn test_ten_redraws() {
        let mut p = ProgressPrinter::new(Vec::new(), 100);
        for i in 1..=100 {
            p.on_iteration(i, 5);
        }
        assert_eq!(output(p).matches('\r').count(), 10);
    }

    #[test]
    fn test_short_runs_redraw_every_iteration() {
        let mut p = ProgressPrinter::new(Vec::new(), 3);
        for i in 1..=3 {
            p.on_iteration(i, 1);
        }
        assert_eq!(output(p).matches('\r').count(), 3);
    }

    #[test]
    fn test_full_bar_and_highlight() {
        let mut p = ProgressPrinter::new(Vec::new(), 10);
        p.on_iteration(9, 10);
        p.on_iteration(10, 20);
        let out = output(p);
        let last = out.rsplit('\r').next().unwrap();
        assert!(last.contains(&"=".repeat(BAR_LENGTH)));
        assert!(last.contains("100 %"));
        assert!(last.contains(&format!("{GREEN}20{RESET}")));
    }

    #[test]
    fn test_zero_total_prints_nothing() {
        let mut p = ProgressPrinter::new(Vec::new(), 0);
        p.on_iteration(1, 1);
        p.on_finish();
        assert!(output(p).is_empty());
    }

    #[test]
    fn test_finish_ends_drawn_bar() {
        let mut p = ProgressPrinter::new(Vec::new(), 1);
        p.on_iteration(1, 3);
        p.on_finish();
        assert!(output(p).ends_with('\n'));
    }
}
