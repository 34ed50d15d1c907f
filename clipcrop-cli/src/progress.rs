// ============================================================================
// clipcrop-cli/src/progress.rs
// ============================================================================
//
// PROGRESS REPORTING: Batch progress bar
//
// An indicatif bar that advances once per finished clip and keeps running
// counts of succeeded (or planned, in a dry run), skipped and failed clips in
// its message. It is hidden when stderr is not a terminal so logs and CI
// output stay clean.
//
// While a batch runs the bar is registered as the active bar, and console
// log lines are written through it so they never interleave with a redraw.

// ---- External crate imports ----
use clipcrop_core::{BatchObserver, BatchSummary, ClipOutcome, ClipReport};
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

// ---- Standard library imports ----
use std::io::IsTerminal;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Bar currently drawn on stderr, if any.
static ACTIVE_BAR: Mutex<Option<ProgressBar>> = Mutex::new(None);

fn set_active_bar(bar: Option<ProgressBar>) {
    if let Ok(mut active) = ACTIVE_BAR.lock() {
        *active = bar;
    }
}

/// Writes one console line to stderr, hiding the active bar while it does.
pub fn write_console_line(line: &str) {
    let bar = ACTIVE_BAR.lock().ok().and_then(|active| active.clone());
    match bar {
        Some(bar) => bar.suspend(|| eprintln!("{line}")),
        None => eprintln!("{line}"),
    }
}

/// Running tallies shown next to the bar.
#[derive(Debug, Default)]
struct Counts {
    succeeded: AtomicUsize,
    planned: AtomicUsize,
    skipped: AtomicUsize,
    failed: AtomicUsize,
}

impl Counts {
    fn record(&self, outcome: &ClipOutcome) {
        let counter = match outcome {
            ClipOutcome::Succeeded { .. } => &self.succeeded,
            ClipOutcome::Planned { .. } => &self.planned,
            ClipOutcome::Skipped(_) => &self.skipped,
            ClipOutcome::Failed(_) => &self.failed,
            ClipOutcome::Cancelled => return,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    fn message(&self) -> String {
        let planned = self.planned.load(Ordering::Relaxed);
        let done = if planned > 0 {
            format!("planned {planned}")
        } else {
            format!("ok {}", self.succeeded.load(Ordering::Relaxed))
        };
        format!(
            "{done} | skipped {} | failed {}",
            self.skipped.load(Ordering::Relaxed),
            self.failed.load(Ordering::Relaxed)
        )
    }
}

/// `BatchObserver` that drives a progress bar.
pub struct BatchProgress {
    bar: ProgressBar,
    counts: Counts,
}

impl BatchProgress {
    /// Creates a bar drawn on stderr, or a hidden one when `hidden` is set or stderr is not a TTY.
    #[must_use]
    pub fn new(hidden: bool) -> Self {
        let bar = ProgressBar::new(0);
        let style = ProgressStyle::default_bar()
            .template("  ⧖ Clips: {pos}/{len} [{bar:30}] {percent:>3}% ({elapsed_precise} / {eta_precise}) {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("##.");
        bar.set_style(style);

        if hidden || !std::io::stderr().is_terminal() {
            bar.set_draw_target(ProgressDrawTarget::hidden());
        }
        Self {
            bar,
            counts: Counts::default(),
        }
    }

    /// Number of clips the bar has seen finish.
    #[must_use]
    pub fn position(&self) -> u64 {
        self.bar.position()
    }
}

impl BatchObserver for BatchProgress {
    fn batch_started(&self, total: usize) {
        self.bar.set_length(total as u64);
        self.bar.set_message(self.counts.message());
        set_active_bar(Some(self.bar.clone()));
        self.bar.enable_steady_tick(Duration::from_millis(250));
    }

    fn clip_finished(&self, report: &ClipReport) {
        self.counts.record(&report.outcome);
        self.bar.set_message(self.counts.message());
        self.bar.inc(1);
    }

    fn batch_finished(&self, _summary: &BatchSummary) {
        set_active_bar(None);
        self.bar.finish_and_clear();
    }
}
