//! Cooperative cancellation and progress reporting (§5).
//!
//! A `Monitor` is polled once per word rather than pre-empting mid
//! classification: `deadline_msecs` and `cancel` are both checked at that
//! granularity. The core's [`crate::collaborators::Classifier`] contract
//! recognizes a whole page per call, so `Session::recognize_with_monitor`
//! can only poll before and after that call rather than between words; a
//! backend wanting true per-word polling re-implements `Classifier` to
//! call back into the monitor itself.

use std::time::{Duration, Instant};

/// New-style progress callback: receives the whole monitor so it can also
/// inspect `deadline_msecs`/elapsed time, per §5 "the new-style callback
/// receives the whole monitor struct".
pub type ProgressCallback = Box<dyn FnMut(&MonitorState)>;
/// Old-style progress callback: receives only the integer percentage.
pub type LegacyProgressCallback = Box<dyn FnMut(u8)>;
/// `cancel(cancel_this, words_done) -> bool` (§5).
pub type CancelCallback = Box<dyn FnMut(bool, u32) -> bool>;

/// Read-only snapshot passed to the new-style progress callback.
#[derive(Debug, Clone, Copy)]
pub struct MonitorState {
    pub deadline_msecs: u64,
    pub progress_percent: u8,
}

/// Deadline, cancellation, and progress-reporting state for one
/// long-running operation (`recognize`, `process_pages`, `process_page`).
pub struct Monitor {
    deadline_msecs: u64,
    started_at: Option<Instant>,
    cancel: Option<CancelCallback>,
    progress: Option<ProgressCallback>,
    legacy_progress: Option<LegacyProgressCallback>,
    last_progress: u8,
}

impl std::fmt::Debug for Monitor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Monitor")
            .field("deadline_msecs", &self.deadline_msecs)
            .field("last_progress", &self.last_progress)
            .finish()
    }
}

impl Default for Monitor {
    fn default() -> Self {
        Monitor {
            deadline_msecs: 0,
            started_at: None,
            cancel: None,
            progress: None,
            legacy_progress: None,
            last_progress: 0,
        }
    }
}

impl Monitor {
    /// A monitor with no deadline and no cancellation, for callers that
    /// don't need cooperative cancellation.
    pub fn new() -> Self {
        Self::default()
    }

    /// A monitor with a deadline in milliseconds; `0` means unbounded
    /// (§5 `deadline_msecs`).
    pub fn with_deadline_msecs(deadline_msecs: u64) -> Self {
        Monitor {
            deadline_msecs,
            started_at: if deadline_msecs > 0 { Some(Instant::now()) } else { None },
            ..Self::default()
        }
    }

    pub fn set_cancel(&mut self, cancel: CancelCallback) {
        self.cancel = Some(cancel);
    }

    pub fn set_progress_callback(&mut self, progress: ProgressCallback) {
        self.progress = Some(progress);
    }

    /// Installs the old-style integer-only progress callback. Per §5, if
    /// both styles are installed, only the new style fires.
    pub fn set_legacy_progress_callback(&mut self, progress: LegacyProgressCallback) {
        self.legacy_progress = Some(progress);
    }

    /// Polls `cancel` for the word just finished. `words_done` must be
    /// monotonically non-decreasing across calls within one operation.
    pub fn is_cancelled(&mut self, words_done: u32) -> bool {
        match &mut self.cancel {
            Some(cancel) => cancel(false, words_done),
            None => false,
        }
    }

    /// True once real elapsed time has passed `deadline_msecs` (0 = no
    /// deadline).
    pub fn deadline_exceeded(&self) -> bool {
        match (self.deadline_msecs, self.started_at) {
            (0, _) => false,
            (deadline, Some(start)) => start.elapsed() >= Duration::from_millis(deadline),
            (_, None) => false,
        }
    }

    /// Reports progress in `[0, 100]`, clamped and forced monotonically
    /// non-decreasing (§5). Invokes the new-style callback if installed,
    /// else the legacy one.
    pub fn report_progress(&mut self, percent: u8) {
        let percent = percent.clamp(0, 100).max(self.last_progress);
        self.last_progress = percent;
        if let Some(cb) = &mut self.progress {
            cb(&MonitorState {
                deadline_msecs: self.deadline_msecs,
                progress_percent: percent,
            });
        } else if let Some(cb) = &mut self.legacy_progress {
            cb(percent);
        }
    }

    pub fn deadline_msecs(&self) -> u64 {
        self.deadline_msecs
    }
}
