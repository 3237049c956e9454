//! Live terminal rendering of a run's progress.
//!
//! The reporter redraws three fixed lines on every tick and moves the cursor
//! back to the top of that region, so the next frame overwrites the previous
//! one in place. Stopping the reporter cancels the tick and erases the region.

use std::io::{self, Write};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::debug;

use super::types::{DownloadProgress, MediaProgress, SharedProgress};

/// Destination of the progress display (stdout in the CLI).
pub type DisplaySink = Box<dyn Write + Send>;

/// Shown instead of a percentage while the total size is unknown.
pub const PERCENT_PLACEHOLDER: &str = "--.-- %";

/// Default redraw interval.
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(100);

const LINE_COUNT: usize = 3;
const CLEAR_LINE: &str = "\r\x1b[2K";
const CLEAR_BELOW: &str = "\r\x1b[0J";

/// Formats a download percentage with two decimals, e.g. `25.00 %`.
pub fn format_percent(progress: &DownloadProgress) -> String {
    match progress.percent() {
        Some(percent) if percent.is_finite() => format!("{:.2} %", percent),
        _ => PERCENT_PLACEHOLDER.to_string(),
    }
}

/// Renders the three display lines for a progress snapshot.
pub fn render_lines(progress: &MediaProgress) -> [String; LINE_COUNT] {
    let conversion = &progress.conversion;
    [
        format!("Video download: {}", format_percent(&progress.video)),
        format!("Audio download: {}", format_percent(&progress.audio)),
        format!(
            "Result conversion: {} (frame {} / fps {:.1} / bytes {})",
            conversion.time, conversion.frame, conversion.fps, conversion.converted_bytes
        ),
    ]
}

struct Display {
    sink: DisplaySink,
    drawn: bool,
    stopped: bool,
}

impl Display {
    fn draw(&mut self, progress: &MediaProgress) -> io::Result<()> {
        let mut frame = String::new();
        for line in render_lines(progress) {
            frame.push_str(CLEAR_LINE);
            frame.push_str(&line);
            frame.push('\n');
        }
        frame.push_str(&format!("\x1b[{}A", LINE_COUNT));

        self.sink.write_all(frame.as_bytes())?;
        self.sink.flush()?;
        self.drawn = true;
        Ok(())
    }

    fn clear(&mut self) -> io::Result<()> {
        if self.drawn {
            self.sink.write_all(CLEAR_BELOW.as_bytes())?;
            self.sink.flush()?;
            self.drawn = false;
        }
        Ok(())
    }
}

fn lock(display: &Mutex<Display>) -> MutexGuard<'_, Display> {
    match display.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

/// Starts live progress displays.
#[derive(Debug, Clone)]
pub struct ProgressReporter {
    interval: Duration,
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new(DEFAULT_TICK_INTERVAL)
    }
}

impl ProgressReporter {
    /// Creates a reporter redrawing every `interval`.
    pub fn new(interval: Duration) -> Self {
        Self {
            interval: interval.max(Duration::from_millis(1)),
        }
    }

    /// Returns the redraw interval.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Starts redrawing `progress` to `sink` until the handle is stopped.
    ///
    /// Must be called from within a Tokio runtime. The first frame is drawn
    /// immediately.
    pub fn start(&self, progress: SharedProgress, sink: DisplaySink) -> ReporterHandle {
        let display = Arc::new(Mutex::new(Display {
            sink,
            drawn: false,
            stopped: false,
        }));

        let task_display = Arc::clone(&display);
        let period = self.interval;
        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                ticker.tick().await;
                let snapshot = progress.snapshot();
                let mut display = lock(&task_display);
                if display.stopped {
                    break;
                }
                if let Err(e) = display.draw(&snapshot) {
                    debug!("Failed to draw progress: {}", e);
                }
            }
        });

        ReporterHandle {
            display,
            task: Some(task),
        }
    }
}

/// Owned handle to a running progress display.
///
/// Dropping the handle has the same effect as [`ReporterHandle::stop`], so the
/// tick cannot outlive the run that started it.
pub struct ReporterHandle {
    display: Arc<Mutex<Display>>,
    task: Option<JoinHandle<()>>,
}

impl ReporterHandle {
    /// Cancels the redraw tick and erases the progress lines.
    pub fn stop(mut self) {
        self.shutdown();
    }

    /// Whether the tick has been cancelled.
    pub fn is_stopped(&self) -> bool {
        self.task.is_none()
    }

    fn shutdown(&mut self) {
        let Some(task) = self.task.take() else {
            return;
        };
        task.abort();

        let mut display = lock(&self.display);
        display.stopped = true;
        if let Err(e) = display.clear() {
            debug!("Failed to clear progress display: {}", e);
        }
    }
}

impl Drop for ReporterHandle {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl std::fmt::Debug for ReporterHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReporterHandle")
            .field("stopped", &self.is_stopped())
            .finish()
    }
}
