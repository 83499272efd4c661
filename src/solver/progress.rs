//! Progress reporting for a running search.

use indicatif::ProgressBar;

/// A snapshot of the search counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Progress {
    /// Orientations tried so far. Only ever increases.
    pub attempts: u64,
    /// Shapes currently placed in the cube.
    pub placed: usize,
    /// `true` for the final report of a search.
    pub finished: bool,
}

/// Receives periodic [`Progress`] reports from a
/// [`CubePacker`](super::CubePacker).
///
/// Reports are informational only; an observer cannot influence the search.
pub trait ProgressObserver {
    fn progress(&mut self, progress: &Progress);
}

/// Discards all reports.
impl ProgressObserver for () {
    fn progress(&mut self, _: &Progress) {}
}

impl<F> ProgressObserver for F
where
    F: FnMut(&Progress),
{
    fn progress(&mut self, progress: &Progress) {
        self(progress)
    }
}

/// Writes reports to the `log` facade at `info` level.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogObserver;

impl ProgressObserver for LogObserver {
    fn progress(&mut self, progress: &Progress) {
        if progress.finished {
            log::info!(
                "Search finished after {} attempts with {} placed shapes",
                progress.attempts,
                progress.placed
            );
        } else {
            log::info!(
                "Attempt [{}]: No of placed shapes {}",
                progress.attempts,
                progress.placed
            );
        }
    }
}

/// Shows the attempt count as the bar position and the placed shapes as
/// its message.
impl ProgressObserver for ProgressBar {
    fn progress(&mut self, progress: &Progress) {
        self.set_position(progress.attempts);
        self.set_message(format!("attempts, {} shapes placed", progress.placed));
    }
}

#[test]
fn closures_observe() {
    let mut seen = Vec::new();
    {
        let mut observer = |p: &Progress| seen.push(p.attempts);
        observer.progress(&Progress {
            attempts: 7,
            ..Default::default()
        });
    }
    assert_eq!(seen, vec![7]);
}
