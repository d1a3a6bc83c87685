//! Periodic progress lines.

use std::io::{self, Write};
use std::sync::Arc;
use std::time::Duration;

use crossbeam_channel::{select, tick, Receiver};
use tracing::warn;

use super::state::{SearchState, Snapshot};

/// Samples the shared counters on a fixed interval. Read-only.
pub struct StatusEmitter {
    state: Arc<SearchState>,
    interval: Duration,
}

impl StatusEmitter {
    pub fn new(state: Arc<SearchState>, interval: Duration) -> Self {
        Self { state, interval }
    }

    /// Emits a progress line every interval until `done` disconnects.
    pub fn run(self, done: Receiver<()>) {
        let ticker = tick(self.interval);
        loop {
            select! {
                recv(ticker) -> _ => self.emit(),
                recv(done) -> _ => break,
            }
        }
    }

    fn emit(&self) {
        let line = format_progress(&self.state.snapshot());
        let mut stdout = io::stdout().lock();
        if let Err(e) = writeln!(stdout, "{}", line) {
            warn!("could not write progress line: {}", e);
        }
    }
}

/// Formats one progress line.
pub fn format_progress(snapshot: &Snapshot) -> String {
    format!(
        "[{:>5}s] Generated {} ({}/s) | Found {}",
        snapshot.elapsed.as_secs(),
        format_number(snapshot.generated),
        format_number(snapshot.keys_per_second() as u64),
        snapshot.found
    )
}

pub fn format_number(n: u64) -> String {
    if n >= 1_000_000_000 {
        format!("{:.2}B", n as f64 / 1_000_000_000.0)
    } else if n >= 1_000_000 {
        format!("{:.2}M", n as f64 / 1_000_000.0)
    } else if n >= 1_000 {
        format!("{:.2}K", n as f64 / 1_000.0)
    } else {
        n.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::bounded;
    use std::thread;

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(999), "999");
        assert_eq!(format_number(1_500), "1.50K");
        assert_eq!(format_number(2_000_000), "2.00M");
        assert_eq!(format_number(3_250_000_000), "3.25B");
    }

    #[test]
    fn test_format_progress() {
        let snapshot = Snapshot {
            generated: 12_000,
            found: 3,
            elapsed: Duration::from_secs(4),
        };
        assert_eq!(
            format_progress(&snapshot),
            "[    4s] Generated 12.00K (3.00K/s) | Found 3"
        );
    }

    #[test]
    fn test_emitter_exits_when_done_drops_and_leaves_state_alone() {
        let state = Arc::new(SearchState::new(5));
        state.add_generated(42);

        let (done_tx, done_rx) = bounded::<()>(0);
        let emitter = StatusEmitter::new(Arc::clone(&state), Duration::from_millis(5));
        let handle = thread::spawn(move || emitter.run(done_rx));

        thread::sleep(Duration::from_millis(30));
        drop(done_tx);
        handle.join().unwrap();

        assert_eq!(state.total_generated(), 42);
        assert_eq!(state.total_found(), 0);
        assert!(!state.is_stopped());
    }
}
