use std::thread;
use std::time::Duration;

use crate::console::{Console, Screen};
use crate::render::{Draw, Tone};

pub const GLYPHS: [&str; 4] = ["\\", "|", "/", "-"];
pub const DEFAULT_CADENCE: Duration = Duration::from_millis(100);

/// Spinner drawn over the cell under the cursor while a fetch is in flight.
pub struct BusyIndicator<S: Screen + 'static> {
    console: Console<S>,
    cadence: Duration,
}

impl<S: Screen + 'static> BusyIndicator<S> {
    pub fn new(console: Console<S>) -> Self {
        Self::with_cadence(console, DEFAULT_CADENCE)
    }

    pub fn with_cadence(console: Console<S>, cadence: Duration) -> Self {
        Self { console, cadence }
    }

    pub fn start(&self) -> bool {
        let generation = {
            let mut shared = self.console.lock();
            if shared.busy.running {
                return false;
            }
            shared.busy.running = true;
            shared.busy.generation += 1;
            shared.busy.live_tasks += 1;
            shared.busy.generation
        };

        let console = self.console.clone();
        let cadence = self.cadence;
        thread::spawn(move || animate(console, generation, cadence));
        true
    }

    pub fn stop(&self) {
        self.console.lock().busy.running = false;
    }

    #[cfg(test)]
    fn is_running(&self) -> bool {
        self.console.lock().busy.running
    }

    #[cfg(test)]
    fn live_tasks(&self) -> usize {
        self.console.lock().busy.live_tasks
    }
}

impl<S: Screen + 'static> Drop for BusyIndicator<S> {
    fn drop(&mut self) {
        self.stop();
    }
}

fn animate<S: Screen>(console: Console<S>, generation: u64, cadence: Duration) {
    let mut frame = 0usize;
    loop {
        {
            let mut shared = console.lock();
            if !shared.busy.running || shared.busy.generation != generation {
                shared.busy.live_tasks -= 1;
                return;
            }
            let glyph = [
                Draw::SaveCursor,
                Draw::text(Tone::Fetching, GLYPHS[frame]),
                Draw::RestoreCursor,
            ];
            if let Err(err) = shared.screen.draw(&glyph) {
                tracing::debug!(error = %err, "busy indicator frame failed");
                shared.busy.running = false;
                shared.busy.live_tasks -= 1;
                return;
            }
        }
        frame = (frame + 1) % GLYPHS.len();
        thread::sleep(cadence);
    }
}
