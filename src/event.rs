use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyEvent};

pub enum AppEvent {
    Key(KeyEvent),
    Tick,
    Resize(#[allow(dead_code)] u16, #[allow(dead_code)] u16),
}

/// Background event pump: forwards key/resize events and emits ticks on a
/// fixed deadline schedule. Ticks drive disclosure animations, so they must
/// keep arriving even while keys stream in; polling with the full tick rate
/// as timeout (and only ticking on timeout) would starve animation frames
/// under held keys.
pub struct EventHandler {
    rx: mpsc::Receiver<AppEvent>,
    _tx: mpsc::Sender<AppEvent>,
}

impl EventHandler {
    pub fn new(tick_rate: Duration) -> Self {
        let (tx, rx) = mpsc::channel();
        let _tx = tx.clone();

        thread::spawn(move || {
            let mut next_tick = Instant::now() + tick_rate;
            loop {
                let wait = next_tick.saturating_duration_since(Instant::now());
                if event::poll(wait).unwrap_or(false) {
                    match event::read() {
                        Ok(Event::Key(key)) => {
                            if tx.send(AppEvent::Key(key)).is_err() {
                                return;
                            }
                        }
                        Ok(Event::Resize(w, h)) => {
                            if tx.send(AppEvent::Resize(w, h)).is_err() {
                                return;
                            }
                        }
                        _ => {}
                    }
                }
                if Instant::now() >= next_tick {
                    if tx.send(AppEvent::Tick).is_err() {
                        return;
                    }
                    next_tick += tick_rate;
                }
            }
        });

        Self { rx, _tx }
    }

    pub fn next(&self) -> anyhow::Result<AppEvent> {
        Ok(self.rx.recv()?)
    }
}
