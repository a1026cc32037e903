//! Seek bar refresh timer
//!
//! One background task ticks at a fixed interval while a song plays. It only
//! signals; the screen owning the player does the work on its own task.
//! Starting the poller always cancels the previous task first, and ticks
//! from a cancelled task are dropped by generation, so two chains can never
//! drive the player at once.

use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{self, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Tick {
    generation: u64,
}

pub struct Poller {
    interval: Duration,
    tx: mpsc::Sender<Tick>,
    rx: mpsc::Receiver<Tick>,
    generation: u64,
    token: Option<CancellationToken>,
}

impl Poller {
    pub fn new(interval: Duration) -> Self {
        // one slot: a slow consumer sees one pending tick, never a backlog
        let (tx, rx) = mpsc::channel(1);
        Self {
            interval,
            tx,
            rx,
            generation: 0,
            token: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.token.is_some()
    }

    /// Start ticking, replacing any running task
    pub fn start(&mut self) {
        self.stop();
        self.generation += 1;

        let token = CancellationToken::new();
        let cancelled = token.clone();
        let tx = self.tx.clone();
        let interval = self.interval;
        let tick = Tick {
            generation: self.generation,
        };

        tokio::spawn(async move {
            let mut ticker = time::interval_at(Instant::now() + interval, interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    _ = cancelled.cancelled() => break,
                    _ = ticker.tick() => {
                        // a full slot already holds a tick; dropping this one is fine
                        if let Err(mpsc::error::TrySendError::Closed(_)) = tx.try_send(tick) {
                            break;
                        }
                    }
                }
            }
            debug!("Poller generation {} stopped", tick.generation);
        });

        self.token = Some(token);
    }

    /// Cancel the running task, if any
    pub fn stop(&mut self) {
        if let Some(token) = self.token.take() {
            token.cancel();
        }
    }

    /// Start or stop so that the poller runs exactly when `wanted`
    pub fn sync(&mut self, wanted: bool) {
        match (wanted, self.is_running()) {
            (true, false) => self.start(),
            (false, true) => self.stop(),
            _ => {}
        }
    }

    /// Wait for the next tick of the running task. Pends forever while stopped.
    pub async fn next_tick(&mut self) {
        loop {
            if self.token.is_none() {
                std::future::pending::<()>().await;
            }

            match self.rx.recv().await {
                Some(tick) if tick.generation == self.generation => return,
                Some(_) => continue,
                // we hold a sender, so the channel never closes
                None => std::future::pending::<()>().await,
            }
        }
    }
}

impl Drop for Poller {
    fn drop(&mut self) {
        self.stop();
    }
}
