//! Emergency alarm countdown.
//!
//! [`Countdown`] is the bare state machine: start, tick once per second,
//! fire at zero, cancel. [`AlarmController`] drives it from a single
//! background timer thread that it owns and tears down on cancel or drop.

use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::{self, JoinHandle};
use std::time::Duration;

pub const DEFAULT_COUNTDOWN_SECONDS: u32 = 5;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AlarmState {
    Idle,
    /// Seconds left before contacts are notified
    Counting(u32),
    /// Countdown reached zero; stays here until cancelled
    Triggered,
}

#[derive(Clone, Debug)]
pub struct Countdown {
    seconds: u32,
    state: AlarmState,
}

impl Countdown {
    pub fn new(seconds: u32) -> Self {
        Self {
            seconds,
            state: AlarmState::Idle,
        }
    }

    pub fn state(&self) -> AlarmState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.state != AlarmState::Idle
    }

    /// Seconds left on the counter; the full countdown when idle
    pub fn remaining(&self) -> u32 {
        match self.state {
            AlarmState::Idle => self.seconds,
            AlarmState::Counting(n) => n,
            AlarmState::Triggered => 0,
        }
    }

    /// (Re)start from the full countdown. Returns true if that already
    /// fires, which only happens with a zero-second countdown.
    pub fn start(&mut self) -> bool {
        if self.seconds == 0 {
            self.state = AlarmState::Triggered;
            true
        } else {
            self.state = AlarmState::Counting(self.seconds);
            false
        }
    }

    /// Advance one second. Returns true exactly on the tick that fires.
    pub fn tick(&mut self) -> bool {
        match self.state {
            AlarmState::Counting(n) if n <= 1 => {
                self.state = AlarmState::Triggered;
                true
            }
            AlarmState::Counting(n) => {
                self.state = AlarmState::Counting(n - 1);
                false
            }
            AlarmState::Idle | AlarmState::Triggered => false,
        }
    }

    /// Stop and reset the counter
    pub fn cancel(&mut self) {
        self.state = AlarmState::Idle;
    }
}

/// Owns the alarm's one timer
pub struct AlarmController {
    countdown: Arc<Mutex<Countdown>>,
    interval: Duration,
    timer: Option<(Sender<()>, JoinHandle<()>)>,
}

impl AlarmController {
    pub fn new(seconds: u32) -> Self {
        Self::with_interval(seconds, Duration::from_secs(1))
    }

    /// Controller ticking every `interval` instead of every second
    pub fn with_interval(seconds: u32, interval: Duration) -> Self {
        Self {
            countdown: Arc::new(Mutex::new(Countdown::new(seconds))),
            interval,
            timer: None,
        }
    }

    pub fn state(&self) -> AlarmState {
        lock(&self.countdown).state()
    }

    pub fn remaining(&self) -> u32 {
        lock(&self.countdown).remaining()
    }

    /// Start the countdown, replacing any timer already running.
    /// `on_trigger` runs once, on the timer thread, when the count hits zero.
    pub fn start<F>(&mut self, on_trigger: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.cancel();

        if lock(&self.countdown).start() {
            tracing::warn!("Emergency alarm triggered");
            on_trigger();
            return;
        }

        let (cancel_tx, cancel_rx) = mpsc::channel::<()>();
        let countdown = Arc::clone(&self.countdown);
        let interval = self.interval;

        let handle = thread::spawn(move || loop {
            match cancel_rx.recv_timeout(interval) {
                Err(RecvTimeoutError::Timeout) => {}
                // Cancelled, or the controller went away
                Ok(()) | Err(RecvTimeoutError::Disconnected) => return,
            }

            let fired = {
                let mut countdown = lock(&countdown);
                let fired = countdown.tick();
                tracing::debug!("Alarm countdown: {:?}", countdown.state());
                fired
            };
            if fired {
                tracing::warn!("Emergency alarm triggered");
                on_trigger();
                return;
            }
        });

        tracing::info!("Emergency alarm started");
        self.timer = Some((cancel_tx, handle));
    }

    /// Stop the timer and reset the counter; no-op when idle
    pub fn cancel(&mut self) {
        if let Some((cancel_tx, handle)) = self.timer.take() {
            let _ = cancel_tx.send(());
            if handle.join().is_err() {
                tracing::error!("Alarm timer thread panicked");
            }
        }

        let mut countdown = lock(&self.countdown);
        if countdown.is_active() {
            tracing::info!("Emergency alarm cancelled");
        }
        countdown.cancel();
    }

    /// Block until the running timer has fired or been cancelled
    pub fn wait(&mut self) {
        if let Some((cancel_tx, handle)) = self.timer.take() {
            if handle.join().is_err() {
                tracing::error!("Alarm timer thread panicked");
            }
            drop(cancel_tx);
        }
    }
}

impl Drop for AlarmController {
    fn drop(&mut self) {
        self.cancel();
    }
}

fn lock(countdown: &Mutex<Countdown>) -> MutexGuard<'_, Countdown> {
    countdown.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
