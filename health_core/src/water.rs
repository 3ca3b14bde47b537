//! Daily water intake tracking.
//!
//! Unlike the record collections, water intake is an aggregate: a running
//! total clamped to a daily cap, a goal, and the list of today's entries.
//! Each part lives under its own storage key.

use crate::storage::{StoragePort, WATER_GOAL_KEY, WATER_HISTORY_KEY, WATER_INTAKE_KEY};
use crate::types::WaterEntry;
use crate::validate::{validate_water_amount, validate_water_goal};
use crate::Result;
use chrono::{Local, NaiveTime};
use serde::de::DeserializeOwned;

pub const DEFAULT_GOAL: u8 = 8;
pub const DEFAULT_MAX_GLASSES: f64 = 20.0;

/// Snapshot of today's water intake
#[derive(Clone, Debug, PartialEq)]
pub struct WaterLog {
    pub total: f64,
    pub goal: u8,
    pub history: Vec<WaterEntry>,
}

impl Default for WaterLog {
    fn default() -> Self {
        Self {
            total: 0.0,
            goal: DEFAULT_GOAL,
            history: Vec::new(),
        }
    }
}

pub struct WaterTracker<S: StoragePort> {
    storage: S,
    log: WaterLog,
    cap: f64,
    default_goal: u8,
    loaded: bool,
}

impl<S: StoragePort> WaterTracker<S> {
    pub fn new(storage: S) -> Self {
        Self::with_limits(storage, DEFAULT_MAX_GLASSES, DEFAULT_GOAL)
    }

    /// Tracker with a custom daily cap and the goal used when none is stored
    pub fn with_limits(storage: S, cap: f64, default_goal: u8) -> Self {
        Self {
            storage,
            log: WaterLog {
                goal: default_goal,
                ..WaterLog::default()
            },
            cap,
            default_goal,
            loaded: false,
        }
    }

    pub fn open(storage: S, cap: f64, default_goal: u8) -> Result<Self> {
        let mut tracker = Self::with_limits(storage, cap, default_goal);
        tracker.load()?;
        Ok(tracker)
    }

    /// Load all three water keys; each one that is missing or malformed
    /// keeps its default.
    pub fn load(&mut self) -> Result<&WaterLog> {
        self.log = WaterLog {
            goal: self.default_goal,
            ..WaterLog::default()
        };
        if let Some(total) = self.read_key::<f64>(WATER_INTAKE_KEY) {
            self.log.total = total.clamp(0.0, self.cap);
        }
        if let Some(goal) = self.read_key::<i64>(WATER_GOAL_KEY) {
            match validate_water_goal(goal) {
                Ok(goal) => self.log.goal = goal,
                Err(e) => tracing::warn!("Ignoring stored water goal: {}", e),
            }
        }
        if let Some(history) = self.read_key::<Vec<WaterEntry>>(WATER_HISTORY_KEY) {
            self.log.history = history;
        }

        self.loaded = true;
        self.persist()?;
        Ok(&self.log)
    }

    fn read_key<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = match self.storage.read(key) {
            Ok(raw) => raw?,
            Err(e) => {
                tracing::warn!("Unable to read {}: {}. Using default.", key, e);
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!("Failed to parse {}: {}. Using default.", key, e);
                None
            }
        }
    }

    pub fn log(&self) -> &WaterLog {
        &self.log
    }

    pub fn cap(&self) -> f64 {
        self.cap
    }

    /// Record `amount` glasses now; returns the new (clamped) total
    pub fn add(&mut self, amount: f64) -> Result<f64> {
        self.add_at(amount, Local::now().time())
    }

    pub fn add_at(&mut self, amount: f64, time: NaiveTime) -> Result<f64> {
        let amount = validate_water_amount(amount, self.cap)?;
        self.log.total = (self.log.total + amount).min(self.cap);
        self.log.history.push(WaterEntry {
            amount,
            time: time.format("%H:%M").to_string(),
        });
        self.persist()?;

        tracing::debug!("Added {} glasses, total {}", amount, self.log.total);
        Ok(self.log.total)
    }

    /// Take back one glass, never going below zero; history is left as is.
    /// Returns the new total.
    pub fn remove_glass(&mut self) -> Result<f64> {
        self.log.total = (self.log.total - 1.0).max(0.0);
        self.persist()?;

        tracing::debug!("Removed a glass, total {}", self.log.total);
        Ok(self.log.total)
    }

    /// Zero the total and clear today's entries; the goal is kept
    pub fn reset(&mut self) -> Result<()> {
        self.log.total = 0.0;
        self.log.history.clear();
        self.persist()
    }

    pub fn set_goal(&mut self, goal: i64) -> Result<u8> {
        self.log.goal = validate_water_goal(goal)?;
        self.persist()?;
        Ok(self.log.goal)
    }

    fn persist(&self) -> Result<()> {
        if !self.loaded {
            tracing::debug!("Skipping water write before load");
            return Ok(());
        }

        self.storage
            .write(WATER_INTAKE_KEY, &serde_json::to_string(&self.log.total)?)?;
        self.storage
            .write(WATER_GOAL_KEY, &serde_json::to_string(&self.log.goal)?)?;
        self.storage
            .write(WATER_HISTORY_KEY, &serde_json::to_string(&self.log.history)?)?;
        Ok(())
    }
}
