//! Core domain types for the health tracker.
//!
//! This module defines the records kept by each tracker:
//! - Generic record envelope and identifiers
//! - Water, blood pressure and heart rate readings
//! - Appointments, doctors and medications
//! - Emergency contacts

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// Record Envelope
// ============================================================================

/// Identifier of a stored record. Never reused once issued.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(transparent)]
pub struct RecordId(pub u64);

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl FromStr for RecordId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(RecordId)
    }
}

/// A timestamped record as persisted by a [`crate::RecordStore`]
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Record<T> {
    pub id: RecordId,
    pub created_at: DateTime<Utc>,
    #[serde(flatten)]
    pub fields: T,
}

// ============================================================================
// Vital Readings
// ============================================================================

/// One entry in today's water log
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct WaterEntry {
    /// Glasses of water (0.5 for half a glass)
    pub amount: f64,
    /// Local wall-clock time of the entry, `HH:MM`
    pub time: String,
}

/// Blood pressure reading in mmHg, pulse in BPM
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct BpReading {
    pub systolic: u16,
    pub diastolic: u16,
    #[serde(default)]
    pub pulse: Option<u16>,
}

/// Heart rate reading in BPM
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct HeartRateReading {
    pub value: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

// ============================================================================
// Care Team and Schedule
// ============================================================================

/// A scheduled doctor's appointment
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    pub doctor_name: String,
    #[serde(default)]
    pub purpose: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    pub date: NaiveDate,
    pub time: NaiveTime,
}

impl Appointment {
    /// Date and time combined; appointments are ordered by this
    pub fn timestamp(&self) -> NaiveDateTime {
        self.date.and_time(self.time)
    }
}

/// A doctor in the user's care team
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Doctor {
    pub name: String,
    pub specialty: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// How often a medication is taken
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum Frequency {
    Daily,
    TwiceDaily,
    Weekly,
    Monthly,
    #[serde(alias = "as needed")]
    AsNeeded,
}

impl Frequency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Frequency::Daily => "daily",
            Frequency::TwiceDaily => "twice-daily",
            Frequency::Weekly => "weekly",
            Frequency::Monthly => "monthly",
            Frequency::AsNeeded => "as-needed",
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Frequency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "daily" => Ok(Frequency::Daily),
            "twice-daily" | "twice daily" => Ok(Frequency::TwiceDaily),
            "weekly" => Ok(Frequency::Weekly),
            "monthly" => Ok(Frequency::Monthly),
            "as-needed" | "as needed" => Ok(Frequency::AsNeeded),
            other => Err(format!(
                "unknown frequency '{}' (expected daily, twice-daily, weekly, monthly or as-needed)",
                other
            )),
        }
    }
}

/// A medication reminder
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Medication {
    pub name: String,
    #[serde(default)]
    pub dosage: Option<String>,
    pub frequency: Frequency,
    /// Time of day to take it; absent only for as-needed medications
    #[serde(default)]
    pub time: Option<NaiveTime>,
    pub start_date: NaiveDate,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub instructions: Option<String>,
    #[serde(default)]
    pub with_food: bool,
    #[serde(default)]
    pub with_water: bool,
    #[serde(default)]
    pub taken: bool,
}

/// Someone to notify when the emergency alarm fires
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct EmergencyContact {
    pub name: String,
    pub phone: String,
}
