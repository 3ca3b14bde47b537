//! Reading classification.
//!
//! Blood pressure stages and heart rate zones. Bands are evaluated in a
//! fixed precedence, first match wins, so a reading that looks normal on one
//! axis can still land in a more severe band because of the other.

use crate::types::{BpReading, HeartRateReading};
use serde::Serialize;

/// How worrying a classification is, from least to most
#[derive(Clone, Copy, Debug, Serialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Unknown,
    Normal,
    Mild,
    Moderate,
    Severe,
    Critical,
}

/// Label and severity derived from a reading
#[derive(Clone, Copy, Debug, Serialize, PartialEq, Eq)]
pub struct Classification {
    pub label: &'static str,
    pub severity: Severity,
}

impl Classification {
    /// Whether the reading warrants an immediate warning
    pub fn alert(&self) -> bool {
        self.severity == Severity::Critical
    }
}

#[derive(Clone, Copy, Debug, Serialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum BpCategory {
    HypertensiveCrisis,
    Stage2,
    Stage1,
    Elevated,
    Normal,
    Unknown,
}

impl BpCategory {
    /// Categorize a systolic/diastolic pair
    pub fn from_values(systolic: u16, diastolic: u16) -> Self {
        let (s, d) = (systolic, diastolic);
        if s >= 180 || d >= 120 {
            BpCategory::HypertensiveCrisis
        } else if s >= 140 || d >= 90 {
            BpCategory::Stage2
        } else if (130..140).contains(&s) || (80..90).contains(&d) {
            BpCategory::Stage1
        } else if (120..130).contains(&s) && d < 80 {
            BpCategory::Elevated
        } else if s < 120 && d < 80 {
            BpCategory::Normal
        } else {
            BpCategory::Unknown
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            BpCategory::HypertensiveCrisis => "Hypertensive Crisis",
            BpCategory::Stage2 => "High Blood Pressure (Stage 2)",
            BpCategory::Stage1 => "High Blood Pressure (Stage 1)",
            BpCategory::Elevated => "Elevated",
            BpCategory::Normal => "Normal",
            BpCategory::Unknown => "Unknown",
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            BpCategory::HypertensiveCrisis => Severity::Critical,
            BpCategory::Stage2 => Severity::Severe,
            BpCategory::Stage1 => Severity::Moderate,
            BpCategory::Elevated => Severity::Mild,
            BpCategory::Normal => Severity::Normal,
            BpCategory::Unknown => Severity::Unknown,
        }
    }
}

#[derive(Clone, Copy, Debug, Serialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum HeartRateZone {
    Bradycardia,
    Normal,
    Elevated,
    Tachycardia,
}

impl HeartRateZone {
    pub fn from_value(bpm: u16) -> Self {
        if bpm < 60 {
            HeartRateZone::Bradycardia
        } else if bpm <= 100 {
            HeartRateZone::Normal
        } else if bpm <= 120 {
            HeartRateZone::Elevated
        } else {
            HeartRateZone::Tachycardia
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            HeartRateZone::Bradycardia => "Bradycardia",
            HeartRateZone::Normal => "Normal",
            HeartRateZone::Elevated => "Elevated",
            HeartRateZone::Tachycardia => "Tachycardia",
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            HeartRateZone::Bradycardia => Severity::Mild,
            HeartRateZone::Normal => Severity::Normal,
            HeartRateZone::Elevated => Severity::Mild,
            HeartRateZone::Tachycardia => Severity::Severe,
        }
    }
}

pub fn classify_bp(reading: &BpReading) -> Classification {
    let category = BpCategory::from_values(reading.systolic, reading.diastolic);
    Classification {
        label: category.label(),
        severity: category.severity(),
    }
}

pub fn classify_heart_rate(reading: &HeartRateReading) -> Classification {
    let zone = HeartRateZone::from_value(reading.value);
    Classification {
        label: zone.label(),
        severity: zone.severity(),
    }
}
