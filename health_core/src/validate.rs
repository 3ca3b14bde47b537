//! Form input validation.
//!
//! Every tracker accepts raw input exactly as the user typed it and runs it
//! through one of these validators before anything reaches a store. The
//! validators are pure: they never touch storage and report the first rule
//! that fails.

use crate::types::{
    Appointment, BpReading, Doctor, EmergencyContact, Frequency, HeartRateReading, Medication,
};
use chrono::{NaiveDate, NaiveTime};
use std::num::IntErrorKind;

pub const SYSTOLIC_RANGE: (i64, i64) = (70, 250);
pub const DIASTOLIC_RANGE: (i64, i64) = (40, 150);
pub const PULSE_RANGE: (i64, i64) = (40, 200);
pub const HEART_RATE_RANGE: (i64, i64) = (30, 220);
pub const WATER_GOAL_RANGE: (i64, i64) = (1, 15);

const DATE_FORMAT: &str = "%Y-%m-%d";
const TIME_FORMAT: &str = "%H:%M";

/// Why a piece of user input was rejected
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("{field} is required")]
    Required { field: &'static str },

    #[error("{field} must be a valid number")]
    NotANumber { field: &'static str },

    #[error("{field} should be between {min} and {max}")]
    OutOfRange {
        field: &'static str,
        min: i64,
        max: i64,
    },

    #[error("{field} must be a positive number")]
    NotPositive { field: &'static str },

    #[error("{field} cannot exceed {max}")]
    AboveCap { field: &'static str, max: f64 },

    #[error("{field} must be formatted as {expected}")]
    InvalidFormat {
        field: &'static str,
        expected: &'static str,
    },
}

// ============================================================================
// Raw Form Inputs
// ============================================================================

/// Blood pressure form; pulse may be left blank
#[derive(Clone, Debug, Default)]
pub struct BpInput {
    pub systolic: String,
    pub diastolic: String,
    pub pulse: String,
}

#[derive(Clone, Debug, Default)]
pub struct HeartRateInput {
    pub value: String,
    pub notes: String,
}

#[derive(Clone, Debug, Default)]
pub struct AppointmentInput {
    pub doctor_name: String,
    pub purpose: String,
    pub location: String,
    pub notes: String,
    /// `YYYY-MM-DD`
    pub date: String,
    /// `HH:MM`
    pub time: String,
}

#[derive(Clone, Debug, Default)]
pub struct DoctorInput {
    pub name: String,
    pub specialty: String,
    pub phone: String,
    pub email: String,
    pub address: String,
    pub notes: String,
}

#[derive(Clone, Debug)]
pub struct MedicationInput {
    pub name: String,
    pub dosage: String,
    pub frequency: Frequency,
    pub time: String,
    /// Blank means today
    pub start_date: String,
    pub end_date: String,
    pub instructions: String,
    pub with_food: bool,
    pub with_water: bool,
}

impl Default for MedicationInput {
    fn default() -> Self {
        Self {
            name: String::new(),
            dosage: String::new(),
            frequency: Frequency::Daily,
            time: String::new(),
            start_date: String::new(),
            end_date: String::new(),
            instructions: String::new(),
            with_food: false,
            with_water: true,
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct ContactInput {
    pub name: String,
    pub phone: String,
}

// ============================================================================
// Validators
// ============================================================================

/// Validate a water amount in glasses against the daily cap
pub fn validate_water_amount(amount: f64, cap: f64) -> Result<f64, ValidationError> {
    let field = "Water amount";
    if !amount.is_finite() || amount <= 0.0 {
        return Err(ValidationError::NotPositive { field });
    }
    if amount > cap {
        return Err(ValidationError::AboveCap { field, max: cap });
    }
    Ok(amount)
}

/// Validate a daily water goal in glasses
pub fn validate_water_goal(goal: i64) -> Result<u8, ValidationError> {
    let goal = in_range("Water goal", goal, WATER_GOAL_RANGE)?;
    Ok(goal as u8)
}

/// Validate a blood pressure form
///
/// Rules are checked stage by stage: required fields, then numeric parsing,
/// then ranges. Within each stage systolic goes first, then diastolic, then
/// pulse.
pub fn validate_bp(input: &BpInput) -> Result<BpReading, ValidationError> {
    let systolic = required("Systolic", &input.systolic)?;
    let diastolic = required("Diastolic", &input.diastolic)?;
    let pulse = optional(&input.pulse);

    let systolic = parse_int("Systolic", systolic)?;
    let diastolic = parse_int("Diastolic", diastolic)?;
    let pulse = pulse
        .as_deref()
        .map(|p| parse_int("Pulse", p))
        .transpose()?;

    let systolic = in_range("Systolic", systolic, SYSTOLIC_RANGE)?;
    let diastolic = in_range("Diastolic", diastolic, DIASTOLIC_RANGE)?;
    let pulse = pulse
        .map(|p| in_range("Pulse", p, PULSE_RANGE))
        .transpose()?;

    Ok(BpReading {
        systolic: systolic as u16,
        diastolic: diastolic as u16,
        pulse: pulse.map(|p| p as u16),
    })
}

pub fn validate_heart_rate(input: &HeartRateInput) -> Result<HeartRateReading, ValidationError> {
    let value = required("Heart rate", &input.value)?;
    let value = parse_int("Heart rate", value)?;
    let value = in_range("Heart rate", value, HEART_RATE_RANGE)?;

    Ok(HeartRateReading {
        value: value as u16,
        notes: optional(&input.notes),
    })
}

pub fn validate_appointment(input: &AppointmentInput) -> Result<Appointment, ValidationError> {
    let doctor_name = required("Doctor name", &input.doctor_name)?;
    let date = required("Date", &input.date)?;
    let time = required("Time", &input.time)?;

    Ok(Appointment {
        doctor_name: doctor_name.to_string(),
        purpose: optional(&input.purpose),
        location: optional(&input.location),
        notes: optional(&input.notes),
        date: parse_date("Date", date)?,
        time: parse_time("Time", time)?,
    })
}

pub fn validate_doctor(input: &DoctorInput) -> Result<Doctor, ValidationError> {
    let name = required("Name", &input.name)?;
    let specialty = required("Specialty", &input.specialty)?;

    Ok(Doctor {
        name: name.to_string(),
        specialty: specialty.to_string(),
        phone: optional(&input.phone),
        email: optional(&input.email),
        address: optional(&input.address),
        notes: optional(&input.notes),
    })
}

/// Validate a medication form
///
/// A blank start date means `today`. Time may only be left blank for
/// as-needed medications.
pub fn validate_medication(
    input: &MedicationInput,
    today: NaiveDate,
) -> Result<Medication, ValidationError> {
    let name = required("Medication name", &input.name)?;

    let time = match optional(&input.time) {
        Some(t) => Some(parse_time("Time", &t)?),
        None if input.frequency == Frequency::AsNeeded => None,
        None => return Err(ValidationError::Required { field: "Time" }),
    };

    let start_date = match optional(&input.start_date) {
        Some(d) => parse_date("Start date", &d)?,
        None => today,
    };
    let end_date = optional(&input.end_date)
        .map(|d| parse_date("End date", &d))
        .transpose()?;

    Ok(Medication {
        name: name.to_string(),
        dosage: optional(&input.dosage),
        frequency: input.frequency,
        time,
        start_date,
        end_date,
        instructions: optional(&input.instructions),
        with_food: input.with_food,
        with_water: input.with_water,
        taken: false,
    })
}

pub fn validate_contact(input: &ContactInput) -> Result<EmergencyContact, ValidationError> {
    let name = required("Contact name", &input.name)?;
    let phone = required("Phone", &input.phone)?;

    Ok(EmergencyContact {
        name: name.to_string(),
        phone: phone.to_string(),
    })
}

// ============================================================================
// Field Helpers
// ============================================================================

fn required<'a>(field: &'static str, value: &'a str) -> Result<&'a str, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(ValidationError::Required { field })
    } else {
        Ok(trimmed)
    }
}

fn optional(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Integers too large for `i64` saturate so the range check reports them
fn parse_int(field: &'static str, value: &str) -> Result<i64, ValidationError> {
    match value.trim().parse::<i64>() {
        Ok(n) => Ok(n),
        Err(e) => match e.kind() {
            IntErrorKind::PosOverflow => Ok(i64::MAX),
            IntErrorKind::NegOverflow => Ok(i64::MIN),
            _ => Err(ValidationError::NotANumber { field }),
        },
    }
}

fn in_range(field: &'static str, value: i64, (min, max): (i64, i64)) -> Result<i64, ValidationError> {
    if value < min || value > max {
        Err(ValidationError::OutOfRange { field, min, max })
    } else {
        Ok(value)
    }
}

fn parse_date(field: &'static str, value: &str) -> Result<NaiveDate, ValidationError> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT).map_err(|_| {
        ValidationError::InvalidFormat {
            field,
            expected: "YYYY-MM-DD",
        }
    })
}

fn parse_time(field: &'static str, value: &str) -> Result<NaiveTime, ValidationError> {
    NaiveTime::parse_from_str(value.trim(), TIME_FORMAT).map_err(|_| {
        ValidationError::InvalidFormat {
            field,
            expected: "HH:MM",
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bp(systolic: &str, diastolic: &str, pulse: &str) -> BpInput {
        BpInput {
            systolic: systolic.into(),
            diastolic: diastolic.into(),
            pulse: pulse.into(),
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
    }

    #[test]
    fn test_valid_bp_with_and_without_pulse() {
        let reading = validate_bp(&bp("120", "80", "72")).unwrap();
        assert_eq!(reading.systolic, 120);
        assert_eq!(reading.diastolic, 80);
        assert_eq!(reading.pulse, Some(72));

        let reading = validate_bp(&bp(" 118 ", "76", "  ")).unwrap();
        assert_eq!(reading.systolic, 118);
        assert_eq!(reading.pulse, None);
    }

    #[test]
    fn test_bp_missing_fields_reported_first() {
        assert_eq!(
            validate_bp(&bp("", "abc", "")),
            Err(ValidationError::Required { field: "Systolic" })
        );
        assert_eq!(
            validate_bp(&bp("999", "", "")),
            Err(ValidationError::Required { field: "Diastolic" })
        );
    }

    #[test]
    fn test_bp_non_numeric_before_out_of_range() {
        // Systolic is out of range but the diastolic parse failure wins
        assert_eq!(
            validate_bp(&bp("300", "eighty", "")),
            Err(ValidationError::NotANumber { field: "Diastolic" })
        );
        assert_eq!(
            validate_bp(&bp("300", "80", "7x")),
            Err(ValidationError::NotANumber { field: "Pulse" })
        );
        assert_eq!(
            validate_bp(&bp("12abc", "80", "")),
            Err(ValidationError::NotANumber { field: "Systolic" })
        );
    }

    #[test]
    fn test_bp_systolic_range_checked_before_diastolic() {
        for systolic in ["69", "251", "0", "400"] {
            assert_eq!(
                validate_bp(&bp(systolic, "10", "")),
                Err(ValidationError::OutOfRange {
                    field: "Systolic",
                    min: 70,
                    max: 250
                })
            );
        }
    }

    #[test]
    fn test_oversized_numbers_are_out_of_range() {
        assert_eq!(
            validate_bp(&bp("99999999999999999999", "80", "")),
            Err(ValidationError::OutOfRange {
                field: "Systolic",
                min: 70,
                max: 250
            })
        );
        assert_eq!(
            validate_bp(&bp("120", "-99999999999999999999", "")),
            Err(ValidationError::OutOfRange {
                field: "Diastolic",
                min: 40,
                max: 150
            })
        );
        // Still a number, so a later non-numeric field is reported first
        assert_eq!(
            validate_bp(&bp("99999999999999999999", "8o", "")),
            Err(ValidationError::NotANumber { field: "Diastolic" })
        );
        assert_eq!(
            validate_heart_rate(&HeartRateInput {
                value: "18446744073709551616".into(),
                notes: String::new(),
            }),
            Err(ValidationError::OutOfRange {
                field: "Heart rate",
                min: 30,
                max: 220
            })
        );
    }

    #[test]
    fn test_bp_range_boundaries() {
        assert!(validate_bp(&bp("70", "40", "40")).is_ok());
        assert!(validate_bp(&bp("250", "150", "200")).is_ok());
        assert_eq!(
            validate_bp(&bp("120", "151", "")),
            Err(ValidationError::OutOfRange {
                field: "Diastolic",
                min: 40,
                max: 150
            })
        );
        assert_eq!(
            validate_bp(&bp("120", "80", "201")),
            Err(ValidationError::OutOfRange {
                field: "Pulse",
                min: 40,
                max: 200
            })
        );
    }

    #[test]
    fn test_validation_messages() {
        let err = validate_bp(&bp("50", "80", "")).unwrap_err();
        assert_eq!(err.to_string(), "Systolic should be between 70 and 250");

        let err = validate_bp(&bp("", "80", "")).unwrap_err();
        assert_eq!(err.to_string(), "Systolic is required");
    }

    #[test]
    fn test_heart_rate_validation() {
        let input = HeartRateInput {
            value: "72".into(),
            notes: "after coffee".into(),
        };
        let reading = validate_heart_rate(&input).unwrap();
        assert_eq!(reading.value, 72);
        assert_eq!(reading.notes.as_deref(), Some("after coffee"));

        let blank = HeartRateInput::default();
        assert_eq!(
            validate_heart_rate(&blank),
            Err(ValidationError::Required { field: "Heart rate" })
        );

        for value in ["29", "221"] {
            let input = HeartRateInput {
                value: value.into(),
                notes: String::new(),
            };
            assert!(matches!(
                validate_heart_rate(&input),
                Err(ValidationError::OutOfRange { .. })
            ));
        }
    }

    #[test]
    fn test_water_amount_and_goal() {
        assert_eq!(validate_water_amount(0.5, 20.0), Ok(0.5));
        assert!(validate_water_amount(0.0, 20.0).is_err());
        assert!(validate_water_amount(-1.0, 20.0).is_err());
        assert!(validate_water_amount(f64::NAN, 20.0).is_err());
        assert!(validate_water_amount(21.0, 20.0).is_err());

        assert_eq!(validate_water_goal(8), Ok(8));
        assert!(validate_water_goal(0).is_err());
        assert!(validate_water_goal(16).is_err());
    }

    #[test]
    fn test_appointment_requires_doctor_date_and_time() {
        let mut input = AppointmentInput {
            doctor_name: "Dr. Chen".into(),
            date: "2024-06-03".into(),
            time: "09:30".into(),
            ..Default::default()
        };
        let appointment = validate_appointment(&input).unwrap();
        assert_eq!(appointment.time, NaiveTime::from_hms_opt(9, 30, 0).unwrap());
        assert_eq!(appointment.purpose, None);

        input.time = " ".into();
        assert_eq!(
            validate_appointment(&input),
            Err(ValidationError::Required { field: "Time" })
        );

        input.time = "9.30am".into();
        assert!(matches!(
            validate_appointment(&input),
            Err(ValidationError::InvalidFormat { field: "Time", .. })
        ));
    }

    #[test]
    fn test_doctor_requires_name_and_specialty() {
        let input = DoctorInput {
            name: "Dr. Patel".into(),
            ..Default::default()
        };
        assert_eq!(
            validate_doctor(&input),
            Err(ValidationError::Required { field: "Specialty" })
        );
    }

    #[test]
    fn test_medication_time_required_unless_as_needed() {
        let as_needed = MedicationInput {
            name: "Ibuprofen".into(),
            frequency: Frequency::AsNeeded,
            ..Default::default()
        };
        let medication = validate_medication(&as_needed, today()).unwrap();
        assert_eq!(medication.time, None);
        assert_eq!(medication.start_date, today());
        assert!(!medication.taken);

        let daily = MedicationInput {
            name: "Vitamin D".into(),
            frequency: Frequency::Daily,
            ..Default::default()
        };
        assert_eq!(
            validate_medication(&daily, today()),
            Err(ValidationError::Required { field: "Time" })
        );
    }

    #[test]
    fn test_medication_name_checked_first() {
        let input = MedicationInput::default();
        assert_eq!(
            validate_medication(&input, today()),
            Err(ValidationError::Required {
                field: "Medication name"
            })
        );
    }

    #[test]
    fn test_contact_requires_name_and_phone() {
        let input = ContactInput {
            name: "Sam".into(),
            phone: "".into(),
        };
        assert_eq!(
            validate_contact(&input),
            Err(ValidationError::Required { field: "Phone" })
        );
    }
}
