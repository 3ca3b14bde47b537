//! Read-only views derived from store snapshots.
//!
//! Nothing here mutates or persists; each function takes the records (and
//! the current time where it matters) and returns what the front end shows.

use crate::types::{Appointment, Doctor, Frequency, HeartRateReading, Medication, Record};
use chrono::NaiveDateTime;

/// Appointments split around "now", each half in store order
#[derive(Debug)]
pub struct AppointmentSchedule<'a> {
    pub upcoming: Vec<&'a Record<Appointment>>,
    pub past: Vec<&'a Record<Appointment>>,
}

/// Partition appointments into upcoming (strictly after `now`) and past
pub fn partition_appointments(
    records: &[Record<Appointment>],
    now: NaiveDateTime,
) -> AppointmentSchedule<'_> {
    let (upcoming, past): (Vec<_>, Vec<_>) = records
        .iter()
        .partition(|r| r.fields.timestamp() > now);
    AppointmentSchedule { upcoming, past }
}

/// Medications to show on today's list
///
/// Only daily and as-needed medications are included; weekly, monthly and
/// twice-daily schedules are not expanded into days.
pub fn due_today(records: &[Record<Medication>]) -> Vec<&Record<Medication>> {
    records
        .iter()
        .filter(|r| matches!(r.fields.frequency, Frequency::Daily | Frequency::AsNeeded))
        .collect()
}

/// Mean heart rate rounded to the nearest BPM, 0 with no readings
pub fn average_heart_rate(records: &[Record<HeartRateReading>]) -> u32 {
    if records.is_empty() {
        return 0;
    }
    let sum: u64 = records.iter().map(|r| u64::from(r.fields.value)).sum();
    (sum as f64 / records.len() as f64).round() as u32
}

/// Percentage of the daily water goal reached, rounded
pub fn water_progress(total: f64, goal: u8) -> u32 {
    if goal == 0 {
        return 0;
    }
    (total / f64::from(goal) * 100.0).round() as u32
}

/// Case-insensitive match on doctor name or specialty; blank query matches all
pub fn search_doctors<'a>(records: &'a [Record<Doctor>], query: &str) -> Vec<&'a Record<Doctor>> {
    let needle = query.trim().to_lowercase();
    records
        .iter()
        .filter(|r| {
            needle.is_empty()
                || r.fields.name.to_lowercase().contains(&needle)
                || r.fields.specialty.to_lowercase().contains(&needle)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seeds;
    use crate::types::RecordId;
    use chrono::{NaiveDate, NaiveTime, Utc};

    fn record<T>(id: u64, fields: T) -> Record<T> {
        Record {
            id: RecordId(id),
            created_at: Utc::now(),
            fields,
        }
    }

    fn heart(values: &[u16]) -> Vec<Record<HeartRateReading>> {
        values
            .iter()
            .enumerate()
            .map(|(i, &value)| record(i as u64, HeartRateReading { value, notes: None }))
            .collect()
    }

    fn appointment_at(day: u32, hour: u32) -> Appointment {
        Appointment {
            doctor_name: "Dr. Chen".into(),
            purpose: None,
            location: None,
            notes: None,
            date: NaiveDate::from_ymd_opt(2024, 3, day).unwrap(),
            time: NaiveTime::from_hms_opt(hour, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_average_heart_rate() {
        assert_eq!(average_heart_rate(&heart(&[60, 80, 100])), 80);
        assert_eq!(average_heart_rate(&heart(&[])), 0);
        assert_eq!(average_heart_rate(&heart(&[70, 71])), 71);
        assert_eq!(average_heart_rate(&heart(&[70, 70, 71])), 70);
    }

    #[test]
    fn test_partition_appointments_around_now() {
        let records = vec![
            record(1, appointment_at(1, 9)),
            record(2, appointment_at(2, 9)),
            record(3, appointment_at(2, 15)),
            record(4, appointment_at(5, 9)),
        ];
        let now = NaiveDate::from_ymd_opt(2024, 3, 2)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap();

        let schedule = partition_appointments(&records, now);
        let upcoming: Vec<_> = schedule.upcoming.iter().map(|r| r.id.0).collect();
        let past: Vec<_> = schedule.past.iter().map(|r| r.id.0).collect();

        // An appointment exactly at "now" counts as past
        assert_eq!(upcoming, vec![3, 4]);
        assert_eq!(past, vec![1, 2]);
    }

    #[test]
    fn test_due_today_only_daily_and_as_needed() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let mut medications = seeds::default_medications(today);
        let mut weekly = medications[0].clone();
        weekly.name = "Methotrexate".into();
        weekly.frequency = Frequency::Weekly;
        let mut twice = medications[0].clone();
        twice.name = "Metformin".into();
        twice.frequency = Frequency::TwiceDaily;
        medications.push(weekly);
        medications.push(twice);

        let records: Vec<_> = medications
            .into_iter()
            .enumerate()
            .map(|(i, m)| record(i as u64, m))
            .collect();

        let names: Vec<_> = due_today(&records)
            .iter()
            .map(|r| r.fields.name.as_str())
            .collect();
        assert_eq!(names, vec!["Vitamin D", "Ibuprofen"]);
    }

    #[test]
    fn test_water_progress() {
        assert_eq!(water_progress(0.0, 8), 0);
        assert_eq!(water_progress(4.0, 8), 50);
        assert_eq!(water_progress(1.0, 3), 33);
        assert_eq!(water_progress(20.0, 8), 250);
    }

    #[test]
    fn test_search_doctors() {
        let records: Vec<_> = seeds::default_doctors()
            .into_iter()
            .enumerate()
            .map(|(i, d)| record(i as u64, d))
            .collect();

        assert_eq!(search_doctors(&records, "").len(), 2);
        assert_eq!(search_doctors(&records, "CARDIO")[0].fields.name, "Dr. Michael Chen");
        assert_eq!(search_doctors(&records, "johnson").len(), 1);
        assert!(search_doctors(&records, "dentist").is_empty());
    }
}
