//! Default records seeded on first use.
//!
//! Doctors, medications and emergency contacts start out with a small set of
//! example entries so a fresh install has something to show. Seeds are only
//! applied when nothing has been persisted for that collection.

use crate::types::{Doctor, EmergencyContact, Frequency, Medication};
use chrono::{NaiveDate, NaiveTime};
use once_cell::sync::Lazy;

static DEFAULT_DOCTORS: Lazy<Vec<Doctor>> = Lazy::new(|| {
    vec![
        Doctor {
            name: "Dr. Sarah Johnson".into(),
            specialty: "Primary Care Physician".into(),
            phone: Some("555-123-4567".into()),
            email: Some("sjohnson@example.com".into()),
            address: Some("123 Medical Center Dr, Suite 101".into()),
            notes: Some("Annual checkup in October".into()),
        },
        Doctor {
            name: "Dr. Michael Chen".into(),
            specialty: "Cardiologist".into(),
            phone: Some("555-987-6543".into()),
            email: Some("mchen@example.com".into()),
            address: Some("456 Specialist Ave, Suite 202".into()),
            notes: None,
        },
    ]
});

static DEFAULT_CONTACTS: Lazy<Vec<EmergencyContact>> = Lazy::new(|| {
    vec![
        EmergencyContact {
            name: "Emergency Services".into(),
            phone: "911".into(),
        },
        EmergencyContact {
            name: "Dr. Johnson".into(),
            phone: "555-123-4567".into(),
        },
    ]
});

pub fn default_doctors() -> Vec<Doctor> {
    DEFAULT_DOCTORS.clone()
}

pub fn default_contacts() -> Vec<EmergencyContact> {
    DEFAULT_CONTACTS.clone()
}

/// Example medications, starting `today`
pub fn default_medications(today: NaiveDate) -> Vec<Medication> {
    vec![
        Medication {
            name: "Vitamin D".into(),
            dosage: Some("1000 IU".into()),
            frequency: Frequency::Daily,
            time: NaiveTime::from_hms_opt(8, 0, 0),
            start_date: today,
            end_date: None,
            instructions: Some("Take with breakfast".into()),
            with_food: true,
            with_water: true,
            taken: false,
        },
        Medication {
            name: "Ibuprofen".into(),
            dosage: Some("200mg".into()),
            frequency: Frequency::AsNeeded,
            time: None,
            start_date: today,
            end_date: None,
            instructions: Some("Take for headache or pain".into()),
            with_food: true,
            with_water: true,
            taken: false,
        },
    ]
}
