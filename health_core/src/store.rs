//! Generic record collections backed by a storage port.
//!
//! A [`RecordStore`] holds the records of one collection (BP readings,
//! appointments, ...) in memory and writes the whole array back to its
//! storage key after every mutation. Persistence is suppressed until the
//! initial load has finished, so a store can never clobber data it has not
//! read yet.

use crate::seeds;
use crate::storage::{
    StoragePort, APPOINTMENTS_KEY, BP_READINGS_KEY, CONTACTS_KEY, DOCTORS_KEY, HEART_RATE_KEY,
    MEDICATIONS_KEY,
};
use crate::types::{
    Appointment, BpReading, Doctor, EmergencyContact, HeartRateReading, Medication, Record,
    RecordId,
};
use crate::Result;
use chrono::{DateTime, NaiveDate, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;

/// A kind of record that lives in its own storage key
pub trait Collection: Clone + Serialize + DeserializeOwned {
    /// Storage key holding the serialized array
    const KEY: &'static str;

    /// Records to start with when nothing has been persisted
    fn seed(_today: NaiveDate) -> Vec<Self> {
        Vec::new()
    }

    /// Restore the collection's ordering after an insertion or load
    fn reorder(_records: &mut [Record<Self>]) {}
}

impl Collection for BpReading {
    const KEY: &'static str = BP_READINGS_KEY;
}

impl Collection for HeartRateReading {
    const KEY: &'static str = HEART_RATE_KEY;
}

impl Collection for Appointment {
    const KEY: &'static str = APPOINTMENTS_KEY;

    fn reorder(records: &mut [Record<Self>]) {
        records.sort_by_key(|r| r.fields.timestamp());
    }
}

impl Collection for Doctor {
    const KEY: &'static str = DOCTORS_KEY;

    fn seed(_today: NaiveDate) -> Vec<Self> {
        seeds::default_doctors()
    }
}

impl Collection for Medication {
    const KEY: &'static str = MEDICATIONS_KEY;

    fn seed(today: NaiveDate) -> Vec<Self> {
        seeds::default_medications(today)
    }
}

impl Collection for EmergencyContact {
    const KEY: &'static str = CONTACTS_KEY;

    fn seed(_today: NaiveDate) -> Vec<Self> {
        seeds::default_contacts()
    }
}

/// Ordered, persisted collection of records of one kind
pub struct RecordStore<T: Collection, S: StoragePort> {
    storage: S,
    records: Vec<Record<T>>,
    loaded: bool,
    last_id: u64,
}

impl<T: Collection, S: StoragePort> RecordStore<T, S> {
    /// Create an unloaded store; nothing is persisted until [`load`](Self::load)
    pub fn new(storage: S) -> Self {
        Self {
            storage,
            records: Vec::new(),
            loaded: false,
            last_id: 0,
        }
    }

    /// Create a store and load it immediately
    pub fn open(storage: S) -> Result<Self> {
        let mut store = Self::new(storage);
        store.load()?;
        Ok(store)
    }

    /// Load persisted records, seeding defaults when there are none
    ///
    /// Missing or unreadable data is treated as "no data". The only error
    /// that can surface is a failure to write the loaded state back.
    pub fn load(&mut self) -> Result<&[Record<T>]> {
        self.load_at(Utc::now())
    }

    pub fn load_at(&mut self, now: DateTime<Utc>) -> Result<&[Record<T>]> {
        self.records = match self.read_persisted() {
            Some(records) => records,
            None => Self::seed_records(now),
        };
        T::reorder(&mut self.records);
        self.last_id = self.records.iter().map(|r| r.id.0).max().unwrap_or(0);
        self.loaded = true;

        tracing::debug!("Loaded {} records from {}", self.records.len(), T::KEY);
        self.persist()?;
        Ok(&self.records)
    }

    fn read_persisted(&self) -> Option<Vec<Record<T>>> {
        let raw = match self.storage.read(T::KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!("Unable to read {}: {}. Using defaults.", T::KEY, e);
                return None;
            }
        };

        match serde_json::from_str::<Vec<Record<T>>>(&raw) {
            Ok(records) => Some(records),
            Err(e) => {
                tracing::warn!("Failed to parse {}: {}. Using defaults.", T::KEY, e);
                None
            }
        }
    }

    fn seed_records(now: DateTime<Utc>) -> Vec<Record<T>> {
        T::seed(now.date_naive())
            .into_iter()
            .zip(1u64..)
            .map(|(fields, id)| Record {
                id: RecordId(id),
                created_at: now,
                fields,
            })
            .collect()
    }

    /// Append a new record and persist; returns the id it was given
    pub fn add(&mut self, fields: T) -> Result<RecordId> {
        self.add_at(fields, Utc::now())
    }

    pub fn add_at(&mut self, fields: T, now: DateTime<Utc>) -> Result<RecordId> {
        let id = self.next_id(now);
        self.records.push(Record {
            id,
            created_at: now,
            fields,
        });
        T::reorder(&mut self.records);
        self.persist()?;

        tracing::debug!("Added record {} to {}", id, T::KEY);
        Ok(id)
    }

    /// Delete the record with `id`; returns whether anything was removed
    ///
    /// Removing an id that is not present is a no-op.
    pub fn remove(&mut self, id: RecordId) -> Result<bool> {
        let before = self.records.len();
        self.records.retain(|r| r.id != id);
        if self.records.len() == before {
            tracing::debug!("No record {} in {}", id, T::KEY);
            return Ok(false);
        }

        self.persist()?;
        tracing::debug!("Removed record {} from {}", id, T::KEY);
        Ok(true)
    }

    pub fn get(&self, id: RecordId) -> Option<&Record<T>> {
        self.records.iter().find(|r| r.id == id)
    }

    pub fn records(&self) -> &[Record<T>] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Millisecond creation time, bumped past the last issued id so two
    /// records created in the same millisecond still get distinct ids.
    fn next_id(&mut self, now: DateTime<Utc>) -> RecordId {
        let millis = u64::try_from(now.timestamp_millis()).unwrap_or(0);
        let id = millis.max(self.last_id + 1);
        self.last_id = id;
        RecordId(id)
    }

    fn persist(&self) -> Result<()> {
        if !self.loaded {
            tracing::debug!("Skipping write of {} before load", T::KEY);
            return Ok(());
        }

        let contents = serde_json::to_string(&self.records)?;
        self.storage.write(T::KEY, &contents)
    }
}

impl<S: StoragePort> RecordStore<Medication, S> {
    /// Replace the medication with `id` by a patched copy; no-op if absent
    pub fn update<F>(&mut self, id: RecordId, patch: F) -> Result<bool>
    where
        F: FnOnce(&mut Medication),
    {
        let Some(record) = self.records.iter_mut().find(|r| r.id == id) else {
            tracing::debug!("No medication {} to update", id);
            return Ok(false);
        };

        let mut fields = record.fields.clone();
        patch(&mut fields);
        record.fields = fields;

        self.persist()?;
        Ok(true)
    }

    /// Flip the taken flag; returns the new value, `None` if `id` is unknown
    pub fn toggle_taken(&mut self, id: RecordId) -> Result<Option<bool>> {
        let mut taken = None;
        self.update(id, |m| {
            m.taken = !m.taken;
            taken = Some(m.taken);
        })?;
        Ok(taken)
    }
}
