//! Record store with merge-on-save persistence.
//!
//! The whole collection lives under a single backend key as a JSON array
//! sorted newest first. Every mutation is a read-modify-write of that
//! array, held under the backend's write lock from read to write;
//! validation happens before anything is written, so a rejected save or
//! import leaves the persisted collection untouched.

use crate::backend::KeyValueStore;
use crate::codec::{self, ImportSummary};
use crate::{Error, HealthRecord, Result};
use chrono::NaiveDate;

/// Backend key holding the record collection
pub const RECORDS_KEY: &str = "patient_health_data";

/// Authoritative collection of health records, keyed by date
pub struct RecordStore<B: KeyValueStore> {
    backend: B,
}

impl<B: KeyValueStore> RecordStore<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// All records, newest first
    ///
    /// A missing collection is empty. A collection that no longer parses
    /// is reported as a format error rather than replaced.
    pub fn get_all(&self) -> Result<Vec<HealthRecord>> {
        let contents = match self.backend.get(RECORDS_KEY)? {
            Some(contents) => contents,
            None => return Ok(Vec::new()),
        };

        if contents.trim().is_empty() {
            return Ok(Vec::new());
        }

        let mut records: Vec<HealthRecord> = serde_json::from_str(&contents).map_err(|e| {
            tracing::warn!("Stored health records are unreadable: {}", e);
            Error::format(format!("stored health records are unreadable: {}", e))
        })?;

        sort_newest_first(&mut records);
        tracing::debug!("Loaded {} health records", records.len());
        Ok(records)
    }

    pub fn get_by_date(&self, date: NaiveDate) -> Result<Option<HealthRecord>> {
        Ok(self.get_all()?.into_iter().find(|r| r.date == date))
    }

    /// Insert a new record or merge into the existing one for its date
    ///
    /// Returns the record as stored after the merge.
    pub fn save(&mut self, incoming: &HealthRecord) -> Result<HealthRecord> {
        incoming.validate()?;

        let _lock = self.backend.lock()?;
        let mut records = self.get_all()?;
        let stored = merge_into(&mut records, incoming);
        self.persist(records)?;

        Ok(stored)
    }

    /// Merge a batch of records with a single write
    ///
    /// Every record is validated before the collection is touched; one bad
    /// record rejects the whole batch.
    pub fn save_all(&mut self, incoming: &[HealthRecord]) -> Result<usize> {
        for record in incoming {
            record.validate()?;
        }
        if incoming.is_empty() {
            return Ok(0);
        }

        let _lock = self.backend.lock()?;
        let mut records = self.get_all()?;
        for record in incoming {
            merge_into(&mut records, record);
        }
        self.persist(records)?;

        Ok(incoming.len())
    }

    /// Remove the record for a date
    ///
    /// Returns false if there was nothing to delete.
    pub fn delete(&mut self, date: NaiveDate) -> Result<bool> {
        let _lock = self.backend.lock()?;
        let mut records = self.get_all()?;
        let before = records.len();
        records.retain(|r| r.date != date);

        if records.len() == before {
            tracing::debug!("No record for {} to delete", date);
            return Ok(false);
        }

        self.persist(records)?;
        tracing::info!("Deleted record for {}", date);
        Ok(true)
    }

    /// Remove every record
    pub fn clear(&mut self) -> Result<()> {
        let _lock = self.backend.lock()?;
        self.backend.remove(RECORDS_KEY)?;
        tracing::info!("Cleared all health records");
        Ok(())
    }

    /// Serialize the full collection for backup
    pub fn export(&self) -> Result<String> {
        codec::export_records(&self.get_all()?)
    }

    /// Merge a backup into the store
    ///
    /// Records without a date are skipped. Parsing and validation complete
    /// before anything is written.
    pub fn import(&mut self, text: &str) -> Result<ImportSummary> {
        let parsed = codec::parse_backup(text)?;
        let imported = self.save_all(&parsed.records)?;

        tracing::info!(
            "Imported {} records ({} skipped without a date)",
            imported,
            parsed.skipped
        );

        Ok(ImportSummary {
            imported,
            skipped: parsed.skipped,
        })
    }

    fn persist(&mut self, mut records: Vec<HealthRecord>) -> Result<()> {
        sort_newest_first(&mut records);
        let contents = serde_json::to_string(&records)?;
        self.backend.set(RECORDS_KEY, &contents)?;
        tracing::debug!("Persisted {} health records", records.len());
        Ok(())
    }
}

fn merge_into(records: &mut Vec<HealthRecord>, incoming: &HealthRecord) -> HealthRecord {
    match records.iter_mut().find(|r| r.date == incoming.date) {
        Some(existing) => {
            existing.merge_from(incoming);
            tracing::info!("Merged reading into existing record for {}", incoming.date);
            existing.clone()
        }
        None => {
            let mut created = HealthRecord::new(incoming.date);
            created.merge_from(incoming);
            records.push(created.clone());
            tracing::info!("Created record for {}", incoming.date);
            created
        }
    }
}

fn sort_newest_first(records: &mut [HealthRecord]) {
    records.sort_by(|a, b| b.date.cmp(&a.date));
}
