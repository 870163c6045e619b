//! JSON document store for the Haze Visuals bot.
//!
//! Persistence is whole-document: every operation loads the full map,
//! mutates it in memory, and writes it back. There is no partial-update API.
//! Because that pattern is racy under concurrent interactions, the store
//! exposes one async mutex per document; core operations hold the guard
//! across their entire load-mutate-save cycle, which is the required
//! hardening over the historical design.
//!
//! A missing document file reads back as an empty map, never an error, so a
//! fresh data directory needs no bootstrap step.

use crate::{
    errors::{Error, Result},
    models::{Appointment, DiscountCode, DiscountKind},
};
use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};
use tokio::sync::{Mutex, MutexGuard};
use tracing::{debug, warn};

const APPOINTMENTS_FILE: &str = "appointments.json";
const DISCOUNT_CODES_FILE: &str = "discount_codes.json";

/// Flat-file JSON store rooted at a data directory.
pub struct JsonStore {
    data_dir: PathBuf,
    appointments_lock: Mutex<()>,
    discount_codes_lock: Mutex<()>,
}

impl JsonStore {
    /// Opens a store rooted at `data_dir`, creating the directory if needed.
    pub fn new(data_dir: impl Into<PathBuf>) -> Result<Self> {
        let data_dir = data_dir.into();
        std::fs::create_dir_all(&data_dir)?;
        Ok(Self {
            data_dir,
            appointments_lock: Mutex::new(()),
            discount_codes_lock: Mutex::new(()),
        })
    }

    /// Acquires the critical section for the appointments document.
    ///
    /// Hold the returned guard across the full load-mutate-save cycle;
    /// otherwise two concurrent bookings for the same slot can both pass the
    /// availability check and one of them is silently lost.
    pub async fn lock_appointments(&self) -> MutexGuard<'_, ()> {
        self.appointments_lock.lock().await
    }

    /// Acquires the critical section for the discount-codes document.
    pub async fn lock_discount_codes(&self) -> MutexGuard<'_, ()> {
        self.discount_codes_lock.lock().await
    }

    /// Loads the full appointment map. Missing file yields an empty map.
    pub async fn load_appointments(&self) -> Result<BTreeMap<String, Appointment>> {
        match self.read_document(APPOINTMENTS_FILE).await? {
            Some(raw) => serde_json::from_str(&raw).map_err(Into::into),
            None => Ok(BTreeMap::new()),
        }
    }

    /// Persists the full appointment map, replacing the previous document.
    pub async fn save_appointments(
        &self,
        appointments: &BTreeMap<String, Appointment>,
    ) -> Result<()> {
        let raw = serde_json::to_string_pretty(appointments)?;
        self.write_document(APPOINTMENTS_FILE, &raw).await
    }

    /// Loads the full discount-code catalog. Missing file yields an empty map.
    ///
    /// Entries in the legacy format (a bare numeric fraction under the code
    /// key) are migrated on read into unlimited percentage codes; the next
    /// save persists them in structured form.
    pub async fn load_discount_codes(&self) -> Result<BTreeMap<String, DiscountCode>> {
        let Some(raw) = self.read_document(DISCOUNT_CODES_FILE).await? else {
            return Ok(BTreeMap::new());
        };

        let entries: BTreeMap<String, serde_json::Value> = serde_json::from_str(&raw)?;
        let mut catalog = BTreeMap::new();
        for (code, value) in entries {
            let record = if let Some(fraction) = value.as_f64() {
                debug!(%code, fraction, "migrating legacy discount code entry");
                migrate_legacy_entry(fraction)
            } else {
                serde_json::from_value(value)?
            };
            catalog.insert(code, record);
        }
        Ok(catalog)
    }

    /// Persists the full discount-code catalog, replacing the previous document.
    pub async fn save_discount_codes(
        &self,
        catalog: &BTreeMap<String, DiscountCode>,
    ) -> Result<()> {
        let raw = serde_json::to_string_pretty(catalog)?;
        self.write_document(DISCOUNT_CODES_FILE, &raw).await
    }

    async fn read_document(&self, file_name: &str) -> Result<Option<String>> {
        let path = self.data_dir.join(file_name);
        match tokio::fs::read_to_string(&path).await {
            Ok(raw) => Ok(Some(raw)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(storage_error(&path, &e)),
        }
    }

    /// Writes through a sibling temp file and renames it into place, so a
    /// crash mid-write never leaves a truncated document behind.
    async fn write_document(&self, file_name: &str, contents: &str) -> Result<()> {
        let path = self.data_dir.join(file_name);
        let tmp_path = self.data_dir.join(format!("{file_name}.tmp"));

        tokio::fs::write(&tmp_path, contents)
            .await
            .map_err(|e| storage_error(&tmp_path, &e))?;
        tokio::fs::rename(&tmp_path, &path)
            .await
            .map_err(|e| storage_error(&path, &e))?;
        Ok(())
    }
}

/// Reinterprets a legacy bare-fraction entry as a structured record.
///
/// The historical format stored `{"CODE": 0.15}` for an unlimited 15% code.
#[must_use]
pub fn migrate_legacy_entry(fraction: f64) -> DiscountCode {
    if !(0.0..=1.0).contains(&fraction) {
        warn!(fraction, "legacy discount fraction outside [0, 1]");
    }
    DiscountCode {
        kind: DiscountKind::Percentage,
        value: fraction,
        max_uses: crate::models::discount::UNLIMITED_USES,
        current_uses: 0,
        used_by: Vec::new(),
        auto_delete: false,
        created_at: 0,
        description: "Migrated legacy percentage code".to_string(),
    }
}

fn storage_error(path: &Path, e: &std::io::Error) -> Error {
    Error::Storage {
        message: format!("{}: {e}", path.display()),
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::test_utils::{sample_appointment, setup_test_store};

    #[tokio::test]
    async fn test_missing_documents_read_as_empty_maps() -> Result<()> {
        let (store, _dir) = setup_test_store()?;

        assert!(store.load_appointments().await?.is_empty());
        assert!(store.load_discount_codes().await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_appointments_round_trip() -> Result<()> {
        let (store, _dir) = setup_test_store()?;

        let mut appointments = BTreeMap::new();
        appointments.insert("2024-03-08_18:30".to_string(), sample_appointment("ticket-1"));
        store.save_appointments(&appointments).await?;

        let loaded = store.load_appointments().await?;
        assert_eq!(loaded, appointments);
        Ok(())
    }

    #[tokio::test]
    async fn test_legacy_fraction_entry_is_migrated_on_read() -> Result<()> {
        let (store, dir) = setup_test_store()?;

        // Mixed document: one legacy bare fraction, one structured record.
        let raw = serde_json::json!({
            "OLDTIMER": 0.15,
            "SAVE10": {
                "type": "percentage",
                "value": 0.10,
                "max_uses": -1,
                "created_at": 1_700_000_000
            }
        });
        std::fs::write(dir.path().join("discount_codes.json"), raw.to_string())?;

        let catalog = store.load_discount_codes().await?;
        let legacy = &catalog["OLDTIMER"];
        assert_eq!(legacy.kind, DiscountKind::Percentage);
        assert_eq!(legacy.value, 0.15);
        assert!(legacy.is_unlimited());

        assert_eq!(catalog["SAVE10"].value, 0.10);

        // Saving persists the migrated entry in structured form.
        store.save_discount_codes(&catalog).await?;
        let rewritten = std::fs::read_to_string(dir.path().join("discount_codes.json"))?;
        let rewritten: serde_json::Value = serde_json::from_str(&rewritten)?;
        assert!(rewritten["OLDTIMER"].is_object());
        Ok(())
    }

    #[tokio::test]
    async fn test_corrupt_document_is_a_storage_level_error() -> Result<()> {
        let (store, dir) = setup_test_store()?;
        std::fs::write(dir.path().join("appointments.json"), "{not json")?;

        let result = store.load_appointments().await;
        assert!(matches!(result, Err(Error::Serialization(_))));
        Ok(())
    }

    #[tokio::test]
    async fn test_save_replaces_whole_document() -> Result<()> {
        let (store, _dir) = setup_test_store()?;

        let mut appointments = BTreeMap::new();
        appointments.insert("2024-03-08_18:00".to_string(), sample_appointment("ticket-1"));
        appointments.insert("2024-03-08_18:30".to_string(), sample_appointment("ticket-2"));
        store.save_appointments(&appointments).await?;

        appointments.remove("2024-03-08_18:00");
        store.save_appointments(&appointments).await?;

        let loaded = store.load_appointments().await?;
        assert_eq!(loaded.len(), 1);
        assert!(loaded.contains_key("2024-03-08_18:30"));
        Ok(())
    }
}
