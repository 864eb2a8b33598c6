use crate::error::StoreError;
use crate::state_management::ManageState;
use borsh::to_vec;
use log::debug;
use sled::{Config, Db, Tree};
use state::config::KeystoreConfig;
use state::keystore_record::{KeystoreRecord, RecordKey, ValueHash};
use state::state_record::StateRecord;

const RECORDS_TREE: &str = "records";

/// Sled backed record store.
///
/// Records live in a single tree keyed by `id || account`, each value being the raw 32-byte
/// value hash.
#[derive(Debug, Clone)]
pub struct SledStateManagement {
    db: Db,
    records: Tree,
}

impl SledStateManagement {
    fn encode_value(record: &KeystoreRecord) -> Result<Vec<u8>, StoreError> {
        if record.value_hash.is_zero() {
            return Err(StoreError::ZeroValueHash);
        }
        // A fixed size array has no length prefix in borsh, so this is exactly 32 bytes
        to_vec(&record.value_hash).map_err(|err| StoreError::Corrupt {
            key: hex_key(&record.get_key()),
            reason: err.to_string(),
        })
    }

    fn decode_entry(key: &[u8], value: &[u8]) -> Result<KeystoreRecord, StoreError> {
        let record_key = RecordKey::from_bytes(key).ok_or_else(|| StoreError::Corrupt {
            key: format!("{:?}", key),
            reason: format!("expected a {} byte key", RecordKey::LEN),
        })?;
        let value_hash = ValueHash::from_slice(value).map_err(|err| StoreError::Corrupt {
            key: hex_key(&record_key),
            reason: err.to_string(),
        })?;
        Ok(KeystoreRecord::new(record_key.id, record_key.account, value_hash))
    }
}

fn hex_key(key: &RecordKey) -> String {
    format!("{}/{}", key.id, key.account)
}

impl ManageState for SledStateManagement {
    type Record = KeystoreRecord;

    fn new(config: &KeystoreConfig) -> Result<Self, StoreError> {
        let sled_config = if config.temporary_db {
            Config::new().temporary(true)
        } else {
            Config::new().path(&config.record_db_path)
        };
        let flush_every_ms = (config.flush_every_ms > 0).then_some(config.flush_every_ms);

        let db = sled_config.flush_every_ms(flush_every_ms).open()?;
        let records = db.open_tree(RECORDS_TREE)?;
        debug!(
            "Opened record store (temporary: {}, path: {})",
            config.temporary_db, config.record_db_path
        );
        Ok(Self { db, records })
    }

    fn get_state_record(&self, key: &RecordKey) -> Result<Option<KeystoreRecord>, StoreError> {
        let key_bytes = key.to_bytes();
        match self.records.get(key_bytes)? {
            None => Ok(None),
            Some(value) => Self::decode_entry(&key_bytes, &value).map(Some),
        }
    }

    fn set_state_record(&self, record: &KeystoreRecord) -> Result<(), StoreError> {
        let value = Self::encode_value(record)?;
        self.records.insert(record.get_key().to_bytes(), value)?;
        Ok(())
    }

    fn swap_state_record(
        &self,
        key: &RecordKey,
        expected: Option<&KeystoreRecord>,
        record: &KeystoreRecord,
    ) -> Result<bool, StoreError> {
        let old = expected.map(Self::encode_value).transpose()?;
        let new = Self::encode_value(record)?;

        let swapped = self.records.compare_and_swap(key.to_bytes(), old, Some(new))?;
        if swapped.is_err() {
            debug!("Lost compare-and-swap on {}", hex_key(key));
        }
        Ok(swapped.is_ok())
    }

    fn get_entries_with_prefix(&self, prefix: &[u8]) -> Result<Vec<KeystoreRecord>, StoreError> {
        self.records
            .scan_prefix(prefix)
            .map(|entry| {
                let (key, value) = entry?;
                Self::decode_entry(&key, &value)
            })
            .collect()
    }

    fn commit(&self) -> Result<(), StoreError> {
        self.db.flush()?;
        Ok(())
    }
}
