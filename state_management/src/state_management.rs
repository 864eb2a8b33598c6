use crate::error::StoreError;
use state::config::KeystoreConfig;
use state::keystore_record::{Address, Id, KeystoreRecord, RecordKey, ValueHash};
use state::state_record::StateRecord;

/// `ManageState` is the storage seam for keystore records. Implementations provide durable
/// key-value storage with an atomic compare-and-swap.
pub trait ManageState: Sized {
    type Record: StateRecord;

    fn new(config: &KeystoreConfig) -> Result<Self, StoreError>;
    fn get_state_record(&self, key: &RecordKey) -> Result<Option<Self::Record>, StoreError>;
    fn set_state_record(&self, record: &Self::Record) -> Result<(), StoreError>;
    /// Write `record` only if the entry under `key` still equals `expected`
    /// (`None` meaning "absent"). Returns `false` when another write got there first.
    fn swap_state_record(
        &self,
        key: &RecordKey,
        expected: Option<&Self::Record>,
        record: &Self::Record,
    ) -> Result<bool, StoreError>;
    fn get_entries_with_prefix(&self, prefix: &[u8]) -> Result<Vec<Self::Record>, StoreError>;
    fn commit(&self) -> Result<(), StoreError>;
}

/// The record store: `(id, account) -> value hash`, on top of any `ManageState` backend.
///
/// No validation happens here beyond refusing the zero value hash; callers enforce the
/// update rules.
#[derive(Debug, Clone)]
pub struct StateManager<T: ManageState<Record = KeystoreRecord>> {
    pub manage_state: T,
}

impl<T: ManageState<Record = KeystoreRecord>> StateManager<T> {
    pub fn new(config: &KeystoreConfig) -> Result<Self, StoreError> {
        Ok(Self {
            manage_state: T::new(config)?,
        })
    }

    pub fn get(&self, id: &Id, account: &Address) -> Result<Option<ValueHash>, StoreError> {
        let record = self.manage_state.get_state_record(&RecordKey::new(*id, *account))?;
        Ok(record.map(|record| record.value_hash))
    }

    /// Raw stored value hash, zero when the record was never written.
    pub fn records(&self, id: &Id, account: &Address) -> Result<[u8; 32], StoreError> {
        Ok(self.get(id, account)?.map(|value_hash| value_hash.0).unwrap_or([0u8; 32]))
    }

    pub fn put(&self, id: &Id, account: &Address, value_hash: &ValueHash) -> Result<(), StoreError> {
        self.manage_state
            .set_state_record(&KeystoreRecord::new(*id, *account, *value_hash))
    }

    pub fn swap(
        &self,
        id: &Id,
        account: &Address,
        expected: Option<&ValueHash>,
        value_hash: &ValueHash,
    ) -> Result<bool, StoreError> {
        let expected = expected.map(|expected| KeystoreRecord::new(*id, *account, *expected));
        self.manage_state.swap_state_record(
            &RecordKey::new(*id, *account),
            expected.as_ref(),
            &KeystoreRecord::new(*id, *account, *value_hash),
        )
    }

    /// Every record written under `id`, ordered by account.
    pub fn accounts(&self, id: &Id) -> Result<Vec<KeystoreRecord>, StoreError> {
        self.manage_state.get_entries_with_prefix(id.as_ref())
    }

    pub fn commit(&self) -> Result<(), StoreError> {
        self.manage_state.commit()
    }
}
