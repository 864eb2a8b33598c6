use crate::keystore_record::RecordKey;
use borsh::{BorshDeserialize, BorshSerialize};

/// A state record is a struct that will be used in a key value store. It can be serialized to
/// and from bytes using borsh and knows the key it is stored under.
pub trait StateRecord: BorshSerialize + BorshDeserialize + Clone {
    fn get_key(&self) -> RecordKey;
}
