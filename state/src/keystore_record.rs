use crate::error::KeystoreError;
use crate::state_record::StateRecord;
use borsh::{BorshDeserialize, BorshSerialize};
use std::fmt;
use std::str::FromStr;

macro_rules! fixed_bytes {
    ($(#[$meta:meta])* $name:ident, $len:expr) => {
        $(#[$meta])*
        #[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, BorshSerialize, BorshDeserialize)]
        pub struct $name(pub [u8; $len]);

        impl $name {
            pub const LEN: usize = $len;

            pub fn to_bytes(&self) -> [u8; $len] {
                self.0
            }

            pub fn is_zero(&self) -> bool {
                self.0 == [0u8; $len]
            }

            pub fn from_slice(bytes: &[u8]) -> Result<Self, KeystoreError> {
                <[u8; $len]>::try_from(bytes).map($name).map_err(|_| {
                    KeystoreError::MalformedInput(format!(
                        "{} must be {} bytes, got {}",
                        stringify!($name),
                        $len,
                        bytes.len()
                    ))
                })
            }
        }

        impl From<[u8; $len]> for $name {
            fn from(bytes: [u8; $len]) -> Self {
                $name(bytes)
            }
        }

        impl AsRef<[u8]> for $name {
            fn as_ref(&self) -> &[u8] {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "0x{}", hex::encode(self.0))
            }
        }

        impl FromStr for $name {
            type Err = KeystoreError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let digits = s.strip_prefix("0x").unwrap_or(s);
                let bytes = hex::decode(digits).map_err(|err| {
                    KeystoreError::MalformedInput(format!("{}: {}", stringify!($name), err))
                })?;
                Self::from_slice(&bytes)
            }
        }
    };
}

fixed_bytes!(
    /// Identifier of a logical keystore entry.
    Id,
    32
);

fixed_bytes!(
    /// Execution context under an identifier.
    Address,
    20
);

fixed_bytes!(
    /// Commitment over a record's [`crate::preimages::ValueHashPreimages`].
    /// The all-zero value is reserved for "never written".
    ValueHash,
    32
);

impl From<Id> for ValueHash {
    fn from(id: Id) -> Self {
        ValueHash(id.0)
    }
}

/// The commitment an update must justify for a record.
///
/// A record that has never been written is anchored at its identifier.
pub fn effective_current(stored: Option<ValueHash>, id: &Id) -> ValueHash {
    stored.unwrap_or_else(|| ValueHash::from(*id))
}

/// Store key for the `id -> account -> value hash` mapping.
///
/// Encoded as `id || account` so that all accounts of an identifier share a key prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RecordKey {
    pub id: Id,
    pub account: Address,
}

impl RecordKey {
    pub const LEN: usize = Id::LEN + Address::LEN;

    pub fn new(id: Id, account: Address) -> Self {
        Self { id, account }
    }

    pub fn to_bytes(&self) -> [u8; Self::LEN] {
        let mut key = [0u8; Self::LEN];
        key[..Id::LEN].copy_from_slice(&self.id.0);
        key[Id::LEN..].copy_from_slice(&self.account.0);
        key
    }

    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.len() != Self::LEN {
            return None;
        }
        let id = Id::from_slice(&bytes[..Id::LEN]).ok()?;
        let account = Address::from_slice(&bytes[Id::LEN..]).ok()?;
        Some(Self { id, account })
    }
}

/// A single `(id, account) -> value_hash` entry.
#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct KeystoreRecord {
    pub id: Id,
    pub account: Address,
    pub value_hash: ValueHash,
}

impl KeystoreRecord {
    pub fn new(id: Id, account: Address, value_hash: ValueHash) -> Self {
        Self { id, account, value_hash }
    }
}

impl StateRecord for KeystoreRecord {
    fn get_key(&self) -> RecordKey {
        RecordKey::new(self.id, self.account)
    }
}
