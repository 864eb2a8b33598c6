use base64::{engine::general_purpose, Engine as _};
use borsh::BorshDeserialize;
use serde_derive::{Deserialize, Serialize};
use state::block::ExternalStateRef;
use state::error::KeystoreError;
use state::keystore_record::{Address, Id, KeystoreRecord, ValueHash};
use state::preimages::ValueHashPreimages;
use state::proofs::ControllerProofs;
use state::update::UpdateRequest;
use std::io;
use std::str::FromStr;
use utoipa::ToSchema;

/// Wire form of an [`UpdateRequest`].
///
/// Fixed size values are `0x` prefixed hex. Preimages, proofs and block data are base64 encoded
/// borsh. An empty `l1BlockData` means no external state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRecordBody {
    pub id: String,
    pub account: String,
    pub current_preimages: String,
    pub new_value_hash: String,
    pub new_preimages: String,
    #[serde(default)]
    pub l1_block_data: String,
    pub controller_proofs: String,
}

impl UpdateRecordBody {
    pub fn from_request(request: &UpdateRequest) -> io::Result<Self> {
        Ok(UpdateRecordBody {
            id: request.id.to_string(),
            account: request.account.to_string(),
            current_preimages: general_purpose::STANDARD.encode(borsh::to_vec(&request.current_preimages)?),
            new_value_hash: request.new_value_hash.to_string(),
            new_preimages: general_purpose::STANDARD.encode(borsh::to_vec(&request.new_preimages)?),
            l1_block_data: general_purpose::STANDARD.encode(request.l1_block_data.encode()?),
            controller_proofs: general_purpose::STANDARD.encode(borsh::to_vec(&request.controller_proofs)?),
        })
    }

    pub fn into_request(self) -> Result<UpdateRequest, KeystoreError> {
        let l1_block_data = decode_base64("l1BlockData", &self.l1_block_data)?;
        Ok(UpdateRequest {
            id: Id::from_str(&self.id)?,
            account: Address::from_str(&self.account)?,
            current_preimages: decode_borsh::<ValueHashPreimages>("currentPreimages", &self.current_preimages)?,
            new_value_hash: ValueHash::from_str(&self.new_value_hash)?,
            new_preimages: decode_borsh::<ValueHashPreimages>("newPreimages", &self.new_preimages)?,
            l1_block_data: ExternalStateRef::decode(&l1_block_data)?,
            controller_proofs: decode_borsh::<ControllerProofs>("controllerProofs", &self.controller_proofs)?,
        })
    }
}

fn decode_base64(field: &str, value: &str) -> Result<Vec<u8>, KeystoreError> {
    general_purpose::STANDARD
        .decode(value)
        .map_err(|err| KeystoreError::MalformedInput(format!("{}: {}", field, err)))
}

fn decode_borsh<T: BorshDeserialize>(field: &str, value: &str) -> Result<T, KeystoreError> {
    let bytes = decode_base64(field, value)?;
    borsh::from_slice(&bytes).map_err(|err| KeystoreError::MalformedInput(format!("{}: {}", field, err)))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAccepted {
    pub id: String,
    pub account: String,
    pub new_value_hash: String,
}

impl From<&UpdateRequest> for UpdateAccepted {
    fn from(request: &UpdateRequest) -> Self {
        UpdateAccepted {
            id: request.id.to_string(),
            account: request.account.to_string(),
            new_value_hash: request.new_value_hash.to_string(),
        }
    }
}

/// `valueHash` is the raw stored value (zero when unset), `effectiveValueHash` is what the next
/// update has to justify.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecordBody {
    pub id: String,
    pub account: String,
    pub value_hash: String,
    pub effective_value_hash: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AccountRecordBody {
    pub account: String,
    pub value_hash: String,
}

impl From<&KeystoreRecord> for AccountRecordBody {
    fn from(record: &KeystoreRecord) -> Self {
        AccountRecordBody {
            account: record.account.to_string(),
            value_hash: record.value_hash.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AccountsBody {
    pub id: String,
    pub records: Vec<AccountRecordBody>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    pub error: String,
    pub message: String,
}

impl From<&KeystoreError> for ErrorBody {
    fn from(err: &KeystoreError) -> Self {
        ErrorBody {
            error: err.kind().to_string(),
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use state::preimages::{Controller, Secp256k1Controller};

    fn request() -> UpdateRequest {
        let preimages = |byte: u8| {
            ValueHashPreimages::new(Controller::Secp256k1(Secp256k1Controller { public_key: [byte; 33] }), [byte; 32])
        };
        UpdateRequest {
            id: Id([1; 32]),
            account: Address([2; 20]),
            current_preimages: preimages(3),
            new_value_hash: ValueHash([4; 32]),
            new_preimages: preimages(5),
            l1_block_data: ExternalStateRef::Absent,
            controller_proofs: ControllerProofs::Signature([6; 64]),
        }
    }

    #[test]
    fn wire_form_carries_the_request() {
        let body = UpdateRecordBody::from_request(&request()).unwrap();
        assert!(body.id.starts_with("0x"));
        assert!(body.l1_block_data.is_empty());
        assert_eq!(body.into_request().unwrap(), request());
    }

    #[test]
    fn json_field_names_are_camel_case() {
        let body = UpdateRecordBody::from_request(&request()).unwrap();
        let value = serde_json::to_value(&body).unwrap();
        for field in ["currentPreimages", "newValueHash", "newPreimages", "l1BlockData", "controllerProofs"] {
            assert!(value.get(field).is_some(), "missing {}", field);
        }
    }

    #[test]
    fn bad_encodings_are_malformed_input() {
        let mut body = UpdateRecordBody::from_request(&request()).unwrap();
        body.controller_proofs = "not base64!".to_string();
        assert!(matches!(body.into_request(), Err(KeystoreError::MalformedInput(_))));

        let mut body = UpdateRecordBody::from_request(&request()).unwrap();
        body.account = "0x1234".to_string();
        assert!(matches!(body.into_request(), Err(KeystoreError::MalformedInput(_))));

        let mut body = UpdateRecordBody::from_request(&request()).unwrap();
        // Trailing bytes after a valid encoding
        let mut bytes = borsh::to_vec(&request().new_preimages).unwrap();
        bytes.push(0);
        body.new_preimages = general_purpose::STANDARD.encode(bytes);
        assert!(matches!(body.into_request(), Err(KeystoreError::MalformedInput(_))));
    }

    #[test]
    fn undecodable_block_data_is_invalid_external_state() {
        let mut body = UpdateRecordBody::from_request(&request()).unwrap();
        body.l1_block_data = general_purpose::STANDARD.encode([9u8; 7]);
        assert!(matches!(body.into_request(), Err(KeystoreError::InvalidExternalState(_))));
    }
}
