use crate::models::{AccountRecordBody, AccountsBody, ErrorBody, RecordBody, UpdateAccepted, UpdateRecordBody};
use crate::ApiKeystore;
use log::{debug, warn};
use serde::Serialize;
use state::error::KeystoreError;
use state::keystore_record::{Address, Id, ValueHash};
use std::convert::Infallible;
use std::str::FromStr;
use std::sync::Arc;
use warp::reply::{json, with_status, Json, WithStatus};
use warp::{http::StatusCode, Rejection, Reply};

type Result<T> = std::result::Result<T, Rejection>;

pub fn status_for(err: &KeystoreError) -> StatusCode {
    match err {
        KeystoreError::MalformedInput(_) => StatusCode::BAD_REQUEST,
        KeystoreError::AuthorizationDenied(_) => StatusCode::FORBIDDEN,
        KeystoreError::PreimageMismatch { .. } => StatusCode::CONFLICT,
        KeystoreError::InvalidExternalState(_) => StatusCode::UNPROCESSABLE_ENTITY,
        KeystoreError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn reply<T: Serialize>(outcome: std::result::Result<T, KeystoreError>) -> WithStatus<Json> {
    match outcome {
        Ok(body) => with_status(json(&body), StatusCode::OK),
        Err(err) => with_status(json(&ErrorBody::from(&err)), status_for(&err)),
    }
}

#[utoipa::path(
    post,
    path = "/update",
    request_body = UpdateRecordBody,
    tag = "keystore",
    responses(
        (status = 200, description = "Record moved to the new value hash", body = UpdateAccepted),
        (status = 400, description = "Request could not be decoded", body = ErrorBody),
        (status = 403, description = "Controller did not approve the proofs", body = ErrorBody),
        (status = 409, description = "Preimages do not reproduce the claimed value hashes", body = ErrorBody),
        (status = 422, description = "L1 block data failed validation", body = ErrorBody),
    ),
)]
pub async fn update_handler(keystore: Arc<ApiKeystore>, body: UpdateRecordBody) -> Result<impl Reply> {
    // Signature checks and the sled swap loop block, keep them off the async workers
    let outcome = tokio::task::spawn_blocking(move || -> std::result::Result<UpdateAccepted, KeystoreError> {
        let request = body.into_request()?;
        keystore.update(&request)?;
        Ok(UpdateAccepted::from(&request))
    })
    .await
    .unwrap_or_else(|err| Err(KeystoreError::Storage(format!("update task failed: {}", err))));
    Ok(reply(outcome))
}

#[utoipa::path(
    get,
    path = "/records/{id}/{account}",
    tag = "keystore",
    responses(
        (status = 200, description = "Stored and effective value hash of the record", body = RecordBody),
        (status = 400, description = "Id or account is not valid hex", body = ErrorBody),
    ),
    params(
        ("id" = String, Path, description = "0x prefixed 32 byte identifier"),
        ("account" = String, Path, description = "0x prefixed 20 byte account"),
    )
)]
pub async fn get_record_handler(id: String, account: String, keystore: Arc<ApiKeystore>) -> Result<impl Reply> {
    Ok(reply(read_record(&keystore, &id, &account)))
}

fn read_record(keystore: &ApiKeystore, id: &str, account: &str) -> std::result::Result<RecordBody, KeystoreError> {
    let id = Id::from_str(id)?;
    let account = Address::from_str(account)?;
    let value_hash = ValueHash(keystore.records(&id, &account)?);
    let effective_value_hash = keystore.effective_value_hash(&id, &account)?;
    Ok(RecordBody {
        id: id.to_string(),
        account: account.to_string(),
        value_hash: value_hash.to_string(),
        effective_value_hash: effective_value_hash.to_string(),
    })
}

#[utoipa::path(
    get,
    path = "/records/{id}",
    tag = "keystore",
    responses(
        (status = 200, description = "Every written account under the id, ordered by account", body = AccountsBody),
        (status = 400, description = "Id is not valid hex", body = ErrorBody),
    ),
    params(
        ("id" = String, Path, description = "0x prefixed 32 byte identifier"),
    )
)]
pub async fn get_accounts_handler(id: String, keystore: Arc<ApiKeystore>) -> Result<impl Reply> {
    let outcome = Id::from_str(&id).and_then(|id| {
        let records = keystore.accounts(&id)?;
        Ok(AccountsBody {
            id: id.to_string(),
            records: records.iter().map(AccountRecordBody::from).collect(),
        })
    });
    Ok(reply(outcome))
}

pub async fn health_handler() -> Result<impl Reply> {
    Ok(StatusCode::OK)
}

/// Turns warp's own rejections into the same error body the handlers use.
pub async fn handle_rejection(rejection: Rejection) -> std::result::Result<impl Reply, Infallible> {
    let (status, body) = if rejection.is_not_found() {
        (
            StatusCode::NOT_FOUND,
            ErrorBody { error: "NotFound".to_string(), message: "No such route".to_string() },
        )
    } else if let Some(err) = rejection.find::<warp::filters::body::BodyDeserializeError>() {
        let err = KeystoreError::MalformedInput(err.to_string());
        (status_for(&err), ErrorBody::from(&err))
    } else if rejection.find::<warp::reject::PayloadTooLarge>().is_some() {
        let err = KeystoreError::MalformedInput("request body too large".to_string());
        (StatusCode::PAYLOAD_TOO_LARGE, ErrorBody::from(&err))
    } else if rejection.find::<warp::reject::UnsupportedMediaType>().is_some() {
        let err = KeystoreError::MalformedInput("request body must be application/json".to_string());
        (StatusCode::UNSUPPORTED_MEDIA_TYPE, ErrorBody::from(&err))
    } else if rejection.find::<warp::reject::LengthRequired>().is_some() {
        let err = KeystoreError::MalformedInput("content-length header is required".to_string());
        (StatusCode::LENGTH_REQUIRED, ErrorBody::from(&err))
    } else if rejection.find::<warp::reject::MethodNotAllowed>().is_some() {
        (
            StatusCode::METHOD_NOT_ALLOWED,
            ErrorBody { error: "MethodNotAllowed".to_string(), message: "Method not allowed".to_string() },
        )
    } else {
        warn!("Unhandled rejection: {:?}", rejection);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            ErrorBody { error: "Internal".to_string(), message: "Unhandled rejection".to_string() },
        )
    };
    debug!("Rejected request with {}: {}", status, body.message);
    Ok(with_status(json(&body), status))
}

