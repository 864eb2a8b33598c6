pub mod client;
pub mod handler;
pub mod models;

use keystore::{Keystore, LogEventSink};
use keystore_validator::authorizer::UpdateAuthorizer;
use keystore_validator::block_validation::{AnchoredBlockValidator, TrustedRoots};
use state_management::sled_state_management::SledStateManagement;
use std::convert::Infallible;
use std::sync::Arc;
use utoipa::OpenApi;
use warp::{Filter, Rejection, Reply};

/// The keystore served over HTTP: sled storage, merkle-anchored block validation and logged events.
pub type ApiKeystore =
    Keystore<SledStateManagement, UpdateAuthorizer<AnchoredBlockValidator<TrustedRoots>>, LogEventSink>;

const MAX_BODY_BYTES: u64 = 64 * 1024;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Keystore API",
        description = "Submit authorized record updates and read back stored value hashes.",
        version = "0.1.0"
    ),
    paths(handler::update_handler, handler::get_record_handler, handler::get_accounts_handler),
    components(schemas(
        models::UpdateRecordBody,
        models::UpdateAccepted,
        models::RecordBody,
        models::AccountRecordBody,
        models::AccountsBody,
        models::ErrorBody
    )),
    tags(
        (name = "keystore", description = "Keystore record endpoints")
    )
)]
pub struct ApiDoc;

pub fn routes(keystore: Arc<ApiKeystore>) -> impl Filter<Extract = impl Reply, Error = Infallible> + Clone {
    health_route()
        .or(update_route(Arc::clone(&keystore)))
        .or(get_record_route(Arc::clone(&keystore)))
        .or(get_accounts_route(keystore))
        .or(api_doc_route())
        .recover(handler::handle_rejection)
}

fn with_keystore(
    keystore: Arc<ApiKeystore>,
) -> impl Filter<Extract = (Arc<ApiKeystore>,), Error = Infallible> + Clone {
    warp::any().map(move || Arc::clone(&keystore))
}

fn health_route() -> impl Filter<Extract = impl Reply, Error = Rejection> + Clone {
    warp::path!("health").and(warp::get()).and_then(handler::health_handler)
}

fn update_route(keystore: Arc<ApiKeystore>) -> impl Filter<Extract = impl Reply, Error = Rejection> + Clone {
    warp::path!("update")
        .and(warp::post())
        .and(with_keystore(keystore))
        .and(warp::body::content_length_limit(MAX_BODY_BYTES))
        .and(warp::body::json())
        .and_then(handler::update_handler)
}

fn get_record_route(keystore: Arc<ApiKeystore>) -> impl Filter<Extract = impl Reply, Error = Rejection> + Clone {
    warp::path!("records" / String / String)
        .and(warp::get())
        .and(with_keystore(keystore))
        .and_then(handler::get_record_handler)
}

fn get_accounts_route(keystore: Arc<ApiKeystore>) -> impl Filter<Extract = impl Reply, Error = Rejection> + Clone {
    warp::path!("records" / String)
        .and(warp::get())
        .and(with_keystore(keystore))
        .and_then(handler::get_accounts_handler)
}

fn api_doc_route() -> impl Filter<Extract = impl Reply, Error = Rejection> + Clone {
    warp::path!("api-doc.json")
        .and(warp::get())
        .map(|| warp::reply::json(&ApiDoc::openapi()))
}
