use anyhow::Result;
use keystore::LogEventSink;
use keystore_api::{routes, ApiKeystore};
use keystore_validator::authorizer::UpdateAuthorizer;
use keystore_validator::block_validation::{AnchoredBlockValidator, TrustedRoots};
use log::{info, warn};
use state::config::KeystoreConfig;
use std::sync::Arc;
use warp::Filter;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let config = KeystoreConfig::load()?;
    let trusted_roots = config.trusted_roots()?;
    if trusted_roots.is_empty() {
        warn!("No trusted block roots configured, updates carrying L1 block data will be refused");
    }

    let authorizer = UpdateAuthorizer::new(AnchoredBlockValidator::new(TrustedRoots::new(trusted_roots)));
    let keystore = Arc::new(ApiKeystore::from_config(&config, authorizer, LogEventSink)?);

    let routes = routes(Arc::clone(&keystore)).with(warp::cors().allow_any_origin());
    let (address, server) = warp::serve(routes).bind_with_graceful_shutdown(([0, 0, 0, 0], config.api_port), async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for shutdown signal: {}", err);
        }
    });
    info!("Keystore API listening on {}", address);
    server.await;

    info!("Shutting down, flushing records");
    keystore.commit()?;
    Ok(())
}
