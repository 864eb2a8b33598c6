use crate::models::{AccountsBody, ErrorBody, RecordBody, UpdateAccepted, UpdateRecordBody};
use anyhow::{anyhow, Result};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use state::keystore_record::{Address, Id};
use state::update::UpdateRequest;

/// HTTP client for the keystore API.
pub struct KeystoreClient {
    client: Client,
    base_url: String,
}

impl KeystoreClient {
    pub fn new(base_url: &str) -> Self {
        KeystoreClient {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn health_check(&self) -> Result<bool> {
        let response = self.client
            .get(&format!("{}/health", self.base_url))
            .send()
            .await?;

        Ok(response.status().is_success())
    }

    pub async fn update(&self, request: &UpdateRequest) -> Result<UpdateAccepted> {
        let response = self.client
            .post(&format!("{}/update", self.base_url))
            .json(&UpdateRecordBody::from_request(request)?)
            .send()
            .await?;

        parse(response).await
    }

    pub async fn record(&self, id: &Id, account: &Address) -> Result<RecordBody> {
        let response = self.client
            .get(&format!("{}/records/{}/{}", self.base_url, id, account))
            .send()
            .await?;

        parse(response).await
    }

    pub async fn accounts(&self, id: &Id) -> Result<AccountsBody> {
        let response = self.client
            .get(&format!("{}/records/{}", self.base_url, id))
            .send()
            .await?;

        parse(response).await
    }
}

async fn parse<T: DeserializeOwned>(response: Response) -> Result<T> {
    let status = response.status();
    if status.is_success() {
        return Ok(response.json().await?);
    }
    match response.json::<ErrorBody>().await {
        Ok(error) => Err(anyhow!("{} ({}): {}", error.error, status, error.message)),
        Err(_) => Err(anyhow!("API request failed: {:?}", status)),
    }
}
