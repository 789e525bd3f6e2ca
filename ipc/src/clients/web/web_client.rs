use crate::client::Client;
use crate::{
    ErrorResponse, FirmwareRequest, FirmwareResponse, HealthResponse, HttpMethod,
    MuteChannelResponse, ResetResponse, SetVolumeResponse, StatusResponse,
};
use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use serde::de::DeserializeOwned;

#[derive(Debug)]
pub struct WebClient {
    url: String,
    http: reqwest::Client,
    status: StatusResponse,
}

impl WebClient {
    pub fn new(url: String) -> Self {
        Self {
            url: url.trim_end_matches('/').to_string(),
            http: reqwest::Client::new(),
            status: StatusResponse::default(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    async fn call<T: DeserializeOwned>(&self, request: &FirmwareRequest) -> Result<T> {
        let url = format!("{}{}", self.url, request.path());
        let builder = match request.method() {
            HttpMethod::Get => self.http.get(&url),
            HttpMethod::Post => self.http.post(&url),
        };
        let builder = match request.body() {
            Some(body) => builder.json(&body),
            None => builder,
        };

        let response = builder
            .send()
            .await
            .with_context(|| format!("Unable to reach the mixer firmware at {}", url))?;

        let status = response.status();
        if status.is_success() {
            return response
                .json::<T>()
                .await
                .with_context(|| format!("Unable to parse the response from {}", url));
        }

        // Errors from the firmware always carry an 'error' field, but a proxy in the way
        // might not, so fall back to the status code.
        match response.json::<ErrorResponse>().await {
            Ok(error) => bail!("{} ({})", error.error, status),
            Err(_) => bail!("Request to {} failed with {}", url, status),
        }
    }
}

#[async_trait]
impl Client for WebClient {
    async fn send(&mut self, request: FirmwareRequest) -> Result<FirmwareResponse> {
        let response = match request {
            FirmwareRequest::SetVolume(_, _) => {
                FirmwareResponse::VolumeSet(self.call::<SetVolumeResponse>(&request).await?)
            }
            FirmwareRequest::ToggleMute(_) => {
                FirmwareResponse::MuteToggled(self.call::<MuteChannelResponse>(&request).await?)
            }
            FirmwareRequest::GetStatus => {
                let status = self.call::<StatusResponse>(&request).await?;
                self.status = status.clone();
                FirmwareResponse::Status(status)
            }
            FirmwareRequest::Reset => {
                FirmwareResponse::Reset(self.call::<ResetResponse>(&request).await?)
            }
            FirmwareRequest::Health => {
                FirmwareResponse::Health(self.call::<HealthResponse>(&request).await?)
            }
        };
        Ok(response)
    }

    async fn poll_status(&mut self) -> Result<()> {
        self.send(FirmwareRequest::GetStatus).await?;
        Ok(())
    }

    fn status(&self) -> &StatusResponse {
        &self.status
    }
}
