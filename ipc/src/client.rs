use crate::{FirmwareRequest, FirmwareResponse, StatusResponse};
use anyhow::Result;
use async_trait::async_trait;

#[async_trait]
pub trait Client {
    async fn send(&mut self, request: FirmwareRequest) -> Result<FirmwareResponse>;
    async fn poll_status(&mut self) -> Result<()>;
    fn status(&self) -> &StatusResponse;
}
