use std::future::Future;

use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response, Url};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::models::{ErrorBody, ExtractResponse, Receipt, ReceiptsResponse, UploadFile};

/// The remote extraction service as seen by the controller.
pub trait ReceiptApi {
    fn extract(&self, file: UploadFile) -> impl Future<Output = Result<Value, ApiError>>;
    fn list_receipts(&self) -> impl Future<Output = Result<Vec<Receipt>, ApiError>>;
    fn delete_receipt(&self, id: i64) -> impl Future<Output = Result<(), ApiError>>;
}

pub struct HttpReceiptApi {
    client: Client,
    base_url: Url,
}

impl HttpReceiptApi {
    pub fn new(config: &ClientConfig) -> anyhow::Result<Self> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(HttpReceiptApi {
            client,
            base_url: config.base_url.clone(),
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        self.base_url
            .join(path)
            .map_err(|e| ApiError::Transport(format!("Invalid URL {}: {}", path, e)))
    }
}

impl ReceiptApi for HttpReceiptApi {
    async fn extract(&self, file: UploadFile) -> Result<Value, ApiError> {
        let url = self.endpoint("extract")?;
        let size = file.bytes.len();
        let part = Part::bytes(file.bytes)
            .file_name(file.file_name.clone())
            .mime_str("application/pdf")?;
        let form = Form::new().part("file", part);

        info!(%url, file = %file.file_name, bytes = size, "posting file for extraction");
        let response = self.client.post(url).multipart(form).send().await?;
        let response = check_status(response).await?;

        let body: ExtractResponse = response.json().await?;
        Ok(body.into_invoice())
    }

    async fn list_receipts(&self) -> Result<Vec<Receipt>, ApiError> {
        let url = self.endpoint("receipts")?;
        debug!(%url, "fetching receipts");
        let response = self.client.get(url).send().await?;
        let response = check_status(response).await?;

        let body: ReceiptsResponse = response.json().await?;
        info!(count = body.receipts.len(), "receipts fetched");
        Ok(body.receipts)
    }

    async fn delete_receipt(&self, id: i64) -> Result<(), ApiError> {
        let url = self.endpoint(&format!("receipts/{}", id))?;
        info!(receipt_id = id, %url, "deleting receipt");
        let response = self.client.delete(url).send().await?;
        check_status(response).await?;
        Ok(())
    }
}

async fn check_status(response: Response) -> Result<Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let fallback = status
        .canonical_reason()
        .map(str::to_string)
        .unwrap_or_else(|| status.as_u16().to_string());
    let body = response.text().await.unwrap_or_default();
    let message = error_message(&body).unwrap_or(fallback);

    warn!(status = status.as_u16(), %message, "service returned an error");
    Err(ApiError::Server {
        status: status.as_u16(),
        message,
    })
}

/// Pulls `error` out of a JSON error body; `None` if the body is not JSON
/// or carries no usable message.
fn error_message(body: &str) -> Option<String> {
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|parsed| parsed.error)
        .filter(|message| !message.trim().is_empty())
}
