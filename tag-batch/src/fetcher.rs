use crate::traits::TagSource;
use crate::types::{
    ApiResponse, AttemptOutcome, FetchConfig, Result, TagBatchError, TagResponse, TransportFailure, UploadResponse,
    GENERIC_ERROR_MESSAGE,
};
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, StatusCode};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

const LOOKUP_PATH: &str = "api/ddr";
const BULK_UPLOAD_PATH: &str = "api/ddr_bulk";

/// HTTP client for the remote classification service.
pub struct Fetcher {
    client: Client,
    config: FetchConfig,
}

impl Fetcher {
    /// Builds the shared client; timeouts and compression apply to every request.
    pub fn new(config: FetchConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(Duration::from_secs(config.timeout_seconds))
            .gzip(true)
            .deflate(true)
            .brotli(true)
            .build()?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &FetchConfig {
        &self.config
    }

    /// Resolves `path` under the base URL, keeping any path prefix the base carries.
    fn endpoint(&self, path: &str) -> Result<Url> {
        let base = if self.config.base_url.ends_with('/') {
            Url::parse(&self.config.base_url)?
        } else {
            Url::parse(&format!("{}/", self.config.base_url))?
        };
        Ok(base.join(path)?)
    }

    pub fn lookup_url(&self, id: &str) -> Result<Url> {
        let mut url = self.endpoint(LOOKUP_PATH)?;
        url.query_pairs_mut().append_pair("id", id);
        Ok(url)
    }

    /// Uploads up to `max_upload_files` images and returns the identifiers the
    /// service accepted, in the order it listed them.
    pub async fn upload_bulk<P: AsRef<Path>>(&self, files: &[P]) -> Result<Vec<String>> {
        if files.is_empty() {
            return Err(TagBatchError::EmptyBatch);
        }
        if files.len() > self.config.max_upload_files {
            return Err(TagBatchError::TooManyFiles {
                max: self.config.max_upload_files,
            });
        }

        let mut form = Form::new();
        for file in files {
            let path = file.as_ref();
            let bytes = tokio::fs::read(path).await?;
            let file_name = path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|| "upload".to_string());
            debug!("Attaching {} ({} bytes)", file_name, bytes.len());
            form = form.part("file", Part::bytes(bytes).file_name(file_name));
        }

        let url = self.endpoint(BULK_UPLOAD_PATH)?;
        info!("Uploading {} file(s) to {}", files.len(), url);
        let response = self.client.post(url).multipart(form).send().await?;

        // status mapping happens before the body is read
        let status = response.status();
        match status.as_u16() {
            503 => return Err(TagBatchError::Maintenance),
            413 => return Err(TagBatchError::PayloadTooLarge),
            419 => return Err(TagBatchError::RateLimited),
            _ if !status.is_success() => {
                return Err(TagBatchError::UnexpectedStatus {
                    status: status.as_u16(),
                })
            }
            _ => {}
        }

        // a 200 can still carry a failed envelope
        let body = response.text().await?;
        let envelope: UploadResponse = serde_json::from_str(&body)?;
        if envelope.status != 200 {
            return Err(TagBatchError::Service(
                envelope.message.unwrap_or_else(|| GENERIC_ERROR_MESSAGE.to_string()),
            ));
        }

        let accepted = envelope
            .data
            .map(|data| data.ok_list)
            .ok_or_else(|| TagBatchError::Service(GENERIC_ERROR_MESSAGE.to_string()))?;
        info!("Service accepted {}/{} file(s)", accepted.len(), files.len());
        Ok(accepted)
    }
}

#[async_trait]
impl TagSource for Fetcher {
    fn source_name(&self) -> String {
        self.config.base_url.clone()
    }

    /// One GET against the lookup endpoint. Never retries; that is the controller's job.
    async fn lookup(&self, id: &str) -> AttemptOutcome {
        let url = match self.lookup_url(id) {
            Ok(url) => url,
            Err(e) => {
                return AttemptOutcome::Failure(TransportFailure::Network { detail: e.to_string() });
            }
        };

        let response = match self.client.get(url).send().await {
            Ok(response) => response,
            Err(e) => {
                debug!("Request for {} did not complete: {}", id, e);
                return AttemptOutcome::Failure(TransportFailure::Network { detail: e.to_string() });
            }
        };

        let status = response.status();
        if status == StatusCode::ACCEPTED {
            return AttemptOutcome::Failure(TransportFailure::Processing);
        }

        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                return AttemptOutcome::Failure(TransportFailure::Network { detail: e.to_string() });
            }
        };

        if !status.is_success() {
            // error bodies are optional, and only the message is of interest
            let message = serde_json::from_str::<ApiResponse<serde_json::Value>>(&body)
                .ok()
                .and_then(|envelope| envelope.message);
            return AttemptOutcome::Failure(TransportFailure::Status {
                code: status.as_u16(),
                message,
            });
        }

        match serde_json::from_str::<TagResponse>(&body) {
            Ok(ApiResponse { data: Some(payload), .. }) => AttemptOutcome::Ready(payload),
            Ok(envelope) => AttemptOutcome::Failure(TransportFailure::Malformed {
                message: envelope.message,
            }),
            Err(e) => {
                warn!("Unreadable body for {}: {}", id, e);
                AttemptOutcome::Failure(TransportFailure::Malformed { message: None })
            }
        }
    }
}
