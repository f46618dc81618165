use crate::core::ActionError;
use crate::download::Downloader;
use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;

/// [`Downloader`] serving canned responses.
///
/// Unknown URLs answer like a missing release asset (HTTP 404). Every
/// request is recorded in order, so tests can assert that nothing was
/// fetched.
#[derive(Debug, Default)]
pub struct FakeDownloader {
    responses: HashMap<String, Result<Vec<u8>, String>>,
    requests: Mutex<Vec<String>>,
}

impl FakeDownloader {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_bytes(mut self, url: &str, bytes: impl Into<Vec<u8>>) -> Self {
        self.responses.insert(url.to_string(), Ok(bytes.into()));
        self
    }

    #[must_use]
    pub fn with_text(self, url: &str, text: impl Into<String>) -> Self {
        self.with_bytes(url, text.into().into_bytes())
    }

    /// Fail `url` with a transport error.
    #[must_use]
    pub fn with_failure(mut self, url: &str, reason: &str) -> Self {
        self.responses.insert(url.to_string(), Err(reason.to_string()));
        self
    }

    /// URLs requested so far, in order.
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    fn respond(&self, url: &str) -> Result<Vec<u8>, ActionError> {
        self.requests.lock().unwrap().push(url.to_string());

        match self.responses.get(url) {
            Some(Ok(bytes)) => Ok(bytes.clone()),
            Some(Err(reason)) => Err(ActionError::DownloadError {
                url: url.to_string(),
                reason: reason.clone(),
            }),
            None => Err(ActionError::DownloadError {
                url: url.to_string(),
                reason: "HTTP 404 Not Found".to_string(),
            }),
        }
    }
}

#[async_trait]
impl Downloader for FakeDownloader {
    async fn download(&self, url: &str, dest: &Path) -> Result<()> {
        let bytes = self.respond(url)?;
        if let Some(parent) = dest.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(dest, bytes).await?;
        Ok(())
    }

    async fn fetch_text(&self, url: &str) -> Result<String> {
        let bytes = self.respond(url)?;
        Ok(String::from_utf8(bytes)?)
    }
}
