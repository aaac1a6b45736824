//! HTTP client for the segmentation/OCR backend

use std::future::Future;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use reqwest::{Client, Response, Url};
use serde::{Deserialize, Serialize};

use crate::config::AnnotatorConfig;
use crate::domain::{PageImage, TableRecord};
use crate::ocr::{DataPointsResponse, OcrDataPoint};

/// Operations the annotator needs from the backend.
///
/// Implementations are cheap to clone; each request future owns its clone.
pub trait Backend: Clone + 'static {
    fn data_points(&self) -> impl Future<Output = Result<Vec<OcrDataPoint>>>;

    fn images(&self) -> impl Future<Output = Result<Vec<PageImage>>>;

    fn tables(&self, image: &str) -> impl Future<Output = Result<Vec<TableRecord>>>;

    /// Store the tables of `image`, returning the server's message
    fn store_tables(
        &self,
        image: &str,
        tables: &[TableRecord],
    ) -> impl Future<Output = Result<String>>;
}

#[derive(Debug, Deserialize)]
struct ImagesResponse {
    images: Vec<PageImage>,
}

#[derive(Debug, Serialize, Deserialize)]
struct TablesResponse {
    tables: Vec<TableRecord>,
}

#[derive(Debug, Default, Deserialize)]
struct MessageResponse {
    #[serde(default)]
    msg: Option<String>,
}

#[derive(Clone, Debug)]
pub struct BackendClient {
    client: Client,
    base: Url,
}

impl BackendClient {
    pub fn new(config: &AnnotatorConfig) -> Result<Self> {
        let base = Url::parse(&config.backend_url)
            .with_context(|| format!("Invalid backend URL {}", config.backend_url))?;
        if base.cannot_be_a_base() {
            return Err(anyhow!("Backend URL {base} cannot carry a path"));
        }
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self { client, base })
    }

    /// `base` joined with escaped path segments
    fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: Url) -> Result<T> {
        log::debug!("GET {url}");
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .with_context(|| format!("Request to {url} failed"))?;
        let response = check_status(response).await?;
        response
            .json()
            .await
            .with_context(|| format!("Invalid response from {url}"))
    }
}

/// Turn a non-2xx response into an error carrying the server's `msg`
async fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let url = response.url().clone();
    let body = response.text().await.unwrap_or_default();
    let msg = serde_json::from_str::<MessageResponse>(&body)
        .ok()
        .and_then(|parsed| parsed.msg);
    Err(match msg {
        Some(msg) => anyhow!("{status} from {url}: {msg}"),
        None => anyhow!("{status} from {url}"),
    })
}

impl Backend for BackendClient {
    async fn data_points(&self) -> Result<Vec<OcrDataPoint>> {
        let response: DataPointsResponse = self.get_json(self.url(&["ocr", "data_points"])).await?;
        Ok(response.data_points)
    }

    async fn images(&self) -> Result<Vec<PageImage>> {
        let response: ImagesResponse = self.get_json(self.url(&["images"])).await?;
        Ok(response.images)
    }

    async fn tables(&self, image: &str) -> Result<Vec<TableRecord>> {
        let response: TablesResponse = self.get_json(self.url(&["tables", image])).await?;
        Ok(response.tables)
    }

    async fn store_tables(&self, image: &str, tables: &[TableRecord]) -> Result<String> {
        let url = self.url(&["tables", image]);
        log::debug!("POST {url} ({} tables)", tables.len());
        let response = self
            .client
            .post(url.clone())
            .json(tables)
            .send()
            .await
            .with_context(|| format!("Request to {url} failed"))?;
        let response = check_status(response).await?;
        let body: MessageResponse = response
            .json()
            .await
            .with_context(|| format!("Invalid response from {url}"))?;
        Ok(body.msg.unwrap_or_default())
    }
}
