use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response, Url};
use tracing::{debug, info, instrument, warn};

use satb_domain::{RecordingDuration, UploadFile};

use crate::backend::ErrorBody;
use crate::{
    BackendConfig, RecordRequest, RecordResponse, TranscriptionBackend, TransportError,
    UploadResponse,
};

const UPLOAD_PATH: &str = "upload";
const RECORD_PATH: &str = "record";
const RESULTS_PATH: &str = "results";
const AUDIO_PATH: &str = "audio";

/// `TranscriptionBackend` over HTTP.
#[derive(Clone, Debug)]
pub struct HttpBackend {
    client: Client,
    base: Url,
}

impl HttpBackend {
    pub fn new(config: &BackendConfig) -> Result<Self, TransportError> {
        let base = Url::parse(&config.base_url)
            .map_err(|err| TransportError::Url(format!("{}: {err}", config.base_url)))?;
        if base.cannot_be_a_base() {
            return Err(TransportError::Url(config.base_url.clone()));
        }
        let client = Client::builder().timeout(config.timeout()).build()?;
        Ok(Self { client, base })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }
}

/// Passes successful responses through; turns anything else into a
/// `TransportError::Status`, keeping the server's `error` message if it sent one.
async fn check(response: Response) -> Result<Response, TransportError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    let detail = serde_json::from_str::<ErrorBody>(&body)
        .ok()
        .map(|body| body.error);
    warn!(status = status.as_u16(), ?detail, "backend request failed");
    Err(TransportError::Status {
        status: status.as_u16(),
        detail,
    })
}

#[async_trait]
impl TranscriptionBackend for HttpBackend {
    #[instrument(skip(self, file), fields(file = %file.name, bytes = file.bytes.len()))]
    async fn upload(&self, file: &UploadFile) -> Result<UploadResponse, TransportError> {
        let part = Part::bytes(file.bytes.clone())
            .file_name(file.name.clone())
            .mime_str("audio/mpeg")?;
        let form = Form::new().part("file", part);
        info!("uploading audio for transcription");
        let response = self
            .client
            .post(self.endpoint(&[UPLOAD_PATH]))
            .multipart(form)
            .send()
            .await?;
        let body: UploadResponse = check(response).await?.json().await?;
        info!(artifacts = body.files.len(), "upload processed");
        Ok(body)
    }

    #[instrument(skip(self), fields(seconds = duration.seconds()))]
    async fn record(&self, duration: RecordingDuration) -> Result<RecordResponse, TransportError> {
        info!("requesting recording");
        let response = self
            .client
            .post(self.endpoint(&[RECORD_PATH]))
            .json(&RecordRequest { duration })
            .send()
            .await?;
        Ok(check(response).await?.json().await?)
    }

    async fn fetch_notation(&self, file_name: &str) -> Result<String, TransportError> {
        debug!(file_name, "fetching notation source");
        let response = self
            .client
            .get(self.endpoint(&[RESULTS_PATH, file_name]))
            .send()
            .await?;
        Ok(check(response).await?.text().await?)
    }

    async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>, TransportError> {
        debug!(url, "fetching bytes");
        let response = self.client.get(url).send().await?;
        Ok(check(response).await?.bytes().await?.to_vec())
    }

    fn results_url(&self, file_name: &str) -> String {
        self.endpoint(&[RESULTS_PATH, file_name]).into()
    }

    fn audio_url(&self, reference: &str) -> String {
        self.endpoint(&[AUDIO_PATH, reference]).into()
    }
}
