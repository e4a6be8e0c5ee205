use crate::config::{ClientConfig, SubmissionMode};
use crate::error::ClientError;
use gloo_file::File as GlooFile;
use gloo_net::http::{Request, Response};
use log::{debug, error, info};
use serde::de::DeserializeOwned;
use shared::{AnalysisResult, AnalysisTask, StartAnalysisResponse, UPLOAD_FIELD};
use web_sys::FormData;

/// The three calls the analysis backend exposes.
#[allow(async_fn_in_trait)]
pub trait AnalysisApi {
    type Image;

    async fn analyze(&self, image: &Self::Image) -> Result<AnalysisResult, ClientError>;

    async fn start_analysis(&self, image: &Self::Image) -> Result<String, ClientError>;

    async fn check_status(&self, task_id: &str) -> Result<AnalysisTask, ClientError>;
}

/// What the backend answered to a submission.
#[derive(Debug, Clone, PartialEq)]
pub enum Submitted {
    Finished(AnalysisResult),
    Accepted(String),
}

pub async fn submit<A: AnalysisApi>(
    api: &A,
    mode: SubmissionMode,
    image: &A::Image,
) -> Result<Submitted, ClientError> {
    match mode {
        SubmissionMode::Sync => api.analyze(image).await.map(Submitted::Finished),
        SubmissionMode::Task => api.start_analysis(image).await.map(Submitted::Accepted),
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct HttpApi {
    config: ClientConfig,
}

impl HttpApi {
    pub fn new(config: ClientConfig) -> Self {
        Self { config }
    }

    fn form(image: &GlooFile) -> Result<FormData, ClientError> {
        let form_data = FormData::new()
            .map_err(|e| ClientError::Transport(format!("Failed to build form data: {:?}", e)))?;
        form_data
            .append_with_blob_and_filename(UPLOAD_FIELD, image.as_ref(), &image.name())
            .map_err(|e| ClientError::Transport(format!("Failed to attach image: {:?}", e)))?;
        Ok(form_data)
    }

    async fn post_image(&self, path: &str, image: &GlooFile) -> Result<Response, ClientError> {
        let url = self.config.endpoint(path);
        info!("Uploading {} ({} bytes) to {}", image.name(), image.size(), url);
        let request = Request::post(&url)
            .body(Self::form(image)?)
            .map_err(|e| ClientError::Transport(format!("Failed to build request: {}", e)))?;
        request.send().await.map_err(|e| {
            error!("Network error calling {}: {}", url, e);
            ClientError::Transport(format!("Network error: {}", e))
        })
    }
}

async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
    if !response.ok() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        error!("Server error from {}: {} - {}", response.url(), status, body);
        return Err(ClientError::Transport(format!("Server error: {} - {}", status, body)));
    }
    response
        .json::<T>()
        .await
        .map_err(|e| ClientError::Transport(format!("Failed to parse response: {}", e)))
}

impl AnalysisApi for HttpApi {
    type Image = GlooFile;

    async fn analyze(&self, image: &GlooFile) -> Result<AnalysisResult, ClientError> {
        let response = self.post_image("analyze", image).await?;
        read_json(response).await
    }

    async fn start_analysis(&self, image: &GlooFile) -> Result<String, ClientError> {
        let response = self.post_image("start-analysis", image).await?;
        let accepted: StartAnalysisResponse = read_json(response).await?;
        info!("Analysis task {} accepted", accepted.task_id);
        Ok(accepted.task_id)
    }

    async fn check_status(&self, task_id: &str) -> Result<AnalysisTask, ClientError> {
        let url = self
            .config
            .endpoint(&format!("check-status/{}", urlencoding::encode(task_id)));
        debug!("Checking status at {}", url);
        let response = Request::get(&url).send().await.map_err(|e| {
            error!("Network error calling {}: {}", url, e);
            ClientError::Transport(format!("Network error: {}", e))
        })?;
        read_json(response).await
    }
}
