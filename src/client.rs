use crate::protocol::StoryRequest;
use reqwest::Client as HttpClient;
use reqwest::header::CONTENT_TYPE;
use serde_json::Value;
use std::error::Error;
use std::future::Future;
use tracing::debug;

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000";
pub const STORY_PATH: &str = "/api/story";

pub type ClientResult<T> = Result<T, Box<dyn Error + Send + Sync>>;

pub struct ClientConfig {
    pub base_url: String,
}

/// Anything that can answer a story request with a JSON document.
///
/// Implementations return the parsed body as-is; deciding whether it has
/// the expected shape is the controller's job.
pub trait StoryApi {
    fn post_story(
        &self,
        request: &StoryRequest,
    ) -> impl Future<Output = ClientResult<Value>> + Send;
}

#[derive(Clone)]
pub struct StoryClient {
    base_url: String,
    http: HttpClient,
}

impl StoryClient {
    pub fn new(config: ClientConfig) -> Self {
        Self {
            base_url: normalize_base_url(&config.base_url),
            http: HttpClient::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn endpoint(&self) -> String {
        format!("{}{}", self.base_url, STORY_PATH)
    }
}

impl StoryApi for StoryClient {
    async fn post_story(&self, request: &StoryRequest) -> ClientResult<Value> {
        let response = self
            .http
            .post(self.endpoint())
            .header(CONTENT_TYPE, "application/json")
            .json(request)
            .send()
            .await?;

        // The body decides the outcome, not the status.
        let status = response.status();
        debug!(%status, "story endpoint responded");

        let body = response.text().await?;
        serde_json::from_str(&body)
            .map_err(|e| format!("Response body is not valid JSON: {}", e).into())
    }
}

fn normalize_base_url(value: &str) -> String {
    value.trim_end_matches('/').to_string()
}
