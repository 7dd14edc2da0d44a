use crate::client::{ClientResult, StoryApi};
use crate::form::FormInput;
use crate::protocol::{Story, StoryRequest};
use crate::render::{Reveal, StoryCard};
use serde_json::Value;
use std::fmt;
use std::time::Instant;
use tracing::{debug, error, info};
use uuid::Uuid;

pub const INVALID_FORMAT_MESSAGE: &str = "Error: Invalid response format.";
pub const CONNECTION_ERROR_MESSAGE: &str = "Error connecting to API.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitError {
    /// The body parsed as JSON but has no `stories` array.
    InvalidFormat,
    /// Transport failure, unparseable body, or a story that cannot be rendered.
    Connection(String),
}

impl SubmitError {
    pub fn user_message(&self) -> &'static str {
        match self {
            SubmitError::InvalidFormat => INVALID_FORMAT_MESSAGE,
            SubmitError::Connection(_) => CONNECTION_ERROR_MESSAGE,
        }
    }
}

impl fmt::Display for SubmitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubmitError::InvalidFormat => write!(f, "response has no stories array"),
            SubmitError::Connection(cause) => write!(f, "request failed: {}", cause),
        }
    }
}

impl std::error::Error for SubmitError {}

/// Number of cards rendered, or the error shown instead.
pub type SubmitOutcome = Result<usize, SubmitError>;

#[derive(Debug, Clone)]
pub struct RenderedCard {
    pub card: StoryCard,
    pub reveal: Reveal,
}

#[derive(Debug, Clone)]
pub enum OutputItem {
    Card(RenderedCard),
    Error(&'static str),
}

/// What the user currently sees.
#[derive(Debug, Clone, Default)]
pub struct UiState {
    pub loading: bool,
    pub output: Vec<OutputItem>,
}

impl UiState {
    pub fn cards(&self) -> impl Iterator<Item = &RenderedCard> {
        self.output.iter().filter_map(|item| match item {
            OutputItem::Card(card) => Some(card),
            OutputItem::Error(_) => None,
        })
    }

    pub fn error(&self) -> Option<&'static str> {
        self.output.iter().find_map(|item| match item {
            OutputItem::Error(message) => Some(*message),
            OutputItem::Card(_) => None,
        })
    }
}

/// Identifies one submission. Only the latest token may settle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestToken {
    generation: u64,
    id: Uuid,
}

impl RequestToken {
    pub fn id(&self) -> Uuid {
        self.id
    }
}

#[derive(Debug)]
pub struct PendingSubmission {
    pub token: RequestToken,
    pub request: StoryRequest,
}

#[derive(Debug, Default)]
pub struct StoryRequestController {
    state: UiState,
    generation: u64,
    current: Option<RequestToken>,
}

impl StoryRequestController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &UiState {
        &self.state
    }

    pub fn clear_output(&mut self) {
        self.state.output.clear();
    }

    pub fn show_loading(&mut self) {
        self.state.loading = true;
    }

    pub fn hide_loading(&mut self) {
        self.state.loading = false;
    }

    pub fn render_card(&mut self, story: &Story, now: Instant) {
        self.state.output.push(OutputItem::Card(RenderedCard {
            card: StoryCard::from_story(story),
            reveal: Reveal::start(now),
        }));
    }

    /// Replaces whatever the output holds with a single message.
    pub fn show_error(&mut self, message: &'static str) {
        self.state.output.clear();
        self.state.output.push(OutputItem::Error(message));
    }

    /// Resets the output, shows the loading indicator and snapshots the
    /// form. Any submission still in flight is superseded.
    pub fn begin_submission(&mut self, input: &FormInput) -> PendingSubmission {
        self.clear_output();
        self.show_loading();

        self.generation += 1;
        let token = RequestToken {
            generation: self.generation,
            id: Uuid::new_v4(),
        };
        if let Some(previous) = self.current.replace(token) {
            debug!(superseded = %previous.id, "submission superseded");
        }
        debug!(request_id = %token.id, generation = token.generation, "submission started");

        PendingSubmission {
            token,
            request: input.to_request(),
        }
    }

    /// Applies the result of a submission. Returns `None` when the token
    /// has been superseded, in which case nothing changes.
    pub fn settle(
        &mut self,
        token: RequestToken,
        result: ClientResult<Value>,
    ) -> Option<SubmitOutcome> {
        if self.current != Some(token) {
            debug!(request_id = %token.id, "dropping stale result");
            return None;
        }
        self.current = None;
        Some(self.apply(token, result))
    }

    pub async fn handle_submit<A: StoryApi>(
        &mut self,
        api: &A,
        input: &FormInput,
    ) -> SubmitOutcome {
        let PendingSubmission { token, request } = self.begin_submission(input);
        let result = api.post_story(&request).await;
        self.current = None;
        self.apply(token, result)
    }

    fn apply(&mut self, token: RequestToken, result: ClientResult<Value>) -> SubmitOutcome {
        self.hide_loading();

        let outcome = match result {
            Ok(body) => interpret_response(body),
            Err(err) => Err(SubmitError::Connection(err.to_string())),
        };

        match outcome {
            Ok(stories) => {
                let now = Instant::now();
                for story in &stories {
                    self.render_card(story, now);
                }
                info!(request_id = %token.id, count = stories.len(), "stories rendered");
                Ok(stories.len())
            }
            Err(err) => {
                if let SubmitError::Connection(cause) = &err {
                    error!(request_id = %token.id, cause = %cause, "story request failed");
                }
                self.show_error(err.user_message());
                Err(err)
            }
        }
    }
}

/// Extracts the stories from a parsed response body.
///
/// Every story is decoded before anything is rendered, so a story that
/// cannot be rendered fails the whole response.
pub fn interpret_response(body: Value) -> Result<Vec<Story>, SubmitError> {
    let stories = match body {
        Value::Null => {
            return Err(SubmitError::Connection(
                "response body is null".to_string(),
            ));
        }
        Value::Object(mut object) => match object.remove("stories") {
            Some(Value::Array(items)) => items,
            _ => return Err(SubmitError::InvalidFormat),
        },
        _ => return Err(SubmitError::InvalidFormat),
    };

    stories
        .into_iter()
        .enumerate()
        .map(|(index, item)| {
            serde_json::from_value(item).map_err(|e| {
                SubmitError::Connection(format!("story {} cannot be rendered: {}", index, e))
            })
        })
        .collect()
}
