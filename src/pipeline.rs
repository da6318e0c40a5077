//! Fetch → validate → summarize state machine.
//!
//! A run starts at [`Stage::Start`] and is stepped until it reaches either
//! [`Stage::Done`] or the absorbing [`Stage::Failed`]. Collaborators are
//! injected as trait objects; the pipeline itself holds no per-run state.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use eyre::Result;
use log::{debug, info, warn};

use crate::normalize::{Summary, normalize};
use crate::prompts;

/// Default character floor below which a transcript is unusable
pub const DEFAULT_MIN_TRANSCRIPT_CHARS: usize = 100;

/// Default character budget a transcript is truncated to
pub const DEFAULT_MAX_TRANSCRIPT_CHARS: usize = 15_000;

/// Default number of comments handed to the model
pub const DEFAULT_MAX_COMMENTS: usize = 100;

/// Message used when the comment list comes back empty
pub const NO_COMMENTS_MESSAGE: &str = "댓글이 없습니다. (no comments found)";

/// Source of raw content for a video
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, video_id: &str) -> Result<Vec<String>>;
}

/// Model call that turns content plus fixed instructions into text
#[async_trait]
pub trait Summarizer: Send + Sync {
    async fn summarize(&self, content: &Content, instructions: &str) -> Result<String>;
}

/// Which of the two workflows a pipeline runs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Workflow {
    Script,
    Comments,
}

impl fmt::Display for Workflow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Workflow::Script => write!(f, "script"),
            Workflow::Comments => write!(f, "comments"),
        }
    }
}

impl Workflow {
    pub fn instructions(&self) -> &'static str {
        match self {
            Workflow::Script => prompts::SCRIPT_INSTRUCTIONS,
            Workflow::Comments => prompts::COMMENT_INSTRUCTIONS,
        }
    }

    /// Viability check for freshly fetched content
    pub fn validate(&self, video_id: &str, raw: Vec<String>, limits: &Limits) -> Result<Content, RunError> {
        let limits = limits.sanitized();
        match self {
            Workflow::Script => validate_transcript(raw, &limits).map(Content::Transcript),
            Workflow::Comments => validate_comments(raw, &limits).map(|comments| Content::Comments {
                video_id: video_id.to_string(),
                comments,
            }),
        }
    }
}

/// Viability floor and truncation ceilings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    pub min_transcript_chars: usize,
    pub max_transcript_chars: usize,
    pub max_comments: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            min_transcript_chars: DEFAULT_MIN_TRANSCRIPT_CHARS,
            max_transcript_chars: DEFAULT_MAX_TRANSCRIPT_CHARS,
            max_comments: DEFAULT_MAX_COMMENTS,
        }
    }
}

impl Limits {
    /// Limits that can never truncate viable content into unviable content.
    ///
    /// The transcript ceiling is raised to the floor, and at least one comment is kept.
    pub fn sanitized(self) -> Self {
        let mut limits = self;
        if limits.max_transcript_chars < limits.min_transcript_chars {
            warn!(
                "max_transcript_chars {} is below min_transcript_chars {}, raising it",
                limits.max_transcript_chars, limits.min_transcript_chars
            );
            limits.max_transcript_chars = limits.min_transcript_chars;
        }
        if limits.max_comments == 0 {
            warn!("max_comments is 0, keeping at least one comment");
            limits.max_comments = 1;
        }
        limits
    }
}

fn validate_transcript(raw: Vec<String>, limits: &Limits) -> Result<String, RunError> {
    let text = raw
        .iter()
        .map(|line| line.trim())
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

    if text.is_empty() {
        return Err(RunError::ContentTooShortOrEmpty("transcript is empty".to_string()));
    }

    let chars = text.chars().count();
    if chars < limits.min_transcript_chars {
        return Err(RunError::ContentTooShortOrEmpty(format!(
            "transcript too short to summarize ({chars} < {} characters)",
            limits.min_transcript_chars
        )));
    }

    if chars > limits.max_transcript_chars {
        warn!(
            "Transcript has {chars} characters, truncating to {}",
            limits.max_transcript_chars
        );
        return Ok(text.chars().take(limits.max_transcript_chars).collect());
    }

    Ok(text)
}

fn validate_comments(raw: Vec<String>, limits: &Limits) -> Result<Vec<String>, RunError> {
    let mut comments: Vec<String> = raw.into_iter().filter(|c| !c.trim().is_empty()).collect();
    if comments.is_empty() {
        return Err(RunError::ContentTooShortOrEmpty(NO_COMMENTS_MESSAGE.to_string()));
    }
    if comments.len() > limits.max_comments {
        debug!("Keeping first {} of {} comments", limits.max_comments, comments.len());
        comments.truncate(limits.max_comments);
    }
    Ok(comments)
}

/// Content handed to the summarizer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Content {
    Transcript(String),
    Comments { video_id: String, comments: Vec<String> },
}

impl Content {
    /// User-turn message for the model
    pub fn user_message(&self) -> String {
        match self {
            Content::Transcript(text) => prompts::script_message(text),
            Content::Comments { video_id, comments } => prompts::comment_message(video_id, comments),
        }
    }
}

/// Terminal run failures
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RunError {
    #[error("could not extract a video ID from: {0}")]
    IdentifierNotFound(String),
    #[error("fetch failed: {0}")]
    FetchFailed(String),
    #[error("content not usable: {0}")]
    ContentTooShortOrEmpty(String),
    #[error("summarization failed: {0}")]
    SummarizationFailed(String),
}

/// Current position of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Start,
    Fetching,
    Validating,
    Summarizing,
    Done,
    Failed,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Start => "START",
            Stage::Fetching => "FETCHING",
            Stage::Validating => "VALIDATING",
            Stage::Summarizing => "SUMMARIZING",
            Stage::Done => "DONE",
            Stage::Failed => "FAILED",
        };
        f.write_str(name)
    }
}

/// State threaded through one run; each variant carries only what is valid at that stage
#[derive(Debug, Clone, PartialEq)]
pub enum RunState {
    Start {
        source_url: String,
    },
    Fetching {
        source_url: String,
    },
    Validating {
        source_url: String,
        video_id: String,
        raw_content: Vec<String>,
    },
    Summarizing {
        source_url: String,
        video_id: String,
        content: Content,
    },
    Done {
        source_url: String,
        video_id: String,
        result_text: String,
        summary: Summary,
    },
    Failed {
        source_url: String,
        video_id: Option<String>,
        error: RunError,
    },
}

impl RunState {
    pub fn new(source_url: impl Into<String>) -> Self {
        RunState::Start {
            source_url: source_url.into(),
        }
    }

    pub fn stage(&self) -> Stage {
        match self {
            RunState::Start { .. } => Stage::Start,
            RunState::Fetching { .. } => Stage::Fetching,
            RunState::Validating { .. } => Stage::Validating,
            RunState::Summarizing { .. } => Stage::Summarizing,
            RunState::Done { .. } => Stage::Done,
            RunState::Failed { .. } => Stage::Failed,
        }
    }

    pub fn source_url(&self) -> &str {
        match self {
            RunState::Start { source_url }
            | RunState::Fetching { source_url }
            | RunState::Validating { source_url, .. }
            | RunState::Summarizing { source_url, .. }
            | RunState::Done { source_url, .. }
            | RunState::Failed { source_url, .. } => source_url,
        }
    }

    pub fn video_id(&self) -> Option<&str> {
        match self {
            RunState::Start { .. } | RunState::Fetching { .. } => None,
            RunState::Validating { video_id, .. }
            | RunState::Summarizing { video_id, .. }
            | RunState::Done { video_id, .. } => Some(video_id),
            RunState::Failed { video_id, .. } => video_id.as_deref(),
        }
    }

    pub fn error(&self) -> Option<&RunError> {
        match self {
            RunState::Failed { error, .. } => Some(error),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self.stage(), Stage::Done | Stage::Failed)
    }

    /// Outcome of a finished run. Non-terminal states are reported as not yet summarized.
    pub fn into_result(self) -> Result<Summary, RunError> {
        match self {
            RunState::Done { summary, .. } => Ok(summary),
            RunState::Failed { error, .. } => Err(error),
            other => Err(RunError::SummarizationFailed(format!(
                "run stopped at {} before producing a summary",
                other.stage()
            ))),
        }
    }
}

/// One workflow wired to its collaborators
#[derive(Clone)]
pub struct Pipeline {
    workflow: Workflow,
    fetcher: Arc<dyn Fetcher>,
    summarizer: Arc<dyn Summarizer>,
    limits: Limits,
}

impl Pipeline {
    pub fn new(
        workflow: Workflow,
        fetcher: Arc<dyn Fetcher>,
        summarizer: Arc<dyn Summarizer>,
        limits: Limits,
    ) -> Self {
        Self {
            workflow,
            fetcher,
            summarizer,
            limits: limits.sanitized(),
        }
    }

    pub fn workflow(&self) -> Workflow {
        self.workflow
    }

    pub fn limits(&self) -> &Limits {
        &self.limits
    }

    /// Drive a run from START to DONE or FAILED
    pub async fn run(&self, source_url: &str) -> RunState {
        let mut state = RunState::new(source_url);
        while !state.is_terminal() {
            state = self.step(state).await;
        }
        state
    }

    /// Apply exactly one transition. Terminal states are returned unchanged.
    pub async fn step(&self, state: RunState) -> RunState {
        let from = state.stage();
        let next = match state {
            RunState::Start { source_url } => RunState::Fetching { source_url },
            RunState::Fetching { source_url } => self.fetch(source_url).await,
            RunState::Validating {
                source_url,
                video_id,
                raw_content,
            } => match self.workflow.validate(&video_id, raw_content, &self.limits) {
                Ok(content) => RunState::Summarizing {
                    source_url,
                    video_id,
                    content,
                },
                Err(error) => RunState::Failed {
                    source_url,
                    video_id: Some(video_id),
                    error,
                },
            },
            RunState::Summarizing {
                source_url,
                video_id,
                content,
            } => self.summarize(source_url, video_id, content).await,
            terminal @ (RunState::Done { .. } | RunState::Failed { .. }) => return terminal,
        };

        match next.error() {
            Some(error) => warn!("[{}] {from} -> {}: {error}", self.workflow, next.stage()),
            None => info!("[{}] {from} -> {}", self.workflow, next.stage()),
        }
        next
    }

    async fn fetch(&self, source_url: String) -> RunState {
        let Some(video_id) = crate::extract_video_id(&source_url) else {
            return RunState::Failed {
                error: RunError::IdentifierNotFound(source_url.clone()),
                source_url,
                video_id: None,
            };
        };
        debug!("Extracted video ID {video_id} from {source_url}");

        match self.fetcher.fetch(&video_id).await {
            Ok(raw_content) => {
                debug!("Fetched {} items for {video_id}", raw_content.len());
                RunState::Validating {
                    source_url,
                    video_id,
                    raw_content,
                }
            }
            Err(e) => RunState::Failed {
                source_url,
                video_id: Some(video_id),
                error: RunError::FetchFailed(format!("{e:#}")),
            },
        }
    }

    async fn summarize(&self, source_url: String, video_id: String, content: Content) -> RunState {
        match self.summarizer.summarize(&content, self.workflow.instructions()).await {
            Ok(result_text) => {
                let summary = normalize(&result_text);
                RunState::Done {
                    source_url,
                    video_id,
                    result_text,
                    summary,
                }
            }
            Err(e) => RunState::Failed {
                source_url,
                video_id: Some(video_id),
                error: RunError::SummarizationFailed(format!("{e:#}")),
            },
        }
    }
}
