use std::fmt;
use std::sync::OnceLock;

use log::{debug, warn};
use regex::Regex;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use super::config::ClientConfig;
use super::tree::{ContentTree, Topic};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentKind {
    ExamQuestions,
    RevisionNotes,
    PastPapers,
}

impl ContentKind {
    pub fn path(&self) -> &'static str {
        match self {
            ContentKind::ExamQuestions => "exam-questions",
            ContentKind::RevisionNotes => "revision-notes",
            ContentKind::PastPapers => "past-papers",
        }
    }
}

impl std::str::FromStr for ContentKind {
    type Err = FetchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "exam-questions" | "questions" => Ok(ContentKind::ExamQuestions),
            "revision-notes" | "notes" => Ok(ContentKind::RevisionNotes),
            "past-papers" | "papers" => Ok(ContentKind::PastPapers),
            other => Err(FetchError::InvalidKey {
                field: "kind",
                value: other.to_string(),
            }),
        }
    }
}

/// Route key for one content tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentKey {
    pub kind: ContentKind,
    pub course: String,
    pub subject: String,
    pub exam_board: String,
}

impl ContentKey {
    pub fn new(
        kind: ContentKind,
        course: impl Into<String>,
        subject: impl Into<String>,
        exam_board: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            course: course.into(),
            subject: subject.into(),
            exam_board: exam_board.into(),
        }
    }

    /// Endpoint path below the API base url, segments checked before any request is made.
    pub fn path(&self) -> Result<String, FetchError> {
        for (field, value) in [
            ("course", &self.course),
            ("subject", &self.subject),
            ("exam_board", &self.exam_board),
        ] {
            if !segment_regex().is_match(value) {
                return Err(FetchError::InvalidKey {
                    field,
                    value: value.clone(),
                });
            }
        }

        Ok(format!(
            "{}/{}/{}/{}",
            self.kind.path(),
            self.course,
            self.subject,
            self.exam_board
        ))
    }
}

impl fmt::Display for ContentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}/{}/{}",
            self.kind.path(),
            self.course,
            self.subject,
            self.exam_board
        )
    }
}

fn segment_regex() -> &'static Regex {
    static SEGMENT: OnceLock<Regex> = OnceLock::new();
    SEGMENT.get_or_init(|| Regex::new(r"^[A-Za-z0-9_.-]+$").unwrap())
}

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("HTTP request failed: {0}")]
    Http(#[source] Box<ureq::Error>),

    #[error("Failed to read response body: {0}")]
    Io(#[from] std::io::Error),

    #[error("Server returned an error: {status}")]
    ServerError { status: u16 },

    #[error("Backend rejected the request: {}", .message.as_deref().unwrap_or("no message"))]
    Rejected { message: Option<String> },

    #[error("Malformed content response: {0}")]
    Shape(String),

    #[error("Invalid {field} '{value}'")]
    InvalidKey { field: &'static str, value: String },
}

impl From<ureq::Error> for FetchError {
    fn from(e: ureq::Error) -> Self {
        match e {
            ureq::Error::Status(code, _) => FetchError::ServerError { status: code },
            other => FetchError::Http(Box::new(other)),
        }
    }
}

/// Anything that can produce a content tree for a route key.
pub trait ContentSource {
    fn fetch(&self, key: &ContentKey) -> Result<ContentTree, FetchError>;
}

pub struct HttpContentClient {
    agent: ureq::Agent,
    config: ClientConfig,
}

impl HttpContentClient {
    pub fn new(config: ClientConfig) -> Self {
        Self {
            agent: ureq::Agent::new(),
            config,
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn url_for(&self, key: &ContentKey) -> Result<String, FetchError> {
        Ok(format!(
            "{}/{}",
            self.config.base_url.trim_end_matches('/'),
            key.path()?
        ))
    }
}

impl ContentSource for HttpContentClient {
    fn fetch(&self, key: &ContentKey) -> Result<ContentTree, FetchError> {
        let url = self.url_for(key)?;
        debug!("fetching {key} from {url}");

        let mut request = self.agent.get(&url).set("Accept", "application/json");
        if let Some(token) = self.config.token.as_deref() {
            request = request.set("Authorization", &format!("Bearer {}", token));
        }

        let body: Value = request.call()?.into_json()?;
        let tree = parse_envelope(body)?;

        debug!(
            "fetched {key}: {} topics, {} questions",
            tree.topics.len(),
            tree.question_count()
        );
        Ok(tree)
    }
}

/// Validate a `{ success, data, message? }` envelope and turn `data` into a tree.
pub fn parse_envelope(body: Value) -> Result<ContentTree, FetchError> {
    let success = body
        .get("success")
        .and_then(Value::as_bool)
        .ok_or_else(|| FetchError::Shape("envelope must set success".to_string()))?;

    let message = body
        .get("message")
        .and_then(Value::as_str)
        .map(str::to_string);

    if !success {
        warn!(
            "content request rejected: {}",
            message.as_deref().unwrap_or("no message")
        );
        return Err(FetchError::Rejected { message });
    }

    let data = body
        .get("data")
        .ok_or_else(|| FetchError::Shape("no data in content response".to_string()))?;

    let topics = match data {
        Value::Array(_) => data,
        Value::Object(map) => map
            .get("topics")
            .ok_or_else(|| FetchError::Shape("content data has no topics".to_string()))?,
        _ => {
            return Err(FetchError::Shape(
                "content data must be a list or an object".to_string(),
            ))
        }
    };

    let topics = Vec::<Topic>::deserialize(topics)
        .map_err(|e| FetchError::Shape(format!("failed to parse topics: {e}")))?;
    let tree = ContentTree::new(topics.into_iter().map(fill_total).collect());
    validate(&tree)?;

    Ok(tree)
}

fn fill_total(mut topic: Topic) -> Topic {
    if topic.total_questions == 0 {
        topic.total_questions = topic.question_count();
    }
    topic
}

fn validate(tree: &ContentTree) -> Result<(), FetchError> {
    for topic in &tree.topics {
        for subsection in &topic.subsections {
            for question in &subsection.questions {
                if question.correct_option >= question.options.len() {
                    return Err(FetchError::Shape(format!(
                        "question '{}' in subsection '{}' has correct option {} but {} options",
                        question.id,
                        subsection.name,
                        question.correct_option,
                        question.options.len()
                    )));
                }
            }
        }
    }
    Ok(())
}
