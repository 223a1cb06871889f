mod config;
mod fetch;
mod loader;
mod tree;

pub use config::{ClientConfig, BASE_URL_VAR, DEFAULT_BASE_URL, TOKEN_VAR};
pub use fetch::{
    parse_envelope, ContentKey, ContentKind, ContentSource, FetchError, HttpContentClient,
};
pub use loader::{ContentLoader, ContentState};
pub use tree::{
    ContentTree, Difficulty, Question, QuestionId, Subsection, SubsectionId, Topic, TopicId,
};
