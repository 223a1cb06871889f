use log::{info, warn};

use super::fetch::{ContentKey, ContentSource, FetchError};
use super::tree::ContentTree;

/// View state for one content page.
#[derive(Debug)]
pub enum ContentState {
    /// no fetch has settled yet
    Loading,
    Loaded(ContentTree),
    /// the fetch worked but there are no topics to show
    Empty,
    Failed(FetchError),
    /// the tree was handed over with `take_tree`
    Idle,
}

impl ContentState {
    pub fn tree(&self) -> Option<&ContentTree> {
        match self {
            ContentState::Loaded(tree) => Some(tree),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&FetchError> {
        match self {
            ContentState::Failed(e) => Some(e),
            _ => None,
        }
    }
}

/// Owns the route key and the current load state. Never retries on its own.
pub struct ContentLoader<S> {
    source: S,
    key: ContentKey,
    state: ContentState,
    attempts: usize,
}

impl<S: ContentSource> ContentLoader<S> {
    pub fn new(source: S, key: ContentKey) -> Self {
        Self {
            source,
            key,
            state: ContentState::Loading,
            attempts: 0,
        }
    }

    pub fn key(&self) -> &ContentKey {
        &self.key
    }

    pub fn state(&self) -> &ContentState {
        &self.state
    }

    pub fn attempts(&self) -> usize {
        self.attempts
    }

    pub fn load(&mut self) -> &ContentState {
        self.attempts += 1;

        self.state = match self.source.fetch(&self.key) {
            Ok(tree) if tree.is_empty() => {
                info!("{} has no topics", self.key);
                ContentState::Empty
            }
            Ok(tree) => ContentState::Loaded(tree),
            Err(e) => {
                warn!("failed to load {}: {e}", self.key);
                ContentState::Failed(e)
            }
        };

        &self.state
    }

    /// Repeats the same fetch after a failure or an empty result.
    pub fn retry(&mut self) -> &ContentState {
        self.load()
    }

    /// Hands the loaded tree over, leaving the loader `Idle`.
    pub fn take_tree(&mut self) -> Option<ContentTree> {
        match std::mem::replace(&mut self.state, ContentState::Idle) {
            ContentState::Loaded(tree) => Some(tree),
            other => {
                self.state = other;
                None
            }
        }
    }
}
