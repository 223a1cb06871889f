use std::collections::HashSet;

use log::info;

use super::progress::ProgressStore;
use crate::content::{Subsection, SubsectionId, Topic};

/// Every question in the subsection has a record.
pub fn is_subsection_complete(subsection: &Subsection, progress: &ProgressStore) -> bool {
    subsection
        .questions
        .iter()
        .all(|q| progress.is_answered(&q.id))
}

/// Raised once per subsection, the first time all its questions are answered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubsectionCompleted {
    pub subsection: SubsectionId,
    pub next: Option<SubsectionId>,
}

#[derive(Debug, Default)]
pub struct CompletionTracker {
    completed: HashSet<SubsectionId>,
}

impl CompletionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_marked(&self, subsection: &SubsectionId) -> bool {
        self.completed.contains(subsection)
    }

    /// Call after a new record for a question in `subsection`, which belongs to `topic`.
    pub fn check(
        &mut self,
        topic: &Topic,
        subsection: &Subsection,
        progress: &ProgressStore,
    ) -> Option<SubsectionCompleted> {
        if self.completed.contains(&subsection.id) || !is_subsection_complete(subsection, progress)
        {
            return None;
        }

        self.completed.insert(subsection.id.clone());
        let next = topic.subsection_after(&subsection.id).map(|s| s.id.clone());
        info!(
            "subsection {} complete, next {}",
            subsection.id,
            next.as_ref().map_or("none", SubsectionId::as_str)
        );

        Some(SubsectionCompleted {
            subsection: subsection.id.clone(),
            next,
        })
    }
}
