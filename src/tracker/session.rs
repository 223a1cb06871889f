use log::{debug, info};
use serde::Serialize;
use thiserror::Error;

use super::completion::{is_subsection_complete, CompletionTracker, SubsectionCompleted};
use super::navigation::{NavigationError, Navigator, Viewer};
use super::progress::{AnswerRecord, ProgressStore, QuestionState};
use super::stats::SessionStats;
use crate::content::{ContentTree, Question, QuestionId, Subsection, SubsectionId, Topic, TopicId};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SelectionError {
    #[error("no topic with id '{0}'")]
    UnknownTopic(TopicId),

    #[error("no subsection with id '{0}'")]
    UnknownSubsection(SubsectionId),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AnswerError {
    #[error("no question is selected")]
    NoQuestion,

    #[error("option {selected} does not exist, question has {options} options")]
    InvalidOption { selected: usize, options: usize },
}

/// What the page shows after an option is picked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerFeedback {
    pub record: AnswerRecord,

    /// false when the question had already been answered; the stored record is returned as is
    pub is_new: bool,

    pub correct_option: usize,

    /// set the first time the current subsection becomes complete
    pub completed: Option<SubsectionCompleted>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Progress {
    pub answered: usize,
    pub total: usize,
}

impl Progress {
    pub fn is_complete(&self) -> bool {
        self.answered == self.total
    }
}

/// One viewer's study page: the fetched tree plus everything tracked on top of it.
#[derive(Debug)]
pub struct StudySession {
    tree: ContentTree,
    navigator: Navigator,
    progress: ProgressStore,
    completion: CompletionTracker,
}

impl StudySession {
    /// Starts on the first subsection of the first topic when there is one.
    pub fn new(tree: ContentTree, viewer: Viewer) -> Self {
        let mut navigator = Navigator::new(viewer);
        if let Some(topic) = tree.first_topic() {
            navigator.select_topic(topic);
        }
        info!(
            "study session started: {} topics, {} questions",
            tree.topics.len(),
            tree.question_count()
        );

        Self {
            tree,
            navigator,
            progress: ProgressStore::new(),
            completion: CompletionTracker::new(),
        }
    }

    pub fn tree(&self) -> &ContentTree {
        &self.tree
    }

    pub fn viewer(&self) -> Viewer {
        self.navigator.viewer()
    }

    pub fn set_viewer(&mut self, viewer: Viewer) {
        self.navigator.set_viewer(viewer);
    }

    pub fn current_topic(&self) -> Option<&Topic> {
        self.tree.topic(self.navigator.topic_id()?)
    }

    pub fn current_subsection(&self) -> Option<&Subsection> {
        self.navigator.current_subsection(&self.tree)
    }

    pub fn current_question(&self) -> Option<&Question> {
        self.navigator.current_question(&self.tree)
    }

    pub fn question_index(&self) -> usize {
        self.navigator.question_index()
    }

    pub fn select_topic(&mut self, id: &TopicId) -> Result<(), SelectionError> {
        let topic = self
            .tree
            .topic(id)
            .ok_or_else(|| SelectionError::UnknownTopic(id.clone()))?;
        self.navigator.select_topic(topic);
        Ok(())
    }

    pub fn select_subsection(&mut self, id: &SubsectionId) -> Result<(), SelectionError> {
        let topic = self
            .tree
            .parent_topic(id)
            .ok_or_else(|| SelectionError::UnknownSubsection(id.clone()))?;
        let subsection = topic
            .subsection(id)
            .ok_or_else(|| SelectionError::UnknownSubsection(id.clone()))?;
        self.navigator.select_subsection(topic, subsection);
        Ok(())
    }

    pub fn next(&mut self) -> Result<bool, NavigationError> {
        self.navigator.go_next(&self.tree)
    }

    pub fn previous(&mut self) -> Result<bool, NavigationError> {
        self.navigator.go_previous()
    }

    pub fn jump_to(&mut self, index: usize) -> Result<(), NavigationError> {
        self.navigator.jump_to(&self.tree, index)
    }

    pub fn toggle_topic_expanded(&mut self, id: &TopicId) -> bool {
        self.navigator.toggle_topic_expanded(id)
    }

    pub fn is_expanded(&self, id: &TopicId) -> bool {
        self.navigator.is_expanded(id)
    }

    /// Answers the question on screen with option `selected`.
    pub fn answer(&mut self, selected: usize) -> Result<AnswerFeedback, AnswerError> {
        let topic = self
            .navigator
            .topic_id()
            .and_then(|id| self.tree.topic(id))
            .ok_or(AnswerError::NoQuestion)?;
        let subsection = self
            .navigator
            .current_subsection(&self.tree)
            .ok_or(AnswerError::NoQuestion)?;
        let question = subsection
            .question_at(self.navigator.question_index())
            .ok_or(AnswerError::NoQuestion)?;

        if selected >= question.options.len() {
            return Err(AnswerError::InvalidOption {
                selected,
                options: question.options.len(),
            });
        }

        let recorded = self
            .progress
            .record_answer(&question.id, selected, question.correct_option);
        debug!(
            "question {} answered with {selected}, correct: {}, new: {}",
            question.id, recorded.record.correct, recorded.is_new
        );

        let completed = if recorded.is_new {
            self.completion.check(topic, subsection, &self.progress)
        } else {
            None
        };

        Ok(AnswerFeedback {
            record: recorded.record,
            is_new: recorded.is_new,
            correct_option: question.correct_option,
            completed,
        })
    }

    pub fn is_answered(&self, id: &QuestionId) -> bool {
        self.progress.is_answered(id)
    }

    pub fn record(&self, id: &QuestionId) -> Option<&AnswerRecord> {
        self.progress.record(id)
    }

    pub fn question_state(&self, id: &QuestionId) -> QuestionState {
        self.progress.state(id)
    }

    pub fn toggle_bookmark(&mut self, id: &QuestionId) -> bool {
        self.progress.toggle_bookmark(id)
    }

    pub fn is_bookmarked(&self, id: &QuestionId) -> bool {
        self.progress.is_bookmarked(id)
    }

    /// Bookmarked questions in tree order.
    pub fn bookmarked_questions(&self) -> Vec<&Question> {
        self.tree
            .topics
            .iter()
            .flat_map(|t| t.subsections.iter())
            .flat_map(|s| s.questions.iter())
            .filter(|q| self.progress.is_bookmarked(&q.id))
            .collect()
    }

    pub fn stats(&self) -> &SessionStats {
        self.progress.stats()
    }

    pub fn reset_stats(&mut self) {
        info!("session stats reset");
        self.progress.reset_stats();
    }

    pub fn is_subsection_complete(&self, id: &SubsectionId) -> bool {
        self.tree
            .subsection(id)
            .is_some_and(|s| is_subsection_complete(s, &self.progress))
    }

    pub fn subsection_progress(&self, id: &SubsectionId) -> Option<Progress> {
        self.tree.subsection(id).map(|s| self.count(s.questions.iter()))
    }

    pub fn topic_progress(&self, id: &TopicId) -> Option<Progress> {
        self.tree.topic(id).map(|t| {
            self.count(t.subsections.iter().flat_map(|s| s.questions.iter()))
        })
    }

    fn count<'a>(&self, questions: impl Iterator<Item = &'a Question>) -> Progress {
        questions.fold(Progress::default(), |mut acc, q| {
            acc.total += 1;
            if self.progress.is_answered(&q.id) {
                acc.answered += 1;
            }
            acc
        })
    }
}
