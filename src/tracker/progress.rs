use std::collections::{BTreeSet, HashMap};

use chrono::{DateTime, Utc};
use log::debug;
use serde::Serialize;

use super::stats::SessionStats;
use crate::content::QuestionId;

/// A viewer's first response to a question. Never changes once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnswerRecord {
    pub question_id: QuestionId,
    pub selected: usize,
    pub correct: bool,
    pub answered_at: DateTime<Utc>,
}

/// Result of `ProgressStore::record_answer`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recorded {
    pub record: AnswerRecord,

    /// false when the question already had a record and nothing changed
    pub is_new: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum QuestionState {
    Unanswered,
    Correct,
    Incorrect,
}

#[derive(Debug, Default)]
pub struct ProgressStore {
    records: HashMap<QuestionId, AnswerRecord>,
    bookmarks: BTreeSet<QuestionId>,
    stats: SessionStats,
}

impl ProgressStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_answer(
        &mut self,
        question_id: &QuestionId,
        selected: usize,
        correct_option: usize,
    ) -> Recorded {
        self.record_answer_at(question_id, selected, correct_option, Utc::now())
    }

    /// First answer wins: later calls for the same question return the stored record untouched.
    pub fn record_answer_at(
        &mut self,
        question_id: &QuestionId,
        selected: usize,
        correct_option: usize,
        at: DateTime<Utc>,
    ) -> Recorded {
        if let Some(existing) = self.records.get(question_id) {
            debug!("question {question_id} already answered, ignoring option {selected}");
            return Recorded {
                record: existing.clone(),
                is_new: false,
            };
        }

        let record = AnswerRecord {
            question_id: question_id.clone(),
            selected,
            correct: selected == correct_option,
            answered_at: at,
        };
        self.stats.record(record.correct);
        self.records.insert(question_id.clone(), record.clone());

        Recorded {
            record,
            is_new: true,
        }
    }

    pub fn is_answered(&self, question_id: &QuestionId) -> bool {
        self.records.contains_key(question_id)
    }

    pub fn record(&self, question_id: &QuestionId) -> Option<&AnswerRecord> {
        self.records.get(question_id)
    }

    pub fn state(&self, question_id: &QuestionId) -> QuestionState {
        match self.records.get(question_id) {
            None => QuestionState::Unanswered,
            Some(r) if r.correct => QuestionState::Correct,
            Some(_) => QuestionState::Incorrect,
        }
    }

    pub fn answered_count(&self) -> usize {
        self.records.len()
    }

    /// Returns whether the question is bookmarked afterwards.
    pub fn toggle_bookmark(&mut self, question_id: &QuestionId) -> bool {
        if self.bookmarks.remove(question_id) {
            false
        } else {
            self.bookmarks.insert(question_id.clone());
            true
        }
    }

    pub fn is_bookmarked(&self, question_id: &QuestionId) -> bool {
        self.bookmarks.contains(question_id)
    }

    pub fn bookmarks(&self) -> impl Iterator<Item = &QuestionId> {
        self.bookmarks.iter()
    }

    pub fn stats(&self) -> &SessionStats {
        &self.stats
    }

    /// Clears the session counters only. Records and bookmarks stay.
    pub fn reset_stats(&mut self) {
        self.stats.reset();
    }
}
