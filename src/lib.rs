//! Exam-question study tracking: fetch a topic tree from the content backend,
//! then navigate it, record answers and follow progress for one page session.

pub mod content;
pub mod tracker;
