use std::collections::BTreeSet;

use log::debug;
use thiserror::Error;

use crate::content::{ContentTree, Question, Subsection, SubsectionId, Topic, TopicId};

/// Who is looking at the page. Passed in by the caller, never looked up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Viewer {
    Anonymous,
    Authenticated,
}

impl Viewer {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Viewer::Authenticated)
    }

    /// Anonymous viewers only get the first question of a subsection.
    pub fn can_view(&self, index: usize) -> bool {
        index == 0 || self.is_authenticated()
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NavigationError {
    #[error("log in to view question {}", .requested.saturating_add(1))]
    LoginRequired { requested: usize },

    #[error("question {index} is out of range, subsection has {len} questions")]
    OutOfRange { index: usize, len: usize },
}

#[derive(Debug)]
pub struct Navigator {
    viewer: Viewer,
    topic: Option<TopicId>,
    subsection: Option<SubsectionId>,
    question_index: usize,
    expanded: BTreeSet<TopicId>,
}

impl Navigator {
    pub fn new(viewer: Viewer) -> Self {
        Self {
            viewer,
            topic: None,
            subsection: None,
            question_index: 0,
            expanded: BTreeSet::new(),
        }
    }

    pub fn viewer(&self) -> Viewer {
        self.viewer
    }

    /// Position is kept on login, so a refused move can simply be tried again.
    /// On logout a gated position falls back to the first question.
    pub fn set_viewer(&mut self, viewer: Viewer) {
        self.viewer = viewer;
        if !viewer.can_view(self.question_index) {
            debug!("viewer can no longer see question index {}", self.question_index);
            self.question_index = 0;
        }
    }

    pub fn topic_id(&self) -> Option<&TopicId> {
        self.topic.as_ref()
    }

    pub fn subsection_id(&self) -> Option<&SubsectionId> {
        self.subsection.as_ref()
    }

    pub fn question_index(&self) -> usize {
        self.question_index
    }

    pub fn current_subsection<'a>(&self, tree: &'a ContentTree) -> Option<&'a Subsection> {
        let topic = tree.topic(self.topic.as_ref()?)?;
        topic.subsection(self.subsection.as_ref()?)
    }

    pub fn current_question<'a>(&self, tree: &'a ContentTree) -> Option<&'a Question> {
        self.current_subsection(tree)?
            .question_at(self.question_index)
    }

    pub fn select_topic(&mut self, topic: &Topic) {
        debug!("select topic {}", topic.id);
        self.topic = Some(topic.id.clone());
        self.subsection = topic.first_subsection().map(|s| s.id.clone());
        self.question_index = 0;
        self.expanded.insert(topic.id.clone());
    }

    /// `parent` is the topic owning `subsection`; it becomes the current topic too.
    pub fn select_subsection(&mut self, parent: &Topic, subsection: &Subsection) {
        debug!("select subsection {}", subsection.id);
        self.topic = Some(parent.id.clone());
        self.subsection = Some(subsection.id.clone());
        self.question_index = 0;
    }

    /// Moves forward one question. `Ok(false)` at the last question.
    pub fn go_next(&mut self, tree: &ContentTree) -> Result<bool, NavigationError> {
        let len = self.current_len(tree);
        let target = self.question_index + 1;
        if target >= len {
            return Ok(false);
        }
        self.move_to(target)?;
        Ok(true)
    }

    /// Moves back one question. `Ok(false)` at the first question.
    pub fn go_previous(&mut self) -> Result<bool, NavigationError> {
        if self.question_index == 0 {
            return Ok(false);
        }
        self.move_to(self.question_index - 1)?;
        Ok(true)
    }

    pub fn jump_to(&mut self, tree: &ContentTree, index: usize) -> Result<(), NavigationError> {
        self.check_access(index)?;

        let len = self.current_len(tree);
        if index > 0 && index >= len {
            return Err(NavigationError::OutOfRange { index, len });
        }
        self.question_index = index;
        Ok(())
    }

    /// Returns whether the topic is expanded afterwards.
    pub fn toggle_topic_expanded(&mut self, topic: &TopicId) -> bool {
        if self.expanded.remove(topic) {
            false
        } else {
            self.expanded.insert(topic.clone());
            true
        }
    }

    pub fn is_expanded(&self, topic: &TopicId) -> bool {
        self.expanded.contains(topic)
    }

    fn move_to(&mut self, index: usize) -> Result<(), NavigationError> {
        self.check_access(index)?;
        self.question_index = index;
        Ok(())
    }

    fn check_access(&self, index: usize) -> Result<(), NavigationError> {
        if self.viewer.can_view(index) {
            Ok(())
        } else {
            debug!("anonymous viewer refused question index {index}");
            Err(NavigationError::LoginRequired { requested: index })
        }
    }

    fn current_len(&self, tree: &ContentTree) -> usize {
        self.current_subsection(tree)
            .map_or(0, |s| s.questions.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::{Difficulty, QuestionId};

    fn question(id: &str) -> Question {
        Question {
            id: QuestionId::new(id),
            text: id.to_string(),
            options: vec!["a".into(), "b".into()],
            correct_option: 0,
            difficulty: Difficulty::Medium,
            marks: 1,
            explanation: String::new(),
        }
    }

    fn tree() -> ContentTree {
        ContentTree::new(vec![
            Topic {
                id: TopicId::new("t1"),
                name: "T1".into(),
                total_questions: 3,
                subsections: vec![
                    Subsection {
                        id: SubsectionId::new("s1"),
                        name: "S1".into(),
                        questions: vec![question("q1"), question("q2"), question("q3")],
                        resource: None,
                    },
                    Subsection {
                        id: SubsectionId::new("s2"),
                        name: "S2".into(),
                        questions: vec![],
                        resource: None,
                    },
                ],
            },
            Topic {
                id: TopicId::new("t2"),
                name: "T2".into(),
                total_questions: 0,
                subsections: vec![],
            },
        ])
    }

    #[test]
    fn select_topic_picks_first_subsection_and_expands() {
        let tree = tree();
        let mut nav = Navigator::new(Viewer::Authenticated);
        nav.select_topic(&tree.topics[0]);

        assert_eq!(nav.subsection_id().map(SubsectionId::as_str), Some("s1"));
        assert_eq!(nav.question_index(), 0);
        assert!(nav.is_expanded(&TopicId::new("t1")));

        nav.select_topic(&tree.topics[1]);
        assert!(nav.subsection_id().is_none());
        assert!(nav.current_question(&tree).is_none());
    }

    #[test]
    fn next_and_previous_stop_at_bounds() {
        let tree = tree();
        let mut nav = Navigator::new(Viewer::Authenticated);
        nav.select_topic(&tree.topics[0]);

        assert_eq!(nav.go_previous(), Ok(false));
        assert_eq!(nav.go_next(&tree), Ok(true));
        assert_eq!(nav.go_next(&tree), Ok(true));
        assert_eq!(nav.go_next(&tree), Ok(false));
        assert_eq!(nav.question_index(), 2);
        assert_eq!(
            nav.current_question(&tree).map(|q| q.id.as_str()),
            Some("q3")
        );
        assert_eq!(nav.go_previous(), Ok(true));
        assert_eq!(nav.question_index(), 1);
    }

    #[test]
    fn selecting_subsection_resets_index() {
        let tree = tree();
        let mut nav = Navigator::new(Viewer::Authenticated);
        nav.select_topic(&tree.topics[0]);
        nav.jump_to(&tree, 2).unwrap();

        nav.select_subsection(&tree.topics[0], &tree.topics[0].subsections[1]);
        assert_eq!(nav.question_index(), 0);
        assert_eq!(nav.go_next(&tree), Ok(false));
    }

    #[test]
    fn anonymous_gate() {
        let tree = tree();
        let mut nav = Navigator::new(Viewer::Anonymous);
        nav.select_topic(&tree.topics[0]);

        assert_eq!(nav.jump_to(&tree, 0), Ok(()));
        assert_eq!(
            nav.jump_to(&tree, 2),
            Err(NavigationError::LoginRequired { requested: 2 })
        );
        assert_eq!(
            nav.go_next(&tree),
            Err(NavigationError::LoginRequired { requested: 1 })
        );
        // gated even past the end
        assert_eq!(
            nav.jump_to(&tree, 10),
            Err(NavigationError::LoginRequired { requested: 10 })
        );
        assert_eq!(nav.question_index(), 0);

        nav.set_viewer(Viewer::Authenticated);
        assert_eq!(nav.jump_to(&tree, 2), Ok(()));
    }

    #[test]
    fn jump_past_end_is_out_of_range() {
        let tree = tree();
        let mut nav = Navigator::new(Viewer::Authenticated);
        nav.select_topic(&tree.topics[0]);

        assert_eq!(
            nav.jump_to(&tree, 3),
            Err(NavigationError::OutOfRange { index: 3, len: 3 })
        );
        assert_eq!(nav.question_index(), 0);
    }

    #[test]
    fn login_required_message_handles_largest_index() {
        let tree = tree();
        let mut nav = Navigator::new(Viewer::Anonymous);
        nav.select_topic(&tree.topics[0]);

        let err = nav.jump_to(&tree, usize::MAX).unwrap_err();
        assert_eq!(err, NavigationError::LoginRequired { requested: usize::MAX });
        assert_eq!(
            err.to_string(),
            format!("log in to view question {}", usize::MAX)
        );
        assert_eq!(
            NavigationError::LoginRequired { requested: 1 }.to_string(),
            "log in to view question 2"
        );
    }

    #[test]
    fn logout_moves_back_to_first_question() {
        let tree = tree();
        let mut nav = Navigator::new(Viewer::Authenticated);
        nav.select_topic(&tree.topics[0]);
        nav.jump_to(&tree, 2).unwrap();

        nav.set_viewer(Viewer::Anonymous);
        assert_eq!(nav.question_index(), 0);
        assert_eq!(nav.go_previous(), Ok(false));
    }

    #[test]
    fn toggle_expanded() {
        let mut nav = Navigator::new(Viewer::Anonymous);
        let t1 = TopicId::new("t1");
        assert!(nav.toggle_topic_expanded(&t1));
        assert!(!nav.toggle_topic_expanded(&t1));
        assert!(!nav.is_expanded(&t1));
    }
}
