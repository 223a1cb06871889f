use std::fmt;

use serde::{Deserialize, Serialize};

/// Ids arrive as JSON strings or numbers depending on the endpoint.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Text(String),
    Number(i64),
}

impl RawId {
    fn into_string(self) -> String {
        match self {
            RawId::Text(s) => s,
            RawId::Number(n) => n.to_string(),
        }
    }
}

macro_rules! opaque_id {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                RawId::deserialize(deserializer).map(|raw| Self(raw.into_string()))
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_string())
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

opaque_id!(TopicId);
opaque_id!(SubsectionId);
opaque_id!(QuestionId);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    #[serde(alias = "Easy", alias = "EASY")]
    Easy,
    #[serde(alias = "Medium", alias = "MEDIUM")]
    Medium,
    #[serde(alias = "Hard", alias = "HARD")]
    Hard,
}

/// All study content for one (course, subject, exam board) combination.
///
/// Immutable once fetched. A refetch replaces the whole tree.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ContentTree {
    pub topics: Vec<Topic>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Topic {
    #[serde(alias = "_id")]
    pub id: TopicId,

    #[serde(alias = "title")]
    pub name: String,

    #[serde(default)]
    pub subsections: Vec<Subsection>,

    /// denormalized question count, filled in from the subsections when the backend omits it
    #[serde(default)]
    pub total_questions: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subsection {
    #[serde(alias = "_id")]
    pub id: SubsectionId,

    #[serde(alias = "title")]
    pub name: String,

    #[serde(default)]
    pub questions: Vec<Question>,

    /// downloadable notes or paper, if any
    #[serde(default, alias = "resourceUrl", alias = "pdfUrl")]
    pub resource: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    #[serde(alias = "_id")]
    pub id: QuestionId,

    #[serde(alias = "question")]
    pub text: String,

    #[serde(default)]
    pub options: Vec<String>,

    #[serde(alias = "correctAnswer", alias = "correctOptionIndex")]
    pub correct_option: usize,

    pub difficulty: Difficulty,

    #[serde(default)]
    pub marks: u32,

    #[serde(default)]
    pub explanation: String,
}

impl ContentTree {
    pub fn new(topics: Vec<Topic>) -> Self {
        Self { topics }
    }

    pub fn is_empty(&self) -> bool {
        self.topics.is_empty()
    }

    pub fn first_topic(&self) -> Option<&Topic> {
        self.topics.first()
    }

    pub fn topic(&self, id: &TopicId) -> Option<&Topic> {
        self.topics.iter().find(|t| &t.id == id)
    }

    pub fn subsection(&self, id: &SubsectionId) -> Option<&Subsection> {
        self.topics
            .iter()
            .flat_map(|t| t.subsections.iter())
            .find(|s| &s.id == id)
    }

    /// topic that owns the given subsection
    pub fn parent_topic(&self, id: &SubsectionId) -> Option<&Topic> {
        self.topics.iter().find(|t| t.subsection(id).is_some())
    }

    pub fn question(&self, id: &QuestionId) -> Option<&Question> {
        self.topics
            .iter()
            .flat_map(|t| t.subsections.iter())
            .flat_map(|s| s.questions.iter())
            .find(|q| &q.id == id)
    }

    pub fn question_count(&self) -> usize {
        self.topics.iter().map(Topic::question_count).sum()
    }
}

impl Topic {
    pub fn first_subsection(&self) -> Option<&Subsection> {
        self.subsections.first()
    }

    pub fn subsection(&self, id: &SubsectionId) -> Option<&Subsection> {
        self.subsections.iter().find(|s| &s.id == id)
    }

    /// The subsection immediately after `id` in this topic, `None` if `id` is last or unknown.
    pub fn subsection_after(&self, id: &SubsectionId) -> Option<&Subsection> {
        let position = self.subsections.iter().position(|s| &s.id == id)?;
        self.subsections.get(position + 1)
    }

    pub fn question_count(&self) -> usize {
        self.subsections.iter().map(|s| s.questions.len()).sum()
    }
}

impl Subsection {
    pub fn question_at(&self, index: usize) -> Option<&Question> {
        self.questions.get(index)
    }

    pub fn contains(&self, id: &QuestionId) -> bool {
        self.questions.iter().any(|q| &q.id == id)
    }
}

impl Question {
    pub fn is_correct(&self, selected: usize) -> bool {
        selected == self.correct_option
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn accepts_numeric_and_underscore_ids() {
        let topic: Topic = serde_json::from_value(json!({
            "_id": 42,
            "name": "Algebra",
            "subsections": [{
                "id": "alg-1",
                "title": "Linear equations",
                "questions": [{
                    "_id": 7,
                    "question": "2x = 4, x = ?",
                    "options": ["1", "2"],
                    "correctOption": 1,
                    "difficulty": "Easy",
                    "marks": 1,
                    "explanation": "divide by two"
                }]
            }]
        }))
        .unwrap();

        assert_eq!(topic.id.as_str(), "42");
        assert_eq!(topic.subsections[0].name, "Linear equations");
        let q = &topic.subsections[0].questions[0];
        assert_eq!(q.id, QuestionId::new("7"));
        assert_eq!(q.difficulty, Difficulty::Easy);
        assert!(q.is_correct(1));
        assert!(!q.is_correct(0));
    }

    #[test]
    fn subsection_after_stops_at_the_end() {
        let topic: Topic = serde_json::from_value(json!({
            "id": "t1",
            "name": "T1",
            "subsections": [
                { "id": "s1", "name": "S1" },
                { "id": "s2", "name": "S2" }
            ]
        }))
        .unwrap();

        let after = topic.subsection_after(&SubsectionId::new("s1")).unwrap();
        assert_eq!(after.id.as_str(), "s2");
        assert!(topic.subsection_after(&SubsectionId::new("s2")).is_none());
        assert!(topic.subsection_after(&SubsectionId::new("nope")).is_none());
    }
}
