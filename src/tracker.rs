mod completion;
mod navigation;
mod progress;
mod session;
mod stats;

pub use completion::{is_subsection_complete, CompletionTracker, SubsectionCompleted};
pub use navigation::{NavigationError, Navigator, Viewer};
pub use progress::{AnswerRecord, ProgressStore, QuestionState, Recorded};
pub use session::{AnswerError, AnswerFeedback, Progress, SelectionError, StudySession};
pub use stats::SessionStats;
