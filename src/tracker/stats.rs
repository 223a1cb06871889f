use serde::Serialize;

/// Running counters for the current study session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SessionStats {
    pub correct: u32,
    pub incorrect: u32,
    pub streak: u32,
    pub max_streak: u32,
}

impl SessionStats {
    pub fn record(&mut self, correct: bool) {
        if correct {
            self.correct += 1;
            self.streak += 1;
            self.max_streak = self.max_streak.max(self.streak);
        } else {
            self.incorrect += 1;
            self.streak = 0;
        }
    }

    pub fn total(&self) -> u32 {
        self.correct + self.incorrect
    }

    /// Percentage of correct answers rounded to the nearest integer, 0 before any answer.
    pub fn accuracy_percent(&self) -> u8 {
        let total = u64::from(self.total());
        if total == 0 {
            return 0;
        }
        ((200 * u64::from(self.correct) + total) / (2 * total)) as u8
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
