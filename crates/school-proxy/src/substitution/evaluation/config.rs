use serde::{Deserialize, Serialize};

pub const DEFAULT_MAX_LOAD: u32 = 6;
pub const DEFAULT_SUBJECT_MATCH_BONUS: i32 = 2;
pub const DEFAULT_ADJACENT_FREE_BONUS: i32 = 1;

/// Scoring and overload policy shared by the evaluator and the day assigner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProxyPolicy {
    /// Candidates whose day load reaches this value are excluded.
    pub max_load: u32,
    /// Subtracted from the score when the candidate is qualified in the subject.
    pub subject_match_bonus: i32,
    /// Subtracted from the score when a neighbouring class period is free.
    pub adjacent_free_bonus: i32,
}

impl Default for ProxyPolicy {
    fn default() -> Self {
        Self {
            max_load: DEFAULT_MAX_LOAD,
            subject_match_bonus: DEFAULT_SUBJECT_MATCH_BONUS,
            adjacent_free_bonus: DEFAULT_ADJACENT_FREE_BONUS,
        }
    }
}
