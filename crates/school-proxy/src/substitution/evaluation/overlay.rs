use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::super::domain::{ProxyAssignment, TeacherId};

/// Cover chosen earlier in the current run that the store has not seen yet.
///
/// The evaluator treats every row here as if it were a stored proxy row, so later periods of
/// the same run observe the load and the slot occupancy of earlier picks.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TentativeAssignments {
    rows: Vec<ProxyAssignment>,
}

impl TentativeAssignments {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, proxy: ProxyAssignment) {
        self.rows.push(proxy);
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ProxyAssignment> {
        self.rows.iter()
    }

    pub(crate) fn for_teacher(
        &self,
        teacher: &TeacherId,
        date: NaiveDate,
    ) -> Vec<&ProxyAssignment> {
        self.rows
            .iter()
            .filter(|proxy| &proxy.assigned_teacher_id == teacher && proxy.date == date)
            .collect()
    }
}
