use std::fmt;

use super::super::domain::{Period, PeriodId, ProxyAssignment, SubjectId, TeacherSnapshot};
use super::config::ProxyPolicy;
use super::{Candidate, ScoreComponent, ScoreFactor};

/// Why a teacher was dropped before scoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Exclusion {
    Absent,
    TeachingInPeriod,
    CoveringInPeriod,
    Overloaded { total_load: u32 },
}

impl fmt::Display for Exclusion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Exclusion::Absent => f.write_str("absent on date"),
            Exclusion::TeachingInPeriod => f.write_str("teaching in period"),
            Exclusion::CoveringInPeriod => f.write_str("already covering in period"),
            Exclusion::Overloaded { total_load } => write!(f, "overloaded ({total_load} periods)"),
        }
    }
}

/// The class periods immediately before and after the target slot.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct Neighbours<'a> {
    pub previous: Option<&'a PeriodId>,
    pub next: Option<&'a PeriodId>,
}

/// `class_periods` must already be ordered by `period_no`.
pub(crate) fn neighbours<'a>(class_periods: &'a [Period], target: &PeriodId) -> Neighbours<'a> {
    let Some(index) = class_periods.iter().position(|period| &period.id == target) else {
        return Neighbours::default();
    };

    Neighbours {
        previous: index
            .checked_sub(1)
            .and_then(|prev| class_periods.get(prev))
            .map(|period| &period.id),
        next: class_periods.get(index + 1).map(|period| &period.id),
    }
}

/// Everything needed to screen and score one teacher for one slot.
pub(crate) struct SlotContext<'a> {
    pub period: &'a PeriodId,
    pub subject: &'a SubjectId,
    pub neighbours: Neighbours<'a>,
    pub policy: &'a ProxyPolicy,
}

/// Apply the exclusion filters in order and score the survivors.
///
/// `tentative` holds cover chosen earlier in the same run for this teacher and date; it is
/// counted exactly like the stored proxy rows.
pub(crate) fn assess(
    snapshot: &TeacherSnapshot,
    tentative: &[&ProxyAssignment],
    slot: &SlotContext<'_>,
) -> Result<Candidate, Exclusion> {
    if snapshot.absence.is_some() {
        return Err(Exclusion::Absent);
    }

    if snapshot.teaches_in(slot.period) {
        return Err(Exclusion::TeachingInPeriod);
    }

    let covering = snapshot
        .proxies
        .iter()
        .chain(tentative.iter().copied())
        .any(|proxy| &proxy.period_id == slot.period);
    if covering {
        return Err(Exclusion::CoveringInPeriod);
    }

    let current_periods = snapshot.timetable.len() as u32;
    let proxy_count = (snapshot.proxies.len() + tentative.len()) as u32;
    let total_load = current_periods + proxy_count;
    if total_load >= slot.policy.max_load {
        return Err(Exclusion::Overloaded { total_load });
    }

    let subject_match = snapshot.teacher.teaches(slot.subject);
    let adjacent_free = is_adjacent_free(snapshot, &slot.neighbours);

    let mut components = Vec::with_capacity(3);
    components.push(ScoreComponent {
        factor: ScoreFactor::Load,
        score: total_load as i32,
        notes: format!("{current_periods} timetabled + {proxy_count} proxy period(s)"),
    });

    let match_score = if subject_match {
        -slot.policy.subject_match_bonus
    } else {
        0
    };
    components.push(ScoreComponent {
        factor: ScoreFactor::SubjectMatch,
        score: match_score,
        notes: if subject_match {
            format!("qualified in {}", slot.subject)
        } else {
            format!("not qualified in {}", slot.subject)
        },
    });

    let adjacency_score = if adjacent_free {
        -slot.policy.adjacent_free_bonus
    } else {
        0
    };
    components.push(ScoreComponent {
        factor: ScoreFactor::AdjacentFree,
        score: adjacency_score,
        notes: if adjacent_free {
            "free in a neighbouring class period".to_string()
        } else {
            "no free neighbouring class period".to_string()
        },
    });

    let score = total_load as i32 + match_score + adjacency_score;

    Ok(Candidate {
        id: snapshot.teacher.id.clone(),
        name: snapshot.teacher.name.clone(),
        current_periods,
        proxy_count,
        total_load,
        subject_match,
        adjacent_free,
        score,
        components,
    })
}

/// Free before the slot, else free after it. A missing neighbour never counts as free.
fn is_adjacent_free(snapshot: &TeacherSnapshot, neighbours: &Neighbours<'_>) -> bool {
    if let Some(previous) = neighbours.previous {
        if !snapshot.teaches_in(previous) {
            return true;
        }
    }

    if let Some(next) = neighbours.next {
        if !snapshot.teaches_in(next) {
            return true;
        }
    }

    false
}
