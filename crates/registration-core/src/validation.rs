//! Advisory checks on derived pricing windows

use itertools::Itertools;
use serde::Serialize;
use std::fmt;
use time::Duration;

use crate::{format_duration, PeriodId, PricingPeriod};

/// Gaps up to this size between consecutive windows are not reported
pub const MAX_GAP: Duration = Duration::hours(24);

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum PeriodIssue {
    /// Both windows contain the same instants, the earlier ordered one wins
    Overlap { first: PeriodId, second: PeriodId },
    EmptyWindow { period: PeriodId },
    Gap {
        after: PeriodId,
        before: PeriodId,
        seconds: i64,
    },
}

impl PeriodIssue {
    pub fn is_error(&self) -> bool {
        !matches!(self, PeriodIssue::Gap { .. })
    }
}

impl fmt::Display for PeriodIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Overlap { first, second } => write!(
                f,
                "period \"{}\" overlaps with \"{}\"",
                first.title(),
                second.title()
            ),
            Self::EmptyWindow { period } => write!(
                f,
                "period \"{}\" has invalid date range (start date must be before end date)",
                period.title()
            ),
            Self::Gap {
                after,
                before,
                seconds,
            } => write!(
                f,
                "gap of {} between \"{}\" and \"{}\"",
                format_duration(Duration::seconds(*seconds)),
                after.title(),
                before.title()
            ),
        }
    }
}

/// Reports overlapping, empty and widely separated windows.
///
/// None of these stop pricing from being resolved.
pub fn validate_periods(periods: &[PricingPeriod]) -> Vec<PeriodIssue> {
    let mut issues: Vec<PeriodIssue> = periods
        .iter()
        .filter(|period| period.start_date >= period.end_date)
        .map(|period| PeriodIssue::EmptyWindow {
            period: period.period_id,
        })
        .collect();

    for (first, second) in periods
        .iter()
        .sorted_by_key(|period| period.display_order)
        .tuple_combinations()
    {
        if first.start_date <= second.end_date && second.start_date <= first.end_date {
            issues.push(PeriodIssue::Overlap {
                first: first.period_id,
                second: second.period_id,
            });
        }
    }

    // Gaps are measured from the latest end seen so far, so a long window
    // covering a later one hides the space before it
    let mut covered: Option<&PricingPeriod> = None;
    for period in periods.iter().sorted_by_key(|period| period.start_date) {
        match covered {
            Some(latest) if period.start_date > latest.end_date => {
                let gap = period.start_date - latest.end_date;
                if gap > MAX_GAP {
                    issues.push(PeriodIssue::Gap {
                        after: latest.period_id,
                        before: period.period_id,
                        seconds: gap.whole_seconds(),
                    });
                }
                covered = Some(period);
            }
            Some(latest) if period.end_date <= latest.end_date => {}
            _ => covered = Some(period),
        }
    }

    issues
}
