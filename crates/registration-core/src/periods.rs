//! Deriving the three pricing windows and locating "now" among them

use itertools::Itertools;
use serde::{Serialize, Serializer};
use time::{
    format_description::well_known::Rfc3339, macros::format_description, macros::time, Date,
    Duration, OffsetDateTime, UtcOffset,
};

use crate::{ConfigurationError, PeriodId, PricingDates, PricingPeriod};

/// Window size around a period change inside which the registration UI warns
pub const DEFAULT_TRANSITION_THRESHOLD: Duration = Duration::hours(24);

#[derive(Clone, Copy)]
enum Edge {
    Start,
    End,
}

/// Turns the stored boundary dates into the early bird, next round and spot
/// registration windows, in that order.
///
/// Calendar dates open at 00:00 UTC and close at the last instant of the day.
/// Without an explicit `earlyBirdStart` the early bird window opens on January 1
/// of the year `earlyBirdEnd` falls in.
pub fn derive_periods(dates: &PricingDates) -> Result<[PricingPeriod; 3], ConfigurationError> {
    let early_bird_end = parse_boundary("earlyBirdEnd", dates.early_bird_end.as_deref(), Edge::End)?;
    let next_round_start = parse_boundary(
        "nextRoundStart",
        dates.next_round_start.as_deref(),
        Edge::Start,
    )?;
    let next_round_end = parse_boundary("nextRoundEnd", dates.next_round_end.as_deref(), Edge::End)?;
    let spot_registration_start = parse_boundary(
        "spotRegistrationStart",
        dates.spot_registration_start.as_deref(),
        Edge::Start,
    )?;
    let registration_close = parse_boundary(
        "registrationCloseDate",
        dates.registration_close_date.as_deref(),
        Edge::End,
    )?;

    let early_bird_start = match non_blank(dates.early_bird_start.as_deref()) {
        Some(value) => parse_boundary("earlyBirdStart", Some(value), Edge::Start)?,
        None => start_of_year(early_bird_end)?,
    };

    let periods = [
        PricingPeriod::new(PeriodId::EarlyBird, early_bird_start, early_bird_end),
        PricingPeriod::new(PeriodId::NextRound, next_round_start, next_round_end),
        PricingPeriod::new(
            PeriodId::SpotRegistration,
            spot_registration_start,
            registration_close,
        ),
    ];

    if let Some(inverted) = periods.iter().find(|p| p.start_date > p.end_date) {
        return Err(ConfigurationError::InvertedWindow(inverted.period_id));
    }

    Ok(periods)
}

/// First period in display order whose window contains `now`.
///
/// Overlapping windows resolve to the earlier ordered period.
pub fn resolve_active_period(
    periods: &[PricingPeriod],
    now: OffsetDateTime,
) -> Option<&PricingPeriod> {
    periods
        .iter()
        .sorted_by_key(|period| period.display_order)
        .find(|period| period.contains(now))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodDetection {
    pub active_period: Option<PricingPeriod>,
    pub next_period: Option<PricingPeriod>,
    pub previous_period: Option<PricingPeriod>,
    #[serde(rename = "timeUntilNextPeriodMs", serialize_with = "as_millis")]
    pub time_until_next_period: Option<Duration>,
    #[serde(rename = "timeUntilCurrentPeriodEndsMs", serialize_with = "as_millis")]
    pub time_until_current_period_ends: Option<Duration>,
    pub is_in_transition_period: bool,
}

pub fn detect_period(
    periods: &[PricingPeriod],
    now: OffsetDateTime,
    transition_threshold: Duration,
) -> PeriodDetection {
    let active_period = resolve_active_period(periods, now).cloned();

    let next_period = periods
        .iter()
        .filter(|period| period.is_active && period.start_date > now)
        .min_by_key(|period| period.start_date)
        .cloned();

    let previous_period = periods
        .iter()
        .filter(|period| period.is_active && period.end_date < now)
        .max_by_key(|period| period.end_date)
        .cloned();

    let time_until_next_period = next_period.as_ref().map(|period| period.start_date - now);
    let time_until_current_period_ends = active_period.as_ref().map(|period| period.end_date - now);

    let is_in_transition_period = [time_until_current_period_ends, time_until_next_period]
        .into_iter()
        .flatten()
        .any(|remaining| remaining <= transition_threshold);

    PeriodDetection {
        active_period,
        next_period,
        previous_period,
        time_until_next_period,
        time_until_current_period_ends,
        is_in_transition_period,
    }
}

impl PeriodDetection {
    pub fn status_message(&self) -> String {
        if let Some(active) = &self.active_period {
            return match self.time_until_current_period_ends {
                Some(remaining) if self.is_in_transition_period => {
                    format!("{} ends in {}", active.title, format_duration(remaining))
                }
                _ => format!("{} is currently active", active.title),
            };
        }

        if let (Some(next), Some(until)) = (&self.next_period, self.time_until_next_period) {
            return format!("{} starts in {}", next.title, format_duration(until));
        }

        match &self.previous_period {
            Some(previous) => format!(
                "Registration period has ended (last period: {})",
                previous.title
            ),
            None => String::from("No pricing periods configured"),
        }
    }
}

/// Renders the two most significant units, e.g. "3 days, 4 hours"
pub fn format_duration(duration: Duration) -> String {
    if duration <= Duration::ZERO {
        return String::from("Expired");
    }

    let seconds = duration.whole_seconds();
    let minutes = seconds / 60;
    let hours = minutes / 60;
    let days = hours / 24;

    if days > 0 {
        format!("{}, {}", units(days, "day"), units(hours % 24, "hour"))
    } else if hours > 0 {
        format!("{}, {}", units(hours, "hour"), units(minutes % 60, "minute"))
    } else if minutes > 0 {
        format!("{}, {}", units(minutes, "minute"), units(seconds % 60, "second"))
    } else {
        units(seconds, "second")
    }
}

fn units(count: i64, unit: &str) -> String {
    if count == 1 {
        format!("{} {}", count, unit)
    } else {
        format!("{} {}s", count, unit)
    }
}

fn as_millis<S: Serializer>(duration: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error> {
    match duration {
        Some(duration) => {
            let millis = i64::try_from(duration.whole_milliseconds()).unwrap_or(
                if duration.is_negative() {
                    i64::MIN
                } else {
                    i64::MAX
                },
            );
            serializer.serialize_some(&millis)
        }
        None => serializer.serialize_none(),
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}

fn parse_boundary(
    field: &'static str,
    value: Option<&str>,
    edge: Edge,
) -> Result<OffsetDateTime, ConfigurationError> {
    let value = non_blank(value).ok_or(ConfigurationError::MissingField(field))?;

    if let Ok(timestamp) = OffsetDateTime::parse(value, &Rfc3339) {
        return Ok(timestamp.to_offset(UtcOffset::UTC));
    }

    let date = Date::parse(value, format_description!("[year]-[month]-[day]")).map_err(|_| {
        ConfigurationError::InvalidDate {
            field,
            value: value.to_string(),
        }
    })?;

    Ok(match edge {
        Edge::Start => date.midnight().assume_utc(),
        Edge::End => date.with_time(time!(23:59:59.999_999_999)).assume_utc(),
    })
}

fn start_of_year(timestamp: OffsetDateTime) -> Result<OffsetDateTime, ConfigurationError> {
    Date::from_ordinal_date(timestamp.year(), 1)
        .map(|date| date.midnight().assume_utc())
        .map_err(|_| ConfigurationError::InvalidDate {
            field: "earlyBirdEnd",
            value: timestamp.to_string(),
        })
}
