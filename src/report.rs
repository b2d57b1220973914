//! Dashboard analytics for one event.
//!
//! [`build_report`] is a pure function of its inputs. Responses are ordered by
//! `(submitted_at, id)` before any order-sensitive computation, so the caller's
//! ordering never changes the result. Stored values that fail today's
//! validation (for example a guest count below 1) are clamped, never rejected.

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use std::collections::{BTreeMap, HashMap, HashSet};

use crate::models::event::Event;
use crate::models::invite::{Invite, InviteStatus};
use crate::models::report::{
    Capacity, DietaryAnalysis, GuestAnalysis, Insights, Milestone, Report, Summary, Trends,
};
use crate::models::response::{Attendance, Response};
use crate::normalize::clamp_guest_count;

const MILESTONES: [u8; 4] = [25, 50, 75, 100];
const SECONDS_PER_DAY: f64 = 86_400.0;

pub fn build_report(
    event: &Event,
    invites: &[Invite],
    responses: &[Response],
    now: DateTime<Utc>,
) -> Report {
    let mut ordered: Vec<&Response> = responses.iter().collect();
    ordered.sort_by(|a, b| {
        a.submitted_at
            .cmp(&b.submitted_at)
            .then_with(|| a.id.cmp(&b.id))
    });

    let summary = summarize(invites, &ordered);
    let milestones = milestones(event, summary.total_invites, &ordered);
    let capacity = event.max_guests.map(|max_guests| Capacity {
        max_guests,
        remaining: max_guests.saturating_sub(summary.total_guests).max(0),
        over_capacity: summary.total_guests > max_guests,
    });

    Report {
        event_id: event.id.clone(),
        generated_at: now,
        trends: trends(event, &ordered),
        milestones,
        dietary: dietary(&ordered),
        guests: guests(&ordered),
        insights: insights(event, &summary, invites, &ordered, now),
        capacity,
        summary,
    }
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

fn percent(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    round1(part as f64 / whole as f64 * 100.0)
}

fn summarize(invites: &[Invite], responses: &[&Response]) -> Summary {
    let responded: HashSet<&str> = responses
        .iter()
        .filter_map(|r| r.invite_id.as_deref())
        .collect();
    let total_invites = invites
        .iter()
        .filter(|i| i.status != InviteStatus::Deactivated || responded.contains(i.id.as_str()))
        .count() as u64;

    let count = |a: Attendance| responses.iter().filter(|r| r.attendance == a).count() as u64;
    let total_guests = responses
        .iter()
        .filter(|r| r.attendance == Attendance::Yes)
        .map(|r| clamp_guest_count(r.guest_count))
        .fold(0i64, i64::saturating_add);
    let total_responses = responses.len() as u64;

    Summary {
        total_invites,
        total_responses,
        attending: count(Attendance::Yes),
        not_attending: count(Attendance::No),
        maybe: count(Attendance::Maybe),
        total_guests,
        // Invite-less responses can outnumber invites.
        response_rate: percent(total_responses, total_invites).min(100.0),
    }
}

fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_monday() as i64)
}

fn trends(event: &Event, responses: &[&Response]) -> Trends {
    let mut out = Trends::default();
    for r in responses {
        let day = event.local_date(r.submitted_at);
        let attending = u64::from(r.attendance == Attendance::Yes);
        for bucket in [
            out.daily.entry(day).or_default(),
            out.weekly.entry(week_start(day)).or_default(),
        ] {
            bucket.responses += 1;
            bucket.attending += attending;
        }
    }
    out
}

fn days_between(later: DateTime<Utc>, earlier: DateTime<Utc>) -> i64 {
    (later - earlier).num_seconds().div_euclid(86_400)
}

fn milestones(event: &Event, total_invites: u64, responses: &[&Response]) -> Vec<Milestone> {
    if total_invites == 0 {
        return Vec::new();
    }
    let starts_at = event.starts_at();
    MILESTONES
        .iter()
        .filter_map(|&pct| {
            let target = (total_invites * pct as u64).div_ceil(100).max(1);
            let reached = responses.get(target as usize - 1)?;
            Some(Milestone {
                percent: pct,
                responses: target,
                reached_at: reached.submitted_at,
                days_until_event: days_between(starts_at, reached.submitted_at),
            })
        })
        .collect()
}

fn dietary(responses: &[&Response]) -> DietaryAnalysis {
    let mut out = DietaryAnalysis::default();
    for r in responses
        .iter()
        .filter(|r| matches!(r.attendance, Attendance::Yes | Attendance::Maybe))
    {
        let mut tags: Vec<&str> = r
            .dietary_options
            .iter()
            .map(|t| t.trim())
            .filter(|t| !t.is_empty())
            .collect();
        tags.sort_unstable();
        tags.dedup();

        if tags.is_empty() {
            out.total_without_dietary += 1;
            continue;
        }
        out.total_with_dietary += 1;

        let weight = clamp_guest_count(r.guest_count);
        for tag in &tags {
            let count = out.preferences.entry(tag.to_string()).or_default();
            *count = count.saturating_add(weight);
        }
        *out.common_combinations.entry(tags.join(", ")).or_default() += 1;
    }
    out
}

fn guests(responses: &[&Response]) -> GuestAnalysis {
    let mut distribution: BTreeMap<i64, u64> = BTreeMap::new();
    for r in responses {
        *distribution.entry(clamp_guest_count(r.guest_count)).or_default() += 1;
    }
    GuestAnalysis {
        guest_count_distribution: distribution,
    }
}

/// Average days from invite creation to response. Responses naming a known
/// invite use that invite's creation time; the rest use the event's first invite.
fn average_response_time(invites: &[Invite], responses: &[&Response]) -> f64 {
    let created: HashMap<&str, DateTime<Utc>> = invites
        .iter()
        .map(|i| (i.id.as_str(), i.created_at))
        .collect();
    let Some(first_invite) = invites.iter().map(|i| i.created_at).min() else {
        return 0.0;
    };

    let delays: Vec<f64> = responses
        .iter()
        .map(|r| {
            let sent = r
                .invite_id
                .as_deref()
                .and_then(|id| created.get(id).copied())
                .unwrap_or(first_invite);
            ((r.submitted_at - sent).num_seconds() as f64 / SECONDS_PER_DAY).max(0.0)
        })
        .collect();

    if delays.is_empty() {
        return 0.0;
    }
    round1(delays.iter().sum::<f64>() / delays.len() as f64)
}

fn insights(
    event: &Event,
    summary: &Summary,
    invites: &[Invite],
    responses: &[&Response],
    now: DateTime<Utc>,
) -> Insights {
    let average_guests_per_response = if summary.attending == 0 {
        0.0
    } else {
        round1(summary.total_guests as f64 / summary.attending as f64)
    };

    Insights {
        response_rate: summary.response_rate,
        attendance_rate: percent(summary.attending, summary.total_responses),
        average_guests_per_response,
        average_response_time_days: average_response_time(invites, responses),
        days_until_event: days_between(event.starts_at(), now),
    }
}
