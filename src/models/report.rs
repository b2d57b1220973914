use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

/// Dashboard report for one event. Every map is ordered so that identical
/// inputs serialize to identical bytes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub event_id: String,
    pub generated_at: DateTime<Utc>,
    pub summary: Summary,
    pub trends: Trends,
    pub milestones: Vec<Milestone>,
    pub dietary: DietaryAnalysis,
    pub guests: GuestAnalysis,
    pub insights: Insights,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capacity: Option<Capacity>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub total_invites: u64,
    pub total_responses: u64,
    pub attending: u64,
    pub not_attending: u64,
    pub maybe: u64,
    pub total_guests: i64,
    pub response_rate: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TrendBucket {
    pub responses: u64,
    pub attending: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Trends {
    /// Keyed by event-local calendar day. Only days with responses appear.
    pub daily: BTreeMap<NaiveDate, TrendBucket>,
    /// Keyed by the Monday that starts the event-local ISO week.
    pub weekly: BTreeMap<NaiveDate, TrendBucket>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Milestone {
    pub percent: u8,
    pub responses: u64,
    pub reached_at: DateTime<Utc>,
    pub days_until_event: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DietaryAnalysis {
    /// Guest-weighted tag counts over `yes` and `maybe` responses.
    pub preferences: BTreeMap<String, i64>,
    pub total_with_dietary: u64,
    pub total_without_dietary: u64,
    pub common_combinations: BTreeMap<String, u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GuestAnalysis {
    pub guest_count_distribution: BTreeMap<i64, u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Insights {
    pub response_rate: f64,
    pub attendance_rate: f64,
    pub average_guests_per_response: f64,
    pub average_response_time_days: f64,
    pub days_until_event: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Capacity {
    pub max_guests: i64,
    pub remaining: i64,
    pub over_capacity: bool,
}
