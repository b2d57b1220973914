use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime, Offset, TimeZone, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: String,
    pub name: String,
    pub date: NaiveDate,
    /// Local start time as `HH:MM`.
    pub time: Option<String>,
    pub location: Option<String>,
    pub max_guests: Option<i64>,
    pub rsvp_deadline: Option<NaiveDate>,
    /// Offset of the event's local calendar from UTC. `None` means UTC.
    pub utc_offset_minutes: Option<i32>,
    pub created_at: DateTime<Utc>,
}

impl Event {
    pub fn offset(&self) -> FixedOffset {
        self.utc_offset_minutes
            .and_then(|m| FixedOffset::east_opt(m * 60))
            .unwrap_or_else(|| Utc.fix())
    }

    /// Event start as an instant. A missing or unparseable time means local midnight.
    pub fn starts_at(&self) -> DateTime<Utc> {
        let time = self
            .time
            .as_deref()
            .and_then(|t| NaiveTime::parse_from_str(t, "%H:%M").ok())
            .unwrap_or(NaiveTime::MIN);
        let local = self.date.and_time(time);
        self.offset()
            .from_local_datetime(&local)
            .single()
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(|| local.and_utc())
    }

    /// Calendar day of `instant` in the event's local context.
    pub fn local_date(&self, instant: DateTime<Utc>) -> NaiveDate {
        instant.with_timezone(&self.offset()).date_naive()
    }
}

/// Persisted form of an event. The host token itself is never stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventRecord {
    #[serde(flatten)]
    pub event: Event,
    pub host_token_hash: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct CreateEvent {
    pub name: Option<String>,
    pub date: Option<String>,
    pub time: Option<String>,
    pub location: Option<String>,
    pub max_guests: Option<i64>,
    pub rsvp_deadline: Option<String>,
    pub utc_offset_minutes: Option<i32>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateEvent {
    pub name: Option<String>,
    pub date: Option<String>,
    pub time: Option<String>,
    pub location: Option<String>,
    pub max_guests: Option<i64>,
    pub rsvp_deadline: Option<String>,
    pub utc_offset_minutes: Option<i32>,
}

#[derive(Debug, Serialize)]
pub struct CreatedEvent {
    pub event: Event,
    pub host_token: String,
}
