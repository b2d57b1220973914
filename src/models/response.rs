use chrono::{DateTime, Utc};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Attendance {
    Yes,
    No,
    Maybe,
}

/// How a response relates to the invite it named.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InviteLink {
    /// No invite id was supplied.
    None,
    Matched,
    /// The invite id is unknown or belongs to another event.
    Unmatched,
    /// The invite exists but was deactivated after issuance.
    Deactivated,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    pub id: String,
    pub event_id: String,
    pub invite_id: Option<String>,
    pub guest_name: String,
    pub guest_email: String,
    pub attendance: Attendance,
    pub guest_count: i64,
    pub dietary_options: Vec<String>,
    pub message: Option<String>,
    pub submitted_at: DateTime<Utc>,
    pub invite_status: InviteLink,
    #[serde(default)]
    pub late: bool,
    #[serde(default)]
    pub updated: bool,
}

/// Guest-supplied RSVP payload. Loosely typed on purpose; see `normalize`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SubmitRsvp {
    pub invite_id: Option<String>,
    pub guest_name: Option<String>,
    pub guest_email: Option<String>,
    pub attendance: Option<String>,
    pub guest_count: Option<serde_json::Value>,
    #[serde(default)]
    pub dietary_options: Vec<String>,
    pub message: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AttendanceFilter {
    #[default]
    All,
    Yes,
    No,
    Maybe,
}

/// Case-insensitive, like attendance on submission.
impl<'de> Deserialize<'de> for AttendanceFilter {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        match raw.trim().to_ascii_lowercase().as_str() {
            "" | "all" => Ok(AttendanceFilter::All),
            "yes" => Ok(AttendanceFilter::Yes),
            "no" => Ok(AttendanceFilter::No),
            "maybe" => Ok(AttendanceFilter::Maybe),
            _ => Err(D::Error::custom(format!(
                "attendance must be one of all, yes, no, maybe (got {raw:?})"
            ))),
        }
    }
}

impl AttendanceFilter {
    pub fn matches(self, attendance: Attendance) -> bool {
        match self {
            AttendanceFilter::All => true,
            AttendanceFilter::Yes => attendance == Attendance::Yes,
            AttendanceFilter::No => attendance == Attendance::No,
            AttendanceFilter::Maybe => attendance == Attendance::Maybe,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub enum SortBy {
    #[default]
    #[serde(rename = "submittedAt", alias = "submitted_at")]
    SubmittedAt,
    #[serde(rename = "guestName", alias = "guest_name")]
    GuestName,
    #[serde(rename = "guestCount", alias = "guest_count")]
    GuestCount,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResponseFilter {
    pub search: Option<String>,
    #[serde(default)]
    pub attendance: AttendanceFilter,
    #[serde(default)]
    pub sort_by: SortBy,
    #[serde(default)]
    pub order: SortOrder,
}
