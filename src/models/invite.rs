use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HostingMethod {
    Local,
    ExternallyHosted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InviteStatus {
    Active,
    Deactivated,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invite {
    pub id: String,
    pub event_id: String,
    pub guest_name: String,
    pub guest_email: String,
    pub personal_message: Option<String>,
    pub rsvp_url: String,
    pub hosting_method: HostingMethod,
    pub status: InviteStatus,
    pub created_at: DateTime<Utc>,
    pub deactivated_at: Option<DateTime<Utc>>,
}

/// One row of a personalized batch. Every field may be missing or blank.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GuestRow {
    pub name: Option<String>,
    pub email: Option<String>,
    pub message: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CreateInvites {
    pub count: Option<i64>,
    pub guests: Option<Vec<GuestRow>>,
    #[serde(default)]
    pub prefer_external_hosting: bool,
}
