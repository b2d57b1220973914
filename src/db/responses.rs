use chrono::Utc;

use super::{encode, events, responses_key, Store};
use crate::error::AppError;
use crate::ids::{self, IdKind};
use crate::models::invite::InviteStatus;
use crate::models::response::{
    InviteLink, Response, ResponseFilter, SortBy, SortOrder, SubmitRsvp,
};
use crate::normalize::{
    coerce_guest_count, normalize_dietary, optional_text, parse_attendance, required_text,
};

/// Validate and store an RSVP.
///
/// A response that names an invite already answered for this event replaces the
/// earlier response in place, keeping its id. Unknown, foreign and deactivated
/// invites are accepted and flagged through `invite_status`.
pub async fn submit_response(
    store: &Store,
    event_id: &str,
    input: &SubmitRsvp,
) -> Result<Response, AppError> {
    let event_id = required_text("event_id", Some(event_id))?;
    let guest_name = required_text("guest_name", input.guest_name.as_deref())?;
    let guest_email = required_text("guest_email", input.guest_email.as_deref())?;
    let attendance = parse_attendance(input.attendance.as_deref())?;
    let guest_count = coerce_guest_count(input.guest_count.as_ref());
    let dietary_options = normalize_dietary(&input.dietary_options);
    let message = optional_text(input.message.as_deref());
    let invite_id = optional_text(input.invite_id.as_deref());

    let event = events::get_event(store, &event_id).await?;

    let ledger = store.ledger(&event_id).await?;
    let mut guard = ledger.lock().await;

    // The invite lookup happens under the same lock as deactivation.
    let invite_status = match invite_id {
        None => InviteLink::None,
        Some(ref id) => match guard.invites.iter().find(|i| &i.id == id) {
            Some(invite) if invite.status == InviteStatus::Deactivated => InviteLink::Deactivated,
            Some(_) => InviteLink::Matched,
            None => InviteLink::Unmatched,
        },
    };

    let submitted_at = Utc::now();
    let late = event
        .rsvp_deadline
        .is_some_and(|deadline| event.local_date(submitted_at) > deadline);

    // Only a real invite of this event identifies a guest; unknown ids always insert.
    let replaces_earlier = matches!(invite_status, InviteLink::Matched | InviteLink::Deactivated);
    let previous = invite_id.as_ref().filter(|_| replaces_earlier).and_then(|id| {
        guard
            .responses
            .iter()
            .position(|r| r.invite_id.as_ref() == Some(id))
    });

    let response = Response {
        id: previous
            .map(|pos| guard.responses[pos].id.clone())
            .unwrap_or_else(|| ids::new_id(IdKind::Response)),
        event_id: event_id.clone(),
        invite_id,
        guest_name,
        guest_email,
        attendance,
        guest_count,
        dietary_options,
        message,
        submitted_at,
        invite_status,
        late,
        updated: previous.is_some(),
    };

    let mut next = guard.responses.clone();
    match previous {
        Some(pos) => next[pos] = response.clone(),
        None => next.push(response.clone()),
    }
    store
        .save_entries(vec![(responses_key(&event_id), encode(&next)?)])
        .await?;
    guard.responses = next;

    if invite_status == InviteLink::Unmatched {
        tracing::warn!(
            "response {} for event {event_id} names an unknown invite",
            response.id
        );
    }
    tracing::info!(
        "{} response {} for event {event_id}",
        if response.updated { "updated" } else { "recorded" },
        response.id
    );
    Ok(response)
}

/// Responses of an event ordered by submission time, ties broken by id.
pub async fn list_event_responses(
    store: &Store,
    event_id: &str,
) -> Result<Vec<Response>, AppError> {
    events::get_event(store, event_id).await?;
    let mut responses = store.snapshot(event_id).await?.responses;
    responses.sort_by(|a, b| {
        a.submitted_at
            .cmp(&b.submitted_at)
            .then_with(|| a.id.cmp(&b.id))
    });
    Ok(responses)
}

pub async fn filter_responses(
    store: &Store,
    event_id: &str,
    filter: &ResponseFilter,
) -> Result<Vec<Response>, AppError> {
    let responses = list_event_responses(store, event_id).await?;
    Ok(apply_filter(responses, filter))
}

/// Search, attendance filter and sort. Every ordering falls back to `id`.
pub fn apply_filter(responses: Vec<Response>, filter: &ResponseFilter) -> Vec<Response> {
    let needle = filter
        .search
        .as_deref()
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty());

    let mut out: Vec<Response> = responses
        .into_iter()
        .filter(|r| filter.attendance.matches(r.attendance))
        .filter(|r| match needle {
            Some(ref n) => {
                r.guest_name.to_lowercase().contains(n) || r.guest_email.to_lowercase().contains(n)
            }
            None => true,
        })
        .collect();

    out.sort_by(|a, b| {
        let primary = match filter.sort_by {
            SortBy::SubmittedAt => a.submitted_at.cmp(&b.submitted_at),
            SortBy::GuestName => a
                .guest_name
                .to_lowercase()
                .cmp(&b.guest_name.to_lowercase()),
            SortBy::GuestCount => a.guest_count.cmp(&b.guest_count),
        };
        let ordered = primary.then_with(|| a.id.cmp(&b.id));
        match filter.order {
            SortOrder::Asc => ordered,
            SortOrder::Desc => ordered.reverse(),
        }
    });
    out
}
