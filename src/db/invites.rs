use chrono::Utc;

use super::{encode, events, invite_index_key, invites_key, Store};
use crate::error::AppError;
use crate::hosting::LinkResolver;
use crate::ids::{self, IdKind};
use crate::models::invite::{GuestRow, Invite, InviteStatus};
use crate::normalize::{lenient_text, optional_text};

/// Guest details for one invite about to be minted.
#[derive(Debug, Default)]
struct Draft {
    guest_name: String,
    guest_email: String,
    personal_message: Option<String>,
}

fn check_batch_size(field: &'static str, count: i64, max_batch: i64) -> Result<(), AppError> {
    if count < 1 {
        return Err(AppError::validation(
            field,
            format!("{field} must be a positive integer"),
        ));
    }
    if count > max_batch {
        return Err(AppError::CapacityExceeded(format!(
            "cannot create {count} invites at once (maximum is {max_batch})"
        )));
    }
    Ok(())
}

/// Create `count` anonymous invites for an event, in creation order.
pub async fn create_batch(
    store: &Store,
    event_id: &str,
    count: i64,
    max_batch: i64,
    resolver: &LinkResolver,
    prefer_external_hosting: bool,
) -> Result<Vec<Invite>, AppError> {
    check_batch_size("count", count, max_batch)?;
    let drafts = (0..count).map(|_| Draft::default()).collect();
    mint(store, event_id, drafts, resolver, prefer_external_hosting).await
}

/// Create one invite per non-blank guest row. Partially filled rows are kept
/// with blanks stored as empty strings; fully blank rows are skipped.
pub async fn create_personalized(
    store: &Store,
    event_id: &str,
    guests: &[GuestRow],
    max_batch: i64,
    resolver: &LinkResolver,
    prefer_external_hosting: bool,
) -> Result<Vec<Invite>, AppError> {
    let drafts: Vec<Draft> = guests
        .iter()
        .map(|row| Draft {
            guest_name: lenient_text(row.name.as_deref()),
            guest_email: lenient_text(row.email.as_deref()),
            personal_message: optional_text(row.message.as_deref()),
        })
        .filter(|d| {
            !(d.guest_name.is_empty() && d.guest_email.is_empty() && d.personal_message.is_none())
        })
        .collect();

    check_batch_size("guests", drafts.len() as i64, max_batch)?;
    mint(store, event_id, drafts, resolver, prefer_external_hosting).await
}

async fn mint(
    store: &Store,
    event_id: &str,
    drafts: Vec<Draft>,
    resolver: &LinkResolver,
    prefer_external_hosting: bool,
) -> Result<Vec<Invite>, AppError> {
    events::get_event(store, event_id).await?;

    // Links are resolved before taking the event lock; the document host may be slow.
    let mut minted = Vec::with_capacity(drafts.len());
    for draft in drafts {
        let id = ids::new_id(IdKind::Invite);
        let link = resolver
            .resolve(event_id, &id, prefer_external_hosting)
            .await;
        minted.push(Invite {
            id,
            event_id: event_id.to_string(),
            guest_name: draft.guest_name,
            guest_email: draft.guest_email,
            personal_message: draft.personal_message,
            rsvp_url: link.rsvp_url,
            hosting_method: link.hosting_method,
            status: InviteStatus::Active,
            created_at: Utc::now(),
            deactivated_at: None,
        });
    }

    let ledger = store.ledger(event_id).await?;
    let mut guard = ledger.lock().await;

    let mut next = guard.invites.clone();
    next.extend(minted.iter().cloned());

    let mut entries = Vec::with_capacity(minted.len() + 1);
    entries.push((invites_key(event_id), encode(&next)?));
    for invite in &minted {
        entries.push((invite_index_key(&invite.id), encode(event_id)?));
    }
    store.save_entries(entries).await?;

    guard.invites = next;
    drop(guard);
    for invite in &minted {
        store.index_invite(&invite.id, event_id);
    }

    tracing::info!("created {} invite(s) for event {event_id}", minted.len());
    Ok(minted)
}

pub async fn get_invite(store: &Store, invite_id: &str) -> Result<Invite, AppError> {
    let not_found = || AppError::NotFound("invite not found".to_string());
    let event_id = store.event_of_invite(invite_id).await?.ok_or_else(not_found)?;
    let ledger = store.ledger(&event_id).await?;
    let guard = ledger.lock().await;
    guard
        .invites
        .iter()
        .find(|i| i.id == invite_id)
        .cloned()
        .ok_or_else(not_found)
}

/// Invites of an event ordered by creation time, ties broken by id.
pub async fn list_event_invites(store: &Store, event_id: &str) -> Result<Vec<Invite>, AppError> {
    events::get_event(store, event_id).await?;
    let mut invites = store.snapshot(event_id).await?.invites;
    invites.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
    Ok(invites)
}

/// Mark an invite deactivated. Deactivating twice leaves the first deactivation intact.
pub async fn deactivate_invite(store: &Store, invite_id: &str) -> Result<Invite, AppError> {
    let not_found = || AppError::NotFound("invite not found".to_string());
    let event_id = store.event_of_invite(invite_id).await?.ok_or_else(not_found)?;
    let ledger = store.ledger(&event_id).await?;
    let mut guard = ledger.lock().await;

    let pos = guard
        .invites
        .iter()
        .position(|i| i.id == invite_id)
        .ok_or_else(not_found)?;
    if guard.invites[pos].status == InviteStatus::Deactivated {
        return Ok(guard.invites[pos].clone());
    }

    let mut next = guard.invites.clone();
    next[pos].status = InviteStatus::Deactivated;
    next[pos].deactivated_at = Some(Utc::now());
    store
        .save_entries(vec![(invites_key(&event_id), encode(&next)?)])
        .await?;

    let invite = next[pos].clone();
    guard.invites = next;
    tracing::info!("deactivated invite {invite_id} of event {event_id}");
    Ok(invite)
}
