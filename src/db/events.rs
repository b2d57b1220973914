use chrono::Utc;
use sha2::{Digest, Sha256};

use super::{encode, event_key, Store};
use crate::error::AppError;
use crate::ids::{self, IdKind};
use crate::models::event::{CreateEvent, Event, EventRecord, UpdateEvent};
use crate::normalize::{check_utc_offset, optional_text, parse_date, parse_time, required_text};

pub(crate) fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    format!("{:x}", hasher.finalize())
}

fn check_max_guests(max_guests: Option<i64>) -> Result<Option<i64>, AppError> {
    match max_guests {
        Some(n) if n < 1 => Err(AppError::validation(
            "max_guests",
            "max_guests must be at least 1",
        )),
        other => Ok(other),
    }
}

/// Create an event and return it with its host token. Only the token's hash is stored.
pub async fn create_event(store: &Store, input: &CreateEvent) -> Result<(Event, String), AppError> {
    let name = required_text("name", input.name.as_deref())?;
    let date = parse_date("date", &required_text("date", input.date.as_deref())?)?;
    let time = optional_text(input.time.as_deref())
        .map(|t| parse_time("time", &t))
        .transpose()?;
    let rsvp_deadline = optional_text(input.rsvp_deadline.as_deref())
        .map(|d| parse_date("rsvp_deadline", &d))
        .transpose()?;
    let utc_offset_minutes = input.utc_offset_minutes.map(check_utc_offset).transpose()?;

    let event = Event {
        id: ids::new_id(IdKind::Event),
        name,
        date,
        time,
        location: optional_text(input.location.as_deref()),
        max_guests: check_max_guests(input.max_guests)?,
        rsvp_deadline,
        utc_offset_minutes,
        created_at: Utc::now(),
    };

    let host_token = ids::new_token();
    let record = EventRecord {
        event: event.clone(),
        host_token_hash: hash_token(&host_token),
    };

    store
        .save_entries(vec![(event_key(&event.id), encode(&record)?)])
        .await?;
    store.cache_event(record);

    tracing::info!("created event {} ({})", event.id, event.name);
    Ok((event, host_token))
}

async fn get_event_record(store: &Store, event_id: &str) -> Result<EventRecord, AppError> {
    if let Some(record) = store.cached_event(event_id) {
        return Ok(record);
    }
    let record: EventRecord = store
        .load_json(&event_key(event_id))
        .await?
        .ok_or_else(|| AppError::NotFound("event not found".to_string()))?;
    Ok(store.cache_loaded_event(record))
}

pub async fn get_event(store: &Store, event_id: &str) -> Result<Event, AppError> {
    Ok(get_event_record(store, event_id).await?.event)
}

pub async fn update_event(
    store: &Store,
    event_id: &str,
    input: &UpdateEvent,
) -> Result<Event, AppError> {
    get_event_record(store, event_id).await?;
    // Serialize updates with the event's invite and response mutations.
    let ledger = store.ledger(event_id).await?;
    let _guard = ledger.lock().await;

    let mut record = get_event_record(store, event_id).await?;
    let event = &mut record.event;

    if let Some(ref name) = input.name {
        event.name = required_text("name", Some(name))?;
    }
    if let Some(ref date) = input.date {
        event.date = parse_date("date", date)?;
    }
    if let Some(ref time) = input.time {
        event.time = optional_text(Some(time))
            .map(|t| parse_time("time", &t))
            .transpose()?;
    }
    if let Some(ref location) = input.location {
        event.location = optional_text(Some(location));
    }
    if input.max_guests.is_some() {
        event.max_guests = check_max_guests(input.max_guests)?;
    }
    if let Some(ref deadline) = input.rsvp_deadline {
        event.rsvp_deadline = optional_text(Some(deadline))
            .map(|d| parse_date("rsvp_deadline", &d))
            .transpose()?;
    }
    if let Some(offset) = input.utc_offset_minutes {
        event.utc_offset_minutes = Some(check_utc_offset(offset)?);
    }

    store
        .save_entries(vec![(event_key(event_id), encode(&record)?)])
        .await?;
    let event = record.event.clone();
    store.cache_event(record);
    Ok(event)
}

/// Whether `token` is the host token of `event_id`.
pub async fn verify_host(store: &Store, event_id: &str, token: &str) -> Result<bool, AppError> {
    let record = get_event_record(store, event_id).await?;
    Ok(record.host_token_hash == hash_token(token))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(name: &str, date: &str) -> CreateEvent {
        CreateEvent {
            name: Some(name.to_string()),
            date: Some(date.to_string()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_create_and_get_event() {
        let store = Store::memory();
        let (event, token) = create_event(&store, &input("Garden Party", "2026-06-01"))
            .await
            .unwrap();
        assert!(event.id.starts_with("evt_"));
        assert_eq!(get_event(&store, &event.id).await.unwrap(), event);
        assert!(verify_host(&store, &event.id, &token).await.unwrap());
        assert!(!verify_host(&store, &event.id, "wrong").await.unwrap());
    }

    #[tokio::test]
    async fn test_create_event_requires_name_and_date() {
        let store = Store::memory();
        let err = create_event(&store, &input(" ", "2026-06-01"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation { field: "name", .. }));

        let err = create_event(&store, &input("Party", "June 1st"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation { field: "date", .. }));
    }

    #[tokio::test]
    async fn test_create_event_rejects_zero_capacity() {
        let store = Store::memory();
        let mut req = input("Party", "2026-06-01");
        req.max_guests = Some(0);
        let err = create_event(&store, &req).await.unwrap_err();
        assert!(matches!(err, AppError::Validation { field: "max_guests", .. }));
    }

    #[tokio::test]
    async fn test_update_event_patches_fields() {
        let store = Store::memory();
        let (event, _) = create_event(&store, &input("Party", "2026-06-01"))
            .await
            .unwrap();
        let updated = update_event(
            &store,
            &event.id,
            &UpdateEvent {
                location: Some("Rooftop".to_string()),
                time: Some("19:00".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(updated.name, "Party");
        assert_eq!(updated.location.as_deref(), Some("Rooftop"));
        assert_eq!(updated.time.as_deref(), Some("19:00"));
    }

    #[tokio::test]
    async fn test_missing_event_is_not_found() {
        let store = Store::memory();
        let err = get_event(&store, "evt_missing").await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
