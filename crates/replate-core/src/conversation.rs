//! Conversation access filter: per-listing chat restricted to the listing's
//! provider and its claiming NGO, with history preserved for legacy
//! participants after an unclaim.

use std::collections::HashSet;

use chrono::Utc;
use tracing::debug;
use uuid::Uuid;

use replate_db::Database;
use replate_db::models::MessageRow;
use replate_types::api::ConversationSummary;
use replate_types::models::{Message, User};

use crate::error::CoreError;
use crate::{guard, lifecycle};

/// Messages exchanged between the caller and one other user on a listing,
/// oldest first. Readable by the listing's current parties and by legacy
/// participants with prior messages on it.
pub fn list_participant_messages(
    db: &Database,
    caller_id: Uuid,
    listing_id: Uuid,
    other_user_id: Uuid,
) -> Result<Vec<Message>, CoreError> {
    let listing = lifecycle::get_listing(db, listing_id)?;

    let prior = db.count_user_messages(&listing_id.to_string(), &caller_id.to_string())?;
    guard::can_read_conversation(caller_id, &listing, prior > 0)?;

    let rows = db.conversation_messages(
        &listing_id.to_string(),
        &caller_id.to_string(),
        &other_user_id.to_string(),
    )?;
    rows_to_messages(rows)
}

/// Validates both parties against the listing, then persists an immutable
/// message. Messages are append-only and never deleted.
pub fn append_message(
    db: &Database,
    caller: &User,
    receiver_id: Uuid,
    listing_id: Uuid,
    text: String,
) -> Result<Message, CoreError> {
    let listing = lifecycle::get_listing(db, listing_id)?;
    guard::can_send_message(&listing, caller.id, receiver_id)?;

    let row = MessageRow {
        id: Uuid::new_v4().to_string(),
        text,
        sender_id: caller.id.to_string(),
        receiver_id: receiver_id.to_string(),
        listing_id: listing_id.to_string(),
        created_at: Utc::now().to_rfc3339(),
    };
    db.insert_message(&row)?;
    debug!("message appended on listing {} by {}", listing_id, caller.id);
    Ok(row.into_message()?)
}

/// The caller's inbox: each listing they have chatted on, paired with the
/// most recent message, newest conversation first. Soft-deleted listings are
/// skipped.
pub fn list_conversations(
    db: &Database,
    caller_id: Uuid,
) -> Result<Vec<ConversationSummary>, CoreError> {
    let rows = db.messages_for_user(&caller_id.to_string())?;

    let mut seen: HashSet<String> = HashSet::new();
    let mut conversations = Vec::new();
    for row in rows {
        if !seen.insert(row.listing_id.clone()) {
            continue;
        }
        let Some(listing_row) = db.get_listing(&row.listing_id)? else {
            continue;
        };
        if !listing_row.is_active {
            continue;
        }
        conversations.push(ConversationSummary {
            listing: listing_row.into_listing()?,
            last_message: row.into_message()?,
        });
    }
    Ok(conversations)
}

fn rows_to_messages(rows: Vec<MessageRow>) -> Result<Vec<Message>, CoreError> {
    let messages = rows
        .into_iter()
        .map(|row| row.into_message())
        .collect::<anyhow::Result<Vec<_>>>()?;
    Ok(messages)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;
    use crate::lifecycle::{claim, create_listing, unclaim};
    use replate_types::models::FoodListing;

    struct Env {
        db: Database,
        provider: User,
        ngo: User,
        listing: FoodListing,
    }

    fn claimed_env() -> Env {
        let db = Database::open_in_memory().unwrap();
        let provider = fixtures::provider();
        let ngo = fixtures::verified_ngo();
        fixtures::seed_user(&db, &provider);
        fixtures::seed_user(&db, &ngo);
        let listing = create_listing(&db, &provider, fixtures::listing_request()).unwrap();
        let listing = claim(&db, &ngo, listing.id).unwrap();
        Env {
            db,
            provider,
            ngo,
            listing,
        }
    }

    #[test]
    fn message_roundtrip_in_append_order() {
        let env = claimed_env();

        let first = append_message(
            &env.db,
            &env.ngo,
            env.provider.id,
            env.listing.id,
            "We can pick up at 5pm".to_string(),
        )
        .unwrap();
        let second = append_message(
            &env.db,
            &env.provider,
            env.ngo.id,
            env.listing.id,
            "5pm works, use the back entrance".to_string(),
        )
        .unwrap();

        let thread =
            list_participant_messages(&env.db, env.ngo.id, env.listing.id, env.provider.id)
                .unwrap();
        assert_eq!(thread.len(), 2);
        assert_eq!(thread[0].id, first.id);
        assert_eq!(thread[1].id, second.id);
        assert_eq!(thread[1].text, "5pm works, use the back entrance");
        assert!(thread.windows(2).all(|w| w[0].created_at <= w[1].created_at));
    }

    #[test]
    fn outsiders_cannot_send_or_read() {
        let env = claimed_env();
        let outsider = fixtures::verified_ngo();
        fixtures::seed_user(&env.db, &outsider);

        let err = append_message(
            &env.db,
            &outsider,
            env.provider.id,
            env.listing.id,
            "hello".to_string(),
        )
        .unwrap_err();
        assert!(matches!(err, CoreError::InvalidParticipants));

        // receiver outside the pair is rejected too
        let err = append_message(
            &env.db,
            &env.provider,
            outsider.id,
            env.listing.id,
            "hello".to_string(),
        )
        .unwrap_err();
        assert!(matches!(err, CoreError::InvalidParticipants));

        let err = list_participant_messages(&env.db, outsider.id, env.listing.id, env.provider.id)
            .unwrap_err();
        assert!(matches!(err, CoreError::Forbidden));
    }

    #[test]
    fn self_messages_are_rejected() {
        let env = claimed_env();
        let err = append_message(
            &env.db,
            &env.provider,
            env.provider.id,
            env.listing.id,
            "note to self".to_string(),
        )
        .unwrap_err();
        assert!(matches!(err, CoreError::InvalidParticipants));
    }

    #[test]
    fn legacy_participant_keeps_history_after_unclaim() {
        let env = claimed_env();
        append_message(
            &env.db,
            &env.ngo,
            env.provider.id,
            env.listing.id,
            "We can pick up at 5pm".to_string(),
        )
        .unwrap();

        unclaim(&env.db, &env.ngo, env.listing.id).unwrap();

        // no longer the claimant, but prior messages keep the thread readable
        let thread =
            list_participant_messages(&env.db, env.ngo.id, env.listing.id, env.provider.id)
                .unwrap();
        assert_eq!(thread.len(), 1);

        // sending is still closed off until reclaiming
        let err = append_message(
            &env.db,
            &env.ngo,
            env.provider.id,
            env.listing.id,
            "still there?".to_string(),
        )
        .unwrap_err();
        assert!(matches!(err, CoreError::InvalidParticipants));
    }

    #[test]
    fn conversations_list_latest_message_per_listing() {
        let env = claimed_env();
        let second_listing =
            create_listing(&env.db, &env.provider, fixtures::listing_request()).unwrap();
        let second_listing = claim(&env.db, &env.ngo, second_listing.id).unwrap();

        append_message(
            &env.db,
            &env.ngo,
            env.provider.id,
            env.listing.id,
            "first thread".to_string(),
        )
        .unwrap();
        append_message(
            &env.db,
            &env.ngo,
            env.provider.id,
            env.listing.id,
            "first thread, newer".to_string(),
        )
        .unwrap();
        append_message(
            &env.db,
            &env.provider,
            env.ngo.id,
            second_listing.id,
            "second thread".to_string(),
        )
        .unwrap();

        let inbox = list_conversations(&env.db, env.ngo.id).unwrap();
        assert_eq!(inbox.len(), 2);
        let first_thread = inbox
            .iter()
            .find(|c| c.listing.id == env.listing.id)
            .unwrap();
        assert_eq!(first_thread.last_message.text, "first thread, newer");
    }
}
