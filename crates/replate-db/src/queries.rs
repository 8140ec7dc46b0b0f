use crate::Database;
use crate::models::{ListingFilters, ListingRow, MessageRow, UserRow};
use anyhow::Result;
use rusqlite::{Row, params};

const USER_COLUMNS: &str = "id, email, password, name, phone, role, organization_type, address, \
     description, is_admin, is_verified, verified_at, rejected_at, created_at";

const LISTING_COLUMNS: &str = "id, title, description, quantity, location, food_type, urgency, \
     expires_in, contact_info, special_instructions, tags, provider_id, claimed_by_ngo_id, \
     claim_status, claimed_at, is_active, created_at, updated_at";

const MESSAGE_COLUMNS: &str = "id, text, sender_id, receiver_id, listing_id, created_at";

impl Database {
    // -- Users --

    pub fn create_user(&self, user: &UserRow) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO users (id, email, password, name, phone, role, organization_type, \
                 address, description, is_admin, is_verified, created_at) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
                params![
                    user.id,
                    user.email,
                    user.password,
                    user.name,
                    user.phone,
                    user.role,
                    user.organization_type,
                    user.address,
                    user.description,
                    user.is_admin,
                    user.is_verified,
                    user.created_at,
                ],
            )?;
            Ok(())
        })
    }

    pub fn get_user_by_email(&self, email: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| {
            let sql = format!("SELECT {} FROM users WHERE email = ?1", USER_COLUMNS);
            let mut stmt = conn.prepare(&sql)?;
            stmt.query_row([email], read_user_row).optional()
        })
    }

    pub fn get_user_by_id(&self, id: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| {
            let sql = format!("SELECT {} FROM users WHERE id = ?1", USER_COLUMNS);
            let mut stmt = conn.prepare(&sql)?;
            stmt.query_row([id], read_user_row).optional()
        })
    }

    /// NGO accounts for the admin review queue. `status` narrows the list:
    /// "pending" (awaiting review), "verified", or "rejected"; anything else
    /// returns all NGOs.
    pub fn list_ngos(&self, status: Option<&str>) -> Result<Vec<UserRow>> {
        self.with_conn(|conn| {
            let mut sql = format!("SELECT {} FROM users WHERE role = 'ngo'", USER_COLUMNS);
            match status {
                Some("pending") => sql.push_str(" AND is_verified = 0 AND rejected_at IS NULL"),
                Some("verified") => sql.push_str(" AND is_verified = 1"),
                Some("rejected") => sql.push_str(" AND rejected_at IS NOT NULL"),
                _ => {}
            }
            sql.push_str(" ORDER BY created_at DESC");

            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map([], read_user_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Marks an NGO verified. Clears any earlier rejection so an admin can
    /// reverse a rejection by verifying. Returns false if the id does not
    /// belong to an NGO.
    pub fn verify_ngo(&self, id: &str, verified_at: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let changed = conn.execute(
                "UPDATE users SET is_verified = 1, verified_at = ?2, rejected_at = NULL \
                 WHERE id = ?1 AND role = 'ngo'",
                params![id, verified_at],
            )?;
            Ok(changed > 0)
        })
    }

    /// Marks a pending NGO rejected. The row is kept for audit; it only drops
    /// out of the pending queue.
    pub fn reject_ngo(&self, id: &str, rejected_at: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let changed = conn.execute(
                "UPDATE users SET rejected_at = ?2 \
                 WHERE id = ?1 AND role = 'ngo' AND is_verified = 0 AND rejected_at IS NULL",
                params![id, rejected_at],
            )?;
            Ok(changed > 0)
        })
    }

    // -- Food listings --

    pub fn insert_listing(&self, listing: &ListingRow) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO food_listings (id, title, description, quantity, location, food_type, \
                 urgency, expires_in, contact_info, special_instructions, tags, provider_id, \
                 claim_status, is_active, created_at, updated_at) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)",
                params![
                    listing.id,
                    listing.title,
                    listing.description,
                    listing.quantity,
                    listing.location,
                    listing.food_type,
                    listing.urgency,
                    listing.expires_in,
                    listing.contact_info,
                    listing.special_instructions,
                    listing.tags,
                    listing.provider_id,
                    listing.claim_status,
                    listing.is_active,
                    listing.created_at,
                    listing.updated_at,
                ],
            )?;
            Ok(())
        })
    }

    /// Fetches a listing regardless of is_active — callers decide whether a
    /// soft-deleted row counts as absent.
    pub fn get_listing(&self, id: &str) -> Result<Option<ListingRow>> {
        self.with_conn(|conn| {
            let sql = format!("SELECT {} FROM food_listings WHERE id = ?1", LISTING_COLUMNS);
            let mut stmt = conn.prepare(&sql)?;
            stmt.query_row([id], read_listing_row).optional()
        })
    }

    /// Active listings, newest first, with optional exact-match filters.
    pub fn list_listings(&self, filters: &ListingFilters) -> Result<Vec<ListingRow>> {
        self.with_conn(|conn| {
            let mut sql = format!(
                "SELECT {} FROM food_listings WHERE is_active = 1",
                LISTING_COLUMNS
            );
            let mut values: Vec<&dyn rusqlite::types::ToSql> = Vec::new();

            for (column, value) in [
                ("location", &filters.location),
                ("urgency", &filters.urgency),
                ("food_type", &filters.food_type),
                ("provider_id", &filters.provider_id),
            ] {
                if let Some(value) = value {
                    values.push(value as &dyn rusqlite::types::ToSql);
                    sql.push_str(&format!(" AND {} = ?{}", column, values.len()));
                }
            }
            sql.push_str(" ORDER BY created_at DESC");

            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map(values.as_slice(), read_listing_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Writes the editable fields of a listing. Claim fields are deliberately
    /// excluded; those only move through claim/unclaim/status updates.
    pub fn update_listing(&self, listing: &ListingRow) -> Result<bool> {
        self.with_conn(|conn| {
            let changed = conn.execute(
                "UPDATE food_listings SET title = ?2, description = ?3, quantity = ?4, \
                 location = ?5, food_type = ?6, urgency = ?7, expires_in = ?8, contact_info = ?9, \
                 special_instructions = ?10, tags = ?11, updated_at = ?12 \
                 WHERE id = ?1",
                params![
                    listing.id,
                    listing.title,
                    listing.description,
                    listing.quantity,
                    listing.location,
                    listing.food_type,
                    listing.urgency,
                    listing.expires_in,
                    listing.contact_info,
                    listing.special_instructions,
                    listing.tags,
                    listing.updated_at,
                ],
            )?;
            Ok(changed > 0)
        })
    }

    /// Compare-and-swap claim: succeeds only if the row is still open and
    /// active at write time. Two racing claimants can never both see a
    /// changed-row count of one.
    pub fn claim_listing(&self, id: &str, ngo_id: &str, now: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let changed = conn.execute(
                "UPDATE food_listings \
                 SET claimed_by_ngo_id = ?2, claim_status = 'claimed', claimed_at = ?3, \
                     updated_at = ?3 \
                 WHERE id = ?1 AND claim_status = 'open' AND is_active = 1",
                params![id, ngo_id, now],
            )?;
            Ok(changed == 1)
        })
    }

    /// Administrative reset back to open; ignores the current status.
    pub fn unclaim_listing(&self, id: &str, now: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let changed = conn.execute(
                "UPDATE food_listings \
                 SET claimed_by_ngo_id = NULL, claim_status = 'open', claimed_at = NULL, \
                     updated_at = ?2 \
                 WHERE id = ?1",
                params![id, now],
            )?;
            Ok(changed > 0)
        })
    }

    pub fn set_listing_status(&self, id: &str, status: &str, now: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let changed = conn.execute(
                "UPDATE food_listings SET claim_status = ?2, updated_at = ?3 WHERE id = ?1",
                params![id, status, now],
            )?;
            Ok(changed > 0)
        })
    }

    /// Soft delete: the row stays for audit but disappears from every read.
    pub fn soft_delete_listing(&self, id: &str, now: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let changed = conn.execute(
                "UPDATE food_listings SET is_active = 0, updated_at = ?2 WHERE id = ?1",
                params![id, now],
            )?;
            Ok(changed > 0)
        })
    }

    // -- Messages --

    pub fn insert_message(&self, message: &MessageRow) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO messages (id, text, sender_id, receiver_id, listing_id, created_at) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    message.id,
                    message.text,
                    message.sender_id,
                    message.receiver_id,
                    message.listing_id,
                    message.created_at,
                ],
            )?;
            Ok(())
        })
    }

    /// Messages exchanged between two users on one listing, in append order.
    pub fn conversation_messages(
        &self,
        listing_id: &str,
        user_a: &str,
        user_b: &str,
    ) -> Result<Vec<MessageRow>> {
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT {} FROM messages \
                 WHERE listing_id = ?1 \
                   AND ((sender_id = ?2 AND receiver_id = ?3) \
                     OR (sender_id = ?3 AND receiver_id = ?2)) \
                 ORDER BY created_at ASC",
                MESSAGE_COLUMNS
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map(params![listing_id, user_a, user_b], read_message_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// How many messages a user has sent or received on a listing. Used to
    /// keep conversation history readable for legacy participants after an
    /// unclaim/reclaim cycle.
    pub fn count_user_messages(&self, listing_id: &str, user_id: &str) -> Result<i64> {
        self.with_conn(|conn| {
            let count = conn.query_row(
                "SELECT COUNT(*) FROM messages \
                 WHERE listing_id = ?1 AND (sender_id = ?2 OR receiver_id = ?2)",
                params![listing_id, user_id],
                |row| row.get(0),
            )?;
            Ok(count)
        })
    }

    /// Every message involving a user, newest first, across all listings.
    pub fn messages_for_user(&self, user_id: &str) -> Result<Vec<MessageRow>> {
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT {} FROM messages \
                 WHERE sender_id = ?1 OR receiver_id = ?1 \
                 ORDER BY created_at DESC",
                MESSAGE_COLUMNS
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map([user_id], read_message_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }
}

fn read_user_row(row: &Row<'_>) -> rusqlite::Result<UserRow> {
    Ok(UserRow {
        id: row.get(0)?,
        email: row.get(1)?,
        password: row.get(2)?,
        name: row.get(3)?,
        phone: row.get(4)?,
        role: row.get(5)?,
        organization_type: row.get(6)?,
        address: row.get(7)?,
        description: row.get(8)?,
        is_admin: row.get(9)?,
        is_verified: row.get(10)?,
        verified_at: row.get(11)?,
        rejected_at: row.get(12)?,
        created_at: row.get(13)?,
    })
}

fn read_listing_row(row: &Row<'_>) -> rusqlite::Result<ListingRow> {
    Ok(ListingRow {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        quantity: row.get(3)?,
        location: row.get(4)?,
        food_type: row.get(5)?,
        urgency: row.get(6)?,
        expires_in: row.get(7)?,
        contact_info: row.get(8)?,
        special_instructions: row.get(9)?,
        tags: row.get(10)?,
        provider_id: row.get(11)?,
        claimed_by_ngo_id: row.get(12)?,
        claim_status: row.get(13)?,
        claimed_at: row.get(14)?,
        is_active: row.get(15)?,
        created_at: row.get(16)?,
        updated_at: row.get(17)?,
    })
}

fn read_message_row(row: &Row<'_>) -> rusqlite::Result<MessageRow> {
    Ok(MessageRow {
        id: row.get(0)?,
        text: row.get(1)?,
        sender_id: row.get(2)?,
        receiver_id: row.get(3)?,
        listing_id: row.get(4)?,
        created_at: row.get(5)?,
    })
}

/// Extension trait for optional query results
trait OptionalExt<T> {
    fn optional(self) -> Result<Option<T>>;
}

impl<T> OptionalExt<T> for std::result::Result<T, rusqlite::Error> {
    fn optional(self) -> Result<Option<T>> {
        match self {
            Ok(val) => Ok(Some(val)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn user_row(email: &str, role: &str) -> UserRow {
        UserRow {
            id: Uuid::new_v4().to_string(),
            email: email.to_string(),
            password: "argon2-hash".to_string(),
            name: "Test User".to_string(),
            phone: "555-0100".to_string(),
            role: role.to_string(),
            organization_type: "restaurant".to_string(),
            address: "1 Main St".to_string(),
            description: None,
            is_admin: false,
            is_verified: false,
            verified_at: None,
            rejected_at: None,
            created_at: Utc::now().to_rfc3339(),
        }
    }

    #[test]
    fn create_and_fetch_user() {
        let db = Database::open_in_memory().unwrap();
        let row = user_row("kitchen@example.org", "provider");
        db.create_user(&row).unwrap();

        let found = db.get_user_by_email("kitchen@example.org").unwrap().unwrap();
        assert_eq!(found.id, row.id);
        assert_eq!(found.role, "provider");
        assert!(db.get_user_by_email("nobody@example.org").unwrap().is_none());
    }

    #[test]
    fn reject_only_touches_pending_ngos() {
        let db = Database::open_in_memory().unwrap();
        let ngo = user_row("ngo@example.org", "ngo");
        let provider = user_row("p@example.org", "provider");
        db.create_user(&ngo).unwrap();
        db.create_user(&provider).unwrap();

        let now = Utc::now().to_rfc3339();
        assert!(!db.reject_ngo(&provider.id, &now).unwrap());
        assert!(db.reject_ngo(&ngo.id, &now).unwrap());
        // already rejected
        assert!(!db.reject_ngo(&ngo.id, &now).unwrap());

        let pending = db.list_ngos(Some("pending")).unwrap();
        assert!(pending.is_empty());
        let rejected = db.list_ngos(Some("rejected")).unwrap();
        assert_eq!(rejected.len(), 1);

        // verification reverses a rejection
        assert!(db.verify_ngo(&ngo.id, &now).unwrap());
        let verified = db.list_ngos(Some("verified")).unwrap();
        assert_eq!(verified.len(), 1);
        assert!(verified[0].rejected_at.is_none());
    }
}
