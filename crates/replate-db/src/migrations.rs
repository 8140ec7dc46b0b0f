use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS users (
            id                  TEXT PRIMARY KEY,
            email               TEXT NOT NULL UNIQUE,
            password            TEXT NOT NULL,
            name                TEXT NOT NULL,
            phone               TEXT NOT NULL,
            role                TEXT NOT NULL CHECK (role IN ('provider', 'ngo')),
            organization_type   TEXT NOT NULL,
            address             TEXT NOT NULL,
            description         TEXT,
            is_admin            INTEGER NOT NULL DEFAULT 0,
            is_verified         INTEGER NOT NULL DEFAULT 0,
            verified_at         TEXT,
            rejected_at         TEXT,
            created_at          TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS food_listings (
            id                      TEXT PRIMARY KEY,
            title                   TEXT NOT NULL,
            description             TEXT NOT NULL,
            quantity                TEXT NOT NULL,
            location                TEXT NOT NULL,
            food_type               TEXT NOT NULL,
            urgency                 TEXT NOT NULL DEFAULT 'medium'
                                        CHECK (urgency IN ('low', 'medium', 'high')),
            expires_in              TEXT NOT NULL,
            contact_info            TEXT NOT NULL,
            special_instructions    TEXT,
            tags                    TEXT NOT NULL DEFAULT '[]',
            provider_id             TEXT NOT NULL REFERENCES users(id),
            claimed_by_ngo_id       TEXT REFERENCES users(id) ON DELETE SET NULL,
            claim_status            TEXT NOT NULL DEFAULT 'open'
                                        CHECK (claim_status IN (
                                            'open', 'claimed', 'confirmed', 'in_process',
                                            'delivery_partner_assigned', 'in_transit',
                                            'completed', 'cancelled')),
            claimed_at              TEXT,
            is_active               INTEGER NOT NULL DEFAULT 1,
            created_at              TEXT NOT NULL DEFAULT (datetime('now')),
            updated_at              TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX IF NOT EXISTS idx_listings_provider
            ON food_listings(provider_id, created_at);

        CREATE INDEX IF NOT EXISTS idx_listings_status
            ON food_listings(claim_status, is_active);

        CREATE TABLE IF NOT EXISTS messages (
            id          TEXT PRIMARY KEY,
            text        TEXT NOT NULL,
            sender_id   TEXT NOT NULL REFERENCES users(id),
            receiver_id TEXT NOT NULL REFERENCES users(id),
            listing_id  TEXT NOT NULL REFERENCES food_listings(id),
            created_at  TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX IF NOT EXISTS idx_messages_listing
            ON messages(listing_id, created_at);
        ",
    )?;

    info!("Database migrations complete");
    Ok(())
}
