use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_version (version INTEGER NOT NULL);"
    )?;

    let version: i64 = conn
        .query_row("SELECT COALESCE(MAX(version), 0) FROM schema_version", [], |r| r.get(0))?;

    if version < 1 {
        info!("Running migration v1 (users, ads, exchange proposals)");
        conn.execute_batch(
            "
            CREATE TABLE users (
                id          TEXT PRIMARY KEY,
                username    TEXT NOT NULL UNIQUE,
                password    TEXT NOT NULL,
                created_at  TEXT NOT NULL DEFAULT (datetime('now'))
            );

            CREATE TABLE ads (
                id          INTEGER PRIMARY KEY AUTOINCREMENT,
                owner_id    TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                title       TEXT NOT NULL,
                description TEXT NOT NULL,
                category    TEXT NOT NULL,
                condition   TEXT NOT NULL,
                created_at  TEXT NOT NULL DEFAULT (datetime('now'))
            );

            CREATE INDEX idx_ads_owner ON ads(owner_id);

            CREATE TABLE exchange_proposals (
                id          INTEGER PRIMARY KEY AUTOINCREMENT,
                ad_sender   INTEGER NOT NULL REFERENCES ads(id) ON DELETE CASCADE,
                ad_receiver INTEGER NOT NULL REFERENCES ads(id) ON DELETE CASCADE,
                comment     TEXT NOT NULL,
                status      TEXT NOT NULL DEFAULT 'waiting'
                            CHECK (status IN ('waiting', 'accepted', 'rejected')),
                created_at  TEXT NOT NULL DEFAULT (datetime('now')),
                CHECK (ad_sender <> ad_receiver)
            );

            CREATE INDEX idx_proposals_sender ON exchange_proposals(ad_sender);
            CREATE INDEX idx_proposals_receiver ON exchange_proposals(ad_receiver);

            -- At most one non-rejected proposal per unordered ad pair
            CREATE UNIQUE INDEX idx_proposals_active_pair
                ON exchange_proposals (min(ad_sender, ad_receiver), max(ad_sender, ad_receiver))
                WHERE status <> 'rejected';

            INSERT INTO schema_version (version) VALUES (1);
            "
        )?;
    }

    if version < 2 {
        info!("Running migration v2 (ad image URLs)");
        conn.execute_batch(
            "
            ALTER TABLE ads ADD COLUMN image_url TEXT;

            INSERT INTO schema_version (version) VALUES (2);
            "
        )?;
    }

    info!("Database migrations complete");
    Ok(())
}
