use crate::models::{AD_COLUMNS, AdRow, PROPOSAL_COLUMNS, ProposalRow, UserRow};
use crate::Database;
use anyhow::Result;
use rusqlite::{Connection, OptionalExtension, params};

impl Database {
    // -- Users --

    pub fn create_user(&self, id: &str, username: &str, password_hash: &str) -> Result<()> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO users (id, username, password) VALUES (?1, ?2, ?3)",
                (id, username, password_hash),
            )?;
            Ok(())
        })
    }

    pub fn get_user_by_username(&self, username: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| {
            let row = conn
                .query_row(
                    "SELECT id, username, password, created_at FROM users WHERE username = ?1",
                    [username],
                    UserRow::from_row,
                )
                .optional()?;
            Ok(row)
        })
    }

    pub fn get_user_by_id(&self, id: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| {
            let row = conn
                .query_row(
                    "SELECT id, username, password, created_at FROM users WHERE id = ?1",
                    [id],
                    UserRow::from_row,
                )
                .optional()?;
            Ok(row)
        })
    }
}

// -- Ads --

pub(crate) fn insert_ad(
    conn: &Connection,
    owner_id: &str,
    title: &str,
    description: &str,
    category: &str,
    condition: &str,
    image_url: Option<&str>,
) -> Result<i64> {
    conn.execute(
        "INSERT INTO ads (owner_id, title, description, category, condition, image_url)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![owner_id, title, description, category, condition, image_url],
    )?;
    Ok(conn.last_insert_rowid())
}

pub(crate) fn update_ad(
    conn: &Connection,
    id: i64,
    title: &str,
    description: &str,
    category: &str,
    condition: &str,
    image_url: Option<&str>,
) -> Result<usize> {
    let changed = conn.execute(
        "UPDATE ads SET title = ?2, description = ?3, category = ?4, condition = ?5, image_url = ?6
         WHERE id = ?1",
        params![id, title, description, category, condition, image_url],
    )?;
    Ok(changed)
}

pub(crate) fn delete_ad(conn: &Connection, id: i64) -> Result<usize> {
    Ok(conn.execute("DELETE FROM ads WHERE id = ?1", [id])?)
}

pub(crate) fn query_ad(conn: &Connection, id: i64) -> Result<Option<AdRow>> {
    let sql = format!("SELECT {AD_COLUMNS} FROM ads WHERE id = ?1");
    Ok(conn.query_row(&sql, [id], AdRow::from_row).optional()?)
}

pub(crate) fn query_ads_by_owner(conn: &Connection, owner_id: &str) -> Result<Vec<AdRow>> {
    let sql = format!("SELECT {AD_COLUMNS} FROM ads WHERE owner_id = ?1 ORDER BY id");
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map([owner_id], AdRow::from_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

pub(crate) fn query_ads(conn: &Connection, limit: u32, offset: u32) -> Result<Vec<AdRow>> {
    let sql = format!("SELECT {AD_COLUMNS} FROM ads ORDER BY id DESC LIMIT ?1 OFFSET ?2");
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map(params![limit, offset], AdRow::from_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

// -- Exchange proposals --

pub(crate) fn insert_proposal(
    conn: &Connection,
    ad_sender: i64,
    ad_receiver: i64,
    comment: &str,
) -> Result<i64> {
    conn.execute(
        "INSERT INTO exchange_proposals (ad_sender, ad_receiver, comment, status)
         VALUES (?1, ?2, ?3, 'waiting')",
        params![ad_sender, ad_receiver, comment],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Rewrites everything except `id` and `created_at`, provided the row still
/// has status `expected`. Returns the number of rows changed.
pub(crate) fn update_proposal(
    conn: &Connection,
    id: i64,
    ad_sender: i64,
    ad_receiver: i64,
    comment: &str,
    status: &str,
    expected: &str,
) -> Result<usize> {
    let changed = conn.execute(
        "UPDATE exchange_proposals
         SET ad_sender = ?2, ad_receiver = ?3, comment = ?4, status = ?5
         WHERE id = ?1 AND status = ?6",
        params![id, ad_sender, ad_receiver, comment, status, expected],
    )?;
    Ok(changed)
}

pub(crate) fn delete_proposal(conn: &Connection, id: i64) -> Result<usize> {
    Ok(conn.execute("DELETE FROM exchange_proposals WHERE id = ?1", [id])?)
}

pub(crate) fn query_proposal(conn: &Connection, id: i64) -> Result<Option<ProposalRow>> {
    let sql = format!("SELECT {PROPOSAL_COLUMNS} FROM exchange_proposals WHERE id = ?1");
    Ok(conn.query_row(&sql, [id], ProposalRow::from_row).optional()?)
}

pub(crate) fn query_active_between(
    conn: &Connection,
    a: i64,
    b: i64,
    excluding: Option<i64>,
) -> Result<Option<ProposalRow>> {
    let sql = format!(
        "SELECT {PROPOSAL_COLUMNS} FROM exchange_proposals
         WHERE ((ad_sender = ?1 AND ad_receiver = ?2) OR (ad_sender = ?2 AND ad_receiver = ?1))
           AND status <> 'rejected'
           AND (?3 IS NULL OR id <> ?3)
         ORDER BY id
         LIMIT 1"
    );
    Ok(conn
        .query_row(&sql, params![a, b, excluding], ProposalRow::from_row)
        .optional()?)
}

pub(crate) fn query_proposals_for_user(conn: &Connection, user_id: &str) -> Result<Vec<ProposalRow>> {
    let mut stmt = conn.prepare(
        "SELECT p.id, p.ad_sender, p.ad_receiver, p.comment, p.status, p.created_at
         FROM exchange_proposals p
         JOIN ads s ON s.id = p.ad_sender
         JOIN ads r ON r.id = p.ad_receiver
         WHERE s.owner_id = ?1 OR r.owner_id = ?1
         ORDER BY p.id DESC",
    )?;
    let rows = stmt
        .query_map([user_id], ProposalRow::from_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}
