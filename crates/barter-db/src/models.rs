//! Database row types. These map directly to SQLite rows and are converted
//! into barter-types models at the store boundary.

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDateTime, Utc};
use rusqlite::Row;
use tracing::warn;

use barter_types::models::{Ad, ExchangeProposal, ProposalStatus, User};
use uuid::Uuid;

pub struct UserRow {
    pub id: String,
    pub username: String,
    pub password: String,
    pub created_at: String,
}

pub struct AdRow {
    pub id: i64,
    pub owner_id: String,
    pub title: String,
    pub description: String,
    pub category: String,
    pub condition: String,
    pub image_url: Option<String>,
    pub created_at: String,
}

pub struct ProposalRow {
    pub id: i64,
    pub ad_sender: i64,
    pub ad_receiver: i64,
    pub comment: String,
    pub status: String,
    pub created_at: String,
}

pub(crate) const AD_COLUMNS: &str =
    "id, owner_id, title, description, category, condition, image_url, created_at";

pub(crate) const PROPOSAL_COLUMNS: &str =
    "id, ad_sender, ad_receiver, comment, status, created_at";

impl UserRow {
    pub(crate) fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            username: row.get(1)?,
            password: row.get(2)?,
            created_at: row.get(3)?,
        })
    }

    pub fn into_user(self) -> Result<User> {
        let id = self
            .id
            .parse::<Uuid>()
            .with_context(|| format!("corrupt id on user '{}'", self.username))?;
        let created_at = parse_timestamp(&self.created_at, format_args!("user {}", self.username));

        Ok(User {
            id,
            username: self.username,
            created_at,
        })
    }
}

impl AdRow {
    pub(crate) fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            owner_id: row.get(1)?,
            title: row.get(2)?,
            description: row.get(3)?,
            category: row.get(4)?,
            condition: row.get(5)?,
            image_url: row.get(6)?,
            created_at: row.get(7)?,
        })
    }

    pub fn into_ad(self) -> Result<Ad> {
        let owner = self
            .owner_id
            .parse::<Uuid>()
            .with_context(|| format!("corrupt owner_id '{}' on ad #{}", self.owner_id, self.id))?;
        let created_at = parse_timestamp(&self.created_at, format_args!("ad #{}", self.id));

        Ok(Ad {
            id: self.id,
            owner,
            title: self.title,
            description: self.description,
            category: self.category,
            condition: self.condition,
            image_url: self.image_url,
            created_at,
        })
    }
}

impl ProposalRow {
    pub(crate) fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            ad_sender: row.get(1)?,
            ad_receiver: row.get(2)?,
            comment: row.get(3)?,
            status: row.get(4)?,
            created_at: row.get(5)?,
        })
    }

    pub fn into_proposal(self) -> Result<ExchangeProposal> {
        let status = self
            .status
            .parse::<ProposalStatus>()
            .with_context(|| format!("corrupt status on proposal #{}", self.id))?;
        let created_at = parse_timestamp(&self.created_at, format_args!("proposal #{}", self.id));

        Ok(ExchangeProposal {
            id: self.id,
            ad_sender: self.ad_sender,
            ad_receiver: self.ad_receiver,
            comment: self.comment,
            status,
            created_at,
        })
    }
}

/// SQLite stores timestamps as "YYYY-MM-DD HH:MM:SS" without timezone.
pub(crate) fn parse_timestamp(raw: &str, what: impl std::fmt::Display) -> DateTime<Utc> {
    raw.parse::<DateTime<Utc>>()
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S").map(|ndt| ndt.and_utc()))
        .unwrap_or_else(|e| {
            warn!("Corrupt created_at '{}' on {}: {}", raw, what, e);
            DateTime::default()
        })
}
