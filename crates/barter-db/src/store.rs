//! Repository trait implementations over SQLite.

use anyhow::anyhow;
use rusqlite::ErrorCode;
use tracing::error;

use barter_core::store::{AdRegistry, AdStore, NewProposal, ProposalStore, StoreResult};
use barter_core::StoreError;
use barter_types::models::{Ad, AdId, AdInput, ExchangeProposal, ProposalId, ProposalStatus, UserId};

use crate::models::{AdRow, ProposalRow};
use crate::queries;
use crate::Database;

/// True when `e` is a UNIQUE constraint violation (taken username, active
/// ad pair).
pub fn is_unique_violation(e: &anyhow::Error) -> bool {
    matches!(
        e.downcast_ref::<rusqlite::Error>(),
        Some(rusqlite::Error::SqliteFailure(code, _))
            if code.code == ErrorCode::ConstraintViolation
                && code.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
    )
}

/// Maps the active-pair unique index violation to `Conflict`; everything
/// else is a backend failure.
fn store_err(e: anyhow::Error) -> StoreError {
    if is_unique_violation(&e) {
        return StoreError::Conflict;
    }
    error!("Store failure: {:#}", e);
    StoreError::Backend(e)
}

fn ads(rows: Vec<AdRow>) -> anyhow::Result<Vec<Ad>> {
    rows.into_iter().map(AdRow::into_ad).collect()
}

fn proposals(rows: Vec<ProposalRow>) -> anyhow::Result<Vec<ExchangeProposal>> {
    rows.into_iter().map(ProposalRow::into_proposal).collect()
}

impl AdRegistry for Database {
    fn get_ad(&self, id: AdId) -> StoreResult<Option<Ad>> {
        self.with_conn(|conn| queries::query_ad(conn, id)?.map(AdRow::into_ad).transpose())
            .map_err(store_err)
    }

    fn list_ads_by_owner(&self, owner: UserId) -> StoreResult<Vec<Ad>> {
        self.with_conn(|conn| ads(queries::query_ads_by_owner(conn, &owner.to_string())?))
            .map_err(store_err)
    }
}

impl AdStore for Database {
    fn insert_ad(&self, owner: UserId, input: &AdInput) -> StoreResult<Ad> {
        self.with_conn_mut(|conn| {
            let id = queries::insert_ad(
                conn,
                &owner.to_string(),
                &input.title,
                &input.description,
                &input.category,
                &input.condition,
                input.image_url.as_deref(),
            )?;
            queries::query_ad(conn, id)?
                .ok_or_else(|| anyhow!("ad #{} missing after insert", id))?
                .into_ad()
        })
        .map_err(store_err)
    }

    fn update_ad(&self, id: AdId, input: &AdInput) -> StoreResult<()> {
        self.with_conn_mut(|conn| {
            let changed = queries::update_ad(
                conn,
                id,
                &input.title,
                &input.description,
                &input.category,
                &input.condition,
                input.image_url.as_deref(),
            )?;
            if changed == 0 {
                return Err(anyhow!("ad #{} vanished", id));
            }
            Ok(())
        })
        .map_err(store_err)
    }

    fn delete_ad(&self, id: AdId) -> StoreResult<bool> {
        self.with_conn_mut(|conn| Ok(queries::delete_ad(conn, id)? > 0))
            .map_err(store_err)
    }

    fn list_ads(&self, limit: u32, offset: u32) -> StoreResult<Vec<Ad>> {
        self.with_conn(|conn| ads(queries::query_ads(conn, limit, offset)?))
            .map_err(store_err)
    }
}

impl ProposalStore for Database {
    fn get_proposal(&self, id: ProposalId) -> StoreResult<Option<ExchangeProposal>> {
        self.with_conn(|conn| {
            queries::query_proposal(conn, id)?
                .map(ProposalRow::into_proposal)
                .transpose()
        })
        .map_err(store_err)
    }

    fn find_active_between(
        &self,
        a: AdId,
        b: AdId,
        excluding: Option<ProposalId>,
    ) -> StoreResult<Option<ExchangeProposal>> {
        self.with_conn(|conn| {
            queries::query_active_between(conn, a, b, excluding)?
                .map(ProposalRow::into_proposal)
                .transpose()
        })
        .map_err(store_err)
    }

    fn insert_proposal(&self, new: &NewProposal) -> StoreResult<ExchangeProposal> {
        self.with_conn_mut(|conn| {
            let id = queries::insert_proposal(conn, new.ad_sender, new.ad_receiver, &new.comment)?;
            queries::query_proposal(conn, id)?
                .ok_or_else(|| anyhow!("proposal #{} missing after insert", id))?
                .into_proposal()
        })
        .map_err(store_err)
    }

    fn update_proposal(
        &self,
        proposal: &ExchangeProposal,
        expected: ProposalStatus,
    ) -> StoreResult<()> {
        let changed = self
            .with_conn_mut(|conn| {
                queries::update_proposal(
                    conn,
                    proposal.id,
                    proposal.ad_sender,
                    proposal.ad_receiver,
                    &proposal.comment,
                    proposal.status.as_str(),
                    expected.as_str(),
                )
            })
            .map_err(store_err)?;
        // Gone, or its status moved on since the caller read it.
        if changed == 0 {
            return Err(StoreError::Stale);
        }
        Ok(())
    }

    fn delete_proposal(&self, id: ProposalId) -> StoreResult<bool> {
        self.with_conn_mut(|conn| Ok(queries::delete_proposal(conn, id)? > 0))
            .map_err(store_err)
    }

    fn list_for_user(&self, user: UserId) -> StoreResult<Vec<ExchangeProposal>> {
        self.with_conn(|conn| proposals(queries::query_proposals_for_user(conn, &user.to_string())?))
            .map_err(store_err)
    }
}
