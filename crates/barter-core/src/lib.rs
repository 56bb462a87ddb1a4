//! Exchange proposal engine.
//!
//! Validation, the status state machine, and the access rules for proposals
//! between two ads. Storage is reached only through the traits in [`store`];
//! callers inject an implementation (SQLite in `barter-db`, or
//! [`memory::MemoryStore`]).

pub mod access;
pub mod engine;
pub mod error;
pub mod memory;
pub mod registry;
pub mod state;
pub mod store;

pub use engine::{ExchangeEngine, ProposalDetail};
pub use error::{ExchangeError, Field, StoreError};
pub use registry::AdService;
pub use state::TransitionPolicy;
pub use store::{AdRegistry, AdStore, NewProposal, ProposalStore};
