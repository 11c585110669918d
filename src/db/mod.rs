//! Persistence adapter - key-value storage for the ledger's collections.
//!
//! [`store::KvStore`] talks to one `app_data` table. [`persistence::Persistence`]
//! pairs the local store with an optional remote mirror and implements the
//! best-effort dual write and the remote-wins load.

/// Single key-value table access
pub mod store;

/// Local store plus optional remote mirror
pub mod persistence;

pub use persistence::{Collection, Persistence};
pub use store::KvStore;
