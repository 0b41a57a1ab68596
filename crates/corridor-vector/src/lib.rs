//! Persistent vector index on LanceDB.
//!
//! Collections are stored as generation tables behind a pointer in a small
//! key/value `meta` table; see [`store`] for the replacement protocol.

pub mod schema;
pub mod store;
pub mod table;

pub use store::{validate_name, ActiveGeneration, LanceIndex};
