//! Data sources: the TRAC detention feed, the two Border Patrol encounter
//! extracts, and the TTL cache that sits in front of them.

pub mod cache;
pub mod encounters;
pub mod trac;

pub use cache::TtlCache;
pub use encounters::{merge_monthly, sw_border_encounters};
pub use trac::{TracClient, parse_detentions};
