//! Persistence seam for Turnhall.
//!
//! [`GameStore`] is the object-store boundary: async CRUD plus the
//! filtered/sorted/paged queries the session layer needs. The trait
//! object stands for a store client constructed once with elevated
//! credentials and passed by reference to every core component — no
//! per-call privilege flags.
//!
//! [`MemoryStore`] is the in-process reference implementation and the
//! test harness. It also carries the one cross-request atomicity
//! guarantee the core relies on: an identity may not hold two
//! simultaneously active player records in the same game, enforced as a
//! check-and-insert under a single write lock.

mod error;
mod memory;
mod paging;
mod store;

pub use error::StoreError;
pub use memory::MemoryStore;
pub use paging::Paging;
pub use store::GameStore;
