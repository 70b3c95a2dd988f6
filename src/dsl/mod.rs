//! Link builder DSL
//!
//! Two ways in:
//!
//! - [`LinkBuilder`] for standalone links and affordances
//! - [`AddLinks::add_links`] for decorating a resource within a scope bound
//!   to one controller

pub mod builder;
pub mod scoped;

pub use builder::{Affordances, LinkBuilder, LinkTo};
pub use scoped::{AddLinks, AddedLink, PendingLink, ScopedAffordances, ScopedLinks};
