//! Domain model for link collections.
//!
//! # Responsibility
//! - Define the canonical link group record and its identifier.
//!
//! # Invariants
//! - List order, not any field, decides display and persistence order.

pub mod link_group;
