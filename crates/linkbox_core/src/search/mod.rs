//! In-memory search over link groups.
//!
//! # Responsibility
//! - Match a free-text query against group labels and individual link lines.
//! - Keep result shaping inside core so adapters only render.

pub mod line_search;
