//! Item collection domain
//!
//! The store trait lives here; the file-backed implementation is under
//! `crate::file`.

pub mod store;
