//! Storage abstractions for service layer
//!
//! Contains the reusable file-backed list store used by services that
//! persist a whole ordered collection as a single JSON array.

pub mod json_list_store;
