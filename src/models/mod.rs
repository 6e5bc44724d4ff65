//! Data models representing store entities.
//!
//! This module contains all data structures that map to Firestore documents.

/// Affiliate record model
pub mod affiliate;
