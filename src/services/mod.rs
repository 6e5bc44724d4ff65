//! Business logic services.
//!
//! Services contain core business logic separated from HTTP handlers.
//! They handle store operations, validation, and record construction.

pub mod affiliate_service;
