//! # HMS Core
//!
//! Core business logic for the hospital management system.
//!
//! This crate owns the SQLite schema and repositories plus the workflows
//! built on them:
//! - Accounts, doctor/patient profiles and the medicine catalogue
//! - Appointment booking with slot collision and a strict status machine
//! - Prescriptions with per-medicine dosage lines
//! - bcrypt credential hashing and HS256 bearer tokens
//!
//! **No API concerns**: HTTP routing, extractors and the OpenAPI document
//! belong in `api-rest`.

pub mod auth;
pub mod authz;
pub mod booking;
pub mod config;
pub mod db;
pub mod error;
pub mod model;
pub mod prescribing;
pub mod reports;
pub mod repositories;
pub mod validation;

#[cfg(test)]
pub(crate) mod testutil;

pub use auth::{Claims, TokenIdentity, TokenService};
pub use config::AppConfig;
pub use error::{HmsError, HmsResult};
