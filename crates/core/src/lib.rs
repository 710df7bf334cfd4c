//! Greengrocer Core - Shared types library.
//!
//! This crate provides common types used across all Greengrocer components:
//! - `storefront` - The axum server (JSON API, HTML fragments, admin)
//! - `client` - Typed HTTP client for the storefront API
//! - `cli` - Command-line tools for migrations, seeding and admin users
//!
//! # Architecture
//!
//! The core crate contains only types and validation - no I/O, no database
//! access, no HTTP clients. This keeps it lightweight and lets the server and
//! the client agree on one definition of every wire shape.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for IDs, prices, emails, statuses and payment details
//! - [`api`] - JSON request and response bodies exchanged over `/api`

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod types;

pub use types::*;
