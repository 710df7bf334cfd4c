//! Greengrocer storefront library.
//!
//! The server binary is a thin wrapper around [`routes::app`]; keeping the
//! application here lets the router be exercised in tests and lets the CLI
//! reuse the account and catalog services.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod filters;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
