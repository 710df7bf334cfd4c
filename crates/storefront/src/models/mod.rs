//! Domain models for the storefront.
//!
//! Row types live next to their queries in [`crate::db`]; these are the
//! validated shapes the services and routes work with.

pub mod cart;
pub mod session;
pub mod user;

pub use cart::{Cart, CartLine};
pub use session::CurrentUser;
pub use user::User;
