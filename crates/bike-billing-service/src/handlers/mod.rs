//! API handlers.

pub mod admin;
pub mod cards;
pub mod charges;
pub mod email;
pub mod health;
