//! Drawgen relay server library
//!
//! Exposes the router so integration tests can run the relay in-process.

pub mod error;
pub mod routes;
