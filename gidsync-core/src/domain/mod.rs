//! Core domain types
//!
//! These types are decoded by the client and written to disk by the poller.

pub mod entity;
pub mod resource;
