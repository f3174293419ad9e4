//! gidsync Core
//!
//! Core types shared by the gidsync client and poller.
//!
//! This crate contains:
//! - Domain types: remote entities and the resource kinds they are grouped by
//! - DTOs: wire envelopes returned by the remote API

pub mod domain;
pub mod dto;
