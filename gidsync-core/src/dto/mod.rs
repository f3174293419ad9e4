//! Data transfer objects
//!
//! Wire shapes of remote API responses.

pub mod envelope;
