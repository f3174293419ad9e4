//! Entity domain model

use serde::{Deserialize, Serialize};

/// A uniquely identified, named remote record
///
/// Projects and users share this shape; `resource_type` tells them apart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    /// Globally unique identifier (opaque)
    pub gid: String,

    /// Display name
    pub name: String,

    /// Resource-type tag, e.g. "project" or "user"
    pub resource_type: String,
}

impl Entity {
    pub fn new(
        gid: impl Into<String>,
        name: impl Into<String>,
        resource_type: impl Into<String>,
    ) -> Self {
        Self {
            gid: gid.into(),
            name: name.into(),
            resource_type: resource_type.into(),
        }
    }
}
