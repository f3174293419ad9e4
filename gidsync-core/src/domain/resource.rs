//! Resource kinds and collections

use crate::domain::entity::Entity;

/// The remote resource types that are mirrored
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Projects,
    Users,
}

impl ResourceKind {
    /// Fetch order within one cycle
    pub const ALL: [ResourceKind; 2] = [ResourceKind::Projects, ResourceKind::Users];

    /// Path segment appended to the API base URL
    pub fn path(&self) -> &'static str {
        match self {
            ResourceKind::Projects => "projects",
            ResourceKind::Users => "users",
        }
    }
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.path())
    }
}

/// All entities of one kind returned by a single fetch
///
/// Decoded fresh every cycle; nothing carries over between cycles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceCollection {
    kind: ResourceKind,
    entities: Vec<Entity>,
}

impl ResourceCollection {
    pub fn new(kind: ResourceKind, entities: Vec<Entity>) -> Self {
        Self { kind, entities }
    }

    pub fn kind(&self) -> ResourceKind {
        self.kind
    }

    /// Entities in the order the API returned them
    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}
