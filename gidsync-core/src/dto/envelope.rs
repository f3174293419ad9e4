//! Response envelope DTO

use serde::{Deserialize, Serialize};

/// The `{"data": [...]}` wrapper every collection endpoint returns
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataEnvelope<T> {
    pub data: Vec<T>,
}
