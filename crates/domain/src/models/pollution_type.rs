//! Pollution type reference data.

use serde::{Deserialize, Serialize};

/// Code of the catch-all type that requires a custom description.
pub const OTHER_TYPE_CODE: &str = "other";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollutionType {
    pub id: i64,
    /// Stable external key, e.g. "burning".
    pub code: String,
    pub name: String,
}

impl PollutionType {
    pub fn is_other(&self) -> bool {
        self.code == OTHER_TYPE_CODE
    }
}
