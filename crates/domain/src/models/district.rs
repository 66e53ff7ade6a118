//! District reference data.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// An administrative district; its name is the external join key for uploads.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct District {
    pub id: i64,
    pub name: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

/// Name → id lookup used while validating uploaded rows.
///
/// Matching ignores surrounding whitespace and letter case.
#[derive(Debug, Clone, Default)]
pub struct DistrictDirectory {
    by_name: HashMap<String, i64>,
}

impl DistrictDirectory {
    pub fn new<'a>(districts: impl IntoIterator<Item = &'a District>) -> Self {
        let by_name = districts
            .into_iter()
            .map(|d| (Self::key(&d.name), d.id))
            .collect();
        Self { by_name }
    }

    fn key(name: &str) -> String {
        name.trim().to_lowercase()
    }

    /// Resolves a district name to its id.
    pub fn resolve(&self, name: &str) -> Option<i64> {
        self.by_name.get(&Self::key(name)).copied()
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn district(id: i64, name: &str) -> District {
        District {
            id,
            name: name.to_string(),
            latitude: None,
            longitude: None,
        }
    }

    #[test]
    fn test_resolve_exact_and_case_insensitive() {
        let districts = vec![district(1, "Ba Đình"), district(2, "Cầu Giấy")];
        let dir = DistrictDirectory::new(&districts);

        assert_eq!(dir.resolve("Ba Đình"), Some(1));
        assert_eq!(dir.resolve("  cầu giấy "), Some(2));
        assert_eq!(dir.resolve("CẦU GIẤY"), Some(2));
        assert_eq!(dir.resolve("Unknown"), None);
        assert_eq!(dir.len(), 2);
    }

    #[test]
    fn test_empty_directory() {
        let dir = DistrictDirectory::default();
        assert!(dir.is_empty());
        assert_eq!(dir.resolve("Ba Đình"), None);
    }
}
