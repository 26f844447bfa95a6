//! Domain types for heuristic listing extraction.

use serde::{Deserialize, Serialize};

/// Postal address assembled from classified text fragments.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub street: Option<String>,
    pub city: Option<String>,
    pub region: Option<String>,
    pub postal: Option<String>,
}

/// One listing mined from a repeated container element.
///
/// Coordinates are kept as the exact strings found on the page; nothing is
/// parsed or rounded.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationRecord {
    pub name: Option<String>,
    pub address: Address,
    pub phone: Option<String>,
    pub latitude: Option<String>,
    pub longitude: Option<String>,
}

impl LocationRecord {
    /// `true` when every field is absent.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self == &Self::default()
    }
}

/// Semantic category assigned to a text fragment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldRole {
    Name,
    Street,
    City,
    Region,
    Postal,
    Phone,
    Other,
}

impl FieldRole {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            FieldRole::Name => "name",
            FieldRole::Street => "street",
            FieldRole::City => "city",
            FieldRole::Region => "region",
            FieldRole::Postal => "postal",
            FieldRole::Phone => "phone",
            FieldRole::Other => "other",
        }
    }
}

impl std::fmt::Display for FieldRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
