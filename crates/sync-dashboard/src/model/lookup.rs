use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// One entry of a reference collection, as used by select inputs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LookupItem {
    pub id: u64,
    pub name: String,
}

/// Slow-changing reference collections the dashboard caches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LookupKind {
    Locations,
    Positions,
    Users,
}

impl LookupKind {
    pub const ALL: [LookupKind; 3] = [LookupKind::Locations, LookupKind::Positions, LookupKind::Users];

    /// Endpoint path, which is also the cache key and the record array key.
    pub fn endpoint(&self) -> &'static str {
        match self {
            LookupKind::Locations => "locations",
            LookupKind::Positions => "positions",
            LookupKind::Users => "users",
        }
    }
}

impl Display for LookupKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.endpoint())
    }
}
