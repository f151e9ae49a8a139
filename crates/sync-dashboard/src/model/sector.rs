use serde::{Deserialize, Serialize};
use sync_framework::SyncResource;

/// An organisational sector. News, documents and teams hang off a sector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sector {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub location_id: Option<u64>,
    pub active: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SectorStats {
    pub total: u64,
    pub active: u64,
}

/// The `sectors` endpoint.
pub struct Sectors;

impl SyncResource for Sectors {
    type Record = Sector;
    type Stats = SectorStats;

    fn endpoint() -> &'static str {
        "sectors"
    }
}
