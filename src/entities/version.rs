// 🕒 Version Snapshots
//
// A snapshot is a deep copy of the property and the repair budgets.
// History is capped at MAX_VERSIONS; the oldest entry is evicted first.

use super::property::PropertyRecord;
use super::repair::RepairBudgetMap;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const MAX_VERSIONS: usize = 50;

/// How many versions the history view shows.
pub const RECENT_VERSIONS: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionSnapshot {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub property_data: PropertyRecord,
    pub repair_budgets: RepairBudgetMap,
    #[serde(default)]
    pub client_id: Option<String>,
    #[serde(default)]
    pub user_note: String,
}

impl VersionSnapshot {
    pub fn capture(
        property: &PropertyRecord,
        budgets: &RepairBudgetMap,
        client_id: Option<String>,
    ) -> Self {
        let now = Utc::now();
        VersionSnapshot {
            id: uuid::Uuid::new_v4().to_string(),
            timestamp: now,
            property_data: property.clone(),
            repair_budgets: budgets.clone(),
            client_id,
            user_note: format!("Version saved at {}", now.format("%Y-%m-%d %H:%M:%S UTC")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VersionHistory {
    entries: Vec<VersionSnapshot>,
}

impl VersionHistory {
    pub fn new() -> Self {
        VersionHistory::default()
    }

    /// Rebuild from persisted entries, keeping only the newest MAX_VERSIONS.
    pub fn from_entries(mut entries: Vec<VersionSnapshot>) -> Self {
        if entries.len() > MAX_VERSIONS {
            entries.drain(..entries.len() - MAX_VERSIONS);
        }
        VersionHistory { entries }
    }

    /// Append a snapshot. Returns the evicted snapshot when the cap was hit.
    pub fn push(&mut self, snapshot: VersionSnapshot) -> Option<VersionSnapshot> {
        self.entries.push(snapshot);
        if self.entries.len() > MAX_VERSIONS {
            Some(self.entries.remove(0))
        } else {
            None
        }
    }

    pub fn get(&self, id: &str) -> Option<&VersionSnapshot> {
        self.entries.iter().find(|v| v.id == id)
    }

    pub fn remove(&mut self, id: &str) -> Option<VersionSnapshot> {
        let index = self.entries.iter().position(|v| v.id == id)?;
        Some(self.entries.remove(index))
    }

    /// Newest first, at most RECENT_VERSIONS.
    pub fn recent(&self) -> Vec<&VersionSnapshot> {
        self.entries.iter().rev().take(RECENT_VERSIONS).collect()
    }

    pub fn latest(&self) -> Option<&VersionSnapshot> {
        self.entries.last()
    }

    pub fn entries(&self) -> &[VersionSnapshot] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
