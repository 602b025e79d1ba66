//! Per-table view preferences.
//!
//! Column visibility, filtering, and sort order are presentation state,
//! so they live under their own `viewPrefs:<table>` keys rather than in
//! any project snapshot. Switching projects does not touch them.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::model::AssetColumn;
use crate::store::{read_or, write_json, KvStore, VIEW_PREFS_KEY_PREFIX};

/// Sort order for one table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SortSpec {
    pub column: AssetColumn,
    #[serde(default)]
    pub descending: bool,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewPrefs {
    #[serde(default)]
    pub hidden_columns: Vec<AssetColumn>,
    #[serde(default)]
    pub filter: String,
    #[serde(default)]
    pub sort: Option<SortSpec>,
}

fn prefs_key(table: &str) -> String {
    format!("{VIEW_PREFS_KEY_PREFIX}:{table}")
}

/// Stored preferences for `table`, defaults when absent or corrupt.
pub fn load_view_prefs(store: &dyn KvStore, table: &str) -> ViewPrefs {
    read_or(store, &prefs_key(table), ViewPrefs::default())
}

pub fn save_view_prefs(store: &dyn KvStore, table: &str, prefs: &ViewPrefs) -> Result<()> {
    write_json(store, &prefs_key(table), prefs)
}
