//! Core data types: assets, repair prices, rules, snapshots, projects.

pub mod asset;
pub mod rule;
pub mod seed;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Result, TankError};

pub use asset::{
    next_asset_id, Abandoned, Asset, AssetSubType, ConditionScore, CostBreakdownItem, Material,
    Measurement, RemainingLife, SystemType, YearInstalled,
};
pub use rule::{
    render_rules, AssetColumn, ColumnKind, Combinator, Condition, ConditionValue, Operator, Rule,
    RuleOutcome,
};

/// Reserved id of the bootstrap project. It always exists and cannot be
/// deleted or saved over.
pub const DEFAULT_PROJECT_ID: &str = "default";

/// Current snapshot schema version. Stored snapshots without a version are
/// treated as version 1.
pub const SNAPSHOT_SCHEMA_VERSION: u32 = 1;

fn default_schema_version() -> u32 {
    SNAPSHOT_SCHEMA_VERSION
}

/// A repair catalog entry. Unique by id; duplicate repair type names are
/// permitted but discouraged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepairPrice {
    pub id: String,
    pub repair_type: String,
    pub unit_price: f64,
    #[serde(default)]
    pub description: String,
}

impl RepairPrice {
    pub fn validate(&self) -> Result<()> {
        if self.unit_price.is_nan() || self.unit_price < 0.0 {
            return Err(TankError::Validation(format!(
                "Repair price {} has a negative or non-numeric unit price",
                self.id
            )));
        }
        Ok(())
    }
}

/// The combined state owned by one project: the unit of atomic persistence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    pub assets: Vec<Asset>,
    pub repair_prices: Vec<RepairPrice>,
    pub rules: Vec<Rule>,
}

impl Snapshot {
    pub fn new(assets: Vec<Asset>, repair_prices: Vec<RepairPrice>, rules: Vec<Rule>) -> Self {
        Self {
            schema_version: SNAPSHOT_SCHEMA_VERSION,
            assets,
            repair_prices,
            rules,
        }
    }

    pub fn empty() -> Self {
        Self::new(Vec::new(), Vec::new(), Vec::new())
    }

    /// Check every collection invariant: asset records valid with unique
    /// ids, prices non-negative, rules well-formed.
    pub fn validate(&self) -> Result<()> {
        let mut seen = std::collections::HashSet::new();
        for asset in &self.assets {
            asset.validate()?;
            if !seen.insert(asset.asset_id.as_str()) {
                return Err(TankError::Validation(format!(
                    "Duplicate asset id: {}",
                    asset.asset_id
                )));
            }
        }
        for price in &self.repair_prices {
            price.validate()?;
        }
        for rule in &self.rules {
            rule.validate()?;
        }
        Ok(())
    }
}

/// A named, persisted register: the unit of switching.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: String,
    pub name: String,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    pub snapshot: Snapshot,
}

impl Project {
    pub fn is_default(&self) -> bool {
        self.id == DEFAULT_PROJECT_ID
    }
}

/// UI-level project summary, without the snapshot payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectSummary {
    pub id: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

impl From<&Project> for ProjectSummary {
    fn from(project: &Project) -> Self {
        Self {
            id: project.id.clone(),
            name: project.name.clone(),
            created_at: project.created_at,
        }
    }
}
