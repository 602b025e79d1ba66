//! Recommendation engine client and result reconciliation.
//!
//! The engine itself is a remote service; this module owns the wire
//! records, the [`RecommendationEngine`] seam, and the logic that merges
//! engine output back into an asset list without letting one bad item
//! poison a batch.

mod http;

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::model::{render_rules, Asset, CostBreakdownItem, RemainingLife, RepairPrice, Rule};

pub use http::HttpEngine;

/// Batch recommendation request: every asset plus the user's rules
/// rendered as plain language.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationRequest {
    pub assets: Vec<Asset>,
    pub rules: String,
}

impl RecommendationRequest {
    pub fn for_snapshot(assets: &[Asset], rules: &[Rule]) -> Self {
        Self {
            assets: assets.to_vec(),
            rules: render_rules(rules),
        }
    }
}

/// One asset's recommendation: repair lines plus an estimated remaining
/// life band.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetRecommendation {
    pub asset_id: String,
    pub recommendation: Vec<String>,
    #[serde(default)]
    pub estimated_remaining_life: Option<RemainingLife>,
}

/// A per-asset failure reported by the engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetFailure {
    pub asset_id: String,
    pub error: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationResponse {
    pub recommendations: Vec<AssetRecommendation>,
    #[serde(default)]
    pub errors: Vec<AssetFailure>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CostRequestAsset {
    pub asset_id: String,
    pub user_recommendation: Vec<String>,
}

/// Cost estimation request: the recommendations to price and the repair
/// catalog to price them against.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CostRequest {
    pub assets: Vec<CostRequestAsset>,
    pub repair_prices: Vec<RepairPrice>,
}

/// One asset's priced recommendation. `recommended_repair_type` names
/// the catalog entries the total was built from; it is report-level
/// detail and is not written back onto the asset.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetCost {
    pub asset_id: String,
    pub recommended_repair_type: Vec<String>,
    pub estimated_cost: f64,
    pub needs_price: bool,
    #[serde(default)]
    pub cost_breakdown: Vec<CostBreakdownItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CostResponse {
    pub costs: Vec<AssetCost>,
}

/// Seam to the remote recommendation engine. Object safe so the CLI can
/// hold `Box<dyn RecommendationEngine>` and tests can substitute fakes.
pub trait RecommendationEngine: Send + Sync {
    fn recommend_repairs(&self, request: &RecommendationRequest) -> Result<RecommendationResponse>;

    fn generate_costs(&self, request: &CostRequest) -> Result<CostResponse>;
}

/// Outcome of applying a batch of engine results.
#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    pub applied: Vec<String>,
    pub failures: Vec<AssetFailure>,
}

impl BatchReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Merge a recommendation response into `assets`.
///
/// Assets named in `recommendations` get their recommendation and
/// remaining-life estimate replaced. Assets named in `errors`, and
/// assets the response is silent about, become per-asset failures; their
/// fields are left as they were.
pub fn apply_recommendations(
    assets: &mut [Asset],
    response: &RecommendationResponse,
) -> BatchReport {
    let mut report = BatchReport::default();
    for recommendation in &response.recommendations {
        match assets
            .iter_mut()
            .find(|asset| asset.asset_id == recommendation.asset_id)
        {
            Some(asset) => {
                asset.recommendation = recommendation.recommendation.clone();
                asset.estimated_remaining_life = recommendation.estimated_remaining_life;
                report.applied.push(recommendation.asset_id.clone());
            }
            None => {
                tracing::warn!(asset_id = %recommendation.asset_id, "recommendation for unknown asset");
            }
        }
    }
    report.failures.extend(response.errors.iter().cloned());
    for asset in assets.iter() {
        let mentioned = report.applied.iter().any(|id| *id == asset.asset_id)
            || response
                .errors
                .iter()
                .any(|failure| failure.asset_id == asset.asset_id);
        if !mentioned {
            report.failures.push(AssetFailure {
                asset_id: asset.asset_id.clone(),
                error: "no recommendation returned".to_string(),
            });
        }
    }
    report
}

/// The settled result of pricing one asset.
#[derive(Debug, Clone)]
pub struct CostOutcome {
    pub asset_id: String,
    pub outcome: std::result::Result<AssetCost, String>,
}

/// The recommendation lines the cost request should price: the user's
/// override when present, the engine's otherwise.
pub fn effective_recommendation(asset: &Asset) -> &[String] {
    if asset.user_recommendation.is_empty() {
        &asset.recommendation
    } else {
        &asset.user_recommendation
    }
}

/// Price each asset with one engine call apiece and collect every
/// settled outcome. A failing call records a failure for its asset and
/// the batch carries on. Assets with no recommendation to price are
/// skipped entirely.
pub fn generate_costs_settled(
    engine: &dyn RecommendationEngine,
    assets: &[Asset],
    repair_prices: &[RepairPrice],
) -> Vec<CostOutcome> {
    let mut outcomes = Vec::new();
    for asset in assets {
        let recommendation = effective_recommendation(asset);
        if recommendation.is_empty() {
            continue;
        }
        let request = CostRequest {
            assets: vec![CostRequestAsset {
                asset_id: asset.asset_id.clone(),
                user_recommendation: recommendation.to_vec(),
            }],
            repair_prices: repair_prices.to_vec(),
        };
        let outcome = match engine.generate_costs(&request) {
            Ok(response) => response
                .costs
                .into_iter()
                .find(|cost| cost.asset_id == asset.asset_id)
                .ok_or_else(|| "no cost returned".to_string()),
            Err(err) => Err(err.to_string()),
        };
        outcomes.push(CostOutcome {
            asset_id: asset.asset_id.clone(),
            outcome,
        });
    }
    outcomes
}

/// Merge settled cost outcomes into `assets`.
pub fn apply_costs(assets: &mut [Asset], outcomes: &[CostOutcome]) -> BatchReport {
    let mut report = BatchReport::default();
    for settled in outcomes {
        match &settled.outcome {
            Ok(cost) => {
                match assets
                    .iter_mut()
                    .find(|asset| asset.asset_id == cost.asset_id)
                {
                    Some(asset) => {
                        asset.ai_estimated_cost = Some(cost.estimated_cost);
                        asset.needs_price = cost.needs_price;
                        asset.cost_breakdown = cost.cost_breakdown.clone();
                        report.applied.push(cost.asset_id.clone());
                    }
                    None => {
                        tracing::warn!(asset_id = %cost.asset_id, "cost for unknown asset");
                    }
                }
            }
            Err(error) => report.failures.push(AssetFailure {
                asset_id: settled.asset_id.clone(),
                error: error.clone(),
            }),
        }
    }
    report
}

/// Hands out monotonically increasing tickets; only the most recently
/// issued ticket is current. Callers discard responses whose ticket has
/// been superseded instead of overwriting newer state.
///
/// The bundled CLI runs one request per invocation and does not need
/// this; it exists for interactive front-ends that can have several
/// requests in flight.
#[derive(Debug, Default)]
pub struct RequestSequencer {
    latest: AtomicU64,
}

impl RequestSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a request, superseding all earlier tickets.
    pub fn begin(&self) -> u64 {
        self.latest.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn is_current(&self, ticket: u64) -> bool {
        self.latest.load(Ordering::SeqCst) == ticket
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::seed::seed_assets;

    #[test]
    fn test_silent_asset_becomes_implicit_failure() {
        let mut assets = seed_assets();
        let response = RecommendationResponse {
            recommendations: vec![AssetRecommendation {
                asset_id: "C-001".to_string(),
                recommendation: vec!["No action required.".to_string()],
                estimated_remaining_life: Some(RemainingLife::Years20To25),
            }],
            errors: vec![AssetFailure {
                asset_id: "S-001".to_string(),
                error: "model refused".to_string(),
            }],
        };
        let report = apply_recommendations(&mut assets, &response);
        assert_eq!(report.applied, vec!["C-001".to_string()]);
        // S-002, C-002, S-003 were never mentioned.
        assert_eq!(report.failures.len(), 4);
        assert!(report
            .failures
            .iter()
            .any(|f| f.asset_id == "S-002" && f.error == "no recommendation returned"));
    }

    #[test]
    fn test_user_recommendation_wins_over_engine_output() {
        let mut asset = seed_assets().remove(0);
        asset.recommendation = vec!["engine line".to_string()];
        asset.user_recommendation = vec!["user line".to_string()];
        assert_eq!(effective_recommendation(&asset), ["user line".to_string()]);
    }

    #[test]
    fn test_stale_ticket_is_not_current() {
        let sequencer = RequestSequencer::new();
        let first = sequencer.begin();
        let second = sequencer.begin();
        assert!(!sequencer.is_current(first));
        assert!(sequencer.is_current(second));
    }
}
