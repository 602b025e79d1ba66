use tanktrack_core::engine::{
    apply_costs, apply_recommendations, generate_costs_settled, BatchReport, RecommendationRequest,
};

use crate::app::AppContext;
use crate::output::{costs_table, print_failures};

pub fn handle_recommend(ctx: &AppContext, endpoint: Option<String>) -> anyhow::Result<()> {
    let engine = ctx.open_engine(endpoint)?;
    let repo = ctx.open_repository()?;
    let snapshot = repo.snapshot();
    if snapshot.assets.is_empty() {
        anyhow::bail!("The active project has no assets");
    }

    if !ctx.quiet {
        println!(
            "Requesting recommendations for {} asset(s)...",
            snapshot.assets.len()
        );
    }
    let request = RecommendationRequest::for_snapshot(&snapshot.assets, &snapshot.rules);
    let response = engine.recommend_repairs(&request)?;

    let mut report = BatchReport::default();
    repo.update_assets(|assets| {
        report = apply_recommendations(assets, &response);
        Ok(())
    })?;

    for asset in repo.snapshot().assets {
        if report.applied.contains(&asset.asset_id) {
            println!("{}:", asset.asset_id);
            for line in &asset.recommendation {
                println!("  - {line}");
            }
            if let Some(band) = asset.estimated_remaining_life {
                println!("  remaining life: {band}");
            }
        }
    }
    print_failures(&report.failures);
    Ok(())
}

pub fn handle_costs(ctx: &AppContext, endpoint: Option<String>) -> anyhow::Result<()> {
    let engine = ctx.open_engine(endpoint)?;
    let repo = ctx.open_repository()?;
    let snapshot = repo.snapshot();

    let outcomes = generate_costs_settled(engine.as_ref(), &snapshot.assets, &snapshot.repair_prices);
    if outcomes.is_empty() {
        anyhow::bail!("No assets have recommendations to price; run `tanktrack recommend` first");
    }

    let mut report = BatchReport::default();
    repo.update_assets(|assets| {
        report = apply_costs(assets, &outcomes);
        Ok(())
    })?;

    println!("{}", costs_table(&outcomes));
    print_failures(&report.failures);
    Ok(())
}
