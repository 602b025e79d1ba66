//! Table and JSON rendering for the CLI.

use comfy_table::presets::UTF8_FULL;
use comfy_table::{ContentArrangement, Table};

use tanktrack_core::engine::{AssetFailure, CostOutcome};
use tanktrack_core::model::{Asset, ProjectSummary, RepairPrice};

fn base_table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header);
    table
}

pub fn projects_table(projects: &[ProjectSummary], active_id: &str) -> Table {
    let mut table = base_table(vec!["", "ID", "Name", "Created"]);
    for project in projects {
        let marker = if project.id == active_id { "*" } else { "" };
        table.add_row(vec![
            marker.to_string(),
            project.id.clone(),
            project.name.clone(),
            project.created_at.format("%Y-%m-%d").to_string(),
        ]);
    }
    table
}

pub fn assets_table(assets: &[Asset]) -> Table {
    let mut table = base_table(vec![
        "ID",
        "Address",
        "Year",
        "Material",
        "Type",
        "Sub-type",
        "Overall",
        "Remaining life",
        "Est. cost",
    ]);
    for asset in assets {
        table.add_row(vec![
            asset.asset_id.clone(),
            asset.address.clone(),
            asset.year_installed.to_string(),
            asset.material.as_str().to_string(),
            asset.system_type.as_str().to_string(),
            asset.asset_sub_type.as_str().to_string(),
            asset.overall_condition.to_string(),
            asset
                .estimated_remaining_life
                .map(|band| band.to_string())
                .unwrap_or_else(|| "-".to_string()),
            asset
                .ai_estimated_cost
                .map(|cost| format!("${cost:.2}"))
                .unwrap_or_else(|| "-".to_string()),
        ]);
    }
    table
}

pub fn prices_table(prices: &[RepairPrice]) -> Table {
    let mut table = base_table(vec!["ID", "Repair type", "Unit price", "Description"]);
    for price in prices {
        table.add_row(vec![
            price.id.clone(),
            price.repair_type.clone(),
            format!("${:.2}", price.unit_price),
            price.description.clone(),
        ]);
    }
    table
}

pub fn costs_table(outcomes: &[CostOutcome]) -> Table {
    let mut table = base_table(vec!["Asset", "Repair types", "Est. cost", "Needs price"]);
    for settled in outcomes {
        match &settled.outcome {
            Ok(cost) => {
                table.add_row(vec![
                    cost.asset_id.clone(),
                    cost.recommended_repair_type.join(", "),
                    format!("${:.2}", cost.estimated_cost),
                    if cost.needs_price { "yes" } else { "no" }.to_string(),
                ]);
            }
            Err(error) => {
                table.add_row(vec![
                    settled.asset_id.clone(),
                    format!("failed: {error}"),
                    "-".to_string(),
                    "-".to_string(),
                ]);
            }
        }
    }
    table
}

pub fn print_failures(failures: &[AssetFailure]) {
    if failures.is_empty() {
        return;
    }
    eprintln!("{} asset(s) were not updated:", failures.len());
    for failure in failures {
        eprintln!("  {}: {}", failure.asset_id, failure.error);
    }
}

pub fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
