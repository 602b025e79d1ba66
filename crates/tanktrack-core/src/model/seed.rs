//! Built-in sample data used to seed the default project.

use chrono::{DateTime, Utc};

use super::asset::{
    Abandoned, Asset, AssetSubType, ConditionScore, Material, Measurement, SystemType,
    YearInstalled,
};
use super::{Project, RepairPrice, Snapshot, DEFAULT_PROJECT_ID};

fn seed_asset(
    asset_id: &str,
    address: &str,
    year: i32,
    material: Material,
    setback_water: f64,
    setback_house: f64,
    bury_depth: f64,
    opening_size: f64,
    collar_height: f64,
    system_type: SystemType,
    sub_type: AssetSubType,
    scores: [u8; 5],
    field_notes: &str,
) -> Asset {
    Asset {
        asset_id: asset_id.to_string(),
        address: address.to_string(),
        year_installed: YearInstalled::Year(year),
        material,
        setback_from_water_source: Measurement::Metres(setback_water),
        setback_from_house: Measurement::Metres(setback_house),
        tank_bury_depth: Measurement::Metres(bury_depth),
        opening_size: Measurement::Metres(opening_size),
        above_ground_collar_height: Measurement::Metres(collar_height),
        system_type,
        asset_sub_type: sub_type,
        site_condition: ConditionScore::Rated(scores[0]),
        cover_condition: ConditionScore::Rated(scores[1]),
        collar_condition: ConditionScore::Rated(scores[2]),
        interior_condition: ConditionScore::Rated(scores[3]),
        overall_condition: ConditionScore::Rated(scores[4]),
        abandoned: Abandoned::No,
        field_notes: field_notes.to_string(),
        recommendation: Vec::new(),
        user_recommendation: Vec::new(),
        ai_estimated_cost: None,
        user_verified_cost: None,
        needs_price: false,
        cost_breakdown: Vec::new(),
        estimated_remaining_life: None,
    }
}

/// The built-in sample assets.
pub fn seed_assets() -> Vec<Asset> {
    vec![
        seed_asset(
            "C-001",
            "123 Willow Creek Rd",
            2015,
            Material::Concrete,
            30.0,
            15.0,
            1.2,
            0.6,
            0.2,
            SystemType::Cistern,
            AssetSubType::Cistern,
            [5, 4, 5, 5, 5],
            "System appears in good condition.",
        ),
        seed_asset(
            "S-001",
            "456 Oak Hollow Ln",
            2008,
            Material::Polyethylene,
            50.0,
            20.0,
            1.5,
            0.7,
            0.1,
            SystemType::SepticTank,
            AssetSubType::PumpOut,
            [4, 3, 4, 3, 3],
            "Cover has minor cracks. Effluent levels normal.",
        ),
        seed_asset(
            "S-002",
            "789 Pine Ridge Trl",
            1999,
            Material::Concrete,
            45.0,
            10.0,
            1.0,
            0.6,
            0.3,
            SystemType::SepticTank,
            AssetSubType::SepticField,
            [2, 2, 3, 2, 2],
            "Lid is damaged. Visible roots near tank. Signs of past overflows.",
        ),
        seed_asset(
            "C-002",
            "321 Maple Grove Ave",
            2020,
            Material::Fibreglass,
            60.0,
            25.0,
            1.8,
            0.5,
            0.2,
            SystemType::Cistern,
            AssetSubType::Cistern,
            [5, 5, 5, 5, 5],
            "New installation. Excellent condition.",
        ),
        seed_asset(
            "S-003",
            "654 Birchwood Dr",
            2012,
            Material::Polyethylene,
            35.0,
            18.0,
            1.3,
            0.7,
            0.15,
            SystemType::SepticTank,
            AssetSubType::Mound,
            [4, 4, 4, 4, 4],
            "No issues noted during last inspection.",
        ),
    ]
}

/// The built-in repair price catalog.
pub fn seed_repair_prices() -> Vec<RepairPrice> {
    let entries = [
        (
            "REPAIR-01",
            "Pump Seal Replacement",
            500.0,
            "Replacement of the main pump seal to prevent leaks.",
        ),
        (
            "REPAIR-02",
            "Pump Impeller Replacement",
            1200.0,
            "Full replacement of the pump impeller assembly.",
        ),
        (
            "REPAIR-03",
            "Valve Gasket Replacement",
            250.0,
            "Replacement of worn gaskets on primary valves.",
        ),
        (
            "REPAIR-04",
            "Pipe Patching (per foot)",
            150.0,
            "Minor pipe repair for small cracks or holes. Price is per linear foot.",
        ),
        (
            "REPAIR-05",
            "Full Pipe Section Replacement (per foot)",
            400.0,
            "Complete replacement of a damaged pipe section. Price is per linear foot.",
        ),
        (
            "REPAIR-06",
            "Tank Relining",
            5000.0,
            "Application of a new interior lining to a concrete tank to seal cracks and prevent leaks.",
        ),
    ];
    entries
        .into_iter()
        .map(|(id, repair_type, unit_price, description)| RepairPrice {
            id: id.to_string(),
            repair_type: repair_type.to_string(),
            unit_price,
            description: description.to_string(),
        })
        .collect()
}

/// The seed snapshot of the default project: sample assets and prices,
/// no rules.
pub fn default_snapshot() -> Snapshot {
    Snapshot::new(seed_assets(), seed_repair_prices(), Vec::new())
}

/// The bootstrap project. Recreated whenever the store has no project
/// list, and restored verbatim by a defaults reset.
pub fn default_project() -> Project {
    Project {
        id: DEFAULT_PROJECT_ID.to_string(),
        name: "Default Project".to_string(),
        // Fixed stamp so two bootstrapping tabs produce identical records.
        created_at: DateTime::<Utc>::UNIX_EPOCH,
        snapshot: default_snapshot(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_snapshot_satisfies_invariants() {
        default_snapshot().validate().expect("seed data is valid");
    }

    #[test]
    fn test_default_project_is_stable() {
        let a = default_project();
        let b = default_project();
        assert_eq!(a, b);
        assert!(a.is_default());
    }
}
