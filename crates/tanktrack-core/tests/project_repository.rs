use std::sync::Arc;

use tanktrack_core::model::{seed, Project, DEFAULT_PROJECT_ID};
use tanktrack_core::store::{JsonFileStore, MemoryStore, ACTIVE_PROJECT_KEY, PROJECTS_KEY};
use tanktrack_core::{KvStore, ProjectRepository, TankError};

fn load(store: &Arc<MemoryStore>) -> ProjectRepository {
    ProjectRepository::load(Arc::clone(store) as Arc<dyn KvStore>).expect("load should succeed")
}

#[test]
fn test_first_load_seeds_the_default_project() {
    let store = Arc::new(MemoryStore::new());
    let repo = load(&store);

    assert_eq!(repo.active_project_id(), DEFAULT_PROJECT_ID);
    assert_eq!(repo.active_project_name(), "Default Project");
    let snapshot = repo.snapshot();
    assert_eq!(snapshot.assets.len(), 5);
    assert_eq!(snapshot.repair_prices.len(), 6);
    assert!(snapshot.rules.is_empty());
    assert!(!repo.has_unsaved_changes());

    // The bootstrap repair is persisted, not just held in memory.
    let stored: Vec<Project> =
        serde_json::from_value(store.read_value(PROJECTS_KEY).expect("projects stored"))
            .expect("stored list decodes");
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].id, DEFAULT_PROJECT_ID);
}

#[test]
fn test_corrupt_project_list_falls_back_to_default() {
    let store = Arc::new(MemoryStore::new());
    store
        .write_value(PROJECTS_KEY, serde_json::json!({"oops": true}))
        .expect("write");
    let repo = load(&store);

    assert_eq!(repo.list_projects().len(), 1);
    assert_eq!(repo.active_project_id(), DEFAULT_PROJECT_ID);
}

#[test]
fn test_dangling_active_pointer_retargets_default() {
    let store = Arc::new(MemoryStore::new());
    {
        let repo = load(&store);
        repo.save_as_new("Survey 2026").expect("save");
    }
    store
        .write_value(ACTIVE_PROJECT_KEY, serde_json::Value::from("PROJ-gone"))
        .expect("write");

    let repo = load(&store);
    assert_eq!(repo.active_project_id(), DEFAULT_PROJECT_ID);
    // The repaired pointer is written back.
    assert_eq!(
        store.read_value(ACTIVE_PROJECT_KEY),
        Some(serde_json::Value::from(DEFAULT_PROJECT_ID))
    );
}

#[test]
fn test_save_as_new_appends_switches_and_persists() {
    let store = Arc::new(MemoryStore::new());
    let repo = load(&store);
    repo.update_assets(|assets| {
        assets.retain(|asset| asset.asset_id.starts_with("S-"));
        Ok(())
    })
    .expect("edit");

    let summary = repo.save_as_new("  Septic Only  ").expect("save");
    assert_eq!(summary.name, "Septic Only");
    assert!(summary.id.starts_with("PROJ-"));
    assert_eq!(repo.active_project_id(), summary.id);
    assert!(!repo.has_unsaved_changes());

    // A fresh load over the same store sees the saved project as active.
    let reloaded = load(&store);
    assert_eq!(reloaded.active_project_id(), summary.id);
    assert_eq!(reloaded.snapshot().assets.len(), 3);
}

#[test]
fn test_save_as_new_rejects_blank_names() {
    let store = Arc::new(MemoryStore::new());
    let repo = load(&store);
    assert!(matches!(
        repo.save_as_new("   "),
        Err(TankError::Validation(_))
    ));
    assert_eq!(repo.list_projects().len(), 1);
}

#[test]
fn test_switch_discards_unsaved_edits() {
    let store = Arc::new(MemoryStore::new());
    let repo = load(&store);
    let summary = repo.save_as_new("Survey 2026").expect("save");
    let saved_snapshot = repo.snapshot();

    repo.update_assets(|assets| {
        assets.clear();
        Ok(())
    })
    .expect("edit");
    assert!(repo.has_unsaved_changes());

    repo.switch_to(DEFAULT_PROJECT_ID).expect("switch");
    repo.switch_to(&summary.id).expect("switch back");

    // The stored snapshot wins in full; the cleared asset list is gone.
    assert_eq!(repo.snapshot(), saved_snapshot);
    assert!(!repo.has_unsaved_changes());
}

#[test]
fn test_update_current_saves_over_named_project() {
    let store = Arc::new(MemoryStore::new());
    let repo = load(&store);
    let summary = repo.save_as_new("Survey 2026").expect("save");

    repo.update_repair_prices(|prices| {
        prices.clear();
        Ok(())
    })
    .expect("edit");
    repo.update_current().expect("update");
    assert!(!repo.has_unsaved_changes());

    let reloaded = load(&store);
    assert_eq!(reloaded.active_project_id(), summary.id);
    assert!(reloaded.snapshot().repair_prices.is_empty());
}

#[test]
fn test_delete_active_project_fails_over_to_default() {
    let store = Arc::new(MemoryStore::new());
    let repo = load(&store);
    let summary = repo.save_as_new("Doomed").expect("save");
    assert_eq!(repo.active_project_id(), summary.id);

    repo.delete_project(&summary.id).expect("delete");

    assert_eq!(repo.active_project_id(), DEFAULT_PROJECT_ID);
    assert_eq!(repo.list_projects().len(), 1);
    assert_eq!(repo.snapshot().assets.len(), 5);
}

#[test]
fn test_cross_tab_delete_fails_peer_over_without_polling() {
    let store = Arc::new(MemoryStore::new());
    let tab_a = load(&store);
    let summary = tab_a.save_as_new("Shared").expect("save");

    let tab_b = load(&store);
    assert_eq!(tab_b.active_project_id(), summary.id);

    // Tab B has to leave the project before deleting it.
    tab_b.switch_to(DEFAULT_PROJECT_ID).expect("switch");
    // Tab A follows the shared pointer.
    assert_eq!(tab_a.active_project_id(), DEFAULT_PROJECT_ID);

    tab_a.switch_to(&summary.id).expect("switch back");
    tab_b.delete_project(&summary.id).expect("delete");

    assert_eq!(tab_a.active_project_id(), DEFAULT_PROJECT_ID);
    assert_eq!(tab_a.list_projects().len(), 1);
}

#[test]
fn test_cross_tab_switch_is_last_write_wins() {
    let store = Arc::new(MemoryStore::new());
    let tab_a = load(&store);
    let summary = tab_a.save_as_new("Shared").expect("save");
    tab_a.switch_to(DEFAULT_PROJECT_ID).expect("switch");

    let tab_b = load(&store);
    tab_b.switch_to(&summary.id).expect("remote switch");

    assert_eq!(tab_a.active_project_id(), summary.id);
    assert_eq!(tab_a.snapshot(), tab_b.snapshot());
}

#[test]
fn test_write_failure_surfaces_but_memory_survives() {
    let store = Arc::new(MemoryStore::new());
    let repo = load(&store);

    store.set_fail_writes(true);
    let result = repo.save_as_new("Unlucky");
    assert!(matches!(result, Err(TankError::Storage(_))));
    // Accepted degradation: the project exists in memory even though the
    // write was rejected.
    assert_eq!(repo.list_projects().len(), 2);

    store.set_fail_writes(false);
    let edited = repo.update_rules(|_| Ok(()));
    assert!(edited.is_ok());
}

#[test]
fn test_working_copy_resumes_across_loads() {
    let store = Arc::new(MemoryStore::new());
    {
        let repo = load(&store);
        repo.update_assets(|assets| {
            assets.truncate(1);
            Ok(())
        })
        .expect("edit");
    }

    let resumed = load(&store);
    assert_eq!(resumed.snapshot().assets.len(), 1);
    assert!(resumed.has_unsaved_changes());
}

#[test]
fn test_mutation_path_forces_cistern_sub_type() {
    use tanktrack_core::model::{AssetSubType, SystemType};

    let store = Arc::new(MemoryStore::new());
    let repo = load(&store);
    repo.update_assets(|assets| {
        // S-001 is a septic tank; flipping the system type must drag the
        // sub-type along.
        assets[1].system_type = SystemType::Cistern;
        Ok(())
    })
    .expect("edit");

    let snapshot = repo.snapshot();
    assert_eq!(snapshot.assets[1].system_type, SystemType::Cistern);
    assert_eq!(snapshot.assets[1].asset_sub_type, AssetSubType::Cistern);
}

#[test]
fn test_reset_to_defaults_restores_seed_data() {
    let store = Arc::new(MemoryStore::new());
    let repo = load(&store);
    repo.update_assets(|assets| {
        assets.clear();
        Ok(())
    })
    .expect("edit");

    repo.reset_to_defaults().expect("reset");
    assert_eq!(repo.snapshot(), seed::default_snapshot());
}

#[test]
fn test_repository_over_json_file_store_persists_to_disk() {
    let dir = tempfile::tempdir().expect("tempdir");
    let summary = {
        let store: Arc<dyn KvStore> =
            Arc::new(JsonFileStore::open(dir.path()).expect("open store"));
        let repo = ProjectRepository::load(store).expect("load");
        repo.save_as_new("On Disk").expect("save")
    };

    let store: Arc<dyn KvStore> = Arc::new(JsonFileStore::open(dir.path()).expect("reopen store"));
    let repo = ProjectRepository::load(store).expect("reload");
    assert_eq!(repo.active_project_id(), summary.id);
    assert_eq!(repo.active_project_name(), "On Disk");
}
