use assert_cmd::Command;
use dossier_store::{FolderId, FolderStore, MemoryStore, NewFolder};
use dossier_workflow::{ContractBook, DossierWorkspace, StaticOwners};
use predicates::prelude::*;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tempfile::{tempdir, TempDir};

struct Fixture {
    _dir: TempDir,
    snapshot: PathBuf,
    linked: FolderId,
    document: u64,
}

/// Workspace root with an archive holding ABC-VAO-0019, one dossier from 2024
/// holding a document and linked to ABC-VAO-0018, plus unassigned contracts.
/// No identifiers are bound until `bootstrap` runs.
fn fixture() -> Fixture {
    let dir = tempdir().unwrap();
    let snapshot = dir.path().join("dossier.json");

    let mut store = MemoryStore::new();
    let root = store.create(NewFolder::new("Dossieres de calidad")).unwrap().id;
    let archived = store.create(NewFolder::new("Archivado").parent(root)).unwrap().id;
    store
        .create(NewFolder::new("ABC-VAO-0019").parent(archived))
        .unwrap();
    let y2024 = store.create(NewFolder::new("2024").parent(root)).unwrap().id;
    let linked = store
        .create(NewFolder::new("ABC-VAO-0018").parent(y2024))
        .unwrap()
        .id;
    let planos = store
        .create(NewFolder::new("7.a Planos").parent(linked))
        .unwrap()
        .id;
    let document = store.add_document("plano-general.pdf", planos).unwrap().id;
    store.add_document("contrato.pdf", linked).unwrap();

    let mut book = ContractBook::new();
    let abc = book.insert("ABC-VAO-0018", None).unwrap();
    book.set_folder(abc, linked).unwrap();
    book.insert("XYZ-CON-0001", None).unwrap();
    let principal = book.insert("LSG-CN-PU-CON-0018", None).unwrap();
    book.insert("LSG-CN-PU-CON-0018A", Some(principal)).unwrap();

    let workspace = DossierWorkspace {
        store,
        book,
        owners: StaticOwners::default().with_role("dossier_manager", &["ana"]),
    };
    workspace.save(&snapshot).unwrap();

    Fixture {
        _dir: dir,
        snapshot,
        linked,
        document,
    }
}

#[allow(deprecated)]
fn dossier(snapshot: &Path) -> Command {
    let mut cmd = Command::cargo_bin("dossier").expect("binary");
    cmd.arg("--store").arg(snapshot).env_remove("RUST_LOG");
    cmd
}

fn run_json(snapshot: &Path, args: &[&str]) -> Value {
    let output = dossier(snapshot)
        .args(args)
        .arg("--json")
        .output()
        .expect("command run");

    assert!(
        output.status.success(),
        "stdout: {}\nstderr: {}",
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("valid json")
}

#[test]
fn parse_reports_every_part() {
    let dir = tempdir().unwrap();
    let parsed = run_json(&dir.path().join("unused.json"), &["parse", "lsg-cn-pu-con-0018d_03"]);
    assert_eq!(parsed["prefix"], "LSG-CN-PU");
    assert_eq!(parsed["type"], "CON");
    assert_eq!(parsed["digits"], "0018");
    assert_eq!(parsed["letter"], "D");
    assert_eq!(parsed["rev"], "03");

    let unstructured = run_json(&dir.path().join("unused.json"), &["parse", "PROYECTO"]);
    assert!(unstructured.is_null());
}

#[test]
fn candidates_are_printed_most_specific_first() {
    let dir = tempdir().unwrap();
    dossier(&dir.path().join("unused.json"))
        .args(["candidates", "LSG-CN-PU-CON-0018D_03"])
        .assert()
        .success()
        .stdout("LSG-CN-PU-CON-0018D\nLSG-CN-PU-CON-0018\n");
}

#[test]
fn similar_names_the_matching_stage() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("unused.json");

    let family = run_json(&path, &["similar", "KLV-682-03", "KLV-682-07"]);
    assert_eq!(family["similar"], true);
    assert_eq!(family["stage"], "family");

    let none = run_json(&path, &["similar", "ABC-VAO-0018", "XYZ-CON-0001"]);
    assert_eq!(none["similar"], false);
    assert!(none["stage"].is_null());
}

#[test]
fn bootstrap_then_assign_creates_the_dossier() {
    let fx = fixture();

    let report = run_json(&fx.snapshot, &["bootstrap", "--year", "2025"]);
    assert!(report["root"].is_u64());
    let bound: Vec<&str> = report["bound"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(Value::as_str)
        .collect();
    assert!(bound.contains(&"dossier.workspace_quality_dossiers"));
    assert!(bound.contains(&"dossier.folder_archived"));
    assert!(bound.contains(&"dossier.folder_year_2024"));
    assert!(bound.contains(&"dossier.folder_year_2025"));

    let assigned = run_json(&fx.snapshot, &["assign", "LSG-CN-PU-CON-0018", "--year", "2025"]);
    let outcome = &assigned["outcome"];
    assert_eq!(outcome["created"], true);
    assert_eq!(
        outcome["path"],
        "Dossieres de calidad / 2025 / LSG-CN-PU-CON-0018"
    );
    assert_eq!(outcome["structure"]["requests_created"], 22);

    let workspace = DossierWorkspace::load(&fx.snapshot).unwrap();
    let principal = workspace.book.find_by_name("LSG-CN-PU-CON-0018").unwrap();
    assert_eq!(
        principal.dossier_folder.map(|f| f.0),
        outcome["folder"]["id"].as_u64()
    );

    // The addendum now defaults to linking the principal's folder
    let addendum = run_json(&fx.snapshot, &["assign", "LSG-CN-PU-CON-0018A"]);
    assert_eq!(addendum["outcome"]["created"], false);
    assert_eq!(addendum["outcome"]["folder"]["id"], outcome["folder"]["id"]);

    let resolved = run_json(&fx.snapshot, &["resolve", "LSG-CN-PU-CON-0018A_02"]);
    assert_eq!(resolved["resolution"]["folder"]["id"], outcome["folder"]["id"]);
    assert_eq!(resolved["resolution"]["source"]["via"], "candidate");
}

#[test]
fn archived_dossiers_stay_hidden_after_bootstrap() {
    let fx = fixture();
    run_json(&fx.snapshot, &["bootstrap", "--year", "2025"]);

    let hidden = run_json(&fx.snapshot, &["resolve", "ABC-VAO-0019"]);
    assert!(hidden["resolution"].is_null());

    let live = run_json(&fx.snapshot, &["resolve", "ABC-VAO-0018"]);
    assert_eq!(live["path"], "Dossieres de calidad / 2024 / ABC-VAO-0018");
}

#[test]
fn state_is_shown_and_changed() {
    let fx = fixture();
    let shown = run_json(&fx.snapshot, &["state", "ABC-VAO-0018"]);
    assert_eq!(shown["state"], "en_proceso");

    let changed = run_json(&fx.snapshot, &["state", "ABC-VAO-0018", "aprobado"]);
    assert_eq!(changed["state"], "aprobado");
    let workspace = DossierWorkspace::load(&fx.snapshot).unwrap();
    assert_eq!(
        workspace.book.find_by_name("ABC-VAO-0018").unwrap().dossier_state.as_str(),
        "aprobado"
    );

    dossier(&fx.snapshot)
        .args(["state", "ABC-VAO-0018", "cerrado"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown dossier state"));
}

#[test]
fn warnings_list_documents_and_the_other_contract() {
    let fx = fixture();
    let linked = fx.linked.0.to_string();
    let warnings = run_json(
        &fx.snapshot,
        &["warnings", "XYZ-CON-0001", "--existing", &linked],
    );
    let kinds: Vec<&str> = warnings
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|w| w["kind"].as_str())
        .collect();
    assert_eq!(kinds, vec!["has_documents", "linked_to_other"]);
    assert_eq!(warnings[0]["count"], 1);
    assert_eq!(warnings[1]["contract"], "ABC-VAO-0018");
}

#[test]
fn dossier_of_a_document_walks_up_to_the_dossier() {
    let fx = fixture();
    run_json(&fx.snapshot, &["bootstrap", "--year", "2025"]);

    dossier(&fx.snapshot)
        .args(["dossier-of", "--document", &fx.document.to_string()])
        .assert()
        .success()
        .stdout("Dossieres de calidad / 2024 / ABC-VAO-0018\n");
}

#[test]
fn resolve_without_a_bound_workspace_fails() {
    let fx = fixture();
    dossier(&fx.snapshot)
        .args(["resolve", "ABC-VAO-0018"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Workspace root folder not found"));
}

#[test]
fn missing_snapshot_is_reported() {
    let dir = tempdir().unwrap();
    dossier(&dir.path().join("absent.json"))
        .args(["resolve", "ABC-VAO-0018"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load snapshot"));
}
