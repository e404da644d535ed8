//! Integration tests for the itam CLI
//!
//! These tests exercise the CLI commands end-to-end using assert_cmd.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

/// Helper to get an itam command isolated from the caller's environment
fn itam(tmp: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("itam").unwrap();
    cmd.current_dir(tmp.path())
        .env("XDG_CONFIG_HOME", tmp.path().join(".config"))
        .env("ITAM_LOGIN_DELAY_MS", "0")
        .env_remove("ITAM_DEFAULT_COMPANY")
        .env_remove("ITAM_MASTER_CODE")
        .env_remove("ITAM_LOCK_PIN")
        .env_remove("ITAM_IDLE_TIMEOUT_MINUTES")
        .env_remove("ITAM_PIN");
    cmd
}

/// Helper to create a workspace in a temp directory
fn setup_workspace() -> TempDir {
    let tmp = TempDir::new().unwrap();
    itam(&tmp).arg("init").assert().success();
    tmp
}

/// Helper to create a workspace with the seeded administrator logged in
fn setup_logged_in() -> TempDir {
    let tmp = setup_workspace();
    itam(&tmp)
        .args(["login", "admin", "--pin", "0000"])
        .assert()
        .success();
    tmp
}

fn add_collaborator(tmp: &TempDir, company: &str, first: &str, last: &str) {
    itam(tmp)
        .args([
            "-c",
            company,
            "collab",
            "new",
            "--first-name",
            first,
            "--last-name",
            last,
            "--email",
            &format!("{}@{}.test", first.to_lowercase(), company),
        ])
        .assert()
        .success();
}

fn add_equipment(tmp: &TempDir, company: &str, serial: &str) {
    itam(tmp)
        .args([
            "-c", company, "equip", "new", "--type", "Laptop", "--brand", "Dell", "--model",
            "Latitude 5440", "--serial", serial, "--ram", "16GB",
        ])
        .assert()
        .success();
}

// ============================================================================
// CLI Basic Tests
// ============================================================================

#[test]
fn test_help_displays() {
    let tmp = TempDir::new().unwrap();
    itam(&tmp)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("equip"))
        .stdout(predicate::str::contains("license"));
}

#[test]
fn test_unknown_command_fails() {
    let tmp = TempDir::new().unwrap();
    itam(&tmp).arg("frobnicate").assert().failure();
}

#[test]
fn test_commands_outside_workspace_fail() {
    let tmp = TempDir::new().unwrap();
    itam(&tmp)
        .args(["equip", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("itam init"));
}

// ============================================================================
// Init and Session Tests
// ============================================================================

#[test]
fn test_init_creates_workspace() {
    let tmp = setup_workspace();
    assert!(tmp.path().join(".itam").is_dir());
    assert!(tmp.path().join(".itam/config.yaml").exists());
}

#[test]
fn test_init_twice_is_harmless() {
    let tmp = setup_workspace();
    itam(&tmp)
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("already exists"));
}

#[test]
fn test_login_with_seeded_admin() {
    let tmp = setup_workspace();
    itam(&tmp)
        .args(["login", "ADMIN", "--pin", "0000"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Logged in as Administrator"));

    itam(&tmp)
        .args(["whoami"])
        .assert()
        .success()
        .stdout(predicate::str::contains("manage_users"));
}

#[test]
fn test_login_wrong_pin_fails() {
    let tmp = setup_workspace();
    itam(&tmp)
        .args(["login", "admin", "--pin", "9999"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid username or PIN"));

    itam(&tmp).arg("whoami").assert().failure();
}

#[test]
fn test_whoami_json_hides_pin() {
    let tmp = setup_logged_in();
    itam(&tmp)
        .args(["-f", "json", "whoami"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"username\": \"admin\""))
        .stdout(predicate::str::contains("0000").not());
}

#[test]
fn test_logout_ends_session() {
    let tmp = setup_logged_in();
    itam(&tmp)
        .arg("logout")
        .assert()
        .success()
        .stdout(predicate::str::contains("Logged out admin"));

    itam(&tmp)
        .args(["-c", "acme", "equip", "list"])
        .assert()
        .failure();
}

// ============================================================================
// Equipment and Collaborator Tests
// ============================================================================

#[test]
fn test_equipment_requires_company() {
    let tmp = setup_logged_in();
    itam(&tmp)
        .args([
            "equip", "new", "--type", "Laptop", "--brand", "Dell", "--model", "X", "--serial",
            "SN-1",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no company selected"));
}

#[test]
fn test_equipment_new_and_list() {
    let tmp = setup_logged_in();
    add_equipment(&tmp, "acme", "SN-100");

    itam(&tmp)
        .args(["-c", "acme", "equip", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("SN-100"))
        .stdout(predicate::str::contains("1 item(s) found."));

    itam(&tmp)
        .args(["-c", "globex", "equip", "list", "--count"])
        .assert()
        .success()
        .stdout("0\n");
}

#[test]
fn test_duplicate_serial_rejected_across_companies() {
    let tmp = setup_logged_in();
    add_equipment(&tmp, "acme", "SN-200");

    itam(&tmp)
        .args([
            "-c", "globex", "equip", "new", "--type", "Desktop", "--brand", "HP", "--model",
            "ProDesk", "--serial", "sn-200",
        ])
        .assert()
        .failure();
}

#[test]
fn test_assignment_writes_history() {
    let tmp = setup_logged_in();
    add_collaborator(&tmp, "acme", "Ana", "Torres");
    add_equipment(&tmp, "acme", "SN-300");

    itam(&tmp)
        .args(["equip", "update", "1", "--assign", "1"])
        .assert()
        .success();
    itam(&tmp)
        .args(["equip", "update", "1", "--unassign"])
        .assert()
        .success();

    itam(&tmp)
        .args(["equip", "history", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("CREATION"))
        .stdout(predicate::str::contains("ASSIGNMENT"))
        .stdout(predicate::str::contains("UNASSIGNMENT"));
}

#[test]
fn test_deleting_collaborator_releases_equipment() {
    let tmp = setup_logged_in();
    add_collaborator(&tmp, "acme", "Luis", "Rojas");
    add_equipment(&tmp, "acme", "SN-400");
    itam(&tmp)
        .args(["equip", "update", "1", "--assign", "1"])
        .assert()
        .success();

    itam(&tmp)
        .args(["collab", "delete", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1 piece(s) of equipment unassigned"));

    itam(&tmp)
        .args(["-f", "json", "equip", "show", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("assignedTo").not());
}

#[test]
fn test_collaborator_toggle() {
    let tmp = setup_logged_in();
    add_collaborator(&tmp, "acme", "Eva", "Mora");

    itam(&tmp)
        .args(["collab", "toggle", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("is now inactive"));

    itam(&tmp)
        .args(["-c", "acme", "collab", "list", "--count"])
        .assert()
        .success()
        .stdout("0\n");
}

// ============================================================================
// License and Maintenance Tests
// ============================================================================

#[test]
fn test_license_over_assignment_warns() {
    let tmp = setup_logged_in();
    add_collaborator(&tmp, "acme", "Ana", "Torres");
    add_collaborator(&tmp, "acme", "Luis", "Rojas");
    itam(&tmp)
        .args(["-c", "acme", "license", "new", "--name", "Office", "--slots", "1"])
        .assert()
        .success();

    itam(&tmp)
        .args(["license", "assign", "1", "--collaborator", "1", "--collaborator", "2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("now uses 2/1 slots"))
        .stderr(predicate::str::contains("uses 2 of 1 slots"));
}

#[test]
fn test_maintenance_ticket_lifecycle() {
    let tmp = setup_logged_in();
    add_equipment(&tmp, "acme", "SN-500");

    itam(&tmp)
        .args(["maint", "open", "1", "--title", "Broken screen", "--severity", "severe"])
        .assert()
        .success()
        .stdout(predicate::str::contains("is now Maintenance"));

    itam(&tmp)
        .args(["maint", "resolve", "1", "--details", "Panel replaced", "--ram", "32GB"])
        .assert()
        .success();

    itam(&tmp)
        .args(["maint", "resolve", "1", "--details", "again"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already closed"));

    itam(&tmp)
        .args(["maint", "deliver", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Delivered"));

    itam(&tmp)
        .args(["-c", "acme", "equip", "show", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("RAM: 32GB"));
}

// ============================================================================
// Credential and User Tests
// ============================================================================

#[test]
fn test_credential_passwords_masked_by_default() {
    let tmp = setup_logged_in();
    itam(&tmp)
        .args([
            "-c", "acme", "cred", "new", "--service", "VPN", "--username", "ops", "--password",
            "s3cret-pass",
        ])
        .assert()
        .success();

    itam(&tmp)
        .args(["-c", "acme", "cred", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("s3cret-pass").not());

    itam(&tmp)
        .args(["-c", "acme", "cred", "list", "--show-passwords"])
        .assert()
        .success()
        .stdout(predicate::str::contains("s3cret-pass"));
}

#[test]
fn test_consultant_cannot_create() {
    let tmp = setup_logged_in();
    itam(&tmp)
        .args(["user", "new", "carlos", "--name", "Carlos", "--pin", "3434"])
        .assert()
        .success();
    itam(&tmp)
        .args(["login", "carlos", "--pin", "3434"])
        .assert()
        .success();

    itam(&tmp)
        .args([
            "-c", "acme", "equip", "new", "--type", "Laptop", "--brand", "Dell", "--model", "X",
            "--serial", "SN-600",
        ])
        .assert()
        .failure();

    itam(&tmp)
        .args(["-c", "acme", "equip", "list"])
        .assert()
        .success();
}

#[test]
fn test_invalid_pin_rejected() {
    let tmp = setup_logged_in();
    itam(&tmp)
        .args(["user", "new", "maria", "--name", "Maria", "--pin", "12a4"])
        .assert()
        .failure();
}

#[test]
fn test_super_admin_cannot_be_deleted() {
    let tmp = setup_logged_in();
    itam(&tmp)
        .args(["user", "delete", "1"])
        .assert()
        .success()
        .stderr(predicate::str::contains("cannot be deleted"));

    itam(&tmp)
        .args(["-f", "id", "user", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1"));
}

#[test]
fn test_other_admin_needs_master_code_for_super_admin() {
    let tmp = setup_logged_in();
    itam(&tmp)
        .args(["user", "new", "maria", "--name", "Maria", "--role", "admin", "--pin", "1212"])
        .assert()
        .success();
    itam(&tmp)
        .args(["login", "maria", "--pin", "1212"])
        .assert()
        .success();

    itam(&tmp)
        .env("ITAM_MASTER_CODE", "8080")
        .args(["user", "edit", "1", "--name", "Root", "--master-code", "1111"])
        .assert()
        .failure();

    itam(&tmp)
        .env("ITAM_MASTER_CODE", "8080")
        .args(["user", "edit", "1", "--name", "Root", "--master-code", "8080"])
        .assert()
        .success();
}

#[test]
fn test_deleted_user_loses_session() {
    let tmp = setup_logged_in();
    itam(&tmp)
        .args(["user", "new", "maria", "--name", "Maria", "--role", "admin", "--pin", "1212"])
        .assert()
        .success();
    itam(&tmp)
        .args(["login", "maria", "--pin", "1212"])
        .assert()
        .success();
    itam(&tmp).args(["user", "delete", "2"]).assert().success();

    itam(&tmp)
        .args([
            "-c", "acme", "equip", "new", "--type", "Laptop", "--brand", "Dell", "--model", "X",
            "--serial", "SN-650",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not logged in"));
    itam(&tmp).arg("whoami").assert().failure();
}

#[test]
fn test_demoted_user_loses_admin_rights() {
    let tmp = setup_logged_in();
    itam(&tmp)
        .args(["user", "new", "maria", "--name", "Maria", "--role", "admin", "--pin", "1212"])
        .assert()
        .success();
    itam(&tmp)
        .args(["login", "maria", "--pin", "1212"])
        .assert()
        .success();
    itam(&tmp)
        .args(["user", "edit", "2", "--role", "consultant"])
        .assert()
        .success();

    itam(&tmp)
        .arg("whoami")
        .assert()
        .success()
        .stdout(predicate::str::contains("Consultant"))
        .stdout(predicate::str::contains("read-only"));
    itam(&tmp)
        .args(["user", "list"])
        .assert()
        .failure();
}

// ============================================================================
// Export and Report Tests
// ============================================================================

#[test]
fn test_export_writes_backup_file() {
    let tmp = setup_logged_in();
    add_equipment(&tmp, "acme", "SN-700");

    itam(&tmp)
        .args(["export", "--output-dir", "."])
        .assert()
        .success()
        .stdout(predicate::str::contains("inventory-backup-"));

    let backup = fs::read_dir(tmp.path())
        .unwrap()
        .filter_map(|e| e.ok())
        .find(|e| e.file_name().to_string_lossy().starts_with("inventory-backup-"))
        .expect("backup file written");
    let contents = fs::read_to_string(backup.path()).unwrap();
    assert!(contents.contains("SN-700"));
}

#[test]
fn test_equipment_report_csv() {
    let tmp = setup_logged_in();
    add_equipment(&tmp, "acme", "SN-800");

    itam(&tmp)
        .args(["-c", "acme", "report", "equipment"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("ID,Type,Brand,Model,Serial Number"))
        .stdout(predicate::str::contains("SN-800"));
}

#[test]
fn test_handover_document_to_file() {
    let tmp = setup_logged_in();
    add_collaborator(&tmp, "acme", "Ana", "Torres");
    add_equipment(&tmp, "acme", "SN-900");

    itam(&tmp)
        .args([
            "report",
            "handover",
            "--equipment",
            "1",
            "--collaborator",
            "1",
            "-o",
            "handover.md",
        ])
        .assert()
        .success();

    let doc = fs::read_to_string(tmp.path().join("handover.md")).unwrap();
    assert!(doc.contains("SN-900"));
    assert!(doc.contains("Ana Torres"));
}
