// CLI behavior, offline commands and a login round trip against a mock backend

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn geotnb(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("geotnb").unwrap();
    cmd.current_dir(dir.path()).env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_no_subcommand_shows_usage() {
    let dir = TempDir::new().unwrap();
    geotnb(&dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("GeoTNB"))
        .stdout(predicate::str::contains("geotnb tnb"));
}

#[test]
fn test_help_lists_commands() {
    let dir = TempDir::new().unwrap();
    geotnb(&dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("can-transition"))
        .stdout(predicate::str::contains("request-transition"));
}

#[test]
fn test_tnb_for_zone() {
    let dir = TempDir::new().unwrap();
    geotnb(&dir)
        .args(["tnb", "--surface", "500", "--zone", "R1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("5000.00 DH"));
}

#[test]
fn test_tnb_with_share_and_exemption() {
    let dir = TempDir::new().unwrap();
    geotnb(&dir)
        .args(["tnb", "--surface", "1000", "--zone", "c1", "--quota", "0.25"])
        .assert()
        .success()
        .stdout(predicate::str::contains("3750.00 DH"));

    geotnb(&dir)
        .args(["tnb", "--surface", "1000", "--zone", "R1", "--exemption", "3"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Exonéré"));
}

#[test]
fn test_tnb_rejects_invalid_input() {
    let dir = TempDir::new().unwrap();
    geotnb(&dir)
        .args(["tnb", "--surface", "0", "--zone", "R1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("positive"));

    geotnb(&dir)
        .args(["tnb", "--surface", "100", "--zone", "Z9"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Z9"));
}

#[test]
fn test_reader_permissions_are_read_only() {
    let dir = TempDir::new().unwrap();
    geotnb(&dir)
        .args(["permissions", "LECTEUR"])
        .assert()
        .success()
        .stdout(predicate::str::contains("parcelle:read"))
        .stdout(predicate::str::contains("parcelle:validate").not());
}

#[test]
fn test_can_transition_verdicts() {
    let dir = TempDir::new().unwrap();
    geotnb(&dir)
        .args(["can-transition", "--from", "Brouillon", "--to", "Valide", "--role", "TECHNICIEN_SIG"])
        .assert()
        .success()
        .stdout(predicate::str::contains("allowed"));

    geotnb(&dir)
        .args(["can-transition", "--from", "Archive", "--to", "Brouillon", "--role", "ADMIN"])
        .assert()
        .success()
        .stdout(predicate::str::contains("denied"));
}

#[test]
fn test_legacy_state_is_rejected() {
    let dir = TempDir::new().unwrap();
    geotnb(&dir)
        .args(["can-transition", "--from", "En_attente", "--to", "Valide", "--role", "ADMIN"])
        .assert()
        .failure();
}

#[test]
fn test_validate_reports_every_failure() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("parcelle.json");
    std::fs::write(
        &file,
        json!({
            "reference_fonciere": "TF-77/R",
            "surface_imposable": 0.0,
            "zonage": "R3",
            "etat_validation": "Brouillon"
        })
        .to_string(),
    )
    .unwrap();

    geotnb(&dir)
        .args(["validate", "--file", "parcelle.json", "--to", "Valide"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("surface imposable"))
        .stdout(predicate::str::contains("propriétaire"))
        .stdout(predicate::str::contains("géométrie"));
}

#[test]
fn test_export_csv_from_file() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join("parcelles.json"),
        json!([{
            "reference_fonciere": "TF-5/R",
            "surface_totale": 500.0,
            "surface_imposable": 500.0,
            "zonage": "R1",
            "montant_total_tnb": 5000.0,
            "etat_validation": "Valide"
        }])
        .to_string(),
    )
    .unwrap();

    geotnb(&dir)
        .args(["export", "--input", "parcelles.json", "--output", "out.csv"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Exported 1 parcel"));

    let content = std::fs::read_to_string(dir.path().join("out.csv")).unwrap();
    assert!(content.contains("reference_fonciere;surface_totale"));
    assert!(content.contains("TF-5/R;"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_login_then_request_transition_refused_locally() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "cli-token",
            "user": {"id": 4, "username": "lina", "role": "LECTEUR"}
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/parcelles/12"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 12,
            "reference_fonciere": "TF-12/R",
            "surface_imposable": 300.0,
            "zonage": "R2",
            "etat_validation": "Brouillon"
        })))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let uri = server.uri();
    let token_file = dir.path().join("session.json");

    let login = {
        let (dir_path, uri, token_file) = (dir.path().to_path_buf(), uri.clone(), token_file.clone());
        tokio::task::spawn_blocking(move || {
            Command::cargo_bin("geotnb")
                .unwrap()
                .current_dir(dir_path)
                .env("GEOTNB_API__BASE_URL", uri)
                .env("GEOTNB_AUTH__TOKEN_FILE", token_file)
                .env("GEOTNB_PASSWORD", "pw")
                .args(["login", "-u", "lina"])
                .assert()
                .success()
                .get_output()
                .stdout
                .clone()
        })
        .await
        .unwrap()
    };
    assert!(String::from_utf8_lossy(&login).contains("Logged in as lina"));
    assert!(token_file.exists());

    let dir_path = dir.path().to_path_buf();
    tokio::task::spawn_blocking(move || {
        Command::cargo_bin("geotnb")
            .unwrap()
            .current_dir(dir_path)
            .env("GEOTNB_API__BASE_URL", uri)
            .env("GEOTNB_AUTH__TOKEN_FILE", token_file)
            .args(["request-transition", "12", "--to", "Valide"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Transition refused"));
    })
    .await
    .unwrap();

    let requests = server.received_requests().await.unwrap();
    assert!(requests.iter().all(|r| !r.url.path().ends_with("/validate")));
}
