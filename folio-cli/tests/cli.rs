use std::path::Path;

use assert_cmd::{Command, cargo};
use predicates::prelude::*;
use predicates::str::contains;

fn folio(store: &Path) -> Command {
    let mut cmd = cargo::cargo_bin_cmd!("folio");
    cmd.arg("--store").arg(store).env_remove("FOLIO_LOG");
    cmd
}

#[test]
fn prints_help() {
    let mut cmd = cargo::cargo_bin_cmd!("folio");
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(contains("browse"))
        .stdout(contains("replace-image"));
}

#[test]
fn set_then_get_survives_restart() {
    let store = tempfile::tempdir().expect("tempdir");
    folio(store.path())
        .args(["set", "hero.name", "Ada Lovelace"])
        .assert()
        .success()
        .stdout(contains("updated /hero/name"));
    folio(store.path())
        .args(["get", "/hero/name"])
        .assert()
        .success()
        .stdout("Ada Lovelace\n");
}

#[test]
fn fresh_store_serves_default_content() {
    let store = tempfile::tempdir().expect("tempdir");
    folio(store.path())
        .args(["get", "artSeries.0.title"])
        .assert()
        .success()
        .stdout("Born in Thorns\n");
}

#[test]
fn missing_paths_fail() {
    let store = tempfile::tempdir().expect("tempdir");
    folio(store.path())
        .args(["get", "hero.nickname"])
        .assert()
        .failure()
        .stderr(contains("nothing at /hero/nickname"));
    folio(store.path())
        .args(["set", "nowhere.name", "x"])
        .assert()
        .failure();
}

#[test]
fn shape_breaking_values_are_rejected() {
    let store = tempfile::tempdir().expect("tempdir");
    folio(store.path())
        .args(["set", "hero.name", "42", "--json"])
        .assert()
        .failure()
        .stderr(contains("edit rejected"));
}

#[test]
fn append_and_declined_remove() {
    let store = tempfile::tempdir().expect("tempdir");
    folio(store.path())
        .args([
            "append",
            "artSeries.0.images",
            r#"{"url":"https://example.com/extra.jpg","alt":"Extra"}"#,
        ])
        .assert()
        .success();
    folio(store.path())
        .args(["remove", "artSeries.0.images", "2"])
        .write_stdin("n\n")
        .assert()
        .success()
        .stdout(contains("kept"));
    folio(store.path())
        .args(["get", "artSeries.0.images.2.url"])
        .assert()
        .success()
        .stdout("https://example.com/extra.jpg\n");
    folio(store.path())
        .args(["remove", "artSeries.0.images", "2", "--yes"])
        .assert()
        .success()
        .stdout(contains("2 left"));
}

#[test]
fn series_keeps_its_last_image() {
    let store = tempfile::tempdir().expect("tempdir");
    folio(store.path())
        .args(["remove", "artSeries.1.images", "0", "-y"])
        .assert()
        .success();
    folio(store.path())
        .args(["remove", "artSeries.1.images", "0", "-y"])
        .assert()
        .failure()
        .stderr(contains("at least 1 image"));
}

#[test]
fn reset_restores_default() {
    let store = tempfile::tempdir().expect("tempdir");
    folio(store.path())
        .args(["set", "contact.email", "me@example.com"])
        .assert()
        .success();
    folio(store.path())
        .args(["reset", "--yes"])
        .assert()
        .success()
        .stdout(contains("content reset"));
    folio(store.path())
        .args(["get", "contact.email"])
        .assert()
        .success()
        .stdout("contact@zixiongnie.art\n");
}

#[test]
fn replace_image_stores_inline_payload() {
    let store = tempfile::tempdir().expect("tempdir");
    let image = store.path().join("tile.png");
    std::fs::write(&image, [0x89, b'P', b'N', b'G']).expect("write image");
    folio(store.path())
        .args(["replace-image", "hero.images.0"])
        .arg(&image)
        .assert()
        .success();
    folio(store.path())
        .args(["get", "hero.images.0.url"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("data:image/png;base64,"));
}

#[test]
fn replace_image_refuses_text_fields() {
    let store = tempfile::tempdir().expect("tempdir");
    let image = store.path().join("tile.png");
    std::fs::write(&image, [0x89, b'P', b'N', b'G']).expect("write image");
    folio(store.path())
        .args(["replace-image", "hero.name"])
        .arg(&image)
        .assert()
        .failure()
        .stderr(contains("does not hold an image"));
    folio(store.path())
        .args(["get", "hero.name"])
        .assert()
        .success()
        .stdout("Zixiong Nie\n");
}

#[test]
fn compact_export_is_one_line() {
    let store = tempfile::tempdir().expect("tempdir");
    folio(store.path())
        .args(["export", "--compact"])
        .assert()
        .success()
        .stdout(contains("\"artSeries\"").and(predicate::function(|out: &str| {
            out.trim_end().lines().count() == 1
        })));
}
