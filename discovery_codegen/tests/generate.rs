use discovery_codegen::{
    ApiSelector, CodegenError, GenerateSettings, RestDescription, generate_all, generate_to_dir,
    generate_to_writer, load_description,
};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn fixtures_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn settings_in(dir: &TempDir) -> GenerateSettings {
    GenerateSettings {
        output_dir: dir.path().to_path_buf(),
        ..GenerateSettings::default()
    }
}

fn selectors(inputs: &[&str]) -> Vec<ApiSelector> {
    inputs
        .iter()
        .map(|s| s.parse().expect("valid selector"))
        .collect()
}

fn read(dir: &TempDir, relative: &str) -> String {
    fs::read_to_string(dir.path().join(relative))
        .unwrap_or_else(|e| panic!("cannot read {relative}: {e}"))
}

#[test]
fn generate_all_writes_api_modules_and_base_index() {
    let temp_dir: TempDir = TempDir::new().expect("temp dir");
    let settings: GenerateSettings = settings_in(&temp_dir);

    let written: Vec<PathBuf> =
        generate_all(&fixtures_dir(), &selectors(&["calendar:v3"]), &settings).expect("generates");

    let expected_files: [&str; 9] = [
        "generated/mod.rs",
        "generated/calendar/mod.rs",
        "generated/calendar/calendar.rs",
        "generated/calendar/calendar_request.rs",
        "generated/calendar/model/mod.rs",
        "generated/calendar/model/acl.rs",
        "generated/calendar/model/acl_rule.rs",
        "generated/calendar/model/event.rs",
        "generated/calendar/model/events.rs",
    ];
    for file in expected_files {
        let path: PathBuf = temp_dir.path().join(file);
        assert!(written.contains(&path), "{file} not reported as written");
        assert!(path.is_file(), "{file} not on disk");
    }
    assert_eq!(9, written.len());

    let expected_index: &str = "//! Generated by discoverygen. Do not edit manually.

pub mod calendar;
";
    assert_eq!(expected_index, read(&temp_dir, "generated/mod.rs"));
}

#[test]
fn event_model_maps_every_schema_shape() {
    let temp_dir: TempDir = TempDir::new().expect("temp dir");
    generate_all(
        &fixtures_dir(),
        &selectors(&["calendar:v3"]),
        &settings_in(&temp_dir),
    )
    .expect("generates");
    let actual: String = read(&temp_dir, "generated/calendar/model/event.rs");

    let expected_lines: [&str; 10] = [
        "/// An event on a calendar.",
        "pub struct Event {",
        "    pub sequence: Option<i32>,",
        "    pub status: Option<crate::generated::calendar::model::event::Status>,",
        "    pub start: Option<crate::generated::calendar::model::event::Start>,",
        "    pub attendees: Option<Vec<crate::generated::calendar::model::event::Attendees>>,",
        "    pub extended_properties: Option<std::collections::BTreeMap<String, String>>,",
        "    #[serde(default, with = \"discovery_runtime::rfc3339::option\", skip_serializing_if = \"Option::is_none\")]",
        "pub struct Start {",
        "    pub time_zone: Option<discovery_runtime::TimeZone>,",
    ];
    for line in expected_lines {
        assert!(actual.contains(line), "missing line {line:?} in:\n{actual}");
    }
    assert!(actual.contains("/// The event is tentatively confirmed."));
    assert!(actual.contains("pub enum ResponseStatus {"));
}

#[test]
fn client_exposes_resources_methods_and_endpoint_constants() {
    let temp_dir: TempDir = TempDir::new().expect("temp dir");
    generate_all(
        &fixtures_dir(),
        &selectors(&["calendar:v3"]),
        &settings_in(&temp_dir),
    )
    .expect("generates");
    let actual: String = read(&temp_dir, "generated/calendar/calendar.rs");

    let expected_lines: [&str; 8] = [
        "pub struct Calendar {",
        "    pub const API_VERSION: &str = \"v3\";",
        "    pub const DEFAULT_BATCH_PATH: &str = \"batch/calendar/v3\";",
        "    pub const DEFAULT_BASE_URL: &str = \"https://www.googleapis.com/calendar/v3/\";",
        "pub struct Calendars {",
        "pub struct Events {",
        "    pub struct Acl {",
        "        pub const REST_PATH: &str = \"calendars/{calendarId}/events/{eventId}\";",
    ];
    for line in expected_lines {
        assert!(actual.contains(line), "missing line {line:?} in:\n{actual}");
    }
}

#[test]
fn request_base_carries_global_parameters() {
    let temp_dir: TempDir = TempDir::new().expect("temp dir");
    generate_all(
        &fixtures_dir(),
        &selectors(&["calendar:v3"]),
        &settings_in(&temp_dir),
    )
    .expect("generates");
    let actual: String = read(&temp_dir, "generated/calendar/calendar_request.rs");

    assert!(actual.contains("pub struct CalendarRequest<T> {"));
    assert!(actual.contains("Self { base__, fields: None, pretty_print: None }"));
    assert!(actual.contains("pub fn set_pretty_print(&mut self, pretty_print: bool) -> &mut Self {"));
}

#[test]
fn base_package_controls_directories_and_paths() {
    let temp_dir: TempDir = TempDir::new().expect("temp dir");
    let settings: GenerateSettings = GenerateSettings {
        base_package: "info.google".to_string(),
        runtime_crate: "google_runtime".to_string(),
        ..settings_in(&temp_dir)
    };

    generate_all(&fixtures_dir(), &selectors(&["calendar:v3"]), &settings).expect("generates");

    assert!(read(&temp_dir, "info/mod.rs").contains("pub mod google;"));
    assert!(read(&temp_dir, "info/google/mod.rs").contains("pub mod calendar;"));
    let actual: String = read(&temp_dir, "info/google/calendar/model/events.rs");
    assert!(
        actual.contains("pub items: Option<Vec<crate::info::google::calendar::model::Event>>,"),
        "{actual}"
    );
    assert!(read(&temp_dir, "info/google/calendar/calendar.rs").contains("google_runtime::Client"));
}

#[test]
fn missing_document_fails_naming_the_api() {
    let temp_dir: TempDir = TempDir::new().expect("temp dir");

    let err: CodegenError = generate_all(
        &fixtures_dir(),
        &selectors(&["calendar:v3", "drive:v3"]),
        &settings_in(&temp_dir),
    )
    .expect_err("drive:v3 has no document");

    let CodegenError::Api { ref api, ref source } = err else {
        panic!("expected an API error, got {err:?}");
    };
    assert_eq!("drive:v3", api);
    assert!(matches!(**source, CodegenError::Io(_)), "{source:?}");
    assert!(
        !temp_dir.path().join("generated/mod.rs").exists(),
        "nothing is written when an API fails"
    );
}

#[test]
fn versions_of_one_api_cannot_share_a_package() {
    let temp_dir: TempDir = TempDir::new().expect("temp dir");

    let err: CodegenError = generate_all(
        &fixtures_dir(),
        &selectors(&["calendar:v2", "calendar:v3"]),
        &settings_in(&temp_dir),
    )
    .expect_err("both versions map to generated.calendar");

    let expected: &str = "APIs `calendar:v2` and `calendar:v3` both generate package `generated.calendar`";
    assert_eq!(expected, err.to_string());
    assert!(
        !temp_dir.path().join("generated").exists(),
        "nothing is written when packages collide"
    );
}

#[test]
fn generation_is_deterministic() {
    let description: RestDescription =
        load_description(fixtures_dir().join("calendar.v3.json")).expect("valid document");
    let first: TempDir = TempDir::new().expect("temp dir");
    let second: TempDir = TempDir::new().expect("temp dir");

    let first_paths: Vec<PathBuf> =
        generate_to_dir(&description, &settings_in(&first)).expect("generates");
    let second_paths: Vec<PathBuf> =
        generate_to_dir(&description, &settings_in(&second)).expect("generates");

    assert_eq!(first_paths.len(), second_paths.len());
    for path in first_paths {
        let relative: &Path = path.strip_prefix(first.path()).expect("under output dir");
        let expected: String = fs::read_to_string(&path).expect("readable");
        let actual: String = fs::read_to_string(second.path().join(relative)).expect("readable");
        assert_eq!(expected, actual, "{} differs between runs", relative.display());
    }
}

#[test]
fn generate_to_writer_emits_one_module_tree() {
    let json: String =
        fs::read_to_string(fixtures_dir().join("calendar.v3.json")).expect("fixture readable");
    let mut out: Vec<u8> = Vec::new();

    generate_to_writer(&json, &mut out, &GenerateSettings::default()).expect("generates");

    let actual: String = String::from_utf8(out).expect("utf-8");
    assert!(actual.starts_with("pub mod generated {\n    pub mod calendar {\n"));
    assert!(actual.contains("pub struct Event {"));
    assert!(actual.contains("pub struct Calendar {"));
}

#[test]
fn generate_to_writer_rejects_invalid_document() {
    let mut out: Vec<u8> = Vec::new();
    let err: CodegenError =
        generate_to_writer(r#"{ "name": "calendar" }"#, &mut out, &GenerateSettings::default())
            .expect_err("version is missing");
    assert!(matches!(err, CodegenError::Json(_)), "{err:?}");
    assert!(out.is_empty());
}
