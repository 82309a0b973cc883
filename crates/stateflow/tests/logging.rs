//! Subscriber installation and the pipeline running under it

use stateflow::core::logging::{init_logging, LogFormat, LogSettings};

#[test]
fn test_settings_from_arguments() {
    let settings = LogSettings::resolve(Some("stateflow=trace"), Some("Json")).unwrap();
    assert_eq!(settings.level, "stateflow=trace");
    assert_eq!(settings.format, LogFormat::Json);
}

#[test]
fn test_unknown_format_never_installs() {
    assert!(init_logging(Some("info"), Some("yaml")).is_err());
}

#[test]
fn test_pipeline_with_subscriber_installed() {
    // Another test may already own the global subscriber
    let _ = init_logging(Some("trace"), Some("compact"));

    let output = stateflow::render("@StateFlow(name=Job)\n@Flow: A => [ B, C ]").unwrap();
    assert!(output.contains("A -->+"));
}

#[test]
fn test_second_install_is_an_error() {
    let _ = init_logging(Some("off"), Some("json"));
    assert!(init_logging(Some("off"), Some("json")).is_err());
}
