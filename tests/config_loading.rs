// tests/config_loading.rs

mod common;

use std::error::Error;
use std::path::PathBuf;

use castwatch::apply_cli_overrides;
use castwatch::cli::CliArgs;
use castwatch::config::{ConfigFile, load_and_validate, load_from_path, load_or_default};
use castwatch::errors::CastwatchError;
use castwatch::types::ChannelSlot;
use castwatch_test_utils::builders::ConfigFileBuilder;
use clap::Parser;
use common::init_tracing;

type TestResult = Result<(), Box<dyn Error>>;

#[test]
fn full_file_loads() -> TestResult {
    init_tracing();
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("castwatch.toml");
    std::fs::write(
        &path,
        r#"
channels = ["https://twitcasting.tv/first", "", "third"]

[config]
check_interval = 30
auto_record = true
save_path = "recordings"

[tools]
ytdlp = "yt-dlp"
ffmpeg = "ffmpeg"
"#,
    )?;

    let cfg = load_and_validate(&path)?;
    assert_eq!(cfg.interval.secs(), 30);
    assert!(cfg.auto_record);
    assert_eq!(cfg.save_path, Some(PathBuf::from("recordings")));

    let slots: Vec<_> = cfg.configured_channels().collect();
    assert_eq!(
        slots,
        vec![
            (ChannelSlot::new(1).unwrap(), "https://twitcasting.tv/first"),
            (ChannelSlot::new(3).unwrap(), "third"),
        ]
    );
    Ok(())
}

#[test]
fn empty_file_uses_defaults() -> TestResult {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("castwatch.toml");
    std::fs::write(&path, "")?;

    let cfg = load_and_validate(&path)?;
    assert_eq!(cfg.interval.secs(), 60);
    assert!(!cfg.auto_record);
    assert_eq!(cfg.save_path, None);
    assert_eq!(cfg.tools.ytdlp, PathBuf::from("yt-dlp"));
    assert_eq!(cfg.tools.ffmpeg, PathBuf::from("ffmpeg"));
    assert_eq!(cfg.configured_channels().count(), 0);
    Ok(())
}

#[test]
fn interval_may_be_text_and_is_clamped() -> TestResult {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("castwatch.toml");

    std::fs::write(&path, "[config]\ncheck_interval = \"5\"\n")?;
    assert_eq!(load_and_validate(&path)?.interval.secs(), 10);

    std::fs::write(&path, "[config]\ncheck_interval = \"soon\"\n")?;
    assert_eq!(load_and_validate(&path)?.interval.secs(), 60);

    std::fs::write(&path, "[config]\ncheck_interval = 3\n")?;
    assert_eq!(load_and_validate(&path)?.interval.secs(), 10);
    Ok(())
}

#[test]
fn non_numeric_interval_values_fall_back_to_default() -> TestResult {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("castwatch.toml");

    for value in ["30.5", "true", "[1, 2]", "{ secs = 30 }"] {
        std::fs::write(&path, format!("[config]\ncheck_interval = {value}\n"))?;
        let cfg = load_and_validate(&path)?;
        assert_eq!(cfg.interval.secs(), 60, "check_interval = {value}");
    }
    Ok(())
}

#[test]
fn too_many_channels_is_rejected() {
    let raw = ConfigFileBuilder::new()
        .with_channel("a")
        .with_channel("b")
        .with_channel("c")
        .with_channel("d")
        .with_channel("e")
        .raw();

    let err = ConfigFile::try_from(raw).unwrap_err();
    assert!(matches!(err, CastwatchError::ConfigError(_)), "{err}");
}

#[test]
fn empty_tool_path_is_rejected() {
    let raw = ConfigFileBuilder::new().with_ytdlp("").raw();
    let err = ConfigFile::try_from(raw).unwrap_err();
    assert!(err.to_string().contains("ytdlp"), "{err}");
}

#[test]
fn tool_path_must_exist_when_not_a_bare_name() -> TestResult {
    let dir = tempfile::tempdir()?;
    let missing = dir.path().join("bin").join("ffmpeg");

    let raw = ConfigFileBuilder::new().with_ffmpeg(&missing).raw();
    assert!(ConfigFile::try_from(raw).is_err());

    let present = dir.path().join("ffmpeg");
    std::fs::write(&present, b"")?;
    let cfg = ConfigFileBuilder::new().with_ffmpeg(&present).build();
    assert_eq!(cfg.tools.ffmpeg, present);
    Ok(())
}

#[test]
fn blank_save_path_means_working_directory() {
    let cfg = ConfigFileBuilder::new()
        .with_channel("  foo  ")
        .with_save_path("")
        .build();
    assert_eq!(cfg.save_path, None);
    assert_eq!(cfg.channels, vec!["foo".to_string()]);
}

#[test]
fn malformed_toml_is_a_toml_error() -> TestResult {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("castwatch.toml");
    std::fs::write(&path, "channels = [\n")?;

    assert!(matches!(load_from_path(&path), Err(CastwatchError::TomlError(_))));
    Ok(())
}

#[test]
fn missing_file_is_only_an_error_when_required() -> TestResult {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("absent.toml");

    let raw = load_or_default(&path, false)?;
    assert!(raw.channels.is_empty());

    assert!(matches!(
        load_or_default(&path, true),
        Err(CastwatchError::IoError(_))
    ));
    Ok(())
}

#[test]
fn cli_overrides_take_precedence() -> TestResult {
    let mut raw = ConfigFileBuilder::new()
        .with_channel("from_file")
        .with_interval(120)
        .raw();

    let args = CliArgs::try_parse_from([
        "castwatch",
        "--channel",
        "https://twitcasting.tv/one",
        "--channel",
        "two",
        "--interval",
        "15",
        "--auto-record",
        "--save-path",
        "out",
    ])?;
    apply_cli_overrides(&mut raw, &args);
    let cfg = ConfigFile::try_from(raw)?;

    assert_eq!(cfg.channels, vec!["https://twitcasting.tv/one", "two"]);
    assert_eq!(cfg.interval.secs(), 15);
    assert!(cfg.auto_record);
    assert_eq!(cfg.save_path, Some(PathBuf::from("out")));
    Ok(())
}

#[test]
fn cli_without_overrides_keeps_file_values() -> TestResult {
    let mut raw = ConfigFileBuilder::new()
        .with_channel("from_file")
        .with_interval_text("45")
        .auto_record(true)
        .raw();

    let args = CliArgs::try_parse_from(["castwatch"])?;
    apply_cli_overrides(&mut raw, &args);
    let cfg = ConfigFile::try_from(raw)?;

    assert_eq!(cfg.channels, vec!["from_file"]);
    assert_eq!(cfg.interval.secs(), 45);
    assert!(cfg.auto_record);
    Ok(())
}
