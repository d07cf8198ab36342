use std::path::PathBuf;

use conceptcraft::config::{ConfigFlags, load_config_flags, parse_flag_tokens, save_config_flags};
use conceptcraft::view_state::{FontFamily, ThemeName, ViewState};

#[test]
fn test_config_file_parsing_ignores_comments_and_blank_lines() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(".conceptcraftrc");
    let content = r#"
# comment
--watch

--theme forest

--render-debug-log=render.log
"#;
    std::fs::write(&path, content).unwrap();

    let flags = load_config_flags(&path).unwrap();
    assert!(flags.watch);
    assert_eq!(flags.theme, Some(ThemeName::Forest));
    assert_eq!(flags.render_debug_log, Some(PathBuf::from("render.log")));
}

#[test]
fn test_cli_flags_override_file_flags() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(".conceptcraftrc");
    let content = "--watch\n--theme forest\n--font-size 20\n--render-debug-log file.log\n";
    std::fs::write(&path, content).unwrap();

    let file_flags = load_config_flags(&path).unwrap();
    let cli_args = vec![
        "conceptcraft".to_string(),
        "--theme".to_string(),
        "dark".to_string(),
        "--force-half-cell".to_string(),
    ];
    let cli_flags = parse_flag_tokens(&cli_args);

    let effective = file_flags.union(&cli_flags);
    assert!(effective.watch, "file flags should remain enabled");
    assert!(effective.force_half_cell, "cli flags should be applied");
    assert_eq!(effective.theme, Some(ThemeName::Dark), "cli should override theme");
    assert_eq!(effective.font_size, Some(20));
    assert_eq!(
        effective.render_debug_log,
        Some(PathBuf::from("file.log")),
        "file config should be preserved when CLI does not override"
    );
}

#[test]
fn test_parse_flag_tokens_handles_equals_syntax() {
    let args = vec![
        "conceptcraft".to_string(),
        "--theme=neutral".to_string(),
        "--font-family=courier".to_string(),
        "--line-color=#ff0000".to_string(),
    ];
    let flags = parse_flag_tokens(&args);
    assert_eq!(flags.theme, Some(ThemeName::Neutral));
    assert_eq!(flags.font_family, Some(FontFamily::Courier));
    assert_eq!(flags.line_color.as_deref(), Some("#ff0000"));
}

#[test]
fn test_saved_flags_load_back_and_style_the_view() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("config");
    let flags = ConfigFlags {
        theme: Some(ThemeName::Forest),
        font_size: Some(99),
        line_color: Some("not-a-color".to_string()),
        panel_width: Some(40),
        ..ConfigFlags::default()
    };
    save_config_flags(&path, &flags).unwrap();

    let loaded = load_config_flags(&path).unwrap();
    assert_eq!(loaded, flags);

    let mut view = ViewState::new();
    let warnings = loaded.apply_to(&mut view);
    assert_eq!(view.theme().base(), ThemeName::Forest);
    assert_eq!(view.font_size_px(), 30);
    assert_eq!(view.line_color(), "#000000");
    assert!((view.panel_width_percent() - 40.0).abs() < f64::EPSILON);
    assert_eq!(warnings.len(), 2, "clamped size and rejected color: {warnings:?}");
}

#[test]
fn test_config_union_merges_booleans() {
    let file = ConfigFlags {
        watch: true,
        ..ConfigFlags::default()
    };
    let cli = ConfigFlags {
        perf: true,
        force_half_cell: true,
        ..ConfigFlags::default()
    };
    let merged = file.union(&cli);
    assert!(merged.watch);
    assert!(merged.perf);
    assert!(merged.force_half_cell);
}
