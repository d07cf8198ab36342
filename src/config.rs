//! Saved default flags.
//!
//! Config files hold the same `--flag value` tokens as the command line,
//! one or more per line, with `#` comments. The global file is merged with
//! a local `.conceptcraftrc`, and command-line flags override both.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::view_state::{FontFamily, ThemeName, ViewState};

const APP_DIR: &str = "conceptcraft";
const LOCAL_FILE: &str = ".conceptcraftrc";

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ConfigFlags {
    pub watch: bool,
    pub perf: bool,
    pub force_half_cell: bool,
    pub theme: Option<ThemeName>,
    pub font_size: Option<i64>,
    pub font_family: Option<FontFamily>,
    pub line_color: Option<String>,
    pub panel_width: Option<u16>,
    pub out_dir: Option<PathBuf>,
    pub render_debug_log: Option<PathBuf>,
}

impl ConfigFlags {
    /// Merge two flag sets; values from `other` win.
    pub fn union(&self, other: &Self) -> Self {
        Self {
            watch: self.watch || other.watch,
            perf: self.perf || other.perf,
            force_half_cell: self.force_half_cell || other.force_half_cell,
            theme: other.theme.or(self.theme),
            font_size: other.font_size.or(self.font_size),
            font_family: other.font_family.or(self.font_family),
            line_color: other.line_color.clone().or_else(|| self.line_color.clone()),
            panel_width: other.panel_width.or(self.panel_width),
            out_dir: other.out_dir.clone().or_else(|| self.out_dir.clone()),
            render_debug_log: other
                .render_debug_log
                .clone()
                .or_else(|| self.render_debug_log.clone()),
        }
    }

    /// Apply the styling flags to a fresh view state. Returns a warning for
    /// each value the view state rejected.
    pub fn apply_to(&self, state: &mut ViewState) -> Vec<String> {
        let mut warnings = Vec::new();
        if let Some(theme) = self.theme {
            state.set_theme_name(theme);
        }
        if let Some(size) = self.font_size {
            let applied = state.set_font_size(size);
            if i64::from(applied) != size {
                warnings.push(format!("font size {size} clamped to {applied}"));
            }
        }
        if let Some(family) = self.font_family {
            state.set_font_family(family);
        }
        if let Some(color) = &self.line_color
            && let Err(err) = state.set_line_color(color)
        {
            warnings.push(err.to_string());
        }
        if let Some(width) = self.panel_width {
            state.set_panel_width(f64::from(width));
        }
        warnings
    }
}

pub fn global_config_path() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        if let Some(appdata) = std::env::var_os("APPDATA") {
            return PathBuf::from(appdata).join(APP_DIR).join("config");
        }
    }

    #[cfg(target_os = "macos")]
    {
        if let Some(home) = std::env::var_os("HOME") {
            return PathBuf::from(home)
                .join("Library")
                .join("Application Support")
                .join(APP_DIR)
                .join("config");
        }
    }

    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    {
        if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME") {
            return PathBuf::from(xdg).join(APP_DIR).join("config");
        }
        if let Some(home) = std::env::var_os("HOME") {
            return PathBuf::from(home).join(".config").join(APP_DIR).join("config");
        }
    }

    PathBuf::from(LOCAL_FILE)
}

pub fn local_override_path() -> PathBuf {
    PathBuf::from(LOCAL_FILE)
}

/// Load flags from `path`; a missing file yields the defaults.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read.
pub fn load_config_flags(path: &Path) -> Result<ConfigFlags> {
    if !path.exists() {
        return Ok(ConfigFlags::default());
    }
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    let tokens = content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .flat_map(config_line_tokens)
        .collect::<Vec<_>>();
    Ok(parse_flag_tokens(&tokens))
}

/// Split one config line into flag tokens. A `--line-color` value runs to
/// the end of the line, since functional colors contain spaces.
fn config_line_tokens(line: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut rest = line.trim();
    while !rest.is_empty() {
        let (token, tail) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
        if token == "--line-color" {
            tokens.push(token.to_string());
            let value = tail.trim();
            if !value.is_empty() {
                tokens.push(value.to_string());
            }
            break;
        }
        if token.starts_with("--line-color=") {
            tokens.push(rest.to_string());
            break;
        }
        tokens.push(token.to_string());
        rest = tail.trim_start();
    }
    tokens
}

/// # Errors
///
/// Returns an error if the config directory or file cannot be written.
pub fn save_config_flags(path: &Path, flags: &ConfigFlags) -> Result<()> {
    let mut lines = vec!["# conceptcraft defaults (saved with --save)".to_string()];
    if let Some(theme) = flags.theme {
        lines.push(format!("--theme {theme}"));
    }
    if let Some(size) = flags.font_size {
        lines.push(format!("--font-size {size}"));
    }
    if let Some(family) = flags.font_family {
        lines.push(format!("--font-family {family}"));
    }
    if let Some(color) = &flags.line_color {
        lines.push(format!("--line-color {color}"));
    }
    if let Some(width) = flags.panel_width {
        lines.push(format!("--panel-width {width}"));
    }
    if let Some(dir) = &flags.out_dir {
        lines.push(format!("--out {}", dir.display()));
    }
    if flags.watch {
        lines.push("--watch".to_string());
    }
    if flags.perf {
        lines.push("--perf".to_string());
    }
    if flags.force_half_cell {
        lines.push("--force-half-cell".to_string());
    }
    if let Some(path) = &flags.render_debug_log {
        lines.push(format!("--render-debug-log {}", path.display()));
    }
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create config dir {}", parent.display()))?;
    }
    fs::write(path, format!("{}\n", lines.join("\n")))
        .with_context(|| format!("Failed to write config {}", path.display()))
}

/// # Errors
///
/// Returns an error if the file exists but cannot be removed.
pub fn clear_config_flags(path: &Path) -> Result<()> {
    if path.exists() {
        fs::remove_file(path).with_context(|| format!("Failed to remove {}", path.display()))?;
    }
    Ok(())
}

/// Extract known flags from raw tokens, accepting both `--flag value` and
/// `--flag=value`. Unknown tokens and unparsable values are skipped.
pub fn parse_flag_tokens(tokens: &[String]) -> ConfigFlags {
    let mut flags = ConfigFlags::default();
    let mut i = 0;
    while i < tokens.len() {
        let token = tokens[i].as_str();
        let (name, inline_value) = match token.split_once('=') {
            Some((name, value)) if name.starts_with("--") => (name, Some(value)),
            _ => (token, None),
        };
        match name {
            "--watch" | "-w" => flags.watch = true,
            "--perf" => flags.perf = true,
            "--force-half-cell" => flags.force_half_cell = true,
            "--theme" | "--font-size" | "--font-family" | "--line-color" | "--panel-width"
            | "--out" | "--render-debug-log" => {
                let value = if let Some(value) = inline_value {
                    Some(value)
                } else {
                    i += 1;
                    tokens.get(i).map(String::as_str)
                };
                if let Some(value) = value {
                    apply_value(&mut flags, name, value);
                }
            }
            _ => {}
        }
        i += 1;
    }
    flags
}

fn apply_value(flags: &mut ConfigFlags, name: &str, value: &str) {
    match name {
        "--theme" => flags.theme = value.parse().ok(),
        "--font-size" => flags.font_size = value.parse().ok(),
        "--font-family" => flags.font_family = value.parse().ok(),
        "--line-color" => flags.line_color = Some(value.to_string()),
        "--panel-width" => flags.panel_width = value.parse().ok(),
        "--out" => flags.out_dir = Some(PathBuf::from(value)),
        "--render-debug-log" => flags.render_debug_log = Some(PathBuf::from(value)),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn tokens(args: &[&str]) -> Vec<String> {
        args.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_parse_flag_tokens_extracts_known_flags() {
        let flags = parse_flag_tokens(&tokens(&[
            "conceptcraft",
            "--watch",
            "--theme",
            "forest",
            "--font-size=18",
            "--font-family",
            "georgia",
            "--line-color",
            "#ff0000",
            "--out",
            "exports",
            "diagram.mmd",
        ]));
        assert!(flags.watch);
        assert_eq!(flags.theme, Some(ThemeName::Forest));
        assert_eq!(flags.font_size, Some(18));
        assert_eq!(flags.font_family, Some(FontFamily::Georgia));
        assert_eq!(flags.line_color.as_deref(), Some("#ff0000"));
        assert_eq!(flags.out_dir, Some(PathBuf::from("exports")));
    }

    #[test]
    fn test_unknown_theme_value_is_ignored() {
        let flags = parse_flag_tokens(&tokens(&["--theme", "solarized", "--perf"]));
        assert_eq!(flags.theme, None);
        assert!(flags.perf);
    }

    #[test]
    fn test_config_union_prefers_later_values() {
        let file = ConfigFlags {
            watch: true,
            theme: Some(ThemeName::Dark),
            font_size: Some(12),
            ..ConfigFlags::default()
        };
        let cli = ConfigFlags {
            theme: Some(ThemeName::Neutral),
            ..ConfigFlags::default()
        };
        let merged = file.union(&cli);
        assert!(merged.watch);
        assert_eq!(merged.theme, Some(ThemeName::Neutral));
        assert_eq!(merged.font_size, Some(12));
    }

    #[test]
    fn test_apply_to_reports_rejected_values() {
        let flags = ConfigFlags {
            font_size: Some(99),
            line_color: Some("bad color!".to_string()),
            theme: Some(ThemeName::Forest),
            ..ConfigFlags::default()
        };
        let mut state = ViewState::new();
        let warnings = flags.apply_to(&mut state);
        assert_eq!(warnings.len(), 2);
        assert_eq!(state.font_size_px(), 30);
        assert_eq!(state.line_color(), "#000000");
        assert_eq!(state.theme().base(), ThemeName::Forest);
    }

    #[test]
    fn test_save_load_and_clear_config() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config");
        let flags = ConfigFlags {
            watch: true,
            perf: true,
            force_half_cell: true,
            theme: Some(ThemeName::Dark),
            font_size: Some(20),
            font_family: Some(FontFamily::Times),
            line_color: Some("#123456".to_string()),
            panel_width: Some(35),
            out_dir: Some(PathBuf::from("exports")),
            render_debug_log: Some(PathBuf::from("render.log")),
        };

        save_config_flags(&path, &flags).unwrap();
        assert_eq!(load_config_flags(&path).unwrap(), flags);

        clear_config_flags(&path).unwrap();
        assert!(!path.exists());
        assert_eq!(load_config_flags(&path).unwrap(), ConfigFlags::default());
    }

    #[test]
    fn test_functional_line_color_survives_save_and_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config");
        let flags = ConfigFlags {
            watch: true,
            line_color: Some("rgb(10, 20, 30)".to_string()),
            ..ConfigFlags::default()
        };

        save_config_flags(&path, &flags).unwrap();
        let loaded = load_config_flags(&path).unwrap();
        assert_eq!(loaded, flags);

        let mut state = ViewState::new();
        assert!(loaded.apply_to(&mut state).is_empty());
        assert_eq!(state.line_color(), "rgb(10, 20, 30)");
    }

    #[test]
    fn test_config_line_tokens_keeps_line_color_whole() {
        assert_eq!(
            config_line_tokens("--watch --line-color hsl(120deg 50% 50%)"),
            tokens(&["--watch", "--line-color", "hsl(120deg 50% 50%)"])
        );
        assert_eq!(
            config_line_tokens("--line-color=rgba(1, 2, 3, 0.5)"),
            tokens(&["--line-color=rgba(1, 2, 3, 0.5)"])
        );
        assert_eq!(
            config_line_tokens("  --theme   dark  "),
            tokens(&["--theme", "dark"])
        );
    }
}
