//! Diagram themes: the fixed named set plus structured overrides.

use std::fmt;
use std::str::FromStr;

use serde_json::{Map, Value};

use super::color::is_valid_color;

/// Theme variables whose value ends up as an SVG color attribute.
pub const COLOR_VARIABLES: [&str; 11] = [
    "background",
    "primaryColor",
    "mainBkg",
    "primaryTextColor",
    "textColor",
    "primaryBorderColor",
    "nodeBorder",
    "lineColor",
    "clusterBkg",
    "clusterBorder",
    "edgeLabelBackground",
];

/// One of the built-in mermaid themes.
#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ThemeName {
    #[default]
    Default,
    Forest,
    Dark,
    Neutral,
}

impl ThemeName {
    pub const ALL: [Self; 4] = [Self::Default, Self::Forest, Self::Dark, Self::Neutral];

    /// Name as used on the command line and in config files.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Forest => "forest",
            Self::Dark => "dark",
            Self::Neutral => "neutral",
        }
    }

    /// Human readable label for the control panel.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Default => "Default",
            Self::Forest => "Forest",
            Self::Dark => "Dark",
            Self::Neutral => "Neutral",
        }
    }

    pub fn next(self) -> Self {
        let idx = Self::ALL.iter().position(|t| *t == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }

    pub fn prev(self) -> Self {
        let idx = Self::ALL.iter().position(|t| *t == self).unwrap_or(0);
        Self::ALL[(idx + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

impl fmt::Display for ThemeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ThemeName {
    type Err = ThemeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ThemeError::Unknown(s.to_string()))
    }
}

/// The theme currently selected in the view state.
///
/// `Custom` carries mermaid-style theme variables (`primaryColor`,
/// `lineColor`, ...). An optional `"theme"` key names the base palette the
/// variables are layered on; it defaults to [`ThemeName::Default`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ThemeSetting {
    Named(ThemeName),
    Custom(Map<String, Value>),
}

impl ThemeSetting {
    /// The named palette this setting starts from.
    pub fn base(&self) -> ThemeName {
        match self {
            Self::Named(name) => *name,
            Self::Custom(vars) => vars
                .get("theme")
                .and_then(Value::as_str)
                .and_then(|s| s.parse().ok())
                .unwrap_or_default(),
        }
    }

    /// Theme variables layered over the base palette (empty for named themes).
    pub fn overrides(&self) -> Option<&Map<String, Value>> {
        match self {
            Self::Named(_) => None,
            Self::Custom(vars) => Some(vars),
        }
    }

    pub fn label(&self) -> String {
        match self {
            Self::Named(name) => name.label().to_string(),
            Self::Custom(vars) => format!("Custom ({} on {})", vars.len(), self.base().label()),
        }
    }
}

impl Default for ThemeSetting {
    fn default() -> Self {
        Self::Named(ThemeName::Default)
    }
}

impl From<ThemeName> for ThemeSetting {
    fn from(name: ThemeName) -> Self {
        Self::Named(name)
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ThemeError {
    #[error("invalid theme override: {0}")]
    Malformed(String),
    #[error("theme override must be an object")]
    NotAnObject,
    #[error("unknown theme '{0}'")]
    Unknown(String),
    #[error("{key}: {value} is not a valid color")]
    InvalidColor { key: String, value: String },
    #[error("{key}: {value} is not a valid font family")]
    InvalidFont { key: String, value: String },
}

/// Parse JSON-like text (JSON5: unquoted keys, trailing commas, comments)
/// into a theme variable map.
///
/// # Errors
///
/// Returns [`ThemeError::Malformed`] for text that does not parse and
/// [`ThemeError::NotAnObject`] for valid values that are not objects.
/// Color variables must be valid CSS colors ([`ThemeError::InvalidColor`])
/// and `fontFamily` must not contain markup ([`ThemeError::InvalidFont`]).
pub fn parse_theme_override(text: &str) -> Result<Map<String, Value>, ThemeError> {
    let value: Value =
        json5::from_str(text).map_err(|err| ThemeError::Malformed(err.to_string()))?;
    let Value::Object(map) = value else {
        return Err(ThemeError::NotAnObject);
    };
    for (key, value) in &map {
        if COLOR_VARIABLES.contains(&key.as_str())
            && !value.as_str().is_some_and(is_valid_color)
        {
            return Err(ThemeError::InvalidColor {
                key: key.clone(),
                value: value.to_string(),
            });
        }
        if key == "fontFamily"
            && !value
                .as_str()
                .is_some_and(|font| !font.contains(['<', '>', '&']))
        {
            return Err(ThemeError::InvalidFont {
                key: key.clone(),
                value: value.to_string(),
            });
        }
    }
    Ok(map)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_theme_name_parses_case_insensitively() {
        assert_eq!("Forest".parse::<ThemeName>(), Ok(ThemeName::Forest));
        assert_eq!(" dark ".parse::<ThemeName>(), Ok(ThemeName::Dark));
        assert!("solarized".parse::<ThemeName>().is_err());
    }

    #[test]
    fn test_theme_name_cycles_both_ways() {
        assert_eq!(ThemeName::Default.next(), ThemeName::Forest);
        assert_eq!(ThemeName::Neutral.next(), ThemeName::Default);
        assert_eq!(ThemeName::Default.prev(), ThemeName::Neutral);
    }

    #[test]
    fn test_parse_theme_override_accepts_json5() {
        let vars = parse_theme_override("{primaryColor: '#ff0000', theme: 'dark',}").unwrap();
        assert_eq!(vars["primaryColor"], "#ff0000");
        assert_eq!(ThemeSetting::Custom(vars).base(), ThemeName::Dark);
    }

    #[test]
    fn test_parse_theme_override_rejects_bad_input() {
        assert!(matches!(
            parse_theme_override("{bad json"),
            Err(ThemeError::Malformed(_))
        ));
        assert_eq!(parse_theme_override("[1, 2]"), Err(ThemeError::NotAnObject));
        assert_eq!(parse_theme_override("\"dark\""), Err(ThemeError::NotAnObject));
    }

    #[test]
    fn test_parse_theme_override_rejects_unsafe_colors() {
        let err = parse_theme_override(r#"{"primaryColor": "red\" x=\"1"}"#).unwrap_err();
        assert!(matches!(err, ThemeError::InvalidColor { ref key, .. } if key == "primaryColor"));
        assert!(matches!(
            parse_theme_override("{lineColor: 3}"),
            Err(ThemeError::InvalidColor { .. })
        ));
        assert!(matches!(
            parse_theme_override("{fontFamily: '<script>'}"),
            Err(ThemeError::InvalidFont { .. })
        ));
        assert!(parse_theme_override("{lineColor: 'rgb(1, 2, 3)', darkMode: true}").is_ok());
    }

    #[test]
    fn test_custom_theme_without_base_uses_default_palette() {
        let vars = parse_theme_override(r#"{"lineColor": "red"}"#).unwrap();
        let setting = ThemeSetting::Custom(vars);
        assert_eq!(setting.base(), ThemeName::Default);
        assert_eq!(setting.label(), "Custom (1 on Default)");
    }
}
