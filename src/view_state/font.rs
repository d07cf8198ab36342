//! Font families for diagram labels.

use std::fmt;
use std::str::FromStr;

/// Font families offered by the control panel.
#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FontFamily {
    #[default]
    Arial,
    Helvetica,
    Courier,
    Verdana,
    Times,
    Georgia,
    Palatino,
    Garamond,
}

impl FontFamily {
    pub const ALL: [Self; 8] = [
        Self::Arial,
        Self::Helvetica,
        Self::Courier,
        Self::Verdana,
        Self::Times,
        Self::Georgia,
        Self::Palatino,
        Self::Garamond,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Arial => "arial",
            Self::Helvetica => "helvetica",
            Self::Courier => "courier",
            Self::Verdana => "verdana",
            Self::Times => "times",
            Self::Georgia => "georgia",
            Self::Palatino => "palatino",
            Self::Garamond => "garamond",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Arial => "Arial",
            Self::Helvetica => "Helvetica",
            Self::Courier => "Courier",
            Self::Verdana => "Verdana",
            Self::Times => "Times New Roman",
            Self::Georgia => "Georgia",
            Self::Palatino => "Palatino",
            Self::Garamond => "Garamond",
        }
    }

    /// CSS font stack written into the SVG. Multi-word names use single
    /// quotes so the value survives inside a double-quoted attribute.
    pub const fn css_stack(self) -> &'static str {
        match self {
            Self::Arial => "Arial, sans-serif",
            Self::Helvetica => "Helvetica, Arial, sans-serif",
            Self::Courier => "'Courier New', Courier, monospace",
            Self::Verdana => "Verdana, sans-serif",
            Self::Times => "'Times New Roman', Times, serif",
            Self::Georgia => "Georgia, serif",
            Self::Palatino => "'Palatino Linotype', Palatino, serif",
            Self::Garamond => "Garamond, serif",
        }
    }

    pub fn next(self) -> Self {
        let idx = Self::ALL.iter().position(|f| *f == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }

    pub fn prev(self) -> Self {
        let idx = Self::ALL.iter().position(|f| *f == self).unwrap_or(0);
        Self::ALL[(idx + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

impl fmt::Display for FontFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FontFamily {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|f| f.as_str().eq_ignore_ascii_case(s) || f.label().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown font family '{s}'"))
    }
}
