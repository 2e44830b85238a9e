//! Artwork styles and their palettes.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Style {
    MidnightAura,
    KenyanForest,
    CyberHustle,
}

/// RGB colors of one style.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub background: [u8; 3],
    pub accent: [u8; 3],
    pub glow: [u8; 3],
}

impl Style {
    pub const ALL: [Style; 3] = [Style::MidnightAura, Style::KenyanForest, Style::CyberHustle];

    pub fn as_str(self) -> &'static str {
        match self {
            Style::MidnightAura => "midnight-aura",
            Style::KenyanForest => "kenyan-forest",
            Style::CyberHustle => "cyber-hustle",
        }
    }

    pub fn palette(self) -> Palette {
        match self {
            Style::MidnightAura => Palette {
                background: [13, 27, 42],
                accent: [129, 236, 236],
                glow: [27, 67, 50],
            },
            Style::KenyanForest => Palette {
                background: [10, 25, 20],
                accent: [255, 255, 255],
                glow: [45, 106, 79],
            },
            Style::CyberHustle => Palette {
                background: [20, 20, 20],
                accent: [255, 107, 107],
                glow: [60, 20, 20],
            },
        }
    }
}

impl fmt::Display for Style {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, Clone, PartialEq)]
#[error("unsupported style '{0}' (expected one of midnight-aura, kenyan-forest, cyber-hustle)")]
pub struct UnknownStyle(pub String);

impl FromStr for Style {
    type Err = UnknownStyle;

    /// Accepts `midnight-aura`, `Midnight Aura` and `midnight_aura` alike.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let slug = s.trim().to_lowercase().replace([' ', '_'], "-");
        Style::ALL
            .into_iter()
            .find(|style| style.as_str() == slug)
            .ok_or_else(|| UnknownStyle(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_variants() {
        assert_eq!("midnight-aura".parse::<Style>(), Ok(Style::MidnightAura));
        assert_eq!("Kenyan Forest".parse::<Style>(), Ok(Style::KenyanForest));
        assert_eq!(" CYBER_HUSTLE ".parse::<Style>(), Ok(Style::CyberHustle));
    }

    #[test]
    fn test_parse_unknown() {
        let err = "watercolor".parse::<Style>().unwrap_err();
        assert_eq!(err, UnknownStyle("watercolor".into()));
        assert!(err.to_string().contains("watercolor"));
    }

    #[test]
    fn test_roundtrip_through_display() {
        for style in Style::ALL {
            assert_eq!(style.to_string().parse::<Style>(), Ok(style));
        }
    }

    #[test]
    fn test_serde_kebab_case() {
        assert_eq!(serde_json::to_string(&Style::CyberHustle).unwrap(), "\"cyber-hustle\"");
    }
}
