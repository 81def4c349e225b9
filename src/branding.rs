//! White-label display configuration
//!
//! Read-only: rendering may look things up here, simulation never does.

use serde::{Deserialize, Serialize};

use crate::renderer::Color;

/// Palette used by the HUD, overlays and sprites
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Palette {
    pub primary: Color,
    pub background: Color,
    pub ground: Color,
    pub ground_dark: Color,
    pub plant: Color,
    pub plant_dark: Color,
    pub spray: Color,
    pub text: Color,
    pub danger: Color,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            primary: Color::from_hex(0xFF6700),
            background: Color::from_hex(0x2C3E50),
            ground: Color::from_hex(0x5D4037),
            ground_dark: Color::from_hex(0x4E342E),
            plant: Color::from_hex(0x4CAF50),
            plant_dark: Color::from_hex(0x2E7D32),
            spray: Color::rgba(0, 255, 255, 0.6),
            text: Color::WHITE,
            danger: Color::from_hex(0xE74C3C),
        }
    }
}

/// Overlay strings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Labels {
    pub tap_to_start: String,
    pub game_over: String,
    pub tap_to_restart: String,
    pub score: String,
    pub best: String,
    pub get_ready: String,
    pub level_complete: String,
}

impl Default for Labels {
    fn default() -> Self {
        Self {
            tap_to_start: "TOQUE PARA JOGAR".to_string(),
            game_over: "FIM DE JOGO".to_string(),
            tap_to_restart: "TOQUE PARA REINICIAR".to_string(),
            score: "PONTOS".to_string(),
            best: "RECORDE".to_string(),
            get_ready: "MEMORIZE!".to_string(),
            level_complete: "NÍVEL CONCLUÍDO!".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Branding {
    pub company_name: String,
    pub palette: Palette,
    pub labels: Labels,
    /// Image key drawn on the menu overlay, if loaded
    pub logo_key: Option<String>,
    pub logo_url: Option<String>,
}

impl Default for Branding {
    fn default() -> Self {
        Self {
            company_name: "AGRO ARCADE".to_string(),
            palette: Palette::default(),
            labels: Labels::default(),
            logo_key: None,
            logo_url: None,
        }
    }
}

impl Branding {
    /// Parse host-supplied JSON; missing fields keep their defaults
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_keeps_defaults() {
        let b = Branding::from_json(
            r##"{"company_name": "COOP VERDE", "palette": {"primary": "#16a34a"}}"##,
        )
        .unwrap();
        assert_eq!(b.company_name, "COOP VERDE");
        assert_eq!(b.palette.primary, Color::from_hex(0x16a34a));
        assert_eq!(b.palette.danger, Palette::default().danger);
        assert_eq!(b.labels, Labels::default());
    }

    #[test]
    fn test_bad_color_is_an_error() {
        assert!(Branding::from_json(r#"{"palette": {"primary": "orange"}}"#).is_err());
    }
}
