//! HUD and phase overlays drawn on top of the playfield

use glam::Vec2;

use super::color::Color;
use super::shapes;
use super::surface::{RenderSurface, TextAlign};
use crate::branding::Branding;
use crate::consts::{LOGICAL_HEIGHT, LOGICAL_WIDTH};
use crate::sim::Phase;

/// A labelled 0..1 gauge under the score
#[derive(Debug, Clone, PartialEq)]
pub struct Meter {
    pub label: String,
    pub fraction: f32,
    /// Draw in the danger color
    pub danger: bool,
}

/// What a game wants shown in the top bar
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Hud {
    pub score: String,
    /// Right-aligned secondary text
    pub detail: Option<String>,
    pub lives: Option<u32>,
    pub meter: Option<Meter>,
}

impl Hud {
    pub fn score(text: impl Into<String>) -> Self {
        Self {
            score: text.into(),
            ..Self::default()
        }
    }

    pub fn with_detail(mut self, text: impl Into<String>) -> Self {
        self.detail = Some(text.into());
        self
    }

    pub fn with_lives(mut self, lives: u32) -> Self {
        self.lives = Some(lives);
        self
    }

    pub fn with_meter(mut self, label: impl Into<String>, fraction: f32, danger: bool) -> Self {
        self.meter = Some(Meter {
            label: label.into(),
            fraction,
            danger,
        });
        self
    }
}

/// Session facts the overlays need
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlayState {
    pub phase: Phase,
    pub score: u64,
    pub best: u64,
    /// Milliseconds left in a timed phase
    pub remaining_ms: f64,
}

pub fn draw_hud(surface: &mut dyn RenderSurface, hud: &Hud, branding: &Branding) {
    let palette = &branding.palette;
    surface.fill_rect(Vec2::ZERO, Vec2::new(LOGICAL_WIDTH, 56.0), Color::rgba(0, 0, 0, 0.35));
    surface.text(&hud.score, Vec2::new(16.0, 28.0), 22.0, TextAlign::Left, palette.text);

    if let Some(detail) = &hud.detail {
        surface.text(detail, Vec2::new(LOGICAL_WIDTH - 16.0, 28.0), 18.0, TextAlign::Right, palette.text);
    } else if let Some(lives) = hud.lives {
        for i in 0..lives {
            let center = Vec2::new(LOGICAL_WIDTH - 24.0 - i as f32 * 24.0, 28.0);
            surface.fill_circle(center, 8.0, palette.danger);
        }
    }

    if let Some(meter) = &hud.meter {
        let fill = if meter.danger { palette.danger } else { palette.plant };
        surface.text(&meter.label, Vec2::new(16.0, 72.0), 14.0, TextAlign::Left, palette.text);
        shapes::bar(surface, Vec2::new(90.0, 64.0), Vec2::new(LOGICAL_WIDTH - 106.0, 16.0), meter.fraction, fill);
    }
}

/// Menu, countdown, level-complete and game-over screens
pub fn draw_overlay(surface: &mut dyn RenderSurface, state: &OverlayState, branding: &Branding) {
    let palette = &branding.palette;
    let labels = &branding.labels;
    let mid = Vec2::new(LOGICAL_WIDTH / 2.0, LOGICAL_HEIGHT / 2.0);

    match state.phase {
        Phase::Playing => {}
        Phase::Menu => {
            dim(surface, 0.6);
            let logo_drawn = branding.logo_key.as_deref().is_some_and(|key| {
                surface.image(key, mid - Vec2::new(80.0, 220.0), Vec2::new(160.0, 160.0))
            });
            if !logo_drawn {
                surface.text(&branding.company_name, mid - Vec2::new(0.0, 120.0), 32.0, TextAlign::Center, palette.primary);
            }
            surface.text(&labels.tap_to_start, mid + Vec2::new(0.0, 40.0), 24.0, TextAlign::Center, palette.text);
            if state.best > 0 {
                let best = format!("{}: {}", labels.best, state.best);
                surface.text(&best, mid + Vec2::new(0.0, 90.0), 18.0, TextAlign::Center, palette.text);
            }
        }
        Phase::Countdown => {
            dim(surface, 0.3);
            let secs = (state.remaining_ms / 1000.0).ceil().max(1.0) as u32;
            surface.text(&labels.get_ready, mid - Vec2::new(0.0, 60.0), 24.0, TextAlign::Center, palette.text);
            surface.text(&secs.to_string(), mid, 64.0, TextAlign::Center, palette.primary);
        }
        Phase::Success => {
            surface.text(&labels.level_complete, mid, 30.0, TextAlign::Center, palette.plant);
        }
        Phase::GameOver => {
            dim(surface, 0.7);
            surface.text(&labels.game_over, mid - Vec2::new(0.0, 80.0), 36.0, TextAlign::Center, palette.danger);
            let score = format!("{}: {}", labels.score, state.score);
            surface.text(&score, mid, 26.0, TextAlign::Center, palette.text);
            let best = format!("{}: {}", labels.best, state.best.max(state.score));
            surface.text(&best, mid + Vec2::new(0.0, 40.0), 18.0, TextAlign::Center, palette.text);
            surface.text(&labels.tap_to_restart, mid + Vec2::new(0.0, 110.0), 20.0, TextAlign::Center, palette.primary);
        }
    }
}

fn dim(surface: &mut dyn RenderSurface, alpha: f32) {
    surface.fill_rect(Vec2::ZERO, Vec2::new(LOGICAL_WIDTH, LOGICAL_HEIGHT), Color::BLACK.with_alpha(alpha));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::CommandRecorder;

    fn overlay(phase: Phase) -> OverlayState {
        OverlayState {
            phase,
            score: 42,
            best: 30,
            remaining_ms: 2100.0,
        }
    }

    #[test]
    fn test_game_over_shows_score_and_new_best() {
        let mut rec = CommandRecorder::new();
        draw_overlay(&mut rec, &overlay(Phase::GameOver), &Branding::default());
        let texts: Vec<&str> = rec.texts().collect();
        assert!(texts.contains(&"FIM DE JOGO"));
        assert!(texts.contains(&"PONTOS: 42"));
        assert!(texts.contains(&"RECORDE: 42"));
    }

    #[test]
    fn test_countdown_rounds_up() {
        let mut rec = CommandRecorder::new();
        draw_overlay(&mut rec, &overlay(Phase::Countdown), &Branding::default());
        assert!(rec.texts().any(|t| t == "3"));
    }

    #[test]
    fn test_menu_prefers_loaded_logo() {
        let branding = Branding {
            logo_key: Some("logo".into()),
            ..Branding::default()
        };
        let mut rec = CommandRecorder::with_images(&["logo"]);
        draw_overlay(&mut rec, &overlay(Phase::Menu), &branding);
        assert!(!rec.texts().any(|t| t == branding.company_name));

        let mut rec = CommandRecorder::new();
        draw_overlay(&mut rec, &overlay(Phase::Menu), &branding);
        assert!(rec.texts().any(|t| t == branding.company_name));
    }

    #[test]
    fn test_playing_draws_nothing() {
        let mut rec = CommandRecorder::new();
        draw_overlay(&mut rec, &overlay(Phase::Playing), &Branding::default());
        assert!(rec.commands().is_empty());
    }

    #[test]
    fn test_hud_lives() {
        let mut rec = CommandRecorder::new();
        draw_hud(&mut rec, &Hud::score("10").with_lives(2), &Branding::default());
        let circles = rec
            .commands()
            .iter()
            .filter(|c| matches!(c, crate::renderer::DrawCommand::FillCircle { .. }))
            .count();
        assert_eq!(circles, 2);
    }
}
