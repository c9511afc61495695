//! Heads-up display and full-screen menus.
//!
//! Everything here draws from a `HudSnapshot` built by the game after the
//! frame's fixed steps. Buttons do not touch game state; they set flags on
//! `UiActions` that the caller applies.

use egui::{Align2, Color32, FontId, Id, LayerId, Order, Pos2, Rect, RichText, Stroke, Vec2};

const LOW_HEALTH_FRACTION: f32 = 0.3;
const BAR_WIDTH: f32 = 240.0;
const CROSSHAIR_ARM: f32 = 8.0;
const CROSSHAIR_GAP: f32 = 3.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScreenState {
    Title,
    Playing,
    Paused,
    GameOver,
}

/// Red edge flash with a marker toward whoever dealt the damage.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DamageFlash {
    /// 1.0 when the hit lands, fading to 0.0.
    pub intensity: f32,
    /// Attacker bearing relative to the view, radians; 0 is straight ahead,
    /// positive to the right.
    pub bearing: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Banner {
    pub text: String,
    /// Fade factor in [0, 1].
    pub alpha: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HudSnapshot {
    pub screen: ScreenState,
    pub health: f32,
    pub max_health: f32,
    pub stamina: f32,
    pub max_stamina: f32,
    pub score: u32,
    pub wave: u32,
    pub enemies_remaining: u32,
    pub sound_enabled: bool,
    pub music_enabled: bool,
    pub damage: Option<DamageFlash>,
    pub wave_banner: Option<Banner>,
    pub notice: Option<Banner>,
}

impl Default for HudSnapshot {
    fn default() -> Self {
        Self {
            screen: ScreenState::Title,
            health: 100.0,
            max_health: 100.0,
            stamina: 100.0,
            max_stamina: 100.0,
            score: 0,
            wave: 0,
            enemies_remaining: 0,
            sound_enabled: true,
            music_enabled: true,
            damage: None,
            wave_banner: None,
            notice: None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UiActions {
    pub start: bool,
    pub resume: bool,
    pub restart: bool,
    pub quit_to_title: bool,
    pub toggle_sound: bool,
    pub toggle_music: bool,
}

impl UiActions {
    pub fn any(&self) -> bool {
        *self != Self::default()
    }
}

pub fn health_color(fraction: f32) -> Color32 {
    if fraction < LOW_HEALTH_FRACTION {
        Color32::from_rgb(220, 40, 40)
    } else {
        Color32::from_rgb(70, 190, 80)
    }
}

/// Screen-space offset of the damage marker on a circle of `radius` around
/// the center. Up on screen is straight ahead.
pub fn damage_marker_offset(bearing: f32, radius: f32) -> Vec2 {
    Vec2::new(bearing.sin() * radius, -bearing.cos() * radius)
}

fn fraction(value: f32, max: f32) -> f32 {
    if max > 0.0 {
        (value / max).clamp(0.0, 1.0)
    } else {
        0.0
    }
}

fn with_alpha(color: Color32, alpha: f32) -> Color32 {
    let a = (color.a() as f32 * alpha.clamp(0.0, 1.0)).round() as u8;
    Color32::from_rgba_unmultiplied(color.r(), color.g(), color.b(), a)
}

pub fn draw_hud(ctx: &egui::Context, hud: &HudSnapshot) {
    if !matches!(hud.screen, ScreenState::Playing | ScreenState::Paused) {
        return;
    }

    egui::Area::new(Id::new("hud_bars"))
        .anchor(Align2::LEFT_BOTTOM, [16.0, -16.0])
        .interactable(false)
        .show(ctx, |ui| {
            let health = fraction(hud.health, hud.max_health);
            ui.add(
                egui::ProgressBar::new(health)
                    .desired_width(BAR_WIDTH)
                    .fill(health_color(health))
                    .text(format!("Health {:.0}", hud.health.max(0.0))),
            );
            ui.add(
                egui::ProgressBar::new(fraction(hud.stamina, hud.max_stamina))
                    .desired_width(BAR_WIDTH)
                    .fill(Color32::from_rgb(60, 140, 220))
                    .text(format!("Stamina {:.0}", hud.stamina)),
            );
        });

    egui::Area::new(Id::new("hud_score"))
        .anchor(Align2::RIGHT_TOP, [-16.0, 16.0])
        .interactable(false)
        .show(ctx, |ui| {
            ui.label(
                RichText::new(format!("Score {}", hud.score))
                    .size(24.0)
                    .strong()
                    .color(Color32::WHITE),
            );
            if hud.wave > 0 {
                ui.label(
                    RichText::new(format!(
                        "Wave {}  |  {} remaining",
                        hud.wave, hud.enemies_remaining
                    ))
                    .size(18.0)
                    .color(Color32::LIGHT_GRAY),
                );
            }
        });

    let screen = ctx.screen_rect();
    let painter = ctx.layer_painter(LayerId::new(Order::Foreground, Id::new("hud_overlay")));

    if hud.screen == ScreenState::Playing {
        draw_crosshair(&painter, screen.center());
    }

    if let Some(flash) = hud.damage {
        let red = with_alpha(Color32::from_rgb(200, 0, 0), 0.45 * flash.intensity);
        let edge = screen.width().min(screen.height()) * 0.06;
        for band in [
            Rect::from_min_max(screen.min, Pos2::new(screen.max.x, screen.min.y + edge)),
            Rect::from_min_max(Pos2::new(screen.min.x, screen.max.y - edge), screen.max),
            Rect::from_min_max(screen.min, Pos2::new(screen.min.x + edge, screen.max.y)),
            Rect::from_min_max(Pos2::new(screen.max.x - edge, screen.min.y), screen.max),
        ] {
            painter.rect_filled(band, 0.0, red);
        }
        let radius = screen.height() * 0.25;
        let marker = screen.center() + damage_marker_offset(flash.bearing, radius);
        painter.circle_filled(
            marker,
            10.0,
            with_alpha(Color32::from_rgb(255, 40, 40), flash.intensity),
        );
    }

    if let Some(banner) = &hud.wave_banner {
        painter.text(
            Pos2::new(screen.center().x, screen.min.y + screen.height() * 0.28),
            Align2::CENTER_CENTER,
            &banner.text,
            FontId::proportional(48.0),
            with_alpha(Color32::from_rgb(255, 220, 120), banner.alpha),
        );
    }

    if let Some(notice) = &hud.notice {
        painter.text(
            Pos2::new(screen.center().x, screen.max.y - screen.height() * 0.22),
            Align2::CENTER_CENTER,
            &notice.text,
            FontId::proportional(26.0),
            with_alpha(Color32::from_rgb(150, 230, 255), notice.alpha),
        );
    }
}

fn draw_crosshair(painter: &egui::Painter, center: Pos2) {
    let stroke = Stroke::new(2.0, Color32::from_white_alpha(220));
    for dir in [Vec2::X, -Vec2::X, Vec2::Y, -Vec2::Y] {
        painter.line_segment(
            [
                center + dir * CROSSHAIR_GAP,
                center + dir * (CROSSHAIR_GAP + CROSSHAIR_ARM),
            ],
            stroke,
        );
    }
}

pub fn draw_screen(ctx: &egui::Context, hud: &HudSnapshot, actions: &mut UiActions) {
    if hud.screen == ScreenState::Playing {
        return;
    }

    let screen = ctx.screen_rect();
    ctx.layer_painter(LayerId::new(Order::Background, Id::new("menu_dim")))
        .rect_filled(screen, 0.0, Color32::from_black_alpha(150));

    egui::Area::new(Id::new("menu"))
        .anchor(Align2::CENTER_CENTER, [0.0, 0.0])
        .show(ctx, |ui| {
            egui::Frame::popup(ui.style()).show(ui, |ui| {
                ui.set_min_width(320.0);
                ui.vertical_centered(|ui| match hud.screen {
                    ScreenState::Title => title_screen(ui, actions),
                    ScreenState::Paused => pause_screen(ui, hud, actions),
                    ScreenState::GameOver => game_over_screen(ui, hud, actions),
                    ScreenState::Playing => {}
                });
            });
        });
}

fn title_screen(ui: &mut egui::Ui, actions: &mut UiActions) {
    ui.label(RichText::new("HOLLOWFIELD").size(40.0).strong());
    ui.add_space(8.0);
    ui.label("Survive the waves. Grab hearts and sodas.");
    ui.add_space(8.0);
    ui.label("WASD move  |  Shift run  |  Space jump");
    ui.label("Mouse look  |  Left click shoot  |  Esc pause");
    ui.add_space(16.0);
    if ui.button(RichText::new("Start").size(22.0)).clicked() {
        actions.start = true;
    }
}

fn pause_screen(ui: &mut egui::Ui, hud: &HudSnapshot, actions: &mut UiActions) {
    ui.label(RichText::new("Paused").size(32.0).strong());
    ui.add_space(12.0);
    if ui.button(RichText::new("Resume").size(20.0)).clicked() {
        actions.resume = true;
    }
    ui.add_space(8.0);
    let on_off = |enabled: bool| if enabled { "On" } else { "Off" };
    if ui
        .button(format!("Sound: {}", on_off(hud.sound_enabled)))
        .clicked()
    {
        actions.toggle_sound = true;
    }
    if ui
        .button(format!("Music: {}", on_off(hud.music_enabled)))
        .clicked()
    {
        actions.toggle_music = true;
    }
    ui.add_space(8.0);
    if ui.button("Quit to title").clicked() {
        actions.quit_to_title = true;
    }
}

fn game_over_screen(ui: &mut egui::Ui, hud: &HudSnapshot, actions: &mut UiActions) {
    ui.label(
        RichText::new("GAME OVER")
            .size(40.0)
            .strong()
            .color(Color32::from_rgb(220, 40, 40)),
    );
    ui.add_space(8.0);
    ui.label(RichText::new(format!("Final score: {}", hud.score)).size(22.0));
    ui.label(format!("Reached wave {}", hud.wave));
    ui.add_space(16.0);
    if ui.button(RichText::new("Play Again").size(22.0)).clicked() {
        actions.restart = true;
    }
    if ui.button("Quit to title").clicked() {
        actions.quit_to_title = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn health_bar_turns_red_below_threshold() {
        assert_eq!(health_color(0.29), Color32::from_rgb(220, 40, 40));
        assert_eq!(health_color(0.3), Color32::from_rgb(70, 190, 80));
    }

    #[test]
    fn damage_marker_points_toward_attacker() {
        let ahead = damage_marker_offset(0.0, 100.0);
        assert!(ahead.x.abs() < 1e-4 && (ahead.y + 100.0).abs() < 1e-4);
        let right = damage_marker_offset(std::f32::consts::FRAC_PI_2, 100.0);
        assert!((right.x - 100.0).abs() < 1e-4 && right.y.abs() < 1e-4);
    }

    #[test]
    fn fraction_handles_zero_max() {
        assert_eq!(fraction(5.0, 0.0), 0.0);
        assert_eq!(fraction(150.0, 100.0), 1.0);
    }

    #[test]
    fn actions_default_to_nothing() {
        let mut actions = UiActions::default();
        assert!(!actions.any());
        actions.toggle_music = true;
        assert!(actions.any());
    }

    #[test]
    fn menus_run_without_panicking() {
        let ctx = egui::Context::default();
        for screen in [
            ScreenState::Title,
            ScreenState::Playing,
            ScreenState::Paused,
            ScreenState::GameOver,
        ] {
            let hud = HudSnapshot {
                screen,
                damage: Some(DamageFlash {
                    intensity: 0.5,
                    bearing: 1.0,
                }),
                wave_banner: Some(Banner {
                    text: "Wave 2".to_string(),
                    alpha: 1.0,
                }),
                ..HudSnapshot::default()
            };
            let mut actions = UiActions::default();
            let _ = ctx.run(egui::RawInput::default(), |ctx| {
                draw_hud(ctx, &hud);
                draw_screen(ctx, &hud, &mut actions);
            });
            assert!(!actions.any());
        }
    }
}
