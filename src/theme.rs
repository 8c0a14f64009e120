//! Light dashboard theme and scene color conversion

use egui::Color32;

use crate::views::scale::Rgb;

pub mod colors {
    use super::Color32;

    pub const BG_PRIMARY: Color32 = Color32::from_rgb(245, 247, 250);
    pub const BG_PANEL: Color32 = Color32::from_rgb(255, 255, 255);
    pub const BORDER: Color32 = Color32::from_rgb(221, 221, 221);

    pub const TEXT_PRIMARY: Color32 = Color32::from_rgb(51, 51, 51);
    pub const TEXT_SECONDARY: Color32 = Color32::from_rgb(102, 102, 102);
    pub const TEXT_MUTED: Color32 = Color32::from_rgb(153, 153, 153);

    /// Header gradient start, active nav button.
    pub const ACCENT: Color32 = Color32::from_rgb(102, 126, 234);
    pub const NOTICE: Color32 = Color32::from_rgb(204, 102, 0);
}

/// Scene hex color with opacity. Unparseable colors paint grey.
pub fn scene_color(hex: &str, opacity: f32) -> Color32 {
    let Rgb(r, g, b) = Rgb::parse(hex).unwrap_or(Rgb(0xcc, 0xcc, 0xcc));
    let alpha = (opacity.clamp(0.0, 1.0) * 255.0).round() as u8;
    Color32::from_rgba_unmultiplied(r, g, b, alpha)
}

pub fn light_visuals() -> egui::Visuals {
    use colors::*;

    let mut visuals = egui::Visuals::light();

    visuals.panel_fill = BG_PRIMARY;
    visuals.window_fill = BG_PANEL;
    visuals.extreme_bg_color = BG_PANEL;
    visuals.override_text_color = Some(TEXT_PRIMARY);

    visuals.widgets.noninteractive.bg_stroke = egui::Stroke::new(1.0, BORDER);
    visuals.widgets.inactive.fg_stroke = egui::Stroke::new(1.0, TEXT_SECONDARY);
    visuals.widgets.hovered.bg_stroke = egui::Stroke::new(1.0, ACCENT);
    visuals.widgets.active.bg_fill = ACCENT;

    visuals.selection.bg_fill = ACCENT;
    visuals.selection.stroke = egui::Stroke::new(1.0, Color32::WHITE);
    visuals.hyperlink_color = ACCENT;

    visuals.window_shadow = egui::Shadow::NONE;
    visuals.popup_shadow = egui::Shadow::NONE;

    visuals
}
