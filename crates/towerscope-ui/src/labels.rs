//! Screen-space labels for hotspot markers and the loading placeholder.

use egui::{Color32, Context, Id, Order, RichText, Stroke};

/// A marker label, already projected to logical screen points.
#[derive(Debug, Clone, PartialEq)]
pub struct HotspotLabel {
    pub text: String,
    pub color: [f32; 3],
    pub screen_pos: glam::Vec2,
    pub active: bool,
    pub hovered: bool,
}

/// Draws one pill-shaped label above each marker.
pub fn draw_hotspot_labels(ctx: &Context, labels: &[HotspotLabel]) {
    for (i, label) in labels.iter().enumerate() {
        let [r, g, b] = label.color.map(|c| (c.clamp(0.0, 1.0) * 255.0).round() as u8);
        let accent = Color32::from_rgb(r, g, b);
        let (fill, text) = if label.active {
            (accent, Color32::BLACK)
        } else if label.hovered {
            (accent.gamma_multiply(0.5), Color32::WHITE)
        } else {
            (Color32::from_rgba_unmultiplied(0, 0, 0, 180), accent)
        };

        let pos = egui::pos2(label.screen_pos.x, label.screen_pos.y);
        egui::Area::new(Id::new(("towerscope_hotspot_label", i)))
            .order(Order::Middle)
            .fixed_pos(pos)
            .pivot(egui::Align2::CENTER_BOTTOM)
            .interactable(false)
            .show(ctx, |ui| {
                egui::Frame::new()
                    .fill(fill)
                    .stroke(Stroke::new(1.0, accent))
                    .corner_radius(4)
                    .inner_margin(egui::Margin::symmetric(8, 4))
                    .show(ui, |ui| {
                        ui.label(RichText::new(&label.text).monospace().size(10.0).color(text));
                    });
            });
    }
}

/// Full-screen placeholder shown while an external scene loads.
pub fn draw_loading_placeholder(ctx: &Context, elapsed: f32) {
    let dots = ".".repeat(1 + (elapsed * 2.0) as usize % 3);
    egui::Area::new(Id::new("towerscope_loading"))
        .order(Order::Foreground)
        .anchor(egui::Align2::CENTER_CENTER, egui::Vec2::ZERO)
        .interactable(false)
        .show(ctx, |ui| {
            ui.label(
                RichText::new(format!("LOADING SCENE{dots}"))
                    .monospace()
                    .size(12.0)
                    .color(Color32::from_rgb(0x22, 0xd3, 0xee)),
            );
        });
    ctx.request_repaint();
}
