//! The floating data card next to an active view.

use egui::emath::TSTransform;
use egui::{Color32, Context, FontId, Id, LayerId, Order, RichText, Stroke};
use towerscope_core::{MetricStatus, OverlayFrame};

const CARD_ID: &str = "towerscope_data_card";
const CARD_WIDTH: f32 = 220.0;
const ACCENT: Color32 = Color32::from_rgb(0x3b, 0x82, 0xf6);

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn color32(rgb: [f32; 3]) -> Color32 {
    let channel = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
    Color32::from_rgb(channel(rgb[0]), channel(rgb[1]), channel(rgb[2]))
}

/// Text color for a metric value.
pub fn status_color(status: MetricStatus) -> Color32 {
    color32(status.color())
}

/// Draws the card described by `frame`, scaled about its anchor.
pub fn draw_data_card(ctx: &Context, frame: &OverlayFrame<'_>) {
    let id = Id::new(CARD_ID);
    let anchor = egui::pos2(frame.panel.anchor.x, frame.panel.anchor.y + frame.offset_y);

    // Scale about the anchor: p' = s * p + (1 - s) * anchor.
    let s = frame.scale;
    ctx.set_transform_layer(
        LayerId::new(Order::Foreground, id),
        TSTransform::new(anchor.to_vec2() * (1.0 - s), s),
    );

    egui::Area::new(id)
        .order(Order::Foreground)
        .fixed_pos(anchor)
        .interactable(false)
        .show(ctx, |ui| {
            ui.multiply_opacity(frame.opacity);
            egui::Frame::new()
                .fill(Color32::from_rgba_unmultiplied(10, 15, 30, 220))
                .stroke(Stroke::new(1.0, ACCENT.gamma_multiply(0.4)))
                .corner_radius(8)
                .inner_margin(egui::Margin::same(12))
                .show(ui, |ui| {
                    ui.set_width(CARD_WIDTH);
                    ui.horizontal(|ui| {
                        let (dot, _) =
                            ui.allocate_exact_size(egui::vec2(8.0, 8.0), egui::Sense::hover());
                        ui.painter().circle_filled(dot.center(), 4.0, ACCENT);
                        ui.label(
                            RichText::new(frame.title)
                                .strong()
                                .color(Color32::WHITE)
                                .size(14.0),
                        );
                        if let Some(status) = &frame.panel.status {
                            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                                ui.label(
                                    RichText::new(status.to_uppercase())
                                        .monospace()
                                        .size(9.0)
                                        .color(ACCENT),
                                );
                            });
                        }
                    });
                    ui.add_space(6.0);

                    for (metric, row) in frame.panel.metrics.iter().zip(&frame.rows) {
                        ui.scope(|ui| {
                            ui.multiply_opacity(row.opacity);
                            ui.horizontal(|ui| {
                                // offset_x runs from -10 to 0 as the row slides in.
                                ui.add_space(10.0 + row.offset_x);
                                ui.label(
                                    RichText::new(&metric.label)
                                        .size(11.0)
                                        .color(Color32::from_gray(160)),
                                );
                                ui.with_layout(
                                    egui::Layout::right_to_left(egui::Align::Center),
                                    |ui| {
                                        ui.label(
                                            RichText::new(&metric.value)
                                                .font(FontId::monospace(12.0))
                                                .color(status_color(metric.status)),
                                        );
                                    },
                                );
                            });
                        });
                    }
                });
        });

    if frame.exiting || frame.opacity < 1.0 {
        ctx.request_repaint();
    }
}
