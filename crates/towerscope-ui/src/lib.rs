//! UI layer for towerscope using egui.

pub mod data_card;
pub mod integration;
pub mod labels;

pub use data_card::{draw_data_card, status_color};
pub use integration::{paint_output, EguiIntegration};
pub use labels::{draw_hotspot_labels, draw_loading_placeholder, HotspotLabel};
