//! The facility viewer in a window.
//!
//! This demo shows:
//! - The built-in tower with its three hotspots
//! - Camera flights between views and the data cards
//! - Options loaded from an optional JSON file
//! - Ready and transition callbacks
//!
//! Run with: cargo run --example `facility_demo` [-- options.json]
//!
//! Click a marker to fly to it, click it again to fly back. Drag to orbit,
//! scroll to zoom, Escape to quit. Set `RUST_LOG=debug` to follow the state
//! machine.

use towerscope::{Viewer, ViewerOptions};

fn main() -> towerscope::Result<()> {
    env_logger::init();

    let options = match std::env::args().nth(1) {
        Some(path) => ViewerOptions::from_json_file(path)?,
        None => ViewerOptions {
            window_title: "towerscope - facility demo".to_string(),
            ..ViewerOptions::default()
        },
    };

    let mut viewer = Viewer::new(options)?;
    viewer.on_ready(|| log::info!("scene ready"));
    viewer.on_transition_complete(|done| {
        log::info!(
            "arrived at '{}' after {} frames{}",
            done.view,
            done.frames,
            if done.forced { " (forced)" } else { "" }
        );
    });

    towerscope::show(viewer)
}
