//! Render a still of every view without opening a window.
//!
//! Run with: cargo run --example `capture_views`
//!
//! Outputs PNG files to target/views/

use towerscope::{Viewer, ViewerOptions, DEFAULT_VIEW};

const WIDTH: u32 = 1280;
const HEIGHT: u32 = 720;
const OUT_DIR: &str = "target/views";
const DT: f32 = 1.0 / 60.0;

/// Ticks until the flight lands and the card has finished typing.
fn fly_to(viewer: &mut Viewer, view: &str) -> towerscope::Result<()> {
    viewer.request_view(view)?;
    while viewer.tick(DT).is_none() {}
    for _ in 0..90 {
        viewer.tick(DT);
    }
    Ok(())
}

fn main() -> towerscope::Result<()> {
    env_logger::init();
    std::fs::create_dir_all(OUT_DIR)?;

    let mut viewer = Viewer::new(ViewerOptions::default())?;
    let mut views: Vec<String> = viewer
        .controller()
        .views()
        .iter()
        .map(|v| v.id.clone())
        .collect();
    // Overview last, so the cards of the other views exit first.
    views.sort_by_key(|id| id == DEFAULT_VIEW);

    for view in &views {
        print!("Rendering {view}... ");
        fly_to(&mut viewer, view)?;
        let path = format!("{OUT_DIR}/{view}.png");
        match towerscope::render_to_file(&mut viewer, &path, WIDTH, HEIGHT) {
            Ok(()) => println!("OK -> {path}"),
            Err(e) => println!("FAILED: {e}"),
        }
    }

    println!(
        "\nDone! {} views after {:.1}s of simulated time",
        views.len(),
        viewer.elapsed()
    );
    Ok(())
}
