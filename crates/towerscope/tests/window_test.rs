//! Windowed smoke test.
//!
//! Needs a display. Run manually with: cargo test -- --ignored

use towerscope::*;

#[test]
#[ignore = "opens a window and blocks until it is closed"]
fn test_show_window() {
    let mut viewer = Viewer::new(ViewerOptions::default()).unwrap();
    viewer.on_ready(|| println!("ready"));
    show(viewer).expect("viewer window failed");
}
