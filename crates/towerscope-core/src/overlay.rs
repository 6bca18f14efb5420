//! The info overlay ("data card") shown next to an active view.
//!
//! [`OverlayPanel`] is the static content for one view. [`OverlayPresenter`]
//! owns at most one panel at a time and turns elapsed time into the entry,
//! row-stagger, typewriter and exit motion that the UI layer draws.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::options::OverlayOptions;
use crate::typewriter::Typewriter;

/// Semantic status of a metric value, mapped to a text color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetricStatus {
    /// Good news (green).
    Positive,
    /// Needs attention (amber).
    Warning,
    /// Informational (blue).
    Neutral,
    /// Plain text.
    #[default]
    Default,
}

impl MetricStatus {
    /// RGB text color for this status, components in `[0, 1]`.
    pub fn color(self) -> [f32; 3] {
        match self {
            MetricStatus::Positive => crate::hex_color(0x0034_d399),
            MetricStatus::Warning => crate::hex_color(0x00fb_bf24),
            MetricStatus::Neutral => crate::hex_color(0x0060_a5fa),
            MetricStatus::Default => crate::hex_color(0x00e5_e7eb),
        }
    }
}

/// One labeled value in a panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricRow {
    pub label: String,
    pub value: String,
    #[serde(default)]
    pub status: MetricStatus,
}

impl MetricRow {
    /// Creates a new metric row.
    pub fn new(label: impl Into<String>, value: impl Into<String>, status: MetricStatus) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
            status,
        }
    }
}

/// Content of the data card for one view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverlayPanel {
    /// View this panel belongs to.
    pub view: String,
    /// Card heading.
    pub title: String,
    /// Optional status badge next to the title.
    #[serde(default)]
    pub status: Option<String>,
    /// Rows in display order.
    pub metrics: Vec<MetricRow>,
    /// Top-left corner of the card relative to the viewport, in logical pixels.
    #[serde(default)]
    pub anchor: Vec2,
}

/// Motion of a single metric row.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RowFrame {
    pub opacity: f32,
    /// Horizontal slide in logical pixels.
    pub offset_x: f32,
}

/// Everything the UI needs to draw the card for one frame.
#[derive(Debug, Clone)]
pub struct OverlayFrame<'a> {
    pub panel: &'a OverlayPanel,
    pub opacity: f32,
    pub scale: f32,
    /// Vertical slide in logical pixels.
    pub offset_y: f32,
    /// Title text revealed so far.
    pub title: &'a str,
    pub rows: Vec<RowFrame>,
    pub exiting: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Entering,
    Shown,
    Exiting,
}

#[derive(Debug, Clone)]
struct Presented {
    panel: OverlayPanel,
    stage: Stage,
    /// Seconds since the current stage began.
    stage_time: f32,
    /// Seconds since the panel was activated.
    age: f32,
}

/// Drives the lifecycle of the single on-screen panel.
#[derive(Debug, Clone)]
pub struct OverlayPresenter {
    options: OverlayOptions,
    current: Option<Presented>,
    typewriter: Typewriter,
}

impl OverlayPresenter {
    /// Creates an empty presenter.
    pub fn new(options: OverlayOptions) -> Self {
        let typewriter = Typewriter::new(options.typewriter_interval_secs);
        Self {
            options,
            current: None,
            typewriter,
        }
    }

    /// Shows `panel`. The newest request wins: any other panel, including one
    /// that is still exiting, is dropped. Showing the panel that is already
    /// on screen keeps its animation progress; a panel brought back while it
    /// is exiting starts over, title included.
    pub fn show(&mut self, panel: &OverlayPanel) {
        if let Some(current) = &self.current {
            if current.stage != Stage::Exiting && current.panel.view == panel.view {
                return;
            }
        }
        log::debug!("overlay enter: '{}'", panel.view);
        self.typewriter.clear();
        self.typewriter.set_text(&panel.title);
        self.current = Some(Presented {
            panel: panel.clone(),
            stage: Stage::Entering,
            stage_time: 0.0,
            age: 0.0,
        });
    }

    /// Starts the exit motion of the visible panel, if any.
    pub fn hide(&mut self) {
        if let Some(current) = &mut self.current {
            if current.stage != Stage::Exiting {
                log::debug!("overlay exit: '{}'", current.panel.view);
                current.stage = Stage::Exiting;
                current.stage_time = 0.0;
            }
        }
    }

    /// Drops the panel immediately, without an exit motion.
    pub fn clear(&mut self) {
        self.current = None;
        self.typewriter.clear();
    }

    /// Advances all overlay animation by `dt` seconds.
    pub fn tick(&mut self, dt: f32) {
        let dt = dt.max(0.0);
        let Some(current) = &mut self.current else {
            return;
        };
        current.stage_time += dt;
        current.age += dt;
        match current.stage {
            Stage::Entering => {
                self.typewriter.tick(dt);
                if current.stage_time >= self.options.enter_secs {
                    current.stage = Stage::Shown;
                    current.stage_time = 0.0;
                }
            }
            Stage::Shown => {
                self.typewriter.tick(dt);
            }
            Stage::Exiting => {
                if current.stage_time >= self.options.exit_secs {
                    self.current = None;
                    self.typewriter.clear();
                }
            }
        }
    }

    /// True while a panel is entering or fully shown. An exiting panel is
    /// already logically gone.
    pub fn is_visible(&self) -> bool {
        self.current
            .as_ref()
            .is_some_and(|c| c.stage != Stage::Exiting)
    }

    /// True while any panel, including an exiting one, needs drawing.
    pub fn is_drawn(&self) -> bool {
        self.current.is_some()
    }

    /// The logically visible panel.
    pub fn panel(&self) -> Option<&OverlayPanel> {
        self.current
            .as_ref()
            .filter(|c| c.stage != Stage::Exiting)
            .map(|c| &c.panel)
    }

    /// Computes the draw state for this frame.
    pub fn frame(&self) -> Option<OverlayFrame<'_>> {
        let current = self.current.as_ref()?;
        let o = &self.options;

        let (opacity, scale, offset_y) = match current.stage {
            Stage::Entering => {
                let p = ease_out_cubic(progress(current.stage_time, o.enter_secs));
                (p, 0.9 + 0.1 * p, 10.0 * (1.0 - p))
            }
            Stage::Shown => (1.0, 1.0, 0.0),
            Stage::Exiting => {
                let q = ease_out_cubic(progress(current.stage_time, o.exit_secs));
                (1.0 - q, 1.0 - 0.05 * q, -5.0 * q)
            }
        };

        let rows = (0..current.panel.metrics.len())
            .map(|i| {
                let delay = o.row_base_delay_secs + i as f32 * o.row_stagger_secs;
                let r = progress(current.age - delay, o.row_fade_secs);
                RowFrame {
                    opacity: r,
                    offset_x: -10.0 * (1.0 - r),
                }
            })
            .collect();

        Some(OverlayFrame {
            panel: &current.panel,
            opacity,
            scale,
            offset_y,
            title: self.typewriter.visible(),
            rows,
            exiting: current.stage == Stage::Exiting,
        })
    }
}

fn progress(elapsed: f32, duration: f32) -> f32 {
    if duration <= 0.0 {
        if elapsed >= 0.0 {
            1.0
        } else {
            0.0
        }
    } else {
        (elapsed / duration).clamp(0.0, 1.0)
    }
}

/// Cubic ease-out on `[0, 1]`.
pub fn ease_out_cubic(t: f32) -> f32 {
    1.0 - (1.0 - t).powi(3)
}
