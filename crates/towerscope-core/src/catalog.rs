//! The fixed content tables: views, hotspots and overlay panels.

use std::path::Path;

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use crate::error::{Result, ViewerError};
use crate::hotspot::Hotspot;
use crate::overlay::{MetricRow, MetricStatus, OverlayPanel};
use crate::view::{View, ViewTable, DEFAULT_VIEW};

/// Everything the viewer shows, apart from geometry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Catalog {
    /// Identifier of the overview pose.
    #[serde(default = "default_view_id")]
    pub default_view: String,
    pub views: Vec<View>,
    #[serde(default)]
    pub hotspots: Vec<Hotspot>,
    #[serde(default)]
    pub overlays: Vec<OverlayPanel>,
}

fn default_view_id() -> String {
    DEFAULT_VIEW.to_string()
}

impl Catalog {
    /// Parses and validates a catalog from JSON.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let catalog: Self = serde_json::from_str(json)?;
        catalog.validate()?;
        Ok(catalog)
    }

    /// Reads and validates a catalog from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Checks the cross-table references.
    pub fn validate(&self) -> Result<()> {
        let table = self.view_table()?;
        for hotspot in &self.hotspots {
            if !table.contains(&hotspot.view) {
                return Err(ViewerError::HotspotViewMissing {
                    hotspot: hotspot.label.clone(),
                    view: hotspot.view.clone(),
                });
            }
        }
        for (i, panel) in self.overlays.iter().enumerate() {
            if self.overlays[..i].iter().any(|p| p.view == panel.view) {
                return Err(ViewerError::DuplicateOverlay(panel.view.clone()));
            }
            if panel.view == self.default_view {
                return Err(ViewerError::DefaultViewHasOverlay(panel.view.clone()));
            }
            if !table.contains(&panel.view) {
                return Err(ViewerError::OverlayViewMissing(panel.view.clone()));
            }
        }
        Ok(())
    }

    /// Builds the view lookup table.
    pub fn view_table(&self) -> Result<ViewTable> {
        ViewTable::new(self.views.clone(), self.default_view.clone())
    }

    /// Overlay content for `view`, if it has any.
    pub fn overlay_for(&self, view: &str) -> Option<&OverlayPanel> {
        self.overlays.iter().find(|p| p.view == view)
    }

    /// The built-in glass-tower facility.
    pub fn facility() -> Self {
        use MetricStatus::{Default, Neutral, Positive, Warning};

        Self {
            default_view: DEFAULT_VIEW.to_string(),
            views: vec![
                View::new(DEFAULT_VIEW, Vec3::new(25.0, 18.0, 30.0), Vec3::new(0.0, 8.0, 0.0)),
                View::new("roof", Vec3::new(8.0, 25.0, 12.0), Vec3::new(0.0, 16.0, 0.0)),
                View::new("windows", Vec3::new(18.0, 10.0, 8.0), Vec3::new(0.0, 8.0, 0.0)),
                View::new("parking", Vec3::new(15.0, 4.0, 18.0), Vec3::new(0.0, 1.0, 0.0)),
            ],
            hotspots: vec![
                Hotspot::new(Vec3::new(0.0, 18.0, 0.0), "ROOF SYSTEMS", "roof", 0x0022_d3ee),
                Hotspot::new(Vec3::new(5.0, 10.0, 3.0), "FACADE / WINDOWS", "windows", 0x003b_82f6),
                Hotspot::new(Vec3::new(6.0, 1.5, 6.0), "ENTRANCE / PARKING", "parking", 0x0010_b981),
            ],
            overlays: vec![
                OverlayPanel {
                    view: "roof".into(),
                    title: "Roof Systems".into(),
                    status: Some("Monitoring".into()),
                    metrics: vec![
                        MetricRow::new("Load", "78%", Neutral),
                        MetricRow::new("Anomalies", "2", Warning),
                        MetricRow::new("Last Audit", "14d", Default),
                    ],
                    anchor: Vec2::new(260.0, 20.0),
                },
                OverlayPanel {
                    view: "windows".into(),
                    title: "Facade & Glazing".into(),
                    status: Some("Inspected".into()),
                    metrics: vec![
                        MetricRow::new("Thermal Loss", "-12%", Positive),
                        MetricRow::new("Alerts", "1", Warning),
                        MetricRow::new("Inspection", "Q1", Default),
                    ],
                    anchor: Vec2::new(290.0, 160.0),
                },
                OverlayPanel {
                    view: "parking".into(),
                    title: "Parking & Access".into(),
                    status: Some("Operational".into()),
                    metrics: vec![
                        MetricRow::new("Occupancy", "64%", Neutral),
                        MetricRow::new("Cameras", "Online", Positive),
                        MetricRow::new("Incidents", "0", Positive),
                    ],
                    anchor: Vec2::new(20.0, 340.0),
                },
            ],
        }
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::facility()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_facility_is_valid() {
        let catalog = Catalog::facility();
        catalog.validate().unwrap();
        assert_eq!(catalog.view_table().unwrap().len(), 4);
        assert_eq!(catalog.hotspots.len(), 3);
        assert!(catalog.overlay_for(DEFAULT_VIEW).is_none());
        let roof = catalog.overlay_for("roof").unwrap();
        assert_eq!(roof.metrics[1].status, MetricStatus::Warning);
        assert_eq!(roof.anchor, Vec2::new(260.0, 20.0));
    }

    #[test]
    fn test_every_hotspot_view_exists() {
        let catalog = Catalog::facility();
        let table = catalog.view_table().unwrap();
        assert!(catalog.hotspots.iter().all(|h| table.contains(&h.view)));
    }

    #[test]
    fn test_rejects_dangling_hotspot() {
        let mut catalog = Catalog::facility();
        catalog.hotspots[0].view = "basement".into();
        assert!(matches!(
            catalog.validate(),
            Err(ViewerError::HotspotViewMissing { view, .. }) if view == "basement"
        ));
    }

    #[test]
    fn test_rejects_default_overlay() {
        let mut catalog = Catalog::facility();
        catalog.overlays[0].view = DEFAULT_VIEW.into();
        assert!(matches!(
            catalog.validate(),
            Err(ViewerError::DefaultViewHasOverlay(_))
        ));
    }

    #[test]
    fn test_rejects_dangling_overlay() {
        let mut catalog = Catalog::facility();
        catalog.overlays[2].view = "lobby".into();
        assert!(matches!(
            catalog.validate(),
            Err(ViewerError::OverlayViewMissing(v)) if v == "lobby"
        ));
    }

    #[test]
    fn test_rejects_duplicate_overlay() {
        let mut catalog = Catalog::facility();
        let mut copy = catalog.overlays[0].clone();
        copy.title = "Roof Again".into();
        catalog.overlays.push(copy);
        assert!(matches!(
            catalog.validate(),
            Err(ViewerError::DuplicateOverlay(v)) if v == "roof"
        ));
    }

    #[test]
    fn test_json_catalog() {
        let json = r#"{
            "views": [
                { "id": "default", "position": [10, 10, 10], "look_at": [0, 0, 0] },
                { "id": "lobby", "position": [2, 1, 2], "look_at": [0, 1, 0] }
            ],
            "hotspots": [
                { "position": [0, 1, 0], "label": "LOBBY", "view": "lobby", "color": 16711680 }
            ],
            "overlays": [
                { "view": "lobby", "title": "Lobby", "metrics": [
                    { "label": "Visitors", "value": "12", "status": "neutral" }
                ] }
            ]
        }"#;
        let catalog = Catalog::from_json_str(json).unwrap();
        assert_eq!(catalog.default_view, DEFAULT_VIEW);
        assert_eq!(catalog.hotspots[0].rgb(), [1.0, 0.0, 0.0]);
        assert_eq!(catalog.overlay_for("lobby").unwrap().anchor, Vec2::ZERO);
    }

    #[test]
    fn test_json_missing_default_rejected() {
        let json = r#"{ "views": [ { "id": "lobby", "position": [0,0,0], "look_at": [0,0,0] } ] }"#;
        assert!(matches!(
            Catalog::from_json_str(json),
            Err(ViewerError::MissingDefaultView(_))
        ));
    }
}
