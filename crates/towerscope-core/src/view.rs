//! Named camera poses.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::error::{Result, ViewerError};

/// Identifier of the overview pose every catalog must define.
pub const DEFAULT_VIEW: &str = "default";

/// A named camera pose: where the camera sits and what it looks at.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct View {
    /// Lookup key, e.g. `"roof"`.
    pub id: String,
    /// Target camera position.
    pub position: Vec3,
    /// Target look-at point.
    pub look_at: Vec3,
}

impl View {
    /// Creates a new view.
    pub fn new(id: impl Into<String>, position: Vec3, look_at: Vec3) -> Self {
        Self {
            id: id.into(),
            position,
            look_at,
        }
    }
}

/// Immutable lookup table of views, keyed by identifier.
///
/// Lookups are linear; tables hold a handful of entries and keep their
/// declaration order for display.
#[derive(Debug, Clone)]
pub struct ViewTable {
    views: Vec<View>,
    default_index: usize,
}

impl ViewTable {
    /// Builds a table, rejecting duplicate identifiers and a missing default view.
    pub fn new(views: Vec<View>, default_id: impl Into<String>) -> Result<Self> {
        let default_id = default_id.into();
        for (i, view) in views.iter().enumerate() {
            if views[..i].iter().any(|v| v.id == view.id) {
                return Err(ViewerError::DuplicateView(view.id.clone()));
            }
        }
        let default_index = views
            .iter()
            .position(|v| v.id == default_id)
            .ok_or(ViewerError::MissingDefaultView(default_id))?;
        Ok(Self {
            views,
            default_index,
        })
    }

    /// Looks up a view by identifier.
    pub fn get(&self, id: &str) -> Option<&View> {
        self.views.iter().find(|v| v.id == id)
    }

    /// Returns true if the table defines `id`.
    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// The overview pose.
    pub fn default_view(&self) -> &View {
        &self.views[self.default_index]
    }

    /// Identifier of the overview pose.
    pub fn default_id(&self) -> &str {
        &self.views[self.default_index].id
    }

    /// Iterates views in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &View> {
        self.views.iter()
    }

    /// Number of views.
    pub fn len(&self) -> usize {
        self.views.len()
    }

    /// Always false for a constructed table, which holds at least the default view.
    pub fn is_empty(&self) -> bool {
        self.views.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<View> {
        vec![
            View::new(DEFAULT_VIEW, Vec3::new(25.0, 18.0, 30.0), Vec3::new(0.0, 8.0, 0.0)),
            View::new("roof", Vec3::new(8.0, 25.0, 12.0), Vec3::new(0.0, 16.0, 0.0)),
        ]
    }

    #[test]
    fn test_lookup() {
        let table = ViewTable::new(sample(), DEFAULT_VIEW).unwrap();
        assert_eq!(table.len(), 2);
        assert!(table.contains("roof"));
        assert!(!table.contains("basement"));
        assert_eq!(table.default_view().id, DEFAULT_VIEW);
        assert_eq!(table.get("roof").unwrap().look_at, Vec3::new(0.0, 16.0, 0.0));
    }

    #[test]
    fn test_duplicate_rejected() {
        let mut views = sample();
        views.push(View::new("roof", Vec3::ZERO, Vec3::ONE));
        assert!(matches!(
            ViewTable::new(views, DEFAULT_VIEW),
            Err(ViewerError::DuplicateView(id)) if id == "roof"
        ));
    }

    #[test]
    fn test_missing_default_rejected() {
        assert!(matches!(
            ViewTable::new(sample(), "overview"),
            Err(ViewerError::MissingDefaultView(_))
        ));
    }
}
