//! Window layout data models.
//!
//! A `WindowState` is one captured window: its identity (owning application
//! and title) plus its geometry. Values are immutable once captured.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WindowState {
    pub app_name: String,
    /// Empty when the window system could not report a title.
    pub window_title: String,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl WindowState {
    pub fn new(
        app_name: impl Into<String>,
        window_title: impl Into<String>,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
    ) -> Self {
        Self {
            app_name: app_name.into(),
            window_title: window_title.into(),
            x,
            y,
            width,
            height,
        }
    }

    /// Geometry in whole units, truncated toward zero.
    pub fn target(&self) -> GeometryRequest<'_> {
        GeometryRequest {
            app_name: &self.app_name,
            window_title: &self.window_title,
            x: self.x as i64,
            y: self.y as i64,
            width: self.width as i64,
            height: self.height as i64,
        }
    }
}

/// A request to move and resize the first live window matching
/// `(app_name, window_title)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GeometryRequest<'a> {
    pub app_name: &'a str,
    pub window_title: &'a str,
    pub x: i64,
    pub y: i64,
    pub width: i64,
    pub height: i64,
}
