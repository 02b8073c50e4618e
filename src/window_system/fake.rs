use std::sync::Mutex;

use super::WindowSystem;
use crate::db::models::{GeometryRequest, WindowState};
use crate::error::AutomationError;

/// In-memory desktop for tests. Geometry requests move the first live window
/// with a matching app and title.
pub(crate) struct FakeWindowSystem {
    live: Mutex<Vec<WindowState>>,
    denied: bool,
    geometry_calls: Mutex<usize>,
}

impl FakeWindowSystem {
    pub(crate) fn new(live: Vec<WindowState>) -> Self {
        Self {
            live: Mutex::new(live),
            denied: false,
            geometry_calls: Mutex::new(0),
        }
    }

    pub(crate) fn denied() -> Self {
        Self {
            denied: true,
            ..Self::new(Vec::new())
        }
    }

    pub(crate) fn windows(&self) -> Vec<WindowState> {
        self.live.lock().unwrap().clone()
    }

    pub(crate) fn geometry_calls(&self) -> usize {
        *self.geometry_calls.lock().unwrap()
    }
}

impl WindowSystem for FakeWindowSystem {
    fn enumerate_windows(&self) -> Result<String, AutomationError> {
        if self.denied {
            return Err(AutomationError::Denied("not authorized (-1743)".into()));
        }
        Ok(self
            .live
            .lock()
            .unwrap()
            .iter()
            .map(|w| {
                format!(
                    "{},{},{},{},{},{}\n",
                    w.app_name, w.window_title, w.x, w.y, w.width, w.height
                )
            })
            .collect())
    }

    fn set_window_geometry(&self, request: &GeometryRequest<'_>) -> Result<(), AutomationError> {
        *self.geometry_calls.lock().unwrap() += 1;
        let mut live = self.live.lock().unwrap();
        if !live.iter().any(|w| w.app_name == request.app_name) {
            return Err(AutomationError::AppNotRunning {
                app: request.app_name.to_string(),
            });
        }
        let window = live
            .iter_mut()
            .find(|w| w.app_name == request.app_name && w.window_title == request.window_title)
            .ok_or_else(|| AutomationError::WindowNotFound {
                app: request.app_name.to_string(),
                title: request.window_title.to_string(),
            })?;
        window.x = request.x as f64;
        window.y = request.y as f64;
        window.width = request.width as f64;
        window.height = request.height as f64;
        Ok(())
    }
}
