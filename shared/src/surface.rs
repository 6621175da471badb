use serde::{Deserialize, Serialize};

use crate::region::GeoPoint;

/// Where the camera should end up. A missing position keeps the current one
/// and only changes altitude.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraTarget {
    pub position: Option<GeoPoint>,
    pub altitude: f64,
}

impl CameraTarget {
    pub const fn at(lat: f64, lng: f64, altitude: f64) -> Self {
        Self {
            position: Some(GeoPoint { lat, lng }),
            altitude,
        }
    }

    pub const fn altitude_only(altitude: f64) -> Self {
        Self {
            position: None,
            altitude,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cursor {
    Grab,
    Grabbing,
    Pointer,
}

impl Cursor {
    pub const fn as_css(self) -> &'static str {
        match self {
            Self::Grab => "grab",
            Self::Grabbing => "grabbing",
            Self::Pointer => "pointer",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SurfaceError {
    #[error("render surface is not available")]
    Unavailable,
    #[error("camera transition failed: {0}")]
    Transition(String),
}

/// Element whose cursor style reflects hover state.
pub trait CursorElement {
    fn set_cursor(&self, cursor: Cursor);
}

/// The narrow slice of the 3D engine the scene controller drives.
pub trait RenderSurface {
    type Cursor: CursorElement;

    /// Animate the camera to `target` over `duration_ms`.
    fn set_camera_target(&mut self, target: CameraTarget, duration_ms: u32)
    -> Result<(), SurfaceError>;

    fn set_auto_rotate(&mut self, enabled: bool);

    fn cursor_element(&self) -> Option<Self::Cursor>;
}
