pub mod catalog;
pub mod colors;
pub mod config;
pub mod dataset;
pub mod detail;
pub mod interaction;
pub mod overlay;
pub mod region;
pub mod resolver;
pub mod scene;
pub mod surface;
pub mod theme;
pub mod viewport;

pub use catalog::{CountryCatalog, CountryRecord};
pub use config::GlobeConfig;
pub use dataset::{CancelFlag, DatasetError, DatasetState};
pub use interaction::{InteractionState, Selection};
pub use region::{BoundaryCollection, GeoPoint, Region, RegionKey, RegionSet};
pub use resolver::{DegradedRecord, ResolvedRecord, resolve};
pub use scene::{SceneController, SceneEvent, SceneStatus, scene_status};
pub use surface::{CameraTarget, Cursor, CursorElement, RenderSurface, SurfaceError};
pub use theme::ThemeMode;
pub use viewport::ViewportSize;
