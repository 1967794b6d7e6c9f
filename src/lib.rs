//! # mapbridge
//!
//! Declarative overlay components for a native mapping API.
//!
//! Every overlay (markers, shapes, info windows, data layers, drawing tools)
//! is described by a typed props struct. Mounting an overlay constructs the
//! native object, updating it diffs the watched props and calls the matching
//! native setters, and unmounting detaches it again. Native events are routed
//! back into callback props.
//!
//! The native side is abstracted behind [`MapsApi`]. [`HeadlessMaps`] keeps
//! everything in memory and is what the tests drive; the `wasm` feature adds a
//! backend for the Google Maps JavaScript API.

pub mod bridge;
pub mod core;
pub mod data;
pub mod input;
pub mod layers;
pub mod native;
pub mod plugins;
pub mod prelude;
pub mod ui;

pub use crate::core::constants;

// Re-export public API
pub use core::{
    config::{ApiVersion, Library, LoaderOptions},
    geo::{LatLng, LatLngBounds, Point},
    map::{MapHandle, MapOptions},
};

pub use bridge::{EventBinding, RegisteredEvents, Updater};

pub use layers::{
    base::{Mounted, Overlay},
    circle::{Circle, CircleProps},
    marker::{Anchor, Clusterer, Marker, MarkerProps, NativeClusterer},
    polygon::{Polygon, PolygonProps},
    polyline::{Polyline, PolylineProps},
    rectangle::{Rectangle, RectangleProps},
};

pub use ui::{
    info_box::{InfoBox, InfoBoxProps},
    info_window::{InfoWindow, InfoWindowProps},
};

pub use data::{
    geojson::{DataStyle, GeoJson, GeoJsonFeature, GeoJsonGeometry},
    layer::{Data, DataProps},
};

pub use plugins::draw::{DrawingManager, DrawingManagerProps, DrawingMode, OverlayType};

pub use input::{callback::Callback, events::NativeEvent};

pub use native::{headless::HeadlessMaps, MapsApi, NativeClass, NativeValue, ObjectRef};

#[cfg(feature = "wasm")]
pub use native::wasm::GoogleMapsJs;

/// Result type used throughout the library
pub type Result<T> = std::result::Result<T, MapError>;

/// Common error types
#[derive(Debug, thiserror::Error)]
pub enum MapError {
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Native call failed: {0}")]
    Native(String),

    #[error("Unknown native object: {0}")]
    UnknownObject(native::ObjectId),

    #[error("The `{0}` library is not loaded; add it to the loader's libraries")]
    LibraryNotLoaded(Library),

    #[error("<{0}> needs either an anchor or a position to open")]
    MissingAnchorOrPosition(&'static str),
}

/// Error type alias for convenience
pub type Error = MapError;

/// Installs `env_logger` as the `log` backend, honouring `RUST_LOG`.
#[cfg(feature = "debug")]
pub fn init_logging() {
    let _ = env_logger::builder().try_init();
}
