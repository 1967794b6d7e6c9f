//! Prelude module for common mapbridge types and traits
//!
//! This module re-exports the most commonly used types, traits, and functions
//! for easy importing with `use mapbridge::prelude::*;`

pub use crate::core::{
    config::{ApiVersion, Library, LoaderOptions},
    geo::{LatLng, LatLngBounds, Point},
    map::{MapHandle, MapOptions},
};

pub use crate::bridge::{EventBinding, RegisteredEvents, Updater};

pub use crate::layers::{
    base::{Mounted, NativeInstance, Overlay},
    circle::{Circle, CircleProps},
    marker::{
        Anchor, Animation, Clusterer, Marker, MarkerIcon, MarkerLabel, MarkerProps, MarkerShape,
        NativeClusterer,
    },
    polygon::{Polygon, PolygonProps},
    polyline::{Polyline, PolylineProps},
    rectangle::{Rectangle, RectangleProps},
};

pub use crate::ui::{
    info_box::{InfoBox, InfoBoxProps},
    info_window::{InfoWindow, InfoWindowProps},
};

pub use crate::data::{
    geojson::{DataStyle, GeoJson, GeoJsonFeature, GeoJsonGeometry},
    layer::{ControlPosition, Data, DataDrawingMode, DataProps},
};

pub use crate::plugins::draw::{DrawingManager, DrawingManagerProps, DrawingMode, OverlayType};

pub use crate::input::{
    callback::Callback,
    events::{
        DataFeatureEvent, DataGeometryEvent, DataMouseEvent, DataPropertyEvent, FromNativeEvent,
        MapMouseEvent, NativeEvent, OverlayCompleteEvent,
    },
};

pub use crate::native::{
    headless::HeadlessMaps, MapsApi, NativeClass, NativeObject, NativeOptions, NativeValue,
    ObjectRef,
};

#[cfg(feature = "wasm")]
pub use crate::native::wasm::GoogleMapsJs;

pub use crate::{MapError, Result};

// Fast hashing for the in-memory backend's tables
pub use fxhash::{FxHashMap as HashMap, FxHashSet as HashSet};
