//! Drawing tools from the optional `drawing` library
//!
//! The drawing manager lets the user draw shapes and markers on the map.
//! Every finished overlay is handed back as a typed instance through one of
//! the `*complete` callbacks. The crate does not own those overlays: once
//! the embedder is done with one it hands `object()` to `MapsApi::release`
//! so the backend can drop its reference.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    bridge::{EventBinding, Updater},
    core::{config::Library, map::MapHandle},
    input::{callback::Callback, events::OverlayCompleteEvent},
    layers::{
        base::{create_on_map, Overlay},
        circle::Circle,
        marker::Marker,
        polygon::Polygon,
        polyline::Polyline,
        rectangle::Rectangle,
    },
    native::{NativeClass, NativeValue},
    MapError, Result,
};

/// Kind of overlay a drawing produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverlayType {
    Circle,
    Marker,
    Polygon,
    Polyline,
    Rectangle,
}

impl OverlayType {
    pub fn as_str(&self) -> &'static str {
        match self {
            OverlayType::Circle => "circle",
            OverlayType::Marker => "marker",
            OverlayType::Polygon => "polygon",
            OverlayType::Polyline => "polyline",
            OverlayType::Rectangle => "rectangle",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "circle" => Some(OverlayType::Circle),
            "marker" => Some(OverlayType::Marker),
            "polygon" => Some(OverlayType::Polygon),
            "polyline" => Some(OverlayType::Polyline),
            "rectangle" => Some(OverlayType::Rectangle),
            _ => None,
        }
    }

    pub fn native_class(&self) -> NativeClass {
        match self {
            OverlayType::Circle => NativeClass::Circle,
            OverlayType::Marker => NativeClass::Marker,
            OverlayType::Polygon => NativeClass::Polygon,
            OverlayType::Polyline => NativeClass::Polyline,
            OverlayType::Rectangle => NativeClass::Rectangle,
        }
    }
}

/// What the user is currently drawing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum DrawingMode {
    /// Drawing disabled; the map reacts to the pointer as usual
    #[default]
    Off,
    Draw(OverlayType),
}

impl DrawingMode {
    pub fn as_native(&self) -> NativeValue {
        match self {
            DrawingMode::Off => NativeValue::Null,
            DrawingMode::Draw(overlay) => overlay.as_str().into(),
        }
    }

    pub fn from_native(value: &NativeValue) -> Option<Self> {
        if value.is_null() {
            return Some(DrawingMode::Off);
        }
        value
            .as_json()
            .and_then(Value::as_str)
            .and_then(OverlayType::parse)
            .map(DrawingMode::Draw)
    }
}

impl From<OverlayType> for DrawingMode {
    fn from(overlay: OverlayType) -> Self {
        DrawingMode::Draw(overlay)
    }
}

crate::native_object!(
    /// A native drawing manager
    DrawingManager,
    NativeClass::DrawingManager
);

impl DrawingManager {
    pub fn set_drawing_mode(&self, mode: DrawingMode) -> Result<()> {
        self.native.invoke("setDrawingMode", mode.as_native())
    }

    pub fn set_options(&self, options: Value) -> Result<()> {
        self.native.set_options(&options)
    }

    pub fn drawing_mode(&self) -> Result<Option<DrawingMode>> {
        Ok(DrawingMode::from_native(&self.native.get("getDrawingMode")?))
    }
}

#[derive(Debug, Clone, Default)]
pub struct DrawingManagerProps {
    pub options: Option<Value>,
    pub drawing_mode: Option<DrawingMode>,

    pub on_circle_complete: Option<Callback<Circle>>,
    pub on_marker_complete: Option<Callback<Marker>>,
    pub on_overlay_complete: Option<Callback<OverlayCompleteEvent>>,
    pub on_polygon_complete: Option<Callback<Polygon>>,
    pub on_polyline_complete: Option<Callback<Polyline>>,
    pub on_rectangle_complete: Option<Callback<Rectangle>>,

    pub on_load: Option<Callback<DrawingManager>>,
    pub on_unmount: Option<Callback<DrawingManager>>,
}

impl Overlay for DrawingManager {
    type Props = DrawingManagerProps;

    const NAME: &'static str = "DrawingManager";

    const UPDATERS: &'static [Updater<DrawingManagerProps, DrawingManager>] = &[
        crate::updater!(drawing_mode => set_drawing_mode),
        crate::updater!(options => set_options),
    ];

    const EVENTS: &'static [EventBinding<DrawingManagerProps>] = &[
        crate::event_binding!(on_circle_complete => "circlecomplete"),
        crate::event_binding!(on_marker_complete => "markercomplete"),
        crate::event_binding!(on_overlay_complete => "overlaycomplete"),
        crate::event_binding!(on_polygon_complete => "polygoncomplete"),
        crate::event_binding!(on_polyline_complete => "polylinecomplete"),
        crate::event_binding!(on_rectangle_complete => "rectanglecomplete"),
    ];

    fn construct(map: &MapHandle, props: &DrawingManagerProps) -> Result<Self> {
        if !map.api().has_library(Library::Drawing) {
            return Err(MapError::LibraryNotLoaded(Library::Drawing));
        }
        create_on_map(map, NativeClass::DrawingManager, props.options.as_ref())
            .map(Self::from_native)
    }

    fn on_load(props: &DrawingManagerProps) -> Option<&Callback<Self>> {
        props.on_load.as_ref()
    }

    fn on_unmount(props: &DrawingManagerProps) -> Option<&Callback<Self>> {
        props.on_unmount.as_ref()
    }
}
