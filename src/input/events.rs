use std::rc::Rc;

use serde_json::Value;

use crate::{
    core::geo::LatLng,
    native::{MapsApi, ObjectRef},
    plugins::draw::OverlayType,
};

/// Payload of a native event, as delivered by a backend
#[derive(Debug, Clone, PartialEq)]
pub enum NativeEvent {
    /// Property-changed style events carry nothing
    None,
    /// Pointer events on the map, markers and shapes
    Mouse(MapMouseEvent),
    /// Pointer events on a data layer feature
    DataMouse(DataMouseEvent),
    /// `addfeature` / `removefeature`
    Feature(DataFeatureEvent),
    /// `setproperty` / `removeproperty`
    Property(DataPropertyEvent),
    /// `setgeometry`
    Geometry(DataGeometryEvent),
    /// A single overlay, as handed out by the drawing manager's typed events
    Overlay(ObjectRef),
    /// `overlaycomplete`
    OverlayComplete(OverlayCompleteEvent),
}

impl NativeEvent {
    /// Objects in this payload that are only valid while `event` is being
    /// dispatched
    ///
    /// Backends that track native objects by identity forget these once the
    /// handler returns: a removed feature is gone for good, and geometries
    /// are replaced wholesale on every edit. Overlays drawn by the user are
    /// not listed; they stay registered until the embedder releases them.
    pub fn transient_objects(&self, event: &str) -> Vec<ObjectRef> {
        match self {
            NativeEvent::Feature(removed) if event == "removefeature" => vec![removed.feature],
            NativeEvent::Geometry(geometry) => geometry
                .new_geometry
                .into_iter()
                .chain(geometry.old_geometry)
                .collect(),
            _ => Vec::new(),
        }
    }
}

/// Pointer event on the map or on an overlay
///
/// `vertex`, `edge` and `path` are only filled in for shapes, and only when
/// the pointer was over the corresponding part of the outline.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MapMouseEvent {
    pub lat_lng: Option<LatLng>,
    pub vertex: Option<usize>,
    pub edge: Option<usize>,
    pub path: Option<usize>,
}

impl MapMouseEvent {
    pub fn at(lat_lng: LatLng) -> Self {
        Self {
            lat_lng: Some(lat_lng),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DataMouseEvent {
    pub feature: ObjectRef,
    pub lat_lng: Option<LatLng>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DataFeatureEvent {
    pub feature: ObjectRef,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DataPropertyEvent {
    pub feature: ObjectRef,
    pub name: String,
    /// Absent for `removeproperty`
    pub new_value: Option<Value>,
    pub old_value: Option<Value>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DataGeometryEvent {
    pub feature: ObjectRef,
    pub new_geometry: Option<ObjectRef>,
    pub old_geometry: Option<ObjectRef>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OverlayCompleteEvent {
    pub overlay_type: OverlayType,
    pub overlay: ObjectRef,
}

/// Conversion from a native payload into a callback's argument type
///
/// Returning `None` means the payload does not fit; the callback is skipped.
pub trait FromNativeEvent: Sized {
    fn from_native(event: &NativeEvent, api: &Rc<dyn MapsApi>) -> Option<Self>;
}

impl FromNativeEvent for () {
    fn from_native(_event: &NativeEvent, _api: &Rc<dyn MapsApi>) -> Option<Self> {
        Some(())
    }
}

impl FromNativeEvent for MapMouseEvent {
    fn from_native(event: &NativeEvent, _api: &Rc<dyn MapsApi>) -> Option<Self> {
        match event {
            NativeEvent::Mouse(mouse) => Some(mouse.clone()),
            _ => None,
        }
    }
}

impl FromNativeEvent for DataMouseEvent {
    fn from_native(event: &NativeEvent, _api: &Rc<dyn MapsApi>) -> Option<Self> {
        match event {
            NativeEvent::DataMouse(mouse) => Some(mouse.clone()),
            _ => None,
        }
    }
}

impl FromNativeEvent for DataFeatureEvent {
    fn from_native(event: &NativeEvent, _api: &Rc<dyn MapsApi>) -> Option<Self> {
        match event {
            NativeEvent::Feature(feature) => Some(feature.clone()),
            _ => None,
        }
    }
}

impl FromNativeEvent for DataPropertyEvent {
    fn from_native(event: &NativeEvent, _api: &Rc<dyn MapsApi>) -> Option<Self> {
        match event {
            NativeEvent::Property(property) => Some(property.clone()),
            _ => None,
        }
    }
}

impl FromNativeEvent for DataGeometryEvent {
    fn from_native(event: &NativeEvent, _api: &Rc<dyn MapsApi>) -> Option<Self> {
        match event {
            NativeEvent::Geometry(geometry) => Some(geometry.clone()),
            _ => None,
        }
    }
}

impl FromNativeEvent for OverlayCompleteEvent {
    fn from_native(event: &NativeEvent, _api: &Rc<dyn MapsApi>) -> Option<Self> {
        match event {
            NativeEvent::OverlayComplete(complete) => Some(complete.clone()),
            _ => None,
        }
    }
}
