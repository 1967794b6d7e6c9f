//! The boundary to the native mapping library
//!
//! Overlays never talk to the native library directly. They hold a
//! [`NativeObject`] (an [`ObjectRef`] plus the backend that owns it) and issue
//! method calls by native name, the same way the JavaScript API is driven:
//! `setCenter`, `open`, `addGeoJson`, and so on. A backend decides what those
//! calls mean.

pub mod headless;
#[cfg(feature = "wasm")]
pub mod wasm;

use std::{fmt, rc::Rc};

use serde::Serialize;
use serde_json::Value;

use crate::{
    core::{
        config::Library,
        geo::{LatLng, LatLngBounds},
        map::MapHandle,
    },
    input::events::NativeEvent,
    MapError, Result,
};

/// Identifier a backend assigns to each native object it creates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(pub u64);

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Identifier of one registered native listener
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(pub u64);

/// Native classes the overlays instantiate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NativeClass {
    Map,
    Marker,
    Circle,
    Polygon,
    Polyline,
    Rectangle,
    InfoWindow,
    InfoBox,
    Data,
    DataFeature,
    DrawingManager,
    MarkerClusterer,
    /// Any object handed back by the native side that is not one of the above
    Opaque,
}

impl NativeClass {
    /// Constructor path below the `google.maps` namespace
    pub fn constructor_path(&self) -> &'static str {
        match self {
            NativeClass::Map => "Map",
            NativeClass::Marker => "Marker",
            NativeClass::Circle => "Circle",
            NativeClass::Polygon => "Polygon",
            NativeClass::Polyline => "Polyline",
            NativeClass::Rectangle => "Rectangle",
            NativeClass::InfoWindow => "InfoWindow",
            NativeClass::InfoBox => "InfoBox",
            NativeClass::Data => "Data",
            NativeClass::DataFeature => "Data.Feature",
            NativeClass::DrawingManager => "drawing.DrawingManager",
            NativeClass::MarkerClusterer => "MarkerClusterer",
            NativeClass::Opaque => "MVCObject",
        }
    }

    /// Optional library the class ships in, if any
    pub fn required_library(&self) -> Option<Library> {
        match self {
            NativeClass::DrawingManager => Some(Library::Drawing),
            _ => None,
        }
    }
}

impl fmt::Display for NativeClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.constructor_path())
    }
}

/// A reference to a native object owned by a [`MapsApi`] backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObjectRef {
    pub id: ObjectId,
    pub class: NativeClass,
}

impl ObjectRef {
    pub fn new(id: ObjectId, class: NativeClass) -> Self {
        Self { id, class }
    }
}

/// A value crossing the backend boundary
///
/// Plain data travels as JSON. Positions, bounds and object references get
/// their own variants because the native side represents them as objects.
#[derive(Debug, Clone, PartialEq)]
pub enum NativeValue {
    Null,
    Json(Value),
    LatLng(LatLng),
    Bounds(LatLngBounds),
    Object(ObjectRef),
    List(Vec<NativeValue>),
}

impl NativeValue {
    /// Serializes any value into its JSON form
    pub fn json<T: Serialize + ?Sized>(value: &T) -> Result<Self> {
        Ok(NativeValue::Json(serde_json::to_value(value)?))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, NativeValue::Null | NativeValue::Json(Value::Null))
    }

    pub fn as_object(&self) -> Option<ObjectRef> {
        match self {
            NativeValue::Object(object) => Some(*object),
            _ => None,
        }
    }

    /// Reads a position from either representation
    pub fn as_lat_lng(&self) -> Option<LatLng> {
        match self {
            NativeValue::LatLng(lat_lng) => Some(*lat_lng),
            NativeValue::Json(value) => LatLng::from_literal(value),
            _ => None,
        }
    }

    pub fn as_json(&self) -> Option<&Value> {
        match self {
            NativeValue::Json(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        self.as_json().and_then(Value::as_f64)
    }

    pub fn as_bool(&self) -> Option<bool> {
        self.as_json().and_then(Value::as_bool)
    }

    pub fn as_list(&self) -> Option<&[NativeValue]> {
        match self {
            NativeValue::List(items) => Some(items),
            _ => None,
        }
    }
}

impl From<bool> for NativeValue {
    fn from(value: bool) -> Self {
        NativeValue::Json(Value::Bool(value))
    }
}

impl From<f64> for NativeValue {
    fn from(value: f64) -> Self {
        NativeValue::Json(Value::from(value))
    }
}

impl From<i32> for NativeValue {
    fn from(value: i32) -> Self {
        NativeValue::Json(Value::from(value))
    }
}

impl From<&str> for NativeValue {
    fn from(value: &str) -> Self {
        NativeValue::Json(Value::String(value.to_string()))
    }
}

impl From<String> for NativeValue {
    fn from(value: String) -> Self {
        NativeValue::Json(Value::String(value))
    }
}

impl From<Value> for NativeValue {
    fn from(value: Value) -> Self {
        NativeValue::Json(value)
    }
}

impl From<LatLng> for NativeValue {
    fn from(value: LatLng) -> Self {
        NativeValue::LatLng(value)
    }
}

impl From<LatLngBounds> for NativeValue {
    fn from(value: LatLngBounds) -> Self {
        NativeValue::Bounds(value)
    }
}

impl From<ObjectRef> for NativeValue {
    fn from(value: ObjectRef) -> Self {
        NativeValue::Object(value)
    }
}

impl<T: Into<NativeValue>> From<Option<T>> for NativeValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(NativeValue::Null)
    }
}

/// Constructor options, in insertion order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NativeOptions {
    entries: Vec<(String, NativeValue)>,
}

impl NativeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the options from a free-form JSON object
    pub fn from_json(options: Option<&Value>) -> Result<Self> {
        match options {
            None | Some(Value::Null) => Ok(Self::new()),
            Some(Value::Object(map)) => Ok(Self {
                entries: map
                    .iter()
                    .map(|(key, value)| (key.clone(), NativeValue::Json(value.clone())))
                    .collect(),
            }),
            Some(other) => Err(MapError::ParseError(format!(
                "options must be a JSON object, got {}",
                other
            ))),
        }
    }

    /// Sets `key`, replacing any earlier value
    pub fn set(mut self, key: &str, value: impl Into<NativeValue>) -> Self {
        self.insert(key, value.into());
        self
    }

    pub fn insert(&mut self, key: &str, value: NativeValue) {
        match self.entries.iter_mut().find(|(name, _)| name == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key.to_string(), value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&NativeValue> {
        self.entries
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, value)| value)
    }

    pub fn remove(&mut self, key: &str) -> Option<NativeValue> {
        let index = self.entries.iter().position(|(name, _)| name == key)?;
        Some(self.entries.remove(index).1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &NativeValue)> {
        self.entries.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Handler the backend invokes when a native event fires
pub type NativeHandler = Rc<dyn Fn(&NativeEvent)>;

/// Receives the values a native method reports through a function argument
pub type NativeCallback = Box<dyn FnMut(NativeValue)>;

/// The operations overlays need from a native mapping library
///
/// Implementations are single-threaded and must not hold internal borrows
/// while invoking a [`NativeHandler`], since handlers may call back in.
pub trait MapsApi {
    /// Whether an optional library was loaded alongside the API
    fn has_library(&self, library: Library) -> bool;

    /// Instantiates a native object
    fn create(&self, class: NativeClass, options: NativeOptions) -> Result<ObjectRef>;

    /// Calls `method` on `target` and returns its result
    fn call(&self, target: &ObjectRef, method: &str, args: &[NativeValue]) -> Result<NativeValue>;

    /// Calls `method` on `target` with `args` followed by `callback`
    ///
    /// Depending on the method the callback runs before this returns, once
    /// per item, or later on.
    fn call_with_callback(
        &self,
        target: &ObjectRef,
        method: &str,
        args: &[NativeValue],
        callback: NativeCallback,
    ) -> Result<()>;

    /// Attaches `handler` to the native `event` of `target`
    fn add_listener(
        &self,
        target: &ObjectRef,
        event: &str,
        handler: NativeHandler,
    ) -> Result<ListenerId>;

    /// Detaches a listener; unknown or already removed ids are ignored
    fn remove_listener(&self, listener: ListenerId);

    /// Signals that the bridge no longer references `object`
    fn release(&self, _object: &ObjectRef) {}
}

/// A native object together with the backend that owns it
#[derive(Clone)]
pub struct NativeObject {
    api: Rc<dyn MapsApi>,
    object: ObjectRef,
}

impl NativeObject {
    pub fn new(api: Rc<dyn MapsApi>, object: ObjectRef) -> Self {
        Self { api, object }
    }

    pub fn create(api: &Rc<dyn MapsApi>, class: NativeClass, options: NativeOptions) -> Result<Self> {
        let object = api.create(class, options)?;
        Ok(Self::new(api.clone(), object))
    }

    pub fn object(&self) -> ObjectRef {
        self.object
    }

    pub fn class(&self) -> NativeClass {
        self.object.class
    }

    pub fn api(&self) -> &Rc<dyn MapsApi> {
        &self.api
    }

    pub fn call(&self, method: &str, args: &[NativeValue]) -> Result<NativeValue> {
        self.api.call(&self.object, method, args)
    }

    /// Calls a single-argument native setter
    pub fn invoke(&self, method: &str, value: impl Into<NativeValue>) -> Result<()> {
        self.call(method, &[value.into()]).map(|_| ())
    }

    /// Calls a single-argument native setter with a serialized value
    pub fn invoke_json<T: Serialize + ?Sized>(&self, method: &str, value: &T) -> Result<()> {
        self.call(method, &[NativeValue::json(value)?]).map(|_| ())
    }

    /// Calls a zero-argument native getter
    pub fn get(&self, method: &str) -> Result<NativeValue> {
        self.call(method, &[])
    }

    pub fn set_map(&self, map: Option<&MapHandle>) -> Result<()> {
        self.invoke("setMap", map.map(MapHandle::object))
    }

    pub fn set_options(&self, options: &Value) -> Result<()> {
        self.invoke("setOptions", options.clone())
    }

    pub fn call_with_callback(
        &self,
        method: &str,
        args: &[NativeValue],
        callback: impl FnMut(NativeValue) + 'static,
    ) -> Result<()> {
        self.api
            .call_with_callback(&self.object, method, args, Box::new(callback))
    }

    pub fn add_listener(&self, event: &str, handler: NativeHandler) -> Result<ListenerId> {
        self.api.add_listener(&self.object, event, handler)
    }

    pub fn release(&self) {
        self.api.release(&self.object);
    }
}

impl fmt::Debug for NativeObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeObject")
            .field("object", &self.object)
            .finish()
    }
}

impl PartialEq for NativeObject {
    fn eq(&self, other: &Self) -> bool {
        self.object == other.object
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_options_from_json() {
        let options =
            NativeOptions::from_json(Some(&serde_json::json!({ "radius": 10.0, "visible": true })))
                .unwrap();
        assert_eq!(options.len(), 2);
        assert_eq!(options.get("radius"), Some(&NativeValue::from(10.0)));

        assert!(NativeOptions::from_json(None).unwrap().is_empty());
        assert!(NativeOptions::from_json(Some(&Value::Null)).unwrap().is_empty());
        assert!(matches!(
            NativeOptions::from_json(Some(&serde_json::json!([1, 2]))),
            Err(MapError::ParseError(_))
        ));
    }

    #[test]
    fn test_options_set_replaces() {
        let map = ObjectRef::new(ObjectId(1), NativeClass::Map);
        let mut options = NativeOptions::new().set("map", map).set("zIndex", 1);
        options.insert("zIndex", NativeValue::from(2));
        assert_eq!(options.len(), 2);
        assert_eq!(options.get("zIndex"), Some(&NativeValue::from(2)));
        assert_eq!(options.remove("map"), Some(NativeValue::Object(map)));
        assert_eq!(options.get("map"), None);
    }

    #[test]
    fn test_native_value_accessors() {
        let literal = NativeValue::from(serde_json::json!({ "lat": 1.0, "lng": 2.0 }));
        assert_eq!(literal.as_lat_lng(), Some(LatLng::new(1.0, 2.0)));
        assert_eq!(
            NativeValue::LatLng(LatLng::new(3.0, 4.0)).as_lat_lng(),
            Some(LatLng::new(3.0, 4.0))
        );
        assert!(NativeValue::Null.is_null());
        assert!(NativeValue::Json(Value::Null).is_null());
        assert!(NativeValue::from(None::<ObjectRef>).is_null());
        assert_eq!(NativeValue::from(true).as_bool(), Some(true));
    }

    #[test]
    fn test_class_libraries() {
        assert_eq!(
            NativeClass::DrawingManager.required_library(),
            Some(Library::Drawing)
        );
        assert_eq!(NativeClass::Circle.required_library(), None);
        assert_eq!(NativeClass::DrawingManager.to_string(), "drawing.DrawingManager");
    }
}
