//! Backend for the Google Maps JavaScript API
//!
//! Native objects live in a registry keyed by [`ObjectId`]; everything that
//! crosses the boundary goes through [`to_js`] / [`from_js`]. Listener
//! closures are owned by the registry and dropped when the listener is
//! removed.

use std::{cell::RefCell, rc::Rc};

use js_sys::{Array, Function, Object, Reflect, JSON};
use wasm_bindgen::{closure::Closure, JsCast, JsValue};

use crate::{
    core::{
        config::{Library, LoaderOptions},
        constants,
        geo::{LatLng, LatLngBounds},
    },
    input::events::{
        DataFeatureEvent, DataGeometryEvent, DataMouseEvent, DataPropertyEvent, MapMouseEvent,
        NativeEvent, OverlayCompleteEvent,
    },
    native::{
        ListenerId, MapsApi, NativeCallback, NativeClass, NativeHandler, NativeOptions, NativeValue, ObjectId,
        ObjectRef,
    },
    plugins::draw::OverlayType,
    prelude::HashMap,
    MapError, Result,
};

struct JsListener {
    handle: JsValue,
    _closure: Closure<dyn FnMut(JsValue)>,
}

#[derive(Default)]
struct Registry {
    next_object: u64,
    next_listener: u64,
    objects: HashMap<ObjectId, (NativeClass, JsValue)>,
    listeners: HashMap<ListenerId, JsListener>,
}

impl Registry {
    fn insert(&mut self, class: NativeClass, value: JsValue) -> ObjectRef {
        self.next_object += 1;
        let id = ObjectId(self.next_object);
        self.objects.insert(id, (class, value));
        ObjectRef::new(id, class)
    }

    fn get(&self, object: &ObjectRef) -> Result<JsValue> {
        self.objects
            .get(&object.id)
            .map(|(_, value)| value.clone())
            .ok_or(MapError::UnknownObject(object.id))
    }

    /// Looks an object up by identity, registering it under `class` if it is new
    fn intern(&mut self, value: JsValue, class: NativeClass) -> ObjectRef {
        let known = self
            .objects
            .iter()
            .find(|(_, (_, existing))| Object::is(existing, &value))
            .map(|(id, (class, _))| ObjectRef::new(*id, *class));
        known.unwrap_or_else(|| self.insert(class, value))
    }
}

/// Drives `google.maps` in the browser
///
/// Objects handed out through events are registered on first sight. Removed
/// features and edited geometries are forgotten once their listener returns.
/// Overlays drawn through a drawing manager stay registered until the
/// embedder passes them to [`MapsApi::release`], usually after it has
/// mounted its own overlay in their place or called `setMap(null)` on them.
pub struct GoogleMapsJs {
    options: LoaderOptions,
    namespace: JsValue,
    registry: Rc<RefCell<Registry>>,
}

impl GoogleMapsJs {
    /// Binds to an already loaded API
    ///
    /// Load the script from [`LoaderOptions::script_url`] first; this fails
    /// if `google.maps` is not defined yet.
    pub fn new(options: LoaderOptions) -> Result<Rc<Self>> {
        options.validate()?;
        let namespace = lookup(&global(), constants::NATIVE_NAMESPACE)?;
        log::debug!("Bound to {} with libraries {:?}", constants::NATIVE_NAMESPACE, options.libraries);
        Ok(Rc::new(Self {
            options,
            namespace,
            registry: Rc::new(RefCell::new(Registry::default())),
        }))
    }

    /// The raw JavaScript object behind `object`
    pub fn js_object(&self, object: &ObjectRef) -> Result<JsValue> {
        self.registry.borrow().get(object)
    }

    /// Registers an object created outside this crate, such as a map
    pub fn adopt(&self, class: NativeClass, value: JsValue) -> ObjectRef {
        self.registry.borrow_mut().intern(value, class)
    }

    fn constructor(&self, class: NativeClass) -> Result<Function> {
        let constructor = match class {
            NativeClass::InfoBox => lookup(&global(), &self.options.infobox_constructor)?,
            NativeClass::MarkerClusterer => lookup(&global(), class.constructor_path())?,
            _ => lookup(&self.namespace, class.constructor_path())?,
        };
        constructor
            .dyn_into::<Function>()
            .map_err(|_| MapError::Native(format!("{} is not a constructor", class)))
    }

    fn to_js(&self, value: &NativeValue) -> Result<JsValue> {
        to_js(&self.namespace, &self.registry.borrow(), value)
    }

    /// Invokes `method` with the converted `args`, then `trailing` if given
    fn apply(
        &self,
        target: &ObjectRef,
        method: &str,
        args: &[NativeValue],
        trailing: Option<&JsValue>,
    ) -> Result<JsValue> {
        let object = self.registry.borrow().get(target)?;
        let function = Reflect::get(&object, &JsValue::from_str(method))
            .map_err(js_error)?
            .dyn_into::<Function>()
            .map_err(|_| MapError::Native(format!("{} has no method {}", target.class, method)))?;

        let js_args = Array::new();
        for arg in args {
            js_args.push(&self.to_js(arg)?);
        }
        if let Some(trailing) = trailing {
            js_args.push(trailing);
        }
        function.apply(&object, &js_args).map_err(js_error)
    }
}

impl MapsApi for GoogleMapsJs {
    fn has_library(&self, library: Library) -> bool {
        self.options.has_library(library)
            && Reflect::get(&self.namespace, &JsValue::from_str(library.as_str()))
                .map(|value| !value.is_undefined())
                .unwrap_or(false)
    }

    fn create(&self, class: NativeClass, options: NativeOptions) -> Result<ObjectRef> {
        if let Some(library) = class.required_library() {
            if !self.has_library(library) {
                return Err(MapError::LibraryNotLoaded(library));
            }
        }

        let constructor = self.constructor(class)?;
        let js_options = Object::new();
        for (key, value) in options.iter() {
            Reflect::set(&js_options, &JsValue::from_str(key), &self.to_js(value)?).map_err(js_error)?;
        }
        let instance = Reflect::construct(&constructor, &Array::of1(&js_options)).map_err(js_error)?;
        Ok(self.registry.borrow_mut().insert(class, instance))
    }

    fn call(&self, target: &ObjectRef, method: &str, args: &[NativeValue]) -> Result<NativeValue> {
        let result = self.apply(target, method, args, None)?;
        Ok(from_js(&mut self.registry.borrow_mut(), result))
    }

    fn call_with_callback(
        &self,
        target: &ObjectRef,
        method: &str,
        args: &[NativeValue],
        mut callback: NativeCallback,
    ) -> Result<()> {
        let registry = Rc::downgrade(&self.registry);
        let closure = Closure::wrap(Box::new(move |value: JsValue| {
            let Some(registry) = registry.upgrade() else {
                return;
            };
            let decoded = from_js(&mut registry.borrow_mut(), value);
            callback(decoded);
        }) as Box<dyn FnMut(JsValue)>);

        // `loadGeoJson` reports back after this returns, so the JS side owns
        // the closure from here on
        let function = closure.into_js_value();
        self.apply(target, method, args, Some(&function)).map(|_| ())
    }

    fn add_listener(&self, target: &ObjectRef, event: &str, handler: NativeHandler) -> Result<ListenerId> {
        let object = self.registry.borrow().get(target)?;
        let registry = Rc::downgrade(&self.registry);
        let event_name = event.to_string();

        let closure = Closure::wrap(Box::new(move |payload: JsValue| {
            let Some(registry) = registry.upgrade() else {
                return;
            };
            let decoded = decode_event(&mut registry.borrow_mut(), &event_name, payload);
            handler(&decoded);
            let mut registry = registry.borrow_mut();
            for object in decoded.transient_objects(&event_name) {
                registry.objects.remove(&object.id);
            }
        }) as Box<dyn FnMut(JsValue)>);

        let add_listener = lookup(&self.namespace, "event.addListener")?
            .dyn_into::<Function>()
            .map_err(|_| MapError::Native("event.addListener is not a function".to_string()))?;
        let handle = add_listener
            .call3(
                &JsValue::NULL,
                &object,
                &JsValue::from_str(event),
                closure.as_ref(),
            )
            .map_err(js_error)?;

        let mut registry = self.registry.borrow_mut();
        registry.next_listener += 1;
        let listener = ListenerId(registry.next_listener);
        registry.listeners.insert(
            listener,
            JsListener {
                handle,
                _closure: closure,
            },
        );
        Ok(listener)
    }

    fn remove_listener(&self, listener: ListenerId) {
        let Some(removed) = self.registry.borrow_mut().listeners.remove(&listener) else {
            return;
        };
        let remove = Reflect::get(&removed.handle, &JsValue::from_str("remove"))
            .ok()
            .and_then(|value| value.dyn_into::<Function>().ok());
        if let Some(remove) = remove {
            if let Err(err) = remove.call0(&removed.handle) {
                log::warn!("Failed to remove listener {:?}: {:?}", listener, err);
            }
        }
    }

    fn release(&self, object: &ObjectRef) {
        self.registry.borrow_mut().objects.remove(&object.id);
    }
}

fn js_error(err: JsValue) -> MapError {
    MapError::Native(
        err.as_string()
            .or_else(|| JSON::stringify(&err).ok().and_then(|s| s.as_string()))
            .unwrap_or_else(|| format!("{:?}", err)),
    )
}

fn global() -> JsValue {
    js_sys::global().into()
}

/// Resolves a dotted path such as `drawing.DrawingManager` below `root`
fn lookup(root: &JsValue, path: &str) -> Result<JsValue> {
    let mut current = root.clone();
    for segment in path.split('.') {
        current = Reflect::get(&current, &JsValue::from_str(segment)).map_err(js_error)?;
        if current.is_undefined() || current.is_null() {
            return Err(MapError::Native(format!("`{}` is not defined", path)));
        }
    }
    Ok(current)
}

fn to_js(namespace: &JsValue, registry: &Registry, value: &NativeValue) -> Result<JsValue> {
    match value {
        NativeValue::Null => Ok(JsValue::NULL),
        NativeValue::Json(json) => JSON::parse(&serde_json::to_string(json)?).map_err(js_error),
        NativeValue::LatLng(lat_lng) => new_lat_lng(namespace, lat_lng),
        NativeValue::Bounds(bounds) => {
            let constructor = lookup(namespace, "LatLngBounds")?.unchecked_into::<Function>();
            let south_west = new_lat_lng(namespace, &bounds.south_west)?;
            let north_east = new_lat_lng(namespace, &bounds.north_east)?;
            Reflect::construct(&constructor, &Array::of2(&south_west, &north_east)).map_err(js_error)
        }
        NativeValue::Object(object) => registry.get(object),
        NativeValue::List(items) => {
            let array = Array::new();
            for item in items {
                array.push(&to_js(namespace, registry, item)?);
            }
            Ok(array.into())
        }
    }
}

fn new_lat_lng(namespace: &JsValue, lat_lng: &LatLng) -> Result<JsValue> {
    let constructor = lookup(namespace, "LatLng")?.unchecked_into::<Function>();
    Reflect::construct(
        &constructor,
        &Array::of2(&JsValue::from_f64(lat_lng.lat), &JsValue::from_f64(lat_lng.lng)),
    )
    .map_err(js_error)
}

fn method(value: &JsValue, name: &str) -> Option<Function> {
    if !value.is_object() {
        return None;
    }
    Reflect::get(value, &JsValue::from_str(name))
        .ok()
        .and_then(|member| member.dyn_into::<Function>().ok())
}

fn call_f64(value: &JsValue, name: &str) -> Option<f64> {
    method(value, name)?.call0(value).ok()?.as_f64()
}

fn read_lat_lng(value: &JsValue) -> Option<LatLng> {
    Some(LatLng::new(call_f64(value, "lat")?, call_f64(value, "lng")?))
}

fn field(value: &JsValue, name: &str) -> JsValue {
    Reflect::get(value, &JsValue::from_str(name)).unwrap_or(JsValue::UNDEFINED)
}

fn to_json(value: &JsValue) -> Option<serde_json::Value> {
    let text = JSON::stringify(value).ok()?.as_string()?;
    serde_json::from_str(&text).ok()
}

/// Converts a return value into its boundary form
fn from_js(registry: &mut Registry, value: JsValue) -> NativeValue {
    if value.is_null() || value.is_undefined() {
        return NativeValue::Null;
    }
    if let Some(lat_lng) = read_lat_lng(&value) {
        return NativeValue::LatLng(lat_lng);
    }
    if let (Some(south_west), Some(north_east)) = (
        method(&value, "getSouthWest").and_then(|f| f.call0(&value).ok()),
        method(&value, "getNorthEast").and_then(|f| f.call0(&value).ok()),
    ) {
        if let (Some(south_west), Some(north_east)) = (read_lat_lng(&south_west), read_lat_lng(&north_east)) {
            return NativeValue::Bounds(LatLngBounds::new(south_west, north_east));
        }
    }
    if Array::is_array(&value) {
        let items = Array::from(&value)
            .iter()
            .map(|item| from_js(registry, item))
            .collect();
        return NativeValue::List(items);
    }
    if let Some(get_array) = method(&value, "getArray") {
        if let Ok(array) = get_array.call0(&value) {
            return from_js(registry, array);
        }
    }
    if method(&value, "getProperty").is_some() && method(&value, "getGeometry").is_some() {
        return NativeValue::Object(registry.intern(value, NativeClass::DataFeature));
    }
    if method(&value, "addListener").is_some() || method(&value, "bindTo").is_some() {
        return NativeValue::Object(registry.intern(value, NativeClass::Opaque));
    }
    to_json(&value).map(NativeValue::Json).unwrap_or(NativeValue::Null)
}

fn completed_class(event: &str) -> Option<NativeClass> {
    match event {
        "circlecomplete" => Some(NativeClass::Circle),
        "markercomplete" => Some(NativeClass::Marker),
        "polygoncomplete" => Some(NativeClass::Polygon),
        "polylinecomplete" => Some(NativeClass::Polyline),
        "rectanglecomplete" => Some(NativeClass::Rectangle),
        _ => None,
    }
}

fn index(value: &JsValue, name: &str) -> Option<usize> {
    field(value, name).as_f64().map(|index| index as usize)
}

/// Translates a listener payload into a [`NativeEvent`], by event name
fn decode_event(registry: &mut Registry, event: &str, payload: JsValue) -> NativeEvent {
    if let Some(class) = completed_class(event) {
        return NativeEvent::Overlay(registry.intern(payload, class));
    }

    match event {
        "overlaycomplete" => {
            let overlay_type = field(&payload, "type")
                .as_string()
                .and_then(|kind| OverlayType::parse(&kind));
            match overlay_type {
                Some(overlay_type) => NativeEvent::OverlayComplete(OverlayCompleteEvent {
                    overlay_type,
                    overlay: registry.intern(field(&payload, "overlay"), overlay_type.native_class()),
                }),
                None => NativeEvent::None,
            }
        }
        "addfeature" | "removefeature" => NativeEvent::Feature(DataFeatureEvent {
            feature: registry.intern(field(&payload, "feature"), NativeClass::DataFeature),
        }),
        "setproperty" | "removeproperty" => NativeEvent::Property(DataPropertyEvent {
            feature: registry.intern(field(&payload, "feature"), NativeClass::DataFeature),
            name: field(&payload, "name").as_string().unwrap_or_default(),
            new_value: to_json(&field(&payload, "newValue")),
            old_value: to_json(&field(&payload, "oldValue")),
        }),
        "setgeometry" => {
            let mut geometry = |name: &str| {
                let value = field(&payload, name);
                (!value.is_undefined() && !value.is_null())
                    .then(|| registry.insert(NativeClass::Opaque, value))
            };
            let new_geometry = geometry("newGeometry");
            let old_geometry = geometry("oldGeometry");
            NativeEvent::Geometry(DataGeometryEvent {
                feature: registry.intern(field(&payload, "feature"), NativeClass::DataFeature),
                new_geometry,
                old_geometry,
            })
        }
        _ if payload.is_object() => {
            let lat_lng = read_lat_lng(&field(&payload, "latLng"));
            let feature = field(&payload, "feature");
            if feature.is_object() {
                NativeEvent::DataMouse(DataMouseEvent {
                    feature: registry.intern(feature, NativeClass::DataFeature),
                    lat_lng,
                })
            } else {
                NativeEvent::Mouse(MapMouseEvent {
                    lat_lng,
                    vertex: index(&payload, "vertex"),
                    edge: index(&payload, "edge"),
                    path: index(&payload, "path"),
                })
            }
        }
        _ => NativeEvent::None,
    }
}
