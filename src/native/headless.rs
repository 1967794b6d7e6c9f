//! In-memory backend
//!
//! `HeadlessMaps` models every native object as a property bag and records
//! each call made against it, so overlay behavior can be asserted without a
//! browser. It mirrors the native accessor convention: `setFoo(v)` stores
//! `foo`, `getFoo()` reads it back and `setOptions` merges keys.

use std::{cell::RefCell, collections::BTreeMap, rc::Rc};

use serde_json::{json, Value};

use crate::{
    core::{
        config::{Library, LoaderOptions},
        geo::{LatLng, LatLngBounds},
    },
    input::events::NativeEvent,
    native::{
        ListenerId, MapsApi, NativeCallback, NativeClass, NativeHandler, NativeOptions, NativeValue, ObjectId,
        ObjectRef,
    },
    prelude::{HashMap, HashSet},
    MapError, Result,
};

/// One recorded native call
#[derive(Debug, Clone, PartialEq)]
pub struct CallRecord {
    pub target: ObjectRef,
    pub method: String,
    pub args: Vec<NativeValue>,
}

#[derive(Debug)]
struct HeadlessObject {
    class: NativeClass,
    constructed: NativeOptions,
    properties: HashMap<String, NativeValue>,
    /// Features of a data layer, or markers of a clusterer
    children: Vec<ObjectRef>,
    released: bool,
}

impl HeadlessObject {
    /// A data feature as GeoJSON, from its current properties
    fn to_feature(&self) -> Value {
        let json = |key: &str| self.properties.get(key).and_then(NativeValue::as_json).cloned();
        let mut feature = json!({
            "type": "Feature",
            "geometry": json("geometry").unwrap_or(Value::Null),
            "properties": json("properties").unwrap_or_else(|| json!({})),
        });
        if let Some(id) = json("id") {
            feature["id"] = id;
        }
        feature
    }
}

struct Listener {
    target: ObjectRef,
    event: String,
    handler: NativeHandler,
}

#[derive(Default)]
struct State {
    next_object: u64,
    next_listener: u64,
    objects: HashMap<ObjectId, HeadlessObject>,
    listeners: BTreeMap<ListenerId, Listener>,
    calls: Vec<CallRecord>,
    failing: HashSet<String>,
    /// Documents `loadGeoJson` can fetch, by URL
    served: HashMap<String, Value>,
}

impl State {
    fn insert_object(&mut self, class: NativeClass, options: NativeOptions) -> ObjectRef {
        self.next_object += 1;
        let object = ObjectRef::new(ObjectId(self.next_object), class);
        let properties = options
            .iter()
            .map(|(key, value)| (key.to_string(), value.clone()))
            .collect();
        self.objects.insert(
            object.id,
            HeadlessObject {
                class,
                constructed: options,
                properties,
                children: Vec::new(),
                released: false,
            },
        );
        object
    }

    fn live_object(&mut self, object: &ObjectRef) -> Result<&mut HeadlessObject> {
        match self.objects.get_mut(&object.id) {
            Some(entry) if !entry.released => Ok(entry),
            _ => Err(MapError::UnknownObject(object.id)),
        }
    }

    fn check_failing(&self, target: &ObjectRef, method: &str) -> Result<()> {
        if self.failing.contains(method) {
            return Err(MapError::Native(format!(
                "{} failed on {} {}",
                method, target.class, target.id
            )));
        }
        Ok(())
    }

    /// Adds the features of a Feature or FeatureCollection document
    fn add_geo_json(&mut self, target: &ObjectRef, document: Option<&Value>) -> Result<Vec<ObjectRef>> {
        self.live_object(target)?;
        let features = match document {
            Some(Value::Object(document)) => match document.get("features") {
                Some(Value::Array(features)) => features.clone(),
                _ => vec![Value::Object(document.clone())],
            },
            _ => Vec::new(),
        };
        let mut added = Vec::with_capacity(features.len());
        for feature in features {
            let options = NativeOptions::from_json(Some(&feature))?;
            added.push(self.insert_object(NativeClass::DataFeature, options));
        }
        self.live_object(target)?.children.extend(added.iter().copied());
        Ok(added)
    }

    /// Values handed to the callback of `method`, in delivery order
    fn dispatch_with_callback(
        &mut self,
        target: &ObjectRef,
        method: &str,
        args: &[NativeValue],
    ) -> Result<Vec<NativeValue>> {
        let children = self.live_object(target)?.children.clone();
        match method {
            "forEach" => Ok(children.into_iter().map(NativeValue::Object).collect()),
            "toGeoJson" => {
                let features: Vec<Value> = children
                    .iter()
                    .filter_map(|child| self.objects.get(&child.id))
                    .filter(|entry| !entry.released)
                    .map(HeadlessObject::to_feature)
                    .collect();
                Ok(vec![json!({ "type": "FeatureCollection", "features": features }).into()])
            }
            "loadGeoJson" => {
                let url = args
                    .first()
                    .and_then(NativeValue::as_json)
                    .and_then(Value::as_str)
                    .unwrap_or_default();
                let document = self
                    .served
                    .get(url)
                    .cloned()
                    .ok_or_else(|| MapError::Native(format!("nothing served at {}", url)))?;
                let added = self.add_geo_json(target, Some(&document))?;
                Ok(vec![NativeValue::List(added.into_iter().map(NativeValue::Object).collect())])
            }
            _ => Err(MapError::Native(format!(
                "{} on {} takes no callback",
                method, target.class
            ))),
        }
    }
}

/// A [`MapsApi`] that keeps everything in memory
pub struct HeadlessMaps {
    libraries: Vec<Library>,
    state: RefCell<State>,
}

impl HeadlessMaps {
    /// A backend whose loaded libraries follow `options`
    pub fn new(options: &LoaderOptions) -> Rc<Self> {
        Self::with_libraries(&options.libraries)
    }

    pub fn with_libraries(libraries: &[Library]) -> Rc<Self> {
        Rc::new(Self {
            libraries: libraries.to_vec(),
            state: RefCell::new(State::default()),
        })
    }

    /// Makes every later call to `method` fail
    pub fn fail_on(&self, method: &str) {
        self.state.borrow_mut().failing.insert(method.to_string());
    }

    pub fn recover(&self, method: &str) {
        self.state.borrow_mut().failing.remove(method);
    }

    /// Makes `document` available to `loadGeoJson` under `url`
    pub fn serve(&self, url: &str, document: Value) {
        self.state.borrow_mut().served.insert(url.to_string(), document);
    }

    pub fn calls(&self) -> Vec<CallRecord> {
        self.state.borrow().calls.clone()
    }

    pub fn calls_on(&self, target: &ObjectRef) -> Vec<CallRecord> {
        self.state
            .borrow()
            .calls
            .iter()
            .filter(|call| call.target == *target)
            .cloned()
            .collect()
    }

    /// Arguments of every call of `method` on `target`, oldest first
    pub fn calls_to(&self, target: &ObjectRef, method: &str) -> Vec<Vec<NativeValue>> {
        self.state
            .borrow()
            .calls
            .iter()
            .filter(|call| call.target == *target && call.method == method)
            .map(|call| call.args.clone())
            .collect()
    }

    pub fn clear_calls(&self) {
        self.state.borrow_mut().calls.clear();
    }

    /// Options the object was constructed with
    pub fn constructed_with(&self, object: &ObjectRef) -> Option<NativeOptions> {
        self.state
            .borrow()
            .objects
            .get(&object.id)
            .map(|entry| entry.constructed.clone())
    }

    /// Current value of a property; released objects keep their last state
    pub fn property(&self, object: &ObjectRef, key: &str) -> Option<NativeValue> {
        self.state
            .borrow()
            .objects
            .get(&object.id)
            .and_then(|entry| entry.properties.get(key).cloned())
    }

    /// Features of a data layer or markers of a clusterer
    pub fn children(&self, object: &ObjectRef) -> Vec<ObjectRef> {
        self.state
            .borrow()
            .objects
            .get(&object.id)
            .map(|entry| entry.children.clone())
            .unwrap_or_default()
    }

    pub fn is_released(&self, object: &ObjectRef) -> bool {
        self.state
            .borrow()
            .objects
            .get(&object.id)
            .map_or(false, |entry| entry.released)
    }

    /// Every object of `class` ever created, in creation order
    pub fn objects_of(&self, class: NativeClass) -> Vec<ObjectRef> {
        let mut objects: Vec<ObjectRef> = self
            .state
            .borrow()
            .objects
            .iter()
            .filter(|(_, entry)| entry.class == class)
            .map(|(id, _)| ObjectRef::new(*id, class))
            .collect();
        objects.sort_by_key(|object| object.id);
        objects
    }

    pub fn listener_count(&self, target: &ObjectRef, event: &str) -> usize {
        self.state
            .borrow()
            .listeners
            .values()
            .filter(|listener| listener.target == *target && listener.event == event)
            .count()
    }

    pub fn live_listeners(&self, target: &ObjectRef) -> usize {
        self.state
            .borrow()
            .listeners
            .values()
            .filter(|listener| listener.target == *target)
            .count()
    }

    pub fn total_listeners(&self) -> usize {
        self.state.borrow().listeners.len()
    }

    /// Dispatches `event` to the live listeners of `target`
    ///
    /// Returns how many handlers ran. Handlers are collected before any of
    /// them runs, so they may freely call back into the backend.
    pub fn fire(&self, target: &ObjectRef, event: &str, payload: NativeEvent) -> usize {
        let handlers: Vec<NativeHandler> = self
            .state
            .borrow()
            .listeners
            .values()
            .filter(|listener| listener.target == *target && listener.event == event)
            .map(|listener| listener.handler.clone())
            .collect();

        for handler in &handlers {
            handler(&payload);
        }
        handlers.len()
    }

    fn dispatch(
        &self,
        state: &mut State,
        target: &ObjectRef,
        method: &str,
        args: &[NativeValue],
    ) -> Result<NativeValue> {
        let arg = |index: usize| args.get(index).cloned().unwrap_or(NativeValue::Null);

        match method {
            "setOptions" => {
                let entry = state.live_object(target)?;
                if let Some(Value::Object(options)) = arg(0).as_json() {
                    for (key, value) in options {
                        let value = match key.as_str() {
                            "position" | "center" => lift_lat_lng(value),
                            "bounds" => LatLngBounds::from_literal(value)
                                .map(NativeValue::Bounds)
                                .unwrap_or_else(|| NativeValue::Json(value.clone())),
                            _ => NativeValue::Json(value.clone()),
                        };
                        entry.properties.insert(key.clone(), value);
                    }
                }
                Ok(NativeValue::Null)
            }
            "open" => {
                let entry = state.live_object(target)?;
                entry.properties.insert("map".to_string(), arg(0));
                entry.properties.insert("anchor".to_string(), arg(1));
                Ok(NativeValue::Null)
            }
            "close" => {
                let entry = state.live_object(target)?;
                entry.properties.insert("map".to_string(), NativeValue::Null);
                entry.properties.insert("anchor".to_string(), NativeValue::Null);
                Ok(NativeValue::Null)
            }
            "panTo" => {
                let entry = state.live_object(target)?;
                entry.properties.insert("center".to_string(), arg(0));
                Ok(NativeValue::Null)
            }
            "fitBounds" => {
                let entry = state.live_object(target)?;
                if let NativeValue::Bounds(bounds) = arg(0) {
                    entry
                        .properties
                        .insert("center".to_string(), bounds.center().into());
                }
                Ok(NativeValue::Null)
            }
            "addGeoJson" => {
                let added = state.add_geo_json(target, arg(0).as_json())?;
                Ok(NativeValue::List(added.into_iter().map(NativeValue::Object).collect()))
            }
            "add" => {
                state.live_object(target)?;
                let feature = match arg(0) {
                    NativeValue::Object(feature) => feature,
                    NativeValue::Json(literal) => {
                        let options = NativeOptions::from_json(Some(&literal))?;
                        state.insert_object(NativeClass::DataFeature, options)
                    }
                    other => {
                        return Err(MapError::Native(format!(
                            "cannot add {:?} to a data layer",
                            other
                        )))
                    }
                };
                let entry = state.live_object(target)?;
                if !entry.children.contains(&feature) {
                    entry.children.push(feature);
                }
                Ok(NativeValue::Object(feature))
            }
            "remove" | "removeMarker" => {
                let entry = state.live_object(target)?;
                if let Some(child) = arg(0).as_object() {
                    entry.children.retain(|existing| *existing != child);
                }
                Ok(NativeValue::Null)
            }
            "addMarker" => {
                let entry = state.live_object(target)?;
                if let Some(marker) = arg(0).as_object() {
                    if !entry.children.contains(&marker) {
                        entry.children.push(marker);
                    }
                }
                Ok(NativeValue::Null)
            }
            "contains" => {
                let entry = state.live_object(target)?;
                let contained = arg(0)
                    .as_object()
                    .map_or(false, |child| entry.children.contains(&child));
                Ok(contained.into())
            }
            _ => {
                let entry = state.live_object(target)?;
                if let Some(property) = method.strip_prefix("set").filter(|rest| !rest.is_empty()) {
                    entry.properties.insert(accessor_key(property), arg(0));
                    Ok(NativeValue::Null)
                } else if let Some(property) = method.strip_prefix("get").filter(|rest| !rest.is_empty()) {
                    Ok(entry
                        .properties
                        .get(&accessor_key(property))
                        .cloned()
                        .unwrap_or(NativeValue::Null))
                } else {
                    Ok(NativeValue::Null)
                }
            }
        }
    }
}

/// `Position` -> `position`, `ZIndex` -> `zIndex`
fn accessor_key(property: &str) -> String {
    let mut chars = property.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn lift_lat_lng(value: &Value) -> NativeValue {
    LatLng::from_literal(value)
        .map(NativeValue::LatLng)
        .unwrap_or_else(|| NativeValue::Json(value.clone()))
}

impl MapsApi for HeadlessMaps {
    fn has_library(&self, library: Library) -> bool {
        self.libraries.contains(&library)
    }

    fn create(&self, class: NativeClass, options: NativeOptions) -> Result<ObjectRef> {
        if let Some(library) = class.required_library() {
            if !self.has_library(library) {
                return Err(MapError::LibraryNotLoaded(library));
            }
        }
        Ok(self.state.borrow_mut().insert_object(class, options))
    }

    fn call(&self, target: &ObjectRef, method: &str, args: &[NativeValue]) -> Result<NativeValue> {
        let mut state = self.state.borrow_mut();
        state.check_failing(target, method)?;
        let result = self.dispatch(&mut state, target, method, args)?;
        state.calls.push(CallRecord {
            target: *target,
            method: method.to_string(),
            args: args.to_vec(),
        });
        Ok(result)
    }

    fn call_with_callback(
        &self,
        target: &ObjectRef,
        method: &str,
        args: &[NativeValue],
        mut callback: NativeCallback,
    ) -> Result<()> {
        let delivered = {
            let mut state = self.state.borrow_mut();
            state.check_failing(target, method)?;
            let delivered = state.dispatch_with_callback(target, method, args)?;
            state.calls.push(CallRecord {
                target: *target,
                method: method.to_string(),
                args: args.to_vec(),
            });
            delivered
        };
        for value in delivered {
            callback(value);
        }
        Ok(())
    }

    fn add_listener(&self, target: &ObjectRef, event: &str, handler: NativeHandler) -> Result<ListenerId> {
        let mut state = self.state.borrow_mut();
        state.live_object(target)?;
        state.next_listener += 1;
        let listener = ListenerId(state.next_listener);
        state.listeners.insert(
            listener,
            Listener {
                target: *target,
                event: event.to_string(),
                handler,
            },
        );
        Ok(listener)
    }

    fn remove_listener(&self, listener: ListenerId) {
        self.state.borrow_mut().listeners.remove(&listener);
    }

    fn release(&self, object: &ObjectRef) {
        if let Some(entry) = self.state.borrow_mut().objects.get_mut(&object.id) {
            entry.released = true;
        }
    }
}
