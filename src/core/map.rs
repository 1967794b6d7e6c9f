use std::rc::Rc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    core::{
        constants,
        geo::{LatLng, LatLngBounds},
    },
    native::{MapsApi, NativeClass, NativeObject, NativeOptions, NativeValue, ObjectRef},
    MapError, Result,
};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MapOptions {
    pub center: Option<LatLng>,
    pub zoom: Option<f64>,
    pub map_id: Option<String>,
    /// Any further native map options
    pub options: Option<Value>,
}

impl MapOptions {
    pub fn new(center: LatLng, zoom: f64) -> Self {
        Self {
            center: Some(center),
            zoom: Some(zoom),
            ..Self::default()
        }
    }

    pub fn with_map_id(mut self, map_id: impl Into<String>) -> Self {
        self.map_id = Some(map_id.into());
        self
    }
}

/// The map every overlay attaches to
///
/// Cloning is cheap and every clone refers to the same native map. Overlays
/// receive the handle explicitly when they are mounted.
#[derive(Debug, Clone, PartialEq)]
pub struct MapHandle {
    native: NativeObject,
}

impl MapHandle {
    pub fn create(api: Rc<dyn MapsApi>, options: MapOptions) -> Result<Self> {
        let mut native_options = NativeOptions::from_json(options.options.as_ref())?;
        if let Some(center) = options.center {
            if !center.is_valid() {
                return Err(MapError::Config(format!(
                    "map center {},{} is out of range",
                    center.lat, center.lng
                )));
            }
            native_options.insert("center", center.into());
        }
        native_options.insert(
            "zoom",
            options.zoom.unwrap_or(constants::DEFAULT_ZOOM).into(),
        );
        if let Some(map_id) = options.map_id {
            native_options.insert("mapId", map_id.into());
        }

        let native = NativeObject::create(&api, NativeClass::Map, native_options)?;
        log::debug!("Created map {}", native.object().id);
        Ok(Self { native })
    }

    /// Wraps a map that was created outside this crate
    pub fn from_existing(api: Rc<dyn MapsApi>, object: ObjectRef) -> Result<Self> {
        if object.class != NativeClass::Map {
            return Err(MapError::Native(format!(
                "{} is a {}, not a map",
                object.id, object.class
            )));
        }
        Ok(Self {
            native: NativeObject::new(api, object),
        })
    }

    pub fn api(&self) -> &Rc<dyn MapsApi> {
        self.native.api()
    }

    pub fn object(&self) -> ObjectRef {
        self.native.object()
    }

    pub fn native(&self) -> &NativeObject {
        &self.native
    }

    pub fn set_center(&self, center: LatLng) -> Result<()> {
        self.native.invoke("setCenter", center)
    }

    pub fn set_zoom(&self, zoom: f64) -> Result<()> {
        self.native.invoke("setZoom", zoom)
    }

    pub fn pan_to(&self, center: LatLng) -> Result<()> {
        self.native.invoke("panTo", center)
    }

    pub fn fit_bounds(&self, bounds: LatLngBounds) -> Result<()> {
        self.native.invoke("fitBounds", bounds)
    }

    pub fn center(&self) -> Result<Option<LatLng>> {
        Ok(self.native.get("getCenter")?.as_lat_lng())
    }

    pub fn zoom(&self) -> Result<Option<f64>> {
        Ok(self.native.get("getZoom")?.as_f64())
    }

    /// Passes an arbitrary call through to the native map
    pub fn call(&self, method: &str, args: &[NativeValue]) -> Result<NativeValue> {
        self.native.call(method, args)
    }
}
