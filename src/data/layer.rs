//! The native data layer: GeoJSON features with their own styling and
//! drawing controls

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    bridge::{EventBinding, Updater},
    core::map::MapHandle,
    data::geojson::{DataStyle, GeoJson},
    input::{
        callback::Callback,
        events::{DataFeatureEvent, DataGeometryEvent, DataMouseEvent, DataPropertyEvent},
    },
    layers::base::{create_on_map, Overlay},
    native::{NativeClass, NativeValue, ObjectRef},
    MapError, Result,
};

/// Where a map control is placed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ControlPosition {
    TopLeft,
    TopCenter,
    TopRight,
    LeftCenter,
    LeftTop,
    LeftBottom,
    RightTop,
    RightCenter,
    RightBottom,
    BottomLeft,
    BottomCenter,
    BottomRight,
}

impl ControlPosition {
    /// Value of the matching `google.maps.ControlPosition` constant
    pub fn as_native(&self) -> i32 {
        match self {
            ControlPosition::TopLeft => 1,
            ControlPosition::TopCenter => 2,
            ControlPosition::TopRight => 3,
            ControlPosition::LeftCenter => 4,
            ControlPosition::LeftTop => 5,
            ControlPosition::LeftBottom => 6,
            ControlPosition::RightTop => 7,
            ControlPosition::RightCenter => 8,
            ControlPosition::RightBottom => 9,
            ControlPosition::BottomLeft => 10,
            ControlPosition::BottomCenter => 11,
            ControlPosition::BottomRight => 12,
        }
    }
}

/// What the data layer lets the user draw
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataDrawingMode {
    /// Drawing disabled
    Off,
    Point,
    LineString,
    Polygon,
}

impl DataDrawingMode {
    pub fn as_native(&self) -> NativeValue {
        match self {
            DataDrawingMode::Off => NativeValue::Null,
            DataDrawingMode::Point => "Point".into(),
            DataDrawingMode::LineString => "LineString".into(),
            DataDrawingMode::Polygon => "Polygon".into(),
        }
    }
}

crate::native_object!(
    /// A native data layer
    Data,
    NativeClass::Data
);

impl Data {
    /// Adds a feature from a `Data.FeatureOptions` literal
    pub fn add(&self, feature: Value) -> Result<()> {
        self.add_feature(feature).map(|_| ())
    }

    /// Adds a feature and returns the native feature object
    pub fn add_feature(&self, feature: Value) -> Result<ObjectRef> {
        self.native
            .call("add", &[feature.into()])?
            .as_object()
            .ok_or_else(|| MapError::Native("Data.add returned no feature".to_string()))
    }

    /// Adds every feature of `geojson`; returns the created features
    ///
    /// A bare geometry is added as a single feature.
    pub fn add_geo_json(&self, geojson: GeoJson) -> Result<Vec<ObjectRef>> {
        let document = geojson.into_feature_document().to_value()?;
        let added = self.native.call("addGeoJson", &[document.into()])?;
        Ok(feature_list(&added))
    }

    /// Fetches a GeoJSON document from `url` and adds its features
    ///
    /// `options` is a `Data.GeoJsonOptions` literal. `callback` receives the
    /// added features once the document has been loaded; a failed fetch
    /// never calls it.
    pub fn load_geo_json(
        &self,
        url: &str,
        options: Option<Value>,
        callback: impl FnOnce(Vec<ObjectRef>) + 'static,
    ) -> Result<()> {
        let mut callback = Some(callback);
        self.native.call_with_callback(
            "loadGeoJson",
            &[url.into(), options.into()],
            move |added| {
                if let Some(callback) = callback.take() {
                    callback(feature_list(&added));
                }
            },
        )
    }

    /// Exports every feature of the layer as a FeatureCollection
    pub fn to_geo_json(&self, callback: impl FnOnce(Result<GeoJson>) + 'static) -> Result<()> {
        let mut callback = Some(callback);
        self.native.call_with_callback("toGeoJson", &[], move |document| {
            let Some(callback) = callback.take() else {
                return;
            };
            callback(match document {
                NativeValue::Json(document) => GeoJson::from_value(document),
                other => Err(MapError::Native(format!("toGeoJson produced {:?}", other))),
            });
        })
    }

    pub fn for_each(&self, mut callback: impl FnMut(ObjectRef) + 'static) -> Result<()> {
        self.native.call_with_callback("forEach", &[], move |feature| {
            if let Some(feature) = feature.as_object() {
                callback(feature);
            }
        })
    }

    pub fn set_control_position(&self, position: ControlPosition) -> Result<()> {
        self.native.invoke("setControlPosition", position.as_native())
    }

    pub fn set_controls(&self, controls: Vec<DataDrawingMode>) -> Result<()> {
        let controls = controls
            .iter()
            .map(DataDrawingMode::as_native)
            .filter(|mode| !mode.is_null())
            .collect();
        self.native.invoke("setControls", NativeValue::List(controls))
    }

    pub fn set_drawing_mode(&self, mode: DataDrawingMode) -> Result<()> {
        self.native.invoke("setDrawingMode", mode.as_native())
    }

    pub fn set_style(&self, style: DataStyle) -> Result<()> {
        self.native.invoke_json("setStyle", &style)
    }

    pub fn remove(&self, feature: ObjectRef) -> Result<()> {
        self.native.invoke("remove", feature)
    }

    pub fn contains(&self, feature: ObjectRef) -> Result<bool> {
        Ok(self
            .native
            .call("contains", &[feature.into()])?
            .as_bool()
            .unwrap_or(false))
    }

    /// Styles one feature on top of the layer style
    pub fn override_style(&self, feature: ObjectRef, style: &DataStyle) -> Result<()> {
        self.native
            .call("overrideStyle", &[feature.into(), NativeValue::json(style)?])
            .map(|_| ())
    }

    /// Drops overrides of `feature`, or of every feature when `None`
    pub fn revert_style(&self, feature: Option<ObjectRef>) -> Result<()> {
        let args: Vec<NativeValue> = feature.into_iter().map(NativeValue::Object).collect();
        self.native.call("revertStyle", &args).map(|_| ())
    }
}

fn feature_list(value: &NativeValue) -> Vec<ObjectRef> {
    value
        .as_list()
        .map(|features| features.iter().filter_map(NativeValue::as_object).collect())
        .unwrap_or_default()
}

#[derive(Debug, Clone, Default)]
pub struct DataProps {
    pub options: Option<Value>,
    /// `Data.FeatureOptions` literal
    pub add: Option<Value>,
    pub add_geo_json: Option<GeoJson>,
    pub control_position: Option<ControlPosition>,
    pub controls: Option<Vec<DataDrawingMode>>,
    pub drawing_mode: Option<DataDrawingMode>,
    pub style: Option<DataStyle>,

    pub on_click: Option<Callback<DataMouseEvent>>,
    pub on_dbl_click: Option<Callback<DataMouseEvent>>,
    pub on_mouse_down: Option<Callback<DataMouseEvent>>,
    pub on_mouse_out: Option<Callback<DataMouseEvent>>,
    pub on_mouse_over: Option<Callback<DataMouseEvent>>,
    pub on_mouse_up: Option<Callback<DataMouseEvent>>,
    pub on_right_click: Option<Callback<DataMouseEvent>>,
    pub on_add_feature: Option<Callback<DataFeatureEvent>>,
    pub on_remove_feature: Option<Callback<DataFeatureEvent>>,
    pub on_remove_property: Option<Callback<DataPropertyEvent>>,
    pub on_set_geometry: Option<Callback<DataGeometryEvent>>,
    pub on_set_property: Option<Callback<DataPropertyEvent>>,

    pub on_load: Option<Callback<Data>>,
    pub on_unmount: Option<Callback<Data>>,
}

impl Data {
    fn apply_geo_json(&self, geojson: GeoJson) -> Result<()> {
        let added = self.add_geo_json(geojson)?;
        log::debug!("Data layer {} added {} feature(s)", self.native.object().id, added.len());
        Ok(())
    }
}

impl Overlay for Data {
    type Props = DataProps;

    const NAME: &'static str = "Data";

    const UPDATERS: &'static [Updater<DataProps, Data>] = &[
        crate::updater!(add => add),
        crate::updater!(add_geo_json => apply_geo_json),
        crate::updater!(control_position => set_control_position),
        crate::updater!(controls => set_controls),
        crate::updater!(drawing_mode => set_drawing_mode),
        crate::updater!(style => set_style),
    ];

    const EVENTS: &'static [EventBinding<DataProps>] = &[
        crate::event_binding!(on_click => "click"),
        crate::event_binding!(on_dbl_click => "dblclick"),
        crate::event_binding!(on_mouse_down => "mousedown"),
        crate::event_binding!(on_mouse_out => "mouseout"),
        crate::event_binding!(on_mouse_over => "mouseover"),
        crate::event_binding!(on_mouse_up => "mouseup"),
        crate::event_binding!(on_right_click => "rightclick"),
        crate::event_binding!(on_add_feature => "addfeature"),
        crate::event_binding!(on_remove_feature => "removefeature"),
        crate::event_binding!(on_remove_property => "removeproperty"),
        crate::event_binding!(on_set_geometry => "setgeometry"),
        crate::event_binding!(on_set_property => "setproperty"),
    ];

    fn construct(map: &MapHandle, props: &DataProps) -> Result<Self> {
        create_on_map(map, NativeClass::Data, props.options.as_ref()).map(Self::from_native)
    }

    fn on_load(props: &DataProps) -> Option<&Callback<Self>> {
        props.on_load.as_ref()
    }

    fn on_unmount(props: &DataProps) -> Option<&Callback<Self>> {
        props.on_unmount.as_ref()
    }
}
