//! Markers, marker clustering and info window anchors

use std::{fmt, rc::Rc};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    bridge::{EventBinding, Updater},
    core::{
        geo::{LatLng, Point},
        map::MapHandle,
    },
    input::{callback::Callback, events::MapMouseEvent},
    layers::base::{NativeInstance, Overlay},
    native::{NativeClass, NativeObject, NativeOptions, NativeValue, ObjectRef},
    Result,
};

/// Something an info window can be opened on, usually a marker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Anchor {
    object: ObjectRef,
}

impl Anchor {
    pub fn new(object: ObjectRef) -> Self {
        Self { object }
    }

    pub fn object(&self) -> ObjectRef {
        self.object
    }
}

impl From<Anchor> for NativeValue {
    fn from(anchor: Anchor) -> Self {
        NativeValue::Object(anchor.object)
    }
}

/// Built-in marker animations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Animation {
    Bounce,
    Drop,
}

impl Animation {
    /// Value of the matching `google.maps.Animation` constant
    pub fn as_native(&self) -> i32 {
        match self {
            Animation::Bounce => 1,
            Animation::Drop => 2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MarkerIcon {
    /// Image URL, drawn at its natural size
    Url(String),
    Image {
        url: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        size: Option<Size>,
        #[serde(rename = "scaledSize", skip_serializing_if = "Option::is_none")]
        scaled_size: Option<Size>,
        #[serde(skip_serializing_if = "Option::is_none")]
        origin: Option<Point>,
        #[serde(skip_serializing_if = "Option::is_none")]
        anchor: Option<Point>,
        #[serde(rename = "labelOrigin", skip_serializing_if = "Option::is_none")]
        label_origin: Option<Point>,
    },
    /// Vector symbol described by an SVG path
    Symbol {
        path: String,
        #[serde(rename = "fillColor", skip_serializing_if = "Option::is_none")]
        fill_color: Option<String>,
        #[serde(rename = "fillOpacity", skip_serializing_if = "Option::is_none")]
        fill_opacity: Option<f64>,
        #[serde(skip_serializing_if = "Option::is_none")]
        scale: Option<f64>,
        #[serde(rename = "strokeColor", skip_serializing_if = "Option::is_none")]
        stroke_color: Option<String>,
        #[serde(rename = "strokeWeight", skip_serializing_if = "Option::is_none")]
        stroke_weight: Option<f64>,
        #[serde(skip_serializing_if = "Option::is_none")]
        rotation: Option<f64>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MarkerLabel {
    Text(String),
    Styled {
        text: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        color: Option<String>,
        #[serde(rename = "fontFamily", skip_serializing_if = "Option::is_none")]
        font_family: Option<String>,
        #[serde(rename = "fontSize", skip_serializing_if = "Option::is_none")]
        font_size: Option<String>,
        #[serde(rename = "fontWeight", skip_serializing_if = "Option::is_none")]
        font_weight: Option<String>,
        #[serde(rename = "className", skip_serializing_if = "Option::is_none")]
        class_name: Option<String>,
    },
}

/// Clickable region of a marker icon, in icon pixels
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkerShape {
    pub coords: Vec<f64>,
    /// `circle`, `poly` or `rect`
    #[serde(rename = "type")]
    pub shape_type: String,
}

impl MarkerShape {
    pub fn circle(x: f64, y: f64, radius: f64) -> Self {
        Self {
            coords: vec![x, y, radius],
            shape_type: "circle".to_string(),
        }
    }

    pub fn rect(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self {
            coords: vec![x1, y1, x2, y2],
            shape_type: "rect".to_string(),
        }
    }
}

/// Groups markers instead of placing them on the map directly
pub trait Clusterer: fmt::Debug {
    fn add_marker(&self, marker: &Marker, no_draw: bool) -> Result<()>;

    /// Returns whether the marker was part of the clusterer
    fn remove_marker(&self, marker: &Marker, no_draw: bool) -> Result<bool>;
}

/// A native MarkerClusterer object
#[derive(Debug, Clone, PartialEq)]
pub struct NativeClusterer {
    native: NativeObject,
}

impl NativeClusterer {
    pub fn create(map: &MapHandle, options: Option<&Value>) -> Result<Self> {
        let options = NativeOptions::from_json(options)?.set("map", map.object());
        let native = NativeObject::create(map.api(), NativeClass::MarkerClusterer, options)?;
        Ok(Self { native })
    }

    pub fn object(&self) -> ObjectRef {
        self.native.object()
    }

    /// Recomputes the clusters
    pub fn repaint(&self) -> Result<()> {
        self.native.call("repaint", &[]).map(|_| ())
    }

    pub fn clear_markers(&self) -> Result<()> {
        self.native.call("clearMarkers", &[]).map(|_| ())
    }
}

impl Clusterer for NativeClusterer {
    fn add_marker(&self, marker: &Marker, no_draw: bool) -> Result<()> {
        self.native
            .call("addMarker", &[marker.object().into(), no_draw.into()])
            .map(|_| ())
    }

    fn remove_marker(&self, marker: &Marker, no_draw: bool) -> Result<bool> {
        let removed = self
            .native
            .call("removeMarker", &[marker.object().into(), no_draw.into()])?;
        Ok(removed.as_bool().unwrap_or(true))
    }
}

crate::native_object!(
    /// A native marker
    Marker,
    NativeClass::Marker
);

impl Marker {
    pub fn set_animation(&self, animation: Animation) -> Result<()> {
        self.native.invoke("setAnimation", animation.as_native())
    }

    pub fn set_clickable(&self, clickable: bool) -> Result<()> {
        self.native.invoke("setClickable", clickable)
    }

    pub fn set_cursor(&self, cursor: String) -> Result<()> {
        self.native.invoke("setCursor", cursor)
    }

    pub fn set_draggable(&self, draggable: bool) -> Result<()> {
        self.native.invoke("setDraggable", draggable)
    }

    pub fn set_icon(&self, icon: MarkerIcon) -> Result<()> {
        self.native.invoke_json("setIcon", &icon)
    }

    pub fn set_label(&self, label: MarkerLabel) -> Result<()> {
        self.native.invoke_json("setLabel", &label)
    }

    pub fn set_opacity(&self, opacity: f64) -> Result<()> {
        self.native.invoke("setOpacity", opacity)
    }

    pub fn set_options(&self, options: Value) -> Result<()> {
        self.native.set_options(&options)
    }

    pub fn set_position(&self, position: LatLng) -> Result<()> {
        self.native.invoke("setPosition", position)
    }

    pub fn set_shape(&self, shape: MarkerShape) -> Result<()> {
        self.native.invoke_json("setShape", &shape)
    }

    pub fn set_title(&self, title: String) -> Result<()> {
        self.native.invoke("setTitle", title)
    }

    pub fn set_visible(&self, visible: bool) -> Result<()> {
        self.native.invoke("setVisible", visible)
    }

    pub fn set_z_index(&self, z_index: i32) -> Result<()> {
        self.native.invoke("setZIndex", z_index)
    }

    pub fn position(&self) -> Result<Option<LatLng>> {
        Ok(self.native.get("getPosition")?.as_lat_lng())
    }

    pub fn title(&self) -> Result<Option<String>> {
        Ok(self
            .native
            .get("getTitle")?
            .as_json()
            .and_then(Value::as_str)
            .map(str::to_string))
    }

    pub fn visible(&self) -> Result<bool> {
        Ok(self.native.get("getVisible")?.as_bool().unwrap_or(true))
    }

    /// The map the marker is currently on, if any
    pub fn map(&self) -> Result<Option<ObjectRef>> {
        Ok(self.native.get("getMap")?.as_object())
    }
}

#[derive(Debug, Clone, Default)]
pub struct MarkerProps {
    pub options: Option<Value>,
    pub position: Option<LatLng>,
    pub animation: Option<Animation>,
    pub clickable: Option<bool>,
    pub cursor: Option<String>,
    pub draggable: Option<bool>,
    pub icon: Option<MarkerIcon>,
    pub label: Option<MarkerLabel>,
    pub opacity: Option<f64>,
    pub shape: Option<MarkerShape>,
    pub title: Option<String>,
    pub visible: Option<bool>,
    pub z_index: Option<i32>,

    /// Adds the marker to this clusterer instead of the map
    pub clusterer: Option<Rc<dyn Clusterer>>,
    /// Skips the clusterer redraw when adding or removing this marker
    pub no_clusterer_redraw: Option<bool>,

    pub on_animation_changed: Option<Callback<()>>,
    pub on_click: Option<Callback<MapMouseEvent>>,
    pub on_clickable_changed: Option<Callback<()>>,
    pub on_cursor_changed: Option<Callback<()>>,
    pub on_dbl_click: Option<Callback<MapMouseEvent>>,
    pub on_drag: Option<Callback<MapMouseEvent>>,
    pub on_drag_end: Option<Callback<MapMouseEvent>>,
    pub on_draggable_changed: Option<Callback<()>>,
    pub on_drag_start: Option<Callback<MapMouseEvent>>,
    pub on_flat_changed: Option<Callback<()>>,
    pub on_icon_changed: Option<Callback<()>>,
    pub on_mouse_down: Option<Callback<MapMouseEvent>>,
    pub on_mouse_out: Option<Callback<MapMouseEvent>>,
    pub on_mouse_over: Option<Callback<MapMouseEvent>>,
    pub on_mouse_up: Option<Callback<MapMouseEvent>>,
    pub on_position_changed: Option<Callback<()>>,
    pub on_right_click: Option<Callback<MapMouseEvent>>,
    pub on_shape_changed: Option<Callback<()>>,
    pub on_title_changed: Option<Callback<()>>,
    pub on_visible_changed: Option<Callback<()>>,
    pub on_z_index_changed: Option<Callback<()>>,

    pub on_load: Option<Callback<Marker>>,
    pub on_unmount: Option<Callback<Marker>>,
}

impl MarkerProps {
    fn no_redraw(&self) -> bool {
        self.no_clusterer_redraw.unwrap_or(false)
    }
}

impl Overlay for Marker {
    type Props = MarkerProps;

    const NAME: &'static str = "Marker";

    const UPDATERS: &'static [Updater<MarkerProps, Marker>] = &[
        crate::updater!(animation => set_animation),
        crate::updater!(clickable => set_clickable),
        crate::updater!(cursor => set_cursor),
        crate::updater!(draggable => set_draggable),
        crate::updater!(icon => set_icon),
        crate::updater!(label => set_label),
        crate::updater!(opacity => set_opacity),
        crate::updater!(options => set_options),
        crate::updater!(position => set_position),
        crate::updater!(shape => set_shape),
        crate::updater!(title => set_title),
        crate::updater!(visible => set_visible),
        crate::updater!(z_index => set_z_index),
    ];

    const EVENTS: &'static [EventBinding<MarkerProps>] = &[
        crate::event_binding!(on_animation_changed => "animation_changed"),
        crate::event_binding!(on_click => "click"),
        crate::event_binding!(on_clickable_changed => "clickable_changed"),
        crate::event_binding!(on_cursor_changed => "cursor_changed"),
        crate::event_binding!(on_dbl_click => "dblclick"),
        crate::event_binding!(on_drag => "drag"),
        crate::event_binding!(on_drag_end => "dragend"),
        crate::event_binding!(on_draggable_changed => "draggable_changed"),
        crate::event_binding!(on_drag_start => "dragstart"),
        crate::event_binding!(on_flat_changed => "flat_changed"),
        crate::event_binding!(on_icon_changed => "icon_changed"),
        crate::event_binding!(on_mouse_down => "mousedown"),
        crate::event_binding!(on_mouse_out => "mouseout"),
        crate::event_binding!(on_mouse_over => "mouseover"),
        crate::event_binding!(on_mouse_up => "mouseup"),
        crate::event_binding!(on_position_changed => "position_changed"),
        crate::event_binding!(on_right_click => "rightclick"),
        crate::event_binding!(on_shape_changed => "shape_changed"),
        crate::event_binding!(on_title_changed => "title_changed"),
        crate::event_binding!(on_visible_changed => "visible_changed"),
        crate::event_binding!(on_z_index_changed => "zindex_changed"),
    ];

    fn construct(map: &MapHandle, props: &MarkerProps) -> Result<Self> {
        let mut options = NativeOptions::from_json(props.options.as_ref())?;
        if props.clusterer.is_none() {
            options.insert("map", map.object().into());
        }

        let marker = Self::from_native(NativeObject::create(
            map.api(),
            NativeClass::Marker,
            options,
        )?);

        if let Some(clusterer) = &props.clusterer {
            if let Err(err) = clusterer.add_marker(&marker, props.no_redraw()) {
                marker.native().release();
                return Err(err);
            }
        }

        Ok(marker)
    }

    fn on_load(props: &MarkerProps) -> Option<&Callback<Self>> {
        props.on_load.as_ref()
    }

    fn on_unmount(props: &MarkerProps) -> Option<&Callback<Self>> {
        props.on_unmount.as_ref()
    }

    fn detach(&self, attached: &MarkerProps) -> Result<()> {
        match &attached.clusterer {
            Some(clusterer) => clusterer.remove_marker(self, attached.no_redraw()).map(|_| ()),
            None => self.native.set_map(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{core::map::MapOptions, layers::base::Mounted, native::headless::HeadlessMaps};

    fn setup() -> (Rc<HeadlessMaps>, MapHandle) {
        let api = HeadlessMaps::with_libraries(&[]);
        let map = MapHandle::create(api.clone(), MapOptions::default()).unwrap();
        (api, map)
    }

    #[test]
    fn test_icon_and_label_serialization() {
        assert_eq!(
            serde_json::to_value(MarkerIcon::Url("pin.png".to_string())).unwrap(),
            serde_json::json!("pin.png")
        );
        assert_eq!(
            serde_json::to_value(MarkerIcon::Image {
                url: "pin.png".to_string(),
                size: None,
                scaled_size: Some(Size::new(16.0, 16.0)),
                origin: None,
                anchor: None,
                label_origin: None,
            })
            .unwrap(),
            serde_json::json!({ "url": "pin.png", "scaledSize": { "width": 16.0, "height": 16.0 } })
        );
        assert_eq!(
            serde_json::to_value(MarkerShape::circle(1.0, 2.0, 3.0)).unwrap(),
            serde_json::json!({ "coords": [1.0, 2.0, 3.0], "type": "circle" })
        );
    }

    #[test]
    fn test_marker_setters_reach_native() {
        let (api, map) = setup();
        let marker = Mounted::<Marker>::mount(
            &map,
            MarkerProps {
                position: Some(LatLng::new(1.0, 1.0)),
                title: Some("Home".to_string()),
                animation: Some(Animation::Drop),
                z_index: Some(3),
                ..MarkerProps::default()
            },
        )
        .unwrap();

        let object = marker.instance().object();
        assert_eq!(marker.instance().position().unwrap(), Some(LatLng::new(1.0, 1.0)));
        assert_eq!(marker.instance().title().unwrap(), Some("Home".to_string()));
        assert_eq!(api.property(&object, "animation"), Some(NativeValue::from(2)));
        assert_eq!(api.property(&object, "zIndex"), Some(NativeValue::from(3)));
        assert_eq!(marker.instance().map().unwrap(), Some(map.object()));
    }

    #[test]
    fn test_clustered_marker_skips_the_map() {
        let (api, map) = setup();
        let clusterer = Rc::new(NativeClusterer::create(&map, None).unwrap());

        let marker = Mounted::<Marker>::mount(
            &map,
            MarkerProps {
                position: Some(LatLng::new(0.0, 0.0)),
                clusterer: Some(clusterer.clone()),
                no_clusterer_redraw: Some(true),
                ..MarkerProps::default()
            },
        )
        .unwrap();

        let object = marker.instance().object();
        assert_eq!(marker.instance().map().unwrap(), None);
        assert_eq!(api.children(&clusterer.object()), vec![object]);
        assert_eq!(
            api.calls_to(&clusterer.object(), "addMarker"),
            vec![vec![NativeValue::Object(object), NativeValue::from(true)]]
        );

        marker.unmount().unwrap();
        assert!(api.children(&clusterer.object()).is_empty());
        assert!(api.calls_to(&object, "setMap").is_empty());
    }

    #[test]
    fn test_marker_anchor_refers_to_marker() {
        let (_api, map) = setup();
        let marker = Mounted::<Marker>::mount(&map, MarkerProps::default()).unwrap();
        let anchor = marker.instance().anchor();
        assert_eq!(anchor.object(), marker.instance().object());
        assert_eq!(NativeValue::from(anchor), NativeValue::Object(anchor.object()));
    }
}
