use serde_json::Value;

use crate::{
    bridge::{EventBinding, Updater},
    core::{geo::LatLng, map::MapHandle},
    input::{callback::Callback, events::MapMouseEvent},
    layers::{
        base::{create_on_map, Overlay},
        shape::{path_from_value, path_value, paths_value, Shape},
    },
    native::{NativeClass, NativeValue},
    Result,
};

crate::native_object!(
    /// A native polygon, possibly with holes
    Polygon,
    NativeClass::Polygon
);

impl Polygon {
    /// Replaces the outer ring
    pub fn set_path(&self, path: Vec<LatLng>) -> Result<()> {
        self.native.invoke("setPath", path_value(&path))
    }

    /// Replaces every ring; the first is the outline, the rest are holes
    pub fn set_paths(&self, paths: Vec<Vec<LatLng>>) -> Result<()> {
        self.native.invoke("setPaths", paths_value(&paths))
    }

    pub fn path(&self) -> Result<Vec<LatLng>> {
        Ok(path_from_value(&self.native.get("getPath")?))
    }

    pub fn paths(&self) -> Result<Vec<Vec<LatLng>>> {
        match self.native.get("getPaths")? {
            NativeValue::List(rings) => Ok(rings.iter().map(path_from_value).collect()),
            _ => Ok(Vec::new()),
        }
    }
}

impl Shape for Polygon {}

#[derive(Debug, Clone, Default)]
pub struct PolygonProps {
    pub options: Option<Value>,
    pub draggable: Option<bool>,
    pub editable: Option<bool>,
    pub visible: Option<bool>,
    pub path: Option<Vec<LatLng>>,
    pub paths: Option<Vec<Vec<LatLng>>>,

    pub on_click: Option<Callback<MapMouseEvent>>,
    pub on_dbl_click: Option<Callback<MapMouseEvent>>,
    pub on_drag: Option<Callback<MapMouseEvent>>,
    pub on_drag_end: Option<Callback<MapMouseEvent>>,
    pub on_drag_start: Option<Callback<MapMouseEvent>>,
    pub on_mouse_down: Option<Callback<MapMouseEvent>>,
    pub on_mouse_move: Option<Callback<MapMouseEvent>>,
    pub on_mouse_out: Option<Callback<MapMouseEvent>>,
    pub on_mouse_over: Option<Callback<MapMouseEvent>>,
    pub on_mouse_up: Option<Callback<MapMouseEvent>>,
    pub on_right_click: Option<Callback<MapMouseEvent>>,

    pub on_load: Option<Callback<Polygon>>,
    pub on_unmount: Option<Callback<Polygon>>,
}

impl Overlay for Polygon {
    type Props = PolygonProps;

    const NAME: &'static str = "Polygon";

    const UPDATERS: &'static [Updater<PolygonProps, Polygon>] = &[
        crate::updater!(draggable => set_draggable),
        crate::updater!(editable => set_editable),
        crate::updater!(options => set_options),
        crate::updater!(path => set_path),
        crate::updater!(paths => set_paths),
        crate::updater!(visible => set_visible),
    ];

    const EVENTS: &'static [EventBinding<PolygonProps>] = &[
        crate::event_binding!(on_click => "click"),
        crate::event_binding!(on_dbl_click => "dblclick"),
        crate::event_binding!(on_drag => "drag"),
        crate::event_binding!(on_drag_end => "dragend"),
        crate::event_binding!(on_drag_start => "dragstart"),
        crate::event_binding!(on_mouse_down => "mousedown"),
        crate::event_binding!(on_mouse_move => "mousemove"),
        crate::event_binding!(on_mouse_out => "mouseout"),
        crate::event_binding!(on_mouse_over => "mouseover"),
        crate::event_binding!(on_mouse_up => "mouseup"),
        crate::event_binding!(on_right_click => "rightclick"),
    ];

    fn construct(map: &MapHandle, props: &PolygonProps) -> Result<Self> {
        create_on_map(map, NativeClass::Polygon, props.options.as_ref()).map(Self::from_native)
    }

    fn on_load(props: &PolygonProps) -> Option<&Callback<Self>> {
        props.on_load.as_ref()
    }

    fn on_unmount(props: &PolygonProps) -> Option<&Callback<Self>> {
        props.on_unmount.as_ref()
    }
}
