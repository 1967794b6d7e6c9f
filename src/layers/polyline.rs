use serde_json::Value;

use crate::{
    bridge::{EventBinding, Updater},
    core::{
        geo::{LatLng, LatLngBounds},
        map::MapHandle,
    },
    input::{callback::Callback, events::MapMouseEvent},
    layers::{
        base::{create_on_map, Overlay},
        shape::{path_from_value, path_value, Shape},
    },
    native::NativeClass,
    Result,
};

crate::native_object!(
    /// A native polyline
    Polyline,
    NativeClass::Polyline
);

impl Polyline {
    pub fn set_path(&self, path: Vec<LatLng>) -> Result<()> {
        self.native.invoke("setPath", path_value(&path))
    }

    pub fn path(&self) -> Result<Vec<LatLng>> {
        Ok(path_from_value(&self.native.get("getPath")?))
    }

    /// Sum of the great-circle distances between consecutive vertices, in
    /// meters
    pub fn length(&self) -> Result<f64> {
        let path = self.path()?;
        Ok(path
            .windows(2)
            .map(|segment| segment[0].distance_to(&segment[1]))
            .sum())
    }

    pub fn bounds(&self) -> Result<Option<LatLngBounds>> {
        Ok(LatLngBounds::from_points(&self.path()?))
    }
}

impl Shape for Polyline {}

#[derive(Debug, Clone, Default)]
pub struct PolylineProps {
    pub options: Option<Value>,
    pub draggable: Option<bool>,
    pub editable: Option<bool>,
    pub visible: Option<bool>,
    pub path: Option<Vec<LatLng>>,

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

    pub on_load: Option<Callback<Polyline>>,
    pub on_unmount: Option<Callback<Polyline>>,
}

impl Overlay for Polyline {
    type Props = PolylineProps;

    const NAME: &'static str = "Polyline";

    const UPDATERS: &'static [Updater<PolylineProps, Polyline>] = &[
        crate::updater!(draggable => set_draggable),
        crate::updater!(editable => set_editable),
        crate::updater!(options => set_options),
        crate::updater!(path => set_path),
        crate::updater!(visible => set_visible),
    ];

    const EVENTS: &'static [EventBinding<PolylineProps>] = &[
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

    fn construct(map: &MapHandle, props: &PolylineProps) -> Result<Self> {
        create_on_map(map, NativeClass::Polyline, props.options.as_ref()).map(Self::from_native)
    }

    fn on_load(props: &PolylineProps) -> Option<&Callback<Self>> {
        props.on_load.as_ref()
    }

    fn on_unmount(props: &PolylineProps) -> Option<&Callback<Self>> {
        props.on_unmount.as_ref()
    }
}
