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
        shape::Shape,
    },
    native::NativeClass,
    Result,
};

crate::native_object!(
    /// A native circle
    Circle,
    NativeClass::Circle
);

impl Circle {
    pub fn set_center(&self, center: LatLng) -> Result<()> {
        self.native.invoke("setCenter", center)
    }

    pub fn set_radius(&self, radius: f64) -> Result<()> {
        self.native.invoke("setRadius", radius)
    }

    pub fn center(&self) -> Result<Option<LatLng>> {
        Ok(self.native.get("getCenter")?.as_lat_lng())
    }

    /// Radius in meters
    pub fn radius(&self) -> Result<Option<f64>> {
        Ok(self.native.get("getRadius")?.as_f64())
    }

    /// Bounding box of the circle, computed locally from center and radius
    pub fn bounds(&self) -> Result<Option<LatLngBounds>> {
        let (Some(center), Some(radius)) = (self.center()?, self.radius()?) else {
            return Ok(None);
        };
        // One degree of latitude is roughly 111.32 km everywhere
        let lat_delta = radius / 111_320.0;
        let lng_delta = lat_delta / center.lat.to_radians().cos().max(f64::EPSILON);
        Ok(Some(LatLngBounds::from_coords(
            center.lat - lat_delta,
            center.lng - lng_delta,
            center.lat + lat_delta,
            center.lng + lng_delta,
        )))
    }
}

impl Shape for Circle {}

#[derive(Debug, Clone, Default)]
pub struct CircleProps {
    pub options: Option<Value>,
    pub center: Option<LatLng>,
    pub radius: Option<f64>,
    pub draggable: Option<bool>,
    pub editable: Option<bool>,
    pub visible: Option<bool>,

    pub on_center_changed: Option<Callback<()>>,
    pub on_radius_changed: Option<Callback<()>>,
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

    pub on_load: Option<Callback<Circle>>,
    pub on_unmount: Option<Callback<Circle>>,
}

impl Overlay for Circle {
    type Props = CircleProps;

    const NAME: &'static str = "Circle";

    const UPDATERS: &'static [Updater<CircleProps, Circle>] = &[
        crate::updater!(center => set_center),
        crate::updater!(draggable => set_draggable),
        crate::updater!(editable => set_editable),
        crate::updater!(options => set_options),
        crate::updater!(radius => set_radius),
        crate::updater!(visible => set_visible),
    ];

    const EVENTS: &'static [EventBinding<CircleProps>] = &[
        crate::event_binding!(on_center_changed => "center_changed"),
        crate::event_binding!(on_radius_changed => "radius_changed"),
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

    fn construct(map: &MapHandle, props: &CircleProps) -> Result<Self> {
        create_on_map(map, NativeClass::Circle, props.options.as_ref()).map(Self::from_native)
    }

    fn on_load(props: &CircleProps) -> Option<&Callback<Self>> {
        props.on_load.as_ref()
    }

    fn on_unmount(props: &CircleProps) -> Option<&Callback<Self>> {
        props.on_unmount.as_ref()
    }
}
