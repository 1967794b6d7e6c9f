use serde_json::Value;

use crate::{
    bridge::{EventBinding, Updater},
    core::{geo::LatLngBounds, map::MapHandle},
    input::{callback::Callback, events::MapMouseEvent},
    layers::{
        base::{create_on_map, Overlay},
        shape::Shape,
    },
    native::{NativeClass, NativeValue},
    Result,
};

crate::native_object!(
    /// A native axis-aligned rectangle
    Rectangle,
    NativeClass::Rectangle
);

impl Rectangle {
    pub fn set_bounds(&self, bounds: LatLngBounds) -> Result<()> {
        self.native.invoke("setBounds", bounds)
    }

    pub fn bounds(&self) -> Result<Option<LatLngBounds>> {
        Ok(match self.native.get("getBounds")? {
            NativeValue::Bounds(bounds) => Some(bounds),
            NativeValue::Json(literal) => LatLngBounds::from_literal(&literal),
            _ => None,
        })
    }
}

impl Shape for Rectangle {}

#[derive(Debug, Clone, Default)]
pub struct RectangleProps {
    pub options: Option<Value>,
    pub bounds: Option<LatLngBounds>,
    pub draggable: Option<bool>,
    pub editable: Option<bool>,
    pub visible: Option<bool>,

    pub on_bounds_changed: Option<Callback<()>>,
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

    pub on_load: Option<Callback<Rectangle>>,
    pub on_unmount: Option<Callback<Rectangle>>,
}

impl Overlay for Rectangle {
    type Props = RectangleProps;

    const NAME: &'static str = "Rectangle";

    const UPDATERS: &'static [Updater<RectangleProps, Rectangle>] = &[
        crate::updater!(bounds => set_bounds),
        crate::updater!(draggable => set_draggable),
        crate::updater!(editable => set_editable),
        crate::updater!(options => set_options),
        crate::updater!(visible => set_visible),
    ];

    const EVENTS: &'static [EventBinding<RectangleProps>] = &[
        crate::event_binding!(on_bounds_changed => "bounds_changed"),
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

    fn construct(map: &MapHandle, props: &RectangleProps) -> Result<Self> {
        create_on_map(map, NativeClass::Rectangle, props.options.as_ref()).map(Self::from_native)
    }

    fn on_load(props: &RectangleProps) -> Option<&Callback<Self>> {
        props.on_load.as_ref()
    }

    fn on_unmount(props: &RectangleProps) -> Option<&Callback<Self>> {
        props.on_unmount.as_ref()
    }
}
