use serde_json::Value;

use crate::{
    bridge::{EventBinding, Updater},
    core::{geo::LatLng, map::MapHandle},
    input::callback::Callback,
    layers::{base::Overlay, marker::Anchor},
    native::{NativeClass, NativeObject, NativeOptions},
    ui::{open_popup, reopen_on_anchor_change},
    Result,
};

crate::native_object!(
    /// The built-in info window
    InfoWindow,
    NativeClass::InfoWindow
);

impl InfoWindow {
    pub fn set_options(&self, options: Value) -> Result<()> {
        self.native.set_options(&options)
    }

    pub fn set_position(&self, position: LatLng) -> Result<()> {
        self.native.invoke("setPosition", position)
    }

    pub fn set_z_index(&self, z_index: i32) -> Result<()> {
        self.native.invoke("setZIndex", z_index)
    }

    /// Sets the HTML shown inside the window
    pub fn set_content(&self, content: String) -> Result<()> {
        self.native.invoke("setContent", content)
    }

    pub fn position(&self) -> Result<Option<LatLng>> {
        Ok(self.native.get("getPosition")?.as_lat_lng())
    }

    pub fn open(&self, map: &MapHandle, anchor: Option<Anchor>) -> Result<()> {
        open_popup(&self.native, Self::NAME, map, anchor)
    }

    pub fn close(&self) -> Result<()> {
        self.native.call("close", &[]).map(|_| ())
    }
}

#[derive(Debug, Clone, Default)]
pub struct InfoWindowProps {
    /// Object to open on; takes precedence over `position`
    pub anchor: Option<Anchor>,
    pub options: Option<Value>,
    pub position: Option<LatLng>,
    pub z_index: Option<i32>,
    pub content: Option<String>,

    pub on_close_click: Option<Callback<()>>,
    pub on_content_changed: Option<Callback<()>>,
    pub on_dom_ready: Option<Callback<()>>,
    pub on_position_changed: Option<Callback<()>>,
    pub on_z_index_changed: Option<Callback<()>>,

    pub on_load: Option<Callback<InfoWindow>>,
    pub on_unmount: Option<Callback<InfoWindow>>,
}

impl Overlay for InfoWindow {
    type Props = InfoWindowProps;

    const NAME: &'static str = "InfoWindow";

    const UPDATERS: &'static [Updater<InfoWindowProps, InfoWindow>] = &[
        crate::updater!(options => set_options),
        crate::updater!(position => set_position),
        crate::updater!(z_index => set_z_index),
        crate::updater!(content => set_content),
    ];

    const EVENTS: &'static [EventBinding<InfoWindowProps>] = &[
        crate::event_binding!(on_close_click => "closeclick"),
        crate::event_binding!(on_content_changed => "content_changed"),
        crate::event_binding!(on_dom_ready => "domready"),
        crate::event_binding!(on_position_changed => "position_changed"),
        crate::event_binding!(on_z_index_changed => "zindex_changed"),
    ];

    fn construct(map: &MapHandle, props: &InfoWindowProps) -> Result<Self> {
        let options = NativeOptions::from_json(props.options.as_ref())?;
        NativeObject::create(map.api(), NativeClass::InfoWindow, options).map(Self::from_native)
    }

    fn on_load(props: &InfoWindowProps) -> Option<&Callback<Self>> {
        props.on_load.as_ref()
    }

    fn on_unmount(props: &InfoWindowProps) -> Option<&Callback<Self>> {
        props.on_unmount.as_ref()
    }

    fn after_mount(&self, map: &MapHandle, props: &InfoWindowProps) -> Result<()> {
        self.open(map, props.anchor)
    }

    fn after_update(&self, map: &MapHandle, prev: &InfoWindowProps, next: &InfoWindowProps) -> Result<()> {
        reopen_on_anchor_change(&self.native, Self::NAME, map, prev.anchor, next.anchor)
    }

    fn detach(&self, _props: &InfoWindowProps) -> Result<()> {
        self.close()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        core::map::MapOptions,
        layers::{
            base::Mounted,
            marker::{Marker, MarkerProps},
        },
        native::{headless::HeadlessMaps, NativeValue},
        MapError,
    };

    #[test]
    fn test_open_requires_anchor_or_position() {
        let api = HeadlessMaps::with_libraries(&[]);
        let map = MapHandle::create(api.clone(), MapOptions::default()).unwrap();

        let result = Mounted::<InfoWindow>::mount(&map, InfoWindowProps::default());
        assert!(matches!(
            result,
            Err(MapError::MissingAnchorOrPosition("InfoWindow"))
        ));
        assert_eq!(api.total_listeners(), 0);

        let window = Mounted::<InfoWindow>::mount(
            &map,
            InfoWindowProps {
                position: Some(LatLng::new(5.0, 5.0)),
                ..InfoWindowProps::default()
            },
        )
        .unwrap();
        let object = window.instance().object();
        assert_eq!(
            api.calls_to(&object, "open"),
            vec![vec![NativeValue::Object(map.object())]]
        );
    }

    #[test]
    fn test_position_from_options_is_enough() {
        let api = HeadlessMaps::with_libraries(&[]);
        let map = MapHandle::create(api, MapOptions::default()).unwrap();

        let window = Mounted::<InfoWindow>::mount(
            &map,
            InfoWindowProps {
                options: Some(serde_json::json!({ "position": { "lat": 1.0, "lng": 2.0 } })),
                ..InfoWindowProps::default()
            },
        );
        assert!(window.is_ok());
    }

    #[test]
    fn test_anchor_change_reopens_and_unmount_closes() {
        let api = HeadlessMaps::with_libraries(&[]);
        let map = MapHandle::create(api.clone(), MapOptions::default()).unwrap();
        let first = Mounted::<Marker>::mount(&map, MarkerProps::default()).unwrap();
        let second = Mounted::<Marker>::mount(&map, MarkerProps::default()).unwrap();

        let props = InfoWindowProps {
            anchor: Some(first.instance().anchor()),
            content: Some("<b>hi</b>".to_string()),
            ..InfoWindowProps::default()
        };
        let mut window = Mounted::<InfoWindow>::mount(&map, props.clone()).unwrap();
        let object = window.instance().object();

        window.update(props.clone()).unwrap();
        assert_eq!(api.calls_to(&object, "open").len(), 1);

        window
            .update(InfoWindowProps {
                anchor: Some(second.instance().anchor()),
                ..props
            })
            .unwrap();
        assert_eq!(api.calls_to(&object, "close").len(), 1);
        assert_eq!(
            api.property(&object, "anchor"),
            Some(NativeValue::Object(second.instance().object()))
        );

        window.unmount().unwrap();
        assert_eq!(api.calls_to(&object, "close").len(), 2);
        assert!(api.property(&object, "map").unwrap().is_null());
    }
}
