use serde_json::Value;

use crate::{
    bridge::{EventBinding, Updater},
    core::{geo::LatLng, map::MapHandle},
    input::callback::Callback,
    layers::{base::Overlay, marker::Anchor},
    native::{NativeClass, NativeObject, NativeOptions, NativeValue},
    ui::{open_popup, reopen_on_anchor_change},
    Result,
};

crate::native_object!(
    /// A popup from the InfoBox add-on
    ///
    /// The add-on's constructor is looked up under
    /// [`LoaderOptions::infobox_constructor`](crate::core::config::LoaderOptions::infobox_constructor).
    InfoBox,
    NativeClass::InfoBox
);

impl InfoBox {
    pub fn set_options(&self, options: Value) -> Result<()> {
        self.native.set_options(&options)
    }

    /// Always hands the add-on a native position, never a literal
    pub fn set_position(&self, position: LatLng) -> Result<()> {
        self.native.invoke("setPosition", NativeValue::LatLng(position))
    }

    pub fn set_visible(&self, visible: bool) -> Result<()> {
        self.native.invoke("setVisible", visible)
    }

    pub fn set_z_index(&self, z_index: i32) -> Result<()> {
        self.native.invoke("setZIndex", z_index)
    }

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
pub struct InfoBoxProps {
    pub anchor: Option<Anchor>,
    pub options: Option<Value>,
    pub position: Option<LatLng>,
    pub visible: Option<bool>,
    pub z_index: Option<i32>,
    pub content: Option<String>,

    pub on_close_click: Option<Callback<()>>,
    pub on_content_changed: Option<Callback<()>>,
    pub on_dom_ready: Option<Callback<()>>,
    pub on_position_changed: Option<Callback<()>>,
    pub on_z_index_changed: Option<Callback<()>>,

    pub on_load: Option<Callback<InfoBox>>,
    pub on_unmount: Option<Callback<InfoBox>>,
}

impl Overlay for InfoBox {
    type Props = InfoBoxProps;

    const NAME: &'static str = "InfoBox";

    const UPDATERS: &'static [Updater<InfoBoxProps, InfoBox>] = &[
        crate::updater!(options => set_options),
        crate::updater!(position => set_position),
        crate::updater!(visible => set_visible),
        crate::updater!(z_index => set_z_index),
        crate::updater!(content => set_content),
    ];

    const EVENTS: &'static [EventBinding<InfoBoxProps>] = &[
        crate::event_binding!(on_close_click => "closeclick"),
        crate::event_binding!(on_content_changed => "content_changed"),
        crate::event_binding!(on_dom_ready => "domready"),
        crate::event_binding!(on_position_changed => "position_changed"),
        crate::event_binding!(on_z_index_changed => "zindex_changed"),
    ];

    /// A `position` literal in the options is lifted to a native position
    /// before the add-on sees it
    fn construct(map: &MapHandle, props: &InfoBoxProps) -> Result<Self> {
        let mut options = NativeOptions::from_json(props.options.as_ref())?;
        if let Some(position) = options.get("position").and_then(NativeValue::as_lat_lng) {
            options.insert("position", NativeValue::LatLng(position));
        }
        NativeObject::create(map.api(), NativeClass::InfoBox, options).map(Self::from_native)
    }

    fn on_load(props: &InfoBoxProps) -> Option<&Callback<Self>> {
        props.on_load.as_ref()
    }

    fn on_unmount(props: &InfoBoxProps) -> Option<&Callback<Self>> {
        props.on_unmount.as_ref()
    }

    fn after_mount(&self, map: &MapHandle, props: &InfoBoxProps) -> Result<()> {
        self.open(map, props.anchor)
    }

    fn after_update(&self, map: &MapHandle, prev: &InfoBoxProps, next: &InfoBoxProps) -> Result<()> {
        reopen_on_anchor_change(&self.native, Self::NAME, map, prev.anchor, next.anchor)
    }

    fn detach(&self, _props: &InfoBoxProps) -> Result<()> {
        self.close()
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::Cell, rc::Rc};

    use super::*;
    use crate::{
        core::map::MapOptions,
        layers::{
            base::Mounted,
            marker::{Marker, MarkerProps},
        },
        native::headless::HeadlessMaps,
        MapError,
    };

    #[test]
    fn test_position_literal_is_lifted() {
        let api = HeadlessMaps::with_libraries(&[]);
        let map = MapHandle::create(api.clone(), MapOptions::default()).unwrap();

        let info_box = Mounted::<InfoBox>::mount(
            &map,
            InfoBoxProps {
                options: Some(serde_json::json!({
                    "position": { "lat": 1.0, "lng": 2.0 },
                    "closeBoxURL": ""
                })),
                ..InfoBoxProps::default()
            },
        )
        .unwrap();

        let constructed = api.constructed_with(&info_box.instance().object()).unwrap();
        assert_eq!(
            constructed.get("position"),
            Some(&NativeValue::LatLng(LatLng::new(1.0, 2.0)))
        );
        assert_eq!(constructed.get("closeBoxURL"), Some(&NativeValue::from("")));
    }

    #[test]
    fn test_requires_anchor_or_position() {
        let api = HeadlessMaps::with_libraries(&[]);
        let map = MapHandle::create(api.clone(), MapOptions::default()).unwrap();
        let unmounted = Rc::new(Cell::new(false));
        let flag = unmounted.clone();

        let result = Mounted::<InfoBox>::mount(
            &map,
            InfoBoxProps {
                on_unmount: Some(Callback::new(move |_| flag.set(true))),
                ..InfoBoxProps::default()
            },
        );
        assert!(matches!(
            result,
            Err(MapError::MissingAnchorOrPosition("InfoBox"))
        ));
        assert!(!unmounted.get());

        let marker = Mounted::<Marker>::mount(&map, MarkerProps::default()).unwrap();
        let anchored = Mounted::<InfoBox>::mount(
            &map,
            InfoBoxProps {
                anchor: Some(marker.instance().anchor()),
                ..InfoBoxProps::default()
            },
        );
        assert!(anchored.is_ok());
    }

    #[test]
    fn test_position_updater_passes_native_lat_lng() {
        let api = HeadlessMaps::with_libraries(&[]);
        let map = MapHandle::create(api.clone(), MapOptions::default()).unwrap();
        let info_box = Mounted::<InfoBox>::mount(
            &map,
            InfoBoxProps {
                position: Some(LatLng::new(3.0, 4.0)),
                visible: Some(true),
                ..InfoBoxProps::default()
            },
        )
        .unwrap();

        let object = info_box.instance().object();
        assert_eq!(
            api.calls_to(&object, "setPosition"),
            vec![vec![NativeValue::LatLng(LatLng::new(3.0, 4.0))]]
        );
        assert_eq!(info_box.instance().position().unwrap(), Some(LatLng::new(3.0, 4.0)));
    }
}
