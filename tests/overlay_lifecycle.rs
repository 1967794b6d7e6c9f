use std::{cell::RefCell, rc::Rc};

use mapbridge::prelude::*;

/// Mount, update and unmount scenarios driven through the in-memory backend
#[cfg(test)]
mod overlay_lifecycle {
    use super::*;

    fn setup() -> (Rc<HeadlessMaps>, MapHandle) {
        let api = HeadlessMaps::with_libraries(&[]);
        let map = MapHandle::create(api.clone(), MapOptions::new(LatLng::new(0.0, 0.0), 4.0))
            .expect("map should be created");
        (api, map)
    }

    fn marker_at(lat: f64, lng: f64) -> MarkerProps {
        MarkerProps {
            position: Some(LatLng::new(lat, lng)),
            ..MarkerProps::default()
        }
    }

    #[test]
    fn test_marker_moves_with_one_setter_call() {
        let (api, map) = setup();
        let mut marker = Mounted::<Marker>::mount(&map, marker_at(1.0, 1.0)).unwrap();
        let object = marker.instance().object();
        assert_eq!(
            api.calls_to(&object, "setPosition"),
            vec![vec![NativeValue::LatLng(LatLng::new(1.0, 1.0))]]
        );

        api.clear_calls();
        marker.update(marker_at(2.0, 2.0)).unwrap();
        assert_eq!(
            api.calls_to(&object, "setPosition"),
            vec![vec![NativeValue::LatLng(LatLng::new(2.0, 2.0))]]
        );
        assert_eq!(marker.instance().position().unwrap(), Some(LatLng::new(2.0, 2.0)));

        // Same snapshot again: nothing to push
        api.clear_calls();
        marker.update(marker_at(2.0, 2.0)).unwrap();
        assert!(api.calls_on(&object).is_empty());
    }

    #[test]
    fn test_listeners_never_accumulate() {
        let (api, map) = setup();
        let clicks = Rc::new(RefCell::new(0));

        let props = |clicks: &Rc<RefCell<i32>>| {
            let counter = clicks.clone();
            MarkerProps {
                on_click: Some(Callback::new(move |_: MapMouseEvent| *counter.borrow_mut() += 1)),
                on_drag_end: Some(Callback::new(|_: MapMouseEvent| {})),
                ..marker_at(1.0, 1.0)
            }
        };

        let mut marker = Mounted::<Marker>::mount(&map, props(&clicks)).unwrap();
        let object = marker.instance().object();
        for _ in 0..5 {
            marker.update(props(&clicks)).unwrap();
        }

        assert_eq!(api.listener_count(&object, "click"), 1);
        assert_eq!(api.listener_count(&object, "dragend"), 1);
        assert_eq!(marker.listener_count(), 2);

        api.fire(&object, "click", NativeEvent::Mouse(MapMouseEvent::default()));
        assert_eq!(*clicks.borrow(), 1);

        // Removing the prop removes the listener
        marker.update(marker_at(1.0, 1.0)).unwrap();
        assert_eq!(api.live_listeners(&object), 0);
    }

    #[test]
    fn test_unmount_leaves_nothing_behind() {
        let (api, map) = setup();
        let unmounted = Rc::new(RefCell::new(Vec::new()));
        let sink = unmounted.clone();

        let circle = Mounted::<Circle>::mount(
            &map,
            CircleProps {
                center: Some(LatLng::new(1.0, 2.0)),
                radius: Some(500.0),
                on_click: Some(Callback::new(|_: MapMouseEvent| {})),
                on_radius_changed: Some(Callback::new(|_: ()| {})),
                on_unmount: Some(Callback::new(move |circle: Circle| {
                    sink.borrow_mut().push(circle.object())
                })),
                ..CircleProps::default()
            },
        )
        .unwrap();
        let object = circle.instance().object();
        assert_eq!(api.live_listeners(&object), 2);

        circle.unmount().unwrap();

        assert_eq!(api.live_listeners(&object), 0);
        assert!(api.property(&object, "map").unwrap().is_null());
        assert!(api.is_released(&object));
        assert_eq!(*unmounted.borrow(), vec![object]);
    }

    #[test]
    fn test_drop_unmounts() {
        let (api, map) = setup();
        let object = {
            let polyline = Mounted::<Polyline>::mount(
                &map,
                PolylineProps {
                    path: Some(vec![LatLng::new(0.0, 0.0), LatLng::new(1.0, 1.0)]),
                    on_click: Some(Callback::new(|_: MapMouseEvent| {})),
                    ..PolylineProps::default()
                },
            )
            .unwrap();
            polyline.instance().object()
        };

        assert_eq!(api.total_listeners(), 0);
        assert!(api.property(&object, "map").unwrap().is_null());
    }

    #[test]
    fn test_clustered_marker_lifecycle() {
        let (api, map) = setup();
        let clusterer = NativeClusterer::create(&map, None).unwrap();
        let shared: Rc<dyn Clusterer> = Rc::new(clusterer.clone());

        let marker = Mounted::<Marker>::mount(
            &map,
            MarkerProps {
                clusterer: Some(shared),
                no_clusterer_redraw: Some(true),
                on_click: Some(Callback::new(|_: MapMouseEvent| {})),
                ..marker_at(3.0, 4.0)
            },
        )
        .unwrap();
        let object = marker.instance().object();

        assert_eq!(api.children(&clusterer.object()), vec![object]);
        assert!(api.constructed_with(&object).unwrap().get("map").is_none());
        assert_eq!(
            api.calls_to(&clusterer.object(), "addMarker"),
            vec![vec![NativeValue::Object(object), NativeValue::from(true)]]
        );

        marker.unmount().unwrap();
        assert!(api.children(&clusterer.object()).is_empty());
        assert_eq!(api.live_listeners(&object), 0);
        assert!(api.calls_to(&object, "setMap").is_empty());
    }

    #[test]
    fn test_marker_given_a_clusterer_later_still_leaves_the_map() {
        let (api, map) = setup();
        let clusterer = NativeClusterer::create(&map, None).unwrap();
        let mut marker = Mounted::<Marker>::mount(&map, marker_at(1.0, 1.0)).unwrap();
        let object = marker.instance().object();

        marker
            .update(MarkerProps {
                clusterer: Some(Rc::new(clusterer.clone())),
                ..marker_at(1.0, 1.0)
            })
            .unwrap();
        marker.unmount().unwrap();

        assert!(api.property(&object, "map").unwrap().is_null());
        assert_eq!(api.calls_to(&object, "setMap"), vec![vec![NativeValue::Null]]);
        assert!(api.calls_to(&clusterer.object(), "removeMarker").is_empty());
    }

    #[test]
    fn test_marker_dropping_its_clusterer_still_leaves_the_clusterer() {
        let (api, map) = setup();
        let clusterer = NativeClusterer::create(&map, None).unwrap();
        let mut marker = Mounted::<Marker>::mount(
            &map,
            MarkerProps {
                clusterer: Some(Rc::new(clusterer.clone())),
                ..marker_at(1.0, 1.0)
            },
        )
        .unwrap();
        let object = marker.instance().object();

        marker.update(MarkerProps::default()).unwrap();
        marker.unmount().unwrap();

        assert!(api.children(&clusterer.object()).is_empty());
        assert!(api.calls_to(&object, "setMap").is_empty());
    }

    #[test]
    fn test_failed_setter_still_rebinds_listeners() {
        let (api, map) = setup();
        let mut marker = Mounted::<Marker>::mount(&map, marker_at(1.0, 1.0)).unwrap();
        let object = marker.instance().object();

        api.fail_on("setPosition");
        let result = marker.update(MarkerProps {
            on_click: Some(Callback::new(|_: MapMouseEvent| {})),
            ..marker_at(5.0, 5.0)
        });

        assert!(matches!(result, Err(MapError::Native(_))));
        assert_eq!(api.listener_count(&object, "click"), 1);
    }

    #[test]
    fn test_info_window_needs_anchor_or_position() {
        let (api, map) = setup();

        let result = Mounted::<InfoWindow>::mount(&map, InfoWindowProps::default());
        assert!(matches!(
            result,
            Err(MapError::MissingAnchorOrPosition("InfoWindow"))
        ));
        let orphan = api.objects_of(NativeClass::InfoWindow)[0];
        assert!(api.is_released(&orphan));

        let marker = Mounted::<Marker>::mount(&map, marker_at(1.0, 1.0)).unwrap();
        let window = Mounted::<InfoWindow>::mount(
            &map,
            InfoWindowProps {
                anchor: Some(marker.instance().anchor()),
                content: Some("<b>hello</b>".to_string()),
                ..InfoWindowProps::default()
            },
        )
        .unwrap();
        let object = window.instance().object();

        assert_eq!(
            api.property(&object, "anchor"),
            Some(NativeValue::Object(marker.instance().object()))
        );
        assert_eq!(api.property(&object, "map"), Some(NativeValue::Object(map.object())));

        window.unmount().unwrap();
        assert!(api.property(&object, "map").unwrap().is_null());
    }

    #[test]
    fn test_info_box_opens_at_position() {
        let (api, map) = setup();
        let info_box = Mounted::<InfoBox>::mount(
            &map,
            InfoBoxProps {
                position: Some(LatLng::new(7.0, 8.0)),
                visible: Some(true),
                ..InfoBoxProps::default()
            },
        )
        .unwrap();
        let object = info_box.instance().object();

        assert_eq!(info_box.instance().position().unwrap(), Some(LatLng::new(7.0, 8.0)));
        assert_eq!(api.calls_to(&object, "open"), vec![vec![NativeValue::Object(map.object())]]);
    }
}
