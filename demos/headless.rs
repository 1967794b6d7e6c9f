use mapbridge::prelude::*;

/// Drives a few overlays against the in-memory backend and prints what the
/// native side saw
fn main() -> anyhow::Result<()> {
    mapbridge::init_logging();

    println!("mapbridge headless example");
    println!("==========================");

    let loader = LoaderOptions::new("demo-key").with_library(Library::Drawing);
    println!("Script URL: {}", loader.script_url(mapbridge::constants::DEFAULT_LOADER_CALLBACK));

    let api = HeadlessMaps::new(&loader);
    let center = LatLng::new(37.7749, -122.4194); // San Francisco
    let map = MapHandle::create(api.clone(), MapOptions::new(center, 12.0))?;

    let mut marker = Mounted::<Marker>::mount(
        &map,
        MarkerProps {
            position: Some(center),
            title: Some("Ferry Building".to_string()),
            on_click: Some(Callback::new(|event: MapMouseEvent| {
                println!("Marker clicked at {:?}", event.lat_lng)
            })),
            ..MarkerProps::default()
        },
    )?;

    let window = Mounted::<InfoWindow>::mount(
        &map,
        InfoWindowProps {
            anchor: Some(marker.instance().anchor()),
            content: Some("<strong>Ferry Building</strong>".to_string()),
            ..InfoWindowProps::default()
        },
    )?;

    let moved = LatLng::new(37.7955, -122.3937);
    marker.update(MarkerProps {
        position: Some(moved),
        ..marker.props().clone()
    })?;

    let object = marker.instance().object();
    api.fire(&object, "click", NativeEvent::Mouse(MapMouseEvent::at(moved)));

    let circle = Mounted::<Circle>::mount(
        &map,
        CircleProps {
            center: Some(moved),
            radius: Some(250.0),
            ..CircleProps::default()
        },
    )?;
    if let Some(bounds) = circle.instance().bounds()? {
        map.fit_bounds(bounds)?;
    }

    let data = Mounted::<Data>::mount(
        &map,
        DataProps {
            add_geo_json: Some(GeoJson::from_str(
                r#"{"type":"FeatureCollection","features":[
                    {"type":"Feature","geometry":{"type":"Point","coordinates":[-122.41,37.78]},"properties":{}}
                ]}"#,
            )?),
            style: Some(DataStyle::fill("#3388ff", 0.4)),
            ..DataProps::default()
        },
    )?;

    println!("Native calls:");
    for call in api.calls() {
        println!("  {} {}.{}({} arg(s))", call.target.class, call.target.id, call.method, call.args.len());
    }
    println!("Live listeners: {}", api.total_listeners());

    data.unmount()?;
    circle.unmount()?;
    window.unmount()?;
    marker.unmount()?;
    println!("Live listeners after unmount: {}", api.total_listeners());

    Ok(())
}
