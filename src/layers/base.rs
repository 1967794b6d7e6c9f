//! Overlay lifecycle shared by every component
//!
//! An [`Overlay`] supplies its native construction, its two static tables and
//! a few hooks. [`Mounted`] drives the rest: it owns the native instance, the
//! last props snapshot and the currently registered listeners.

use log::{debug, warn};

use crate::{
    bridge::{apply_updaters, register_events, EventBinding, RegisteredEvents, Updater},
    core::map::MapHandle,
    input::callback::Callback,
    native::{NativeClass, NativeObject, NativeOptions, ObjectRef},
    Result,
};

/// Creates a native object already attached to `map`, seeded with the free-form
/// `options` prop
pub(crate) fn create_on_map(
    map: &MapHandle,
    class: NativeClass,
    options: Option<&serde_json::Value>,
) -> Result<NativeObject> {
    let options = NativeOptions::from_json(options)?.set("map", map.object());
    NativeObject::create(map.api(), class, options)
}

/// Anything backed by a single native object
pub trait NativeInstance {
    fn native(&self) -> &NativeObject;

    fn object_ref(&self) -> ObjectRef {
        self.native().object()
    }
}

/// A declarative wrapper around one native class
pub trait Overlay: NativeInstance + Clone + Sized + 'static {
    type Props: Clone + Default + 'static;

    /// Component name used in logs and precondition errors
    const NAME: &'static str;

    /// Watched props, in application order
    const UPDATERS: &'static [Updater<Self::Props, Self>];

    /// Callback props and the native events they listen to
    const EVENTS: &'static [EventBinding<Self::Props>];

    /// Instantiates the native object from the initial props
    fn construct(map: &MapHandle, props: &Self::Props) -> Result<Self>;

    fn on_load(props: &Self::Props) -> Option<&Callback<Self>>;

    fn on_unmount(props: &Self::Props) -> Option<&Callback<Self>>;

    /// Runs once the initial props have been applied
    fn after_mount(&self, _map: &MapHandle, _props: &Self::Props) -> Result<()> {
        Ok(())
    }

    /// Runs after every update pass
    fn after_update(&self, _map: &MapHandle, _prev: &Self::Props, _next: &Self::Props) -> Result<()> {
        Ok(())
    }

    /// Removes the native object from wherever `construct` placed it
    ///
    /// `attached` is the props snapshot the object was constructed with, not
    /// the latest one.
    fn detach(&self, _attached: &Self::Props) -> Result<()> {
        self.native().set_map(None)
    }
}

/// A mounted overlay
///
/// Dropping it unmounts the overlay, logging rather than returning any
/// teardown error.
pub struct Mounted<O: Overlay> {
    map: MapHandle,
    instance: O,
    props: O::Props,
    /// Props at construction time; decides how the object is detached
    attached: O::Props,
    events: RegisteredEvents,
    active: bool,
}

impl<O: Overlay> Mounted<O> {
    /// Constructs the native object and applies `props` to it
    ///
    /// If any step after construction fails the object is detached and
    /// released again before the error is returned; `on_unmount` is not
    /// called in that case.
    pub fn mount(map: &MapHandle, props: O::Props) -> Result<Self> {
        let instance = O::construct(map, &props)?;
        let mut mounted = Self {
            map: map.clone(),
            instance,
            props: O::Props::default(),
            attached: props.clone(),
            events: RegisteredEvents::default(),
            active: true,
        };

        if let Err(err) = mounted.sync(props) {
            mounted.abort();
            return Err(err);
        }
        if let Err(err) = mounted.instance.after_mount(map, &mounted.props) {
            mounted.abort();
            return Err(err);
        }

        debug!(
            "Mounted <{}> as {} with {} listener(s)",
            O::NAME,
            mounted.instance.object_ref().id,
            mounted.events.len()
        );

        if let Some(on_load) = O::on_load(&mounted.props) {
            on_load.emit(mounted.instance.clone());
        }

        Ok(mounted)
    }

    /// Applies a new props snapshot
    ///
    /// Listeners are always re-registered against `next`, even when a setter
    /// failed; the failing setter's error is returned afterwards.
    pub fn update(&mut self, next: O::Props) -> Result<()> {
        let prev = self.sync(next)?;
        self.instance.after_update(&self.map, &prev, &self.props)
    }

    /// Runs `on_unmount`, drops every listener and detaches the native object
    pub fn unmount(mut self) -> Result<()> {
        self.teardown()
    }

    pub fn instance(&self) -> &O {
        &self.instance
    }

    pub fn props(&self) -> &O::Props {
        &self.props
    }

    pub fn map(&self) -> &MapHandle {
        &self.map
    }

    /// Number of native listeners currently registered
    pub fn listener_count(&self) -> usize {
        self.events.len()
    }

    /// One synchronization pass; returns the replaced snapshot
    fn sync(&mut self, next: O::Props) -> Result<O::Props> {
        self.events.unregister();

        let applied = apply_updaters(O::UPDATERS, &self.props, &next, &self.instance);
        let registered = register_events(O::EVENTS, &next, self.instance.native());
        let prev = std::mem::replace(&mut self.props, next);

        self.events = registered?;
        let applied = applied?;

        debug!(
            "Synced <{}> {}: {} setter(s), {} listener(s)",
            O::NAME,
            self.instance.object_ref().id,
            applied,
            self.events.len()
        );
        Ok(prev)
    }

    fn abort(&mut self) {
        self.active = false;
        self.events.unregister();
        if let Err(err) = self.instance.detach(&self.attached) {
            warn!("Failed to detach <{}> after a failed mount: {}", O::NAME, err);
        }
        self.instance.native().release();
    }

    fn teardown(&mut self) -> Result<()> {
        if !self.active {
            return Ok(());
        }
        self.active = false;

        if let Some(on_unmount) = O::on_unmount(&self.props) {
            on_unmount.emit(self.instance.clone());
        }

        self.events.unregister();
        let detached = self.instance.detach(&self.attached);
        self.instance.native().release();

        debug!("Unmounted <{}> {}", O::NAME, self.instance.object_ref().id);
        detached
    }
}

impl<O: Overlay> Drop for Mounted<O> {
    fn drop(&mut self) {
        if let Err(err) = self.teardown() {
            warn!("Failed to unmount <{}>: {}", O::NAME, err);
        }
    }
}

impl<O: Overlay + std::fmt::Debug> std::fmt::Debug for Mounted<O> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Mounted")
            .field("instance", &self.instance)
            .field("events", &self.events)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::RefCell, rc::Rc};

    use super::*;
    use crate::{
        core::{geo::LatLng, map::MapOptions},
        layers::circle::{Circle, CircleProps},
        native::{headless::HeadlessMaps, NativeValue},
        MapError,
    };

    fn journal() -> (Rc<RefCell<Vec<&'static str>>>, CircleProps) {
        let log = Rc::new(RefCell::new(Vec::new()));
        let (loaded, unmounted) = (log.clone(), log.clone());
        let props = CircleProps {
            radius: Some(10.0),
            on_load: Some(Callback::new(move |_: Circle| loaded.borrow_mut().push("load"))),
            on_unmount: Some(Callback::new(move |_: Circle| {
                unmounted.borrow_mut().push("unmount")
            })),
            ..CircleProps::default()
        };
        (log, props)
    }

    #[test]
    fn test_on_load_sees_applied_props() {
        let api = HeadlessMaps::with_libraries(&[]);
        let map = MapHandle::create(api.clone(), MapOptions::default()).unwrap();
        let seen = Rc::new(RefCell::new(None));
        let sink = seen.clone();

        let circle = Mounted::<Circle>::mount(
            &map,
            CircleProps {
                center: Some(LatLng::new(1.0, 1.0)),
                on_load: Some(Callback::new(move |circle: Circle| {
                    *sink.borrow_mut() = circle.center().unwrap()
                })),
                ..CircleProps::default()
            },
        )
        .unwrap();

        assert_eq!(*seen.borrow(), Some(LatLng::new(1.0, 1.0)));
        assert_eq!(circle.map(), &map);
        assert_eq!(
            api.constructed_with(&circle.instance().object()).unwrap().get("map"),
            Some(&NativeValue::Object(map.object()))
        );
    }

    #[test]
    fn test_failed_mount_skips_on_unmount() {
        let api = HeadlessMaps::with_libraries(&[]);
        let map = MapHandle::create(api.clone(), MapOptions::default()).unwrap();
        let (log, props) = journal();

        api.fail_on("setRadius");
        let result = Mounted::<Circle>::mount(&map, props);

        assert!(matches!(result, Err(MapError::Native(_))));
        assert!(log.borrow().is_empty());
        let circle = api.objects_of(NativeClass::Circle)[0];
        assert!(api.is_released(&circle));
        assert_eq!(api.total_listeners(), 0);
    }

    #[test]
    fn test_teardown_runs_once() {
        let api = HeadlessMaps::with_libraries(&[]);
        let map = MapHandle::create(api.clone(), MapOptions::default()).unwrap();
        let (log, props) = journal();

        let circle = Mounted::<Circle>::mount(&map, props).unwrap();
        let object = circle.instance().object();
        circle.unmount().unwrap();

        assert_eq!(*log.borrow(), vec!["load", "unmount"]);
        assert_eq!(api.calls_to(&object, "setMap"), vec![vec![NativeValue::Null]]);
    }

    #[test]
    fn test_detach_error_surfaces_from_unmount() {
        let api = HeadlessMaps::with_libraries(&[]);
        let map = MapHandle::create(api.clone(), MapOptions::default()).unwrap();
        let (_, props) = journal();

        let circle = Mounted::<Circle>::mount(&map, props).unwrap();
        let object = circle.instance().object();
        api.fail_on("setMap");

        assert!(matches!(circle.unmount(), Err(MapError::Native(_))));
        assert!(api.is_released(&object));
    }
}
