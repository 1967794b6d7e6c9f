//! Prop synchronization between an overlay's props and its native object
//!
//! Each overlay type declares two static tables:
//!
//! - an updater table, one [`Updater`] per watched prop, each calling exactly
//!   one native setter when that prop changed between two snapshots;
//! - an event table, one [`EventBinding`] per callback prop, naming the native
//!   event the callback listens to.
//!
//! The tables are built with [`updater!`](crate::updater) and
//! [`event_binding!`](crate::event_binding) and are applied in declaration
//! order. Listeners are never diffed: every synchronization pass releases the
//! previous [`RegisteredEvents`] and registers the current callbacks afresh,
//! which keeps at most one live listener per (object, event).

use std::{fmt, rc::Rc};

use crate::{
    layers::base::NativeInstance,
    native::{ListenerId, MapsApi, NativeHandler, NativeObject},
    Result,
};

/// One entry of an updater table
pub struct Updater<P, I> {
    /// Name of the watched prop
    pub prop: &'static str,
    /// Calls the setter if the prop changed; reports whether it did
    pub apply: fn(&I, &P, &P) -> Result<bool>,
}

impl<P, I> fmt::Debug for Updater<P, I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Updater").field("prop", &self.prop).finish()
    }
}

/// One entry of an event table
pub struct EventBinding<P> {
    /// Name of the callback prop
    pub prop: &'static str,
    /// Native event name
    pub event: &'static str,
    /// Builds the native handler if the callback prop is set
    pub handler: fn(&P, &Rc<dyn MapsApi>) -> Option<NativeHandler>,
}

impl<P> fmt::Debug for EventBinding<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBinding")
            .field("prop", &self.prop)
            .field("event", &self.event)
            .finish()
    }
}

/// The value to hand to a setter: `next` when it is present and differs
/// from `prev`
pub fn changed<'a, T: PartialEq>(prev: &Option<T>, next: &'a Option<T>) -> Option<&'a T> {
    match next {
        Some(value) if prev.as_ref() != Some(value) => Some(value),
        _ => None,
    }
}

/// Runs every updater in table order and returns how many setters fired
///
/// The first failing setter aborts the pass; setters already called are not
/// undone.
pub fn apply_updaters<P, I>(updaters: &[Updater<P, I>], prev: &P, next: &P, instance: &I) -> Result<usize> {
    let mut applied = 0;
    for updater in updaters {
        if (updater.apply)(instance, prev, next)? {
            applied += 1;
        }
    }
    Ok(applied)
}

/// Attaches every callback prop that is set
pub fn register_events<P>(
    events: &[EventBinding<P>],
    props: &P,
    target: &NativeObject,
) -> Result<RegisteredEvents> {
    let mut registered = RegisteredEvents::new(target.api().clone());
    for binding in events {
        if let Some(handler) = (binding.handler)(props, target.api()) {
            let listener = target.add_listener(binding.event, handler)?;
            registered.handles.push(listener);
        }
    }
    Ok(registered)
}

/// Listener handles owned by one mounted overlay
///
/// Dropping the set releases any handle still registered.
#[derive(Default)]
pub struct RegisteredEvents {
    api: Option<Rc<dyn MapsApi>>,
    handles: Vec<ListenerId>,
}

impl RegisteredEvents {
    pub fn new(api: Rc<dyn MapsApi>) -> Self {
        Self {
            api: Some(api),
            handles: Vec::new(),
        }
    }

    pub fn handles(&self) -> &[ListenerId] {
        &self.handles
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Releases every handle; calling it again is a no-op
    pub fn unregister(&mut self) {
        let Some(api) = &self.api else {
            return;
        };
        for listener in self.handles.drain(..) {
            api.remove_listener(listener);
        }
    }
}

impl Drop for RegisteredEvents {
    fn drop(&mut self) {
        self.unregister();
    }
}

impl fmt::Debug for RegisteredEvents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisteredEvents")
            .field("handles", &self.handles)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        input::callback::Callback,
        native::{headless::HeadlessMaps, NativeClass, NativeOptions, NativeValue},
        MapError,
    };

    #[derive(Clone, Default)]
    struct Props {
        radius: Option<f64>,
        title: Option<String>,
        on_click: Option<Callback<()>>,
        on_title_changed: Option<Callback<()>>,
    }

    #[derive(Clone)]
    struct Stub {
        native: NativeObject,
    }

    impl NativeInstance for Stub {
        fn native(&self) -> &NativeObject {
            &self.native
        }
    }

    impl Stub {
        fn set_radius(&self, radius: f64) -> Result<()> {
            self.native.invoke("setRadius", radius)
        }

        fn set_title(&self, title: String) -> Result<()> {
            self.native.invoke("setTitle", title)
        }
    }

    const UPDATERS: &[Updater<Props, Stub>] = &[
        crate::updater!(radius => set_radius),
        crate::updater!(title => set_title),
    ];

    const EVENTS: &[EventBinding<Props>] = &[
        crate::event_binding!(on_click => "click"),
        crate::event_binding!(on_title_changed => "title_changed"),
    ];

    fn stub() -> (Rc<HeadlessMaps>, Stub) {
        let api = HeadlessMaps::with_libraries(&[]);
        let shared: Rc<dyn MapsApi> = api.clone();
        let native = NativeObject::create(&shared, NativeClass::Circle, NativeOptions::new()).unwrap();
        (api, Stub { native })
    }

    #[test]
    fn test_changed() {
        assert_eq!(changed(&None, &Some(1)), Some(&1));
        assert_eq!(changed(&Some(1), &Some(1)), None);
        assert_eq!(changed(&Some(1), &Some(2)), Some(&2));
        assert_eq!(changed::<i32>(&Some(1), &None), None);
    }

    #[test]
    fn test_only_changed_props_are_applied() {
        let (api, stub) = stub();
        let prev = Props {
            radius: Some(1.0),
            title: Some("a".to_string()),
            ..Props::default()
        };
        let next = Props {
            title: Some("b".to_string()),
            ..prev.clone()
        };

        let applied = apply_updaters(UPDATERS, &prev, &next, &stub).unwrap();

        assert_eq!(applied, 1);
        let calls = api.calls_on(&stub.native.object());
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].method, "setTitle");
        assert_eq!(calls[0].args, vec![NativeValue::from("b")]);
    }

    #[test]
    fn test_absent_props_are_never_reset() {
        let (api, stub) = stub();
        let prev = Props {
            radius: Some(1.0),
            ..Props::default()
        };

        let applied = apply_updaters(UPDATERS, &prev, &Props::default(), &stub).unwrap();

        assert_eq!(applied, 0);
        assert!(api.calls_on(&stub.native.object()).is_empty());
    }

    #[test]
    fn test_updaters_run_in_table_order_and_stop_on_error() {
        let (api, stub) = stub();
        let next = Props {
            radius: Some(5.0),
            title: Some("t".to_string()),
            ..Props::default()
        };

        apply_updaters(UPDATERS, &Props::default(), &next, &stub).unwrap();
        let methods: Vec<String> = api
            .calls_on(&stub.native.object())
            .into_iter()
            .map(|call| call.method)
            .collect();
        assert_eq!(methods, vec!["setRadius", "setTitle"]);

        api.clear_calls();
        api.fail_on("setRadius");
        let result = apply_updaters(UPDATERS, &Props::default(), &next, &stub);
        assert!(matches!(result, Err(MapError::Native(_))));
        assert!(api.calls_to(&stub.native.object(), "setTitle").is_empty());
    }

    #[test]
    fn test_register_only_set_callbacks() {
        let (api, stub) = stub();
        let props = Props {
            on_click: Some(Callback::new(|_| {})),
            ..Props::default()
        };

        let registered = register_events(EVENTS, &props, &stub.native).unwrap();

        assert_eq!(registered.len(), 1);
        assert_eq!(api.listener_count(&stub.native.object(), "click"), 1);
        assert_eq!(api.listener_count(&stub.native.object(), "title_changed"), 0);
    }

    #[test]
    fn test_unregister_is_idempotent_and_runs_on_drop() {
        let (api, stub) = stub();
        let props = Props {
            on_click: Some(Callback::new(|_| {})),
            on_title_changed: Some(Callback::new(|_| {})),
            ..Props::default()
        };

        let mut registered = register_events(EVENTS, &props, &stub.native).unwrap();
        assert_eq!(api.live_listeners(&stub.native.object()), 2);

        registered.unregister();
        registered.unregister();
        assert!(registered.is_empty());
        assert_eq!(api.live_listeners(&stub.native.object()), 0);

        let registered = register_events(EVENTS, &props, &stub.native).unwrap();
        assert_eq!(api.live_listeners(&stub.native.object()), 2);
        drop(registered);
        assert_eq!(api.live_listeners(&stub.native.object()), 0);

        RegisteredEvents::default().unregister();
    }
}
