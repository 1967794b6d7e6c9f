//! Macros to reduce boilerplate in overlay implementations
//!
//! Every overlay declares the same two tables and wraps a native object the
//! same way; these macros generate those pieces from field and method names.

/// Builds one [`Updater`](crate::bridge::Updater) entry
///
/// `updater!(radius => set_radius)` watches the `radius` prop and, when it
/// changed, calls `instance.set_radius(value)` with an owned copy of the new
/// value.
///
/// Usage:
/// ```rust,ignore
/// const UPDATERS: &'static [Updater<CircleProps, Circle>] = &[
///     updater!(center => set_center),
///     updater!(radius => set_radius),
/// ];
/// ```
#[macro_export]
macro_rules! updater {
    ($field:ident => $setter:ident) => {
        $crate::bridge::Updater {
            prop: stringify!($field),
            apply: |instance, prev, next| {
                match $crate::bridge::changed(&prev.$field, &next.$field) {
                    Some(value) => instance.$setter(value.clone()).map(|_| true),
                    None => Ok(false),
                }
            },
        }
    };
}

/// Builds one [`EventBinding`](crate::bridge::EventBinding) entry
///
/// `event_binding!(on_click => "click")` listens to the native `click` event
/// whenever the `on_click` callback prop is set.
#[macro_export]
macro_rules! event_binding {
    ($field:ident => $event:literal) => {
        $crate::bridge::EventBinding {
            prop: stringify!($field),
            event: $event,
            handler: |props, api| {
                props
                    .$field
                    .as_ref()
                    .map(|callback| callback.to_native_handler(api, $event))
            },
        }
    };
}

/// Declares a typed wrapper around a [`NativeObject`](crate::native::NativeObject)
///
/// This generates:
/// - the wrapper struct with `Clone`, `Debug` and `PartialEq`
/// - `NativeInstance`, so the bridge can reach the native object
/// - `FromNativeEvent`, so drawing callbacks can receive the typed wrapper
/// - `anchor()`, for handing the object to info windows
#[macro_export]
macro_rules! native_object {
    ($(#[$meta:meta])* $name:ident, $class:expr) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq)]
        pub struct $name {
            native: $crate::native::NativeObject,
        }

        impl $name {
            pub(crate) fn from_native(native: $crate::native::NativeObject) -> Self {
                Self { native }
            }

            /// The native object behind this wrapper
            pub fn object(&self) -> $crate::native::ObjectRef {
                self.native.object()
            }

            /// This object as an info window anchor
            pub fn anchor(&self) -> $crate::layers::marker::Anchor {
                $crate::layers::marker::Anchor::new(self.native.object())
            }
        }

        impl $crate::layers::base::NativeInstance for $name {
            fn native(&self) -> &$crate::native::NativeObject {
                &self.native
            }
        }

        impl $crate::input::events::FromNativeEvent for $name {
            fn from_native(
                event: &$crate::input::events::NativeEvent,
                api: &std::rc::Rc<dyn $crate::native::MapsApi>,
            ) -> Option<Self> {
                match event {
                    $crate::input::events::NativeEvent::Overlay(object) if object.class == $class => {
                        Some(Self::from_native($crate::native::NativeObject::new(api.clone(), *object)))
                    }
                    _ => None,
                }
            }
        }
    };
}
