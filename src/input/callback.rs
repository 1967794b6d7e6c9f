use std::{fmt, rc::Rc};

use crate::{
    input::events::{FromNativeEvent, NativeEvent},
    native::{MapsApi, NativeHandler},
};

/// A callback prop
///
/// Two callbacks are equal only when they share the same closure, so cloning a
/// callback keeps it equal while wrapping the same logic in a new closure
/// does not.
pub struct Callback<IN> {
    cb: Rc<dyn Fn(IN)>,
}

impl<IN> Callback<IN> {
    pub fn new(f: impl Fn(IN) + 'static) -> Self {
        Self { cb: Rc::new(f) }
    }

    pub fn emit(&self, value: IN) {
        (self.cb)(value)
    }
}

impl<IN: FromNativeEvent + 'static> Callback<IN> {
    /// Wraps the callback as a native listener for `event`
    ///
    /// The handler keeps only a weak reference to the backend, so a listener
    /// that outlives its backend turns into a no-op.
    pub fn to_native_handler(&self, api: &Rc<dyn MapsApi>, event: &'static str) -> NativeHandler {
        let callback = self.clone();
        let api = Rc::downgrade(api);
        Rc::new(move |native: &NativeEvent| {
            let Some(api) = api.upgrade() else {
                return;
            };
            match IN::from_native(native, &api) {
                Some(value) => callback.emit(value),
                None => log::warn!("Ignoring `{}` event with unexpected payload {:?}", event, native),
            }
        })
    }
}

impl<IN, F: Fn(IN) + 'static> From<F> for Callback<IN> {
    fn from(f: F) -> Self {
        Self::new(f)
    }
}

impl<IN> Clone for Callback<IN> {
    fn clone(&self) -> Self {
        Self {
            cb: self.cb.clone(),
        }
    }
}

#[allow(clippy::vtable_address_comparisons)]
impl<IN> PartialEq for Callback<IN> {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.cb, &other.cb)
    }
}

impl<IN> fmt::Debug for Callback<IN> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Callback<_>")
    }
}
