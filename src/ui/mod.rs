//! Popup overlays: the built-in info window and the InfoBox add-on
//!
//! Both open on the map at mount time, either on an anchor (usually a
//! marker) or at their own position, and close on unmount.

pub mod info_box;
pub mod info_window;

use crate::{
    core::map::MapHandle,
    layers::marker::Anchor,
    native::NativeObject,
    MapError, Result,
};

/// Opens a popup on `anchor`, or at its own position when there is none
pub(crate) fn open_popup(
    native: &NativeObject,
    name: &'static str,
    map: &MapHandle,
    anchor: Option<Anchor>,
) -> Result<()> {
    let args = match anchor {
        Some(anchor) => vec![map.object().into(), anchor.into()],
        None if has_position(native)? => vec![map.object().into()],
        None => return Err(MapError::MissingAnchorOrPosition(name)),
    };
    native.call("open", &args).map(|_| ())
}

/// Closes and reopens the popup when its anchor changed
pub(crate) fn reopen_on_anchor_change(
    native: &NativeObject,
    name: &'static str,
    map: &MapHandle,
    prev: Option<Anchor>,
    next: Option<Anchor>,
) -> Result<()> {
    if prev == next {
        return Ok(());
    }
    log::debug!("<{}> {} anchor changed, reopening", name, native.object().id);
    native.call("close", &[])?;
    open_popup(native, name, map, next)
}

fn has_position(native: &NativeObject) -> Result<bool> {
    Ok(!native.get("getPosition")?.is_null())
}
