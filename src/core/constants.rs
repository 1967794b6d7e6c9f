//! Constants shared by the loader configuration and the native backends.
//! Keeping them in a single place makes the native naming easy to audit.

/// Bootstrap endpoint of the Maps JavaScript API.
pub const MAPS_SCRIPT_BASE_URL: &str = "https://maps.googleapis.com/maps/api/js";

/// Global callback the bootstrap script invokes once the API is ready.
pub const DEFAULT_LOADER_CALLBACK: &str = "__mapbridgeInit";

/// Global namespace every built-in native class lives under.
pub const NATIVE_NAMESPACE: &str = "google.maps";

/// Where the InfoBox add-on registers its constructor by default.
pub const DEFAULT_INFOBOX_CONSTRUCTOR: &str = "InfoBox";

/// Default zoom used when a map is created without one.
pub const DEFAULT_ZOOM: f64 = 8.0;
