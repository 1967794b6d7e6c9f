pub mod callback;
pub mod events;

pub use callback::Callback;
pub use events::{
    DataFeatureEvent, DataGeometryEvent, DataMouseEvent, DataPropertyEvent, FromNativeEvent,
    MapMouseEvent, NativeEvent, OverlayCompleteEvent,
};
