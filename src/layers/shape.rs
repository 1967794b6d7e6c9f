//! Accessors shared by the vector shapes (circle, polygon, polyline,
//! rectangle)

use serde_json::Value;

use crate::{
    core::geo::LatLng,
    layers::base::NativeInstance,
    native::NativeValue,
    Result,
};

/// Native accessors every shape supports
pub trait Shape: NativeInstance {
    fn set_draggable(&self, draggable: bool) -> Result<()> {
        self.native().invoke("setDraggable", draggable)
    }

    fn set_editable(&self, editable: bool) -> Result<()> {
        self.native().invoke("setEditable", editable)
    }

    fn set_visible(&self, visible: bool) -> Result<()> {
        self.native().invoke("setVisible", visible)
    }

    fn set_options(&self, options: Value) -> Result<()> {
        self.native().set_options(&options)
    }

    fn draggable(&self) -> Result<bool> {
        Ok(self.native().get("getDraggable")?.as_bool().unwrap_or(false))
    }

    fn editable(&self) -> Result<bool> {
        Ok(self.native().get("getEditable")?.as_bool().unwrap_or(false))
    }

    /// Shapes are visible unless hidden explicitly
    fn visible(&self) -> Result<bool> {
        Ok(self.native().get("getVisible")?.as_bool().unwrap_or(true))
    }
}

pub(crate) fn path_value(path: &[LatLng]) -> NativeValue {
    NativeValue::List(path.iter().copied().map(NativeValue::LatLng).collect())
}

pub(crate) fn paths_value(paths: &[Vec<LatLng>]) -> NativeValue {
    NativeValue::List(paths.iter().map(|path| path_value(path)).collect())
}

/// Reads a path back, skipping entries that are not positions
pub(crate) fn path_from_value(value: &NativeValue) -> Vec<LatLng> {
    match value {
        NativeValue::List(items) => items.iter().filter_map(NativeValue::as_lat_lng).collect(),
        NativeValue::Json(Value::Array(items)) => {
            items.iter().filter_map(LatLng::from_literal).collect()
        }
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_conversion() {
        let path = vec![LatLng::new(0.0, 0.0), LatLng::new(1.0, 1.0)];
        assert_eq!(path_from_value(&path_value(&path)), path);

        let literal = NativeValue::from(serde_json::json!([
            { "lat": 2.0, "lng": 3.0 },
            "not a point"
        ]));
        assert_eq!(path_from_value(&literal), vec![LatLng::new(2.0, 3.0)]);
        assert!(path_from_value(&NativeValue::Null).is_empty());
    }

    #[test]
    fn test_paths_value_nests() {
        let paths = vec![vec![LatLng::new(0.0, 0.0)], vec![]];
        match paths_value(&paths) {
            NativeValue::List(rings) => {
                assert_eq!(rings.len(), 2);
                assert_eq!(rings[1], NativeValue::List(Vec::new()));
            }
            other => panic!("unexpected {:?}", other),
        }
    }
}
