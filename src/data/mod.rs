pub mod geojson;
pub mod layer;
