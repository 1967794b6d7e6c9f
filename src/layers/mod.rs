pub mod macros;

pub mod base;
pub mod circle;
pub mod marker;
pub mod polygon;
pub mod polyline;
pub mod rectangle;
pub mod shape;
