use serde::{Deserialize, Serialize};

/// Mean earth radius used by the native geometry library, in meters
const EARTH_RADIUS: f64 = 6378137.0;

/// A position in degrees
///
/// Serializes to the `{ "lat": .., "lng": .. }` literal accepted by every
/// native setter that takes a position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Latitude within [-90, 90] and longitude within [-180, 180]
    pub fn is_valid(&self) -> bool {
        self.lat >= -90.0 && self.lat <= 90.0 && self.lng >= -180.0 && self.lng <= 180.0
    }

    /// Great-circle distance in meters
    pub fn distance_to(&self, other: &LatLng) -> f64 {
        let lat1_rad = self.lat.to_radians();
        let lat2_rad = other.lat.to_radians();
        let delta_lat = (other.lat - self.lat).to_radians();
        let delta_lng = (other.lng - self.lng).to_radians();

        let a = (delta_lat / 2.0).sin().powi(2)
            + lat1_rad.cos() * lat2_rad.cos() * (delta_lng / 2.0).sin().powi(2);
        let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

        EARTH_RADIUS * c
    }

    /// Reads a `{ "lat": .., "lng": .. }` literal
    pub fn from_literal(value: &serde_json::Value) -> Option<Self> {
        let lat = value.get("lat")?.as_f64()?;
        let lng = value.get("lng")?.as_f64()?;
        Some(Self::new(lat, lng))
    }
}

impl Default for LatLng {
    fn default() -> Self {
        Self::new(0.0, 0.0)
    }
}

impl From<(f64, f64)> for LatLng {
    fn from((lat, lng): (f64, f64)) -> Self {
        Self::new(lat, lng)
    }
}

/// A pixel offset, as used by marker icons and labels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl Default for Point {
    fn default() -> Self {
        Self::new(0.0, 0.0)
    }
}

/// A south-west / north-east box
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLngBounds {
    pub south_west: LatLng,
    pub north_east: LatLng,
}

impl LatLngBounds {
    pub fn new(south_west: LatLng, north_east: LatLng) -> Self {
        Self {
            south_west,
            north_east,
        }
    }

    pub fn from_coords(south: f64, west: f64, north: f64, east: f64) -> Self {
        Self::new(LatLng::new(south, west), LatLng::new(north, east))
    }

    pub fn south(&self) -> f64 {
        self.south_west.lat
    }

    pub fn west(&self) -> f64 {
        self.south_west.lng
    }

    pub fn north(&self) -> f64 {
        self.north_east.lat
    }

    pub fn east(&self) -> f64 {
        self.north_east.lng
    }

    /// Inclusive on every edge
    pub fn contains(&self, point: &LatLng) -> bool {
        point.lat >= self.south_west.lat
            && point.lat <= self.north_east.lat
            && point.lng >= self.south_west.lng
            && point.lng <= self.north_east.lng
    }

    /// Grows the box until it covers `point`
    pub fn extend(&mut self, point: &LatLng) {
        self.south_west.lat = self.south_west.lat.min(point.lat);
        self.south_west.lng = self.south_west.lng.min(point.lng);
        self.north_east.lat = self.north_east.lat.max(point.lat);
        self.north_east.lng = self.north_east.lng.max(point.lng);
    }

    pub fn center(&self) -> LatLng {
        LatLng::new(
            (self.south_west.lat + self.north_east.lat) / 2.0,
            (self.south_west.lng + self.north_east.lng) / 2.0,
        )
    }

    /// Smallest bounds containing every point, or `None` for an empty path
    pub fn from_points<'a, I>(points: I) -> Option<LatLngBounds>
    where
        I: IntoIterator<Item = &'a LatLng>,
    {
        let mut iter = points.into_iter();
        let first = *iter.next()?;
        let mut bounds = LatLngBounds::new(first, first);
        for point in iter {
            bounds.extend(point);
        }
        Some(bounds)
    }

    /// The `{ south, west, north, east }` literal the native API expects
    pub fn to_literal(&self) -> serde_json::Value {
        serde_json::json!({
            "south": self.south(),
            "west": self.west(),
            "north": self.north(),
            "east": self.east(),
        })
    }

    /// Reads a `{ south, west, north, east }` literal
    pub fn from_literal(value: &serde_json::Value) -> Option<Self> {
        Some(Self::from_coords(
            value.get("south")?.as_f64()?,
            value.get("west")?.as_f64()?,
            value.get("north")?.as_f64()?,
            value.get("east")?.as_f64()?,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lat_lng_creation() {
        let coord = LatLng::new(40.7128, -74.0060);
        assert_eq!(coord.lat, 40.7128);
        assert_eq!(coord.lng, -74.0060);
        assert!(coord.is_valid());
        assert!(!LatLng::new(91.0, 0.0).is_valid());
    }

    #[test]
    fn test_lat_lng_distance() {
        let nyc = LatLng::new(40.7128, -74.0060);
        let la = LatLng::new(34.0522, -118.2437);
        let distance = nyc.distance_to(&la);

        // Distance should be approximately 3944 km
        assert!((distance - 3944000.0).abs() < 10000.0);
    }

    #[test]
    fn test_lat_lng_literal() {
        let coord = LatLng::new(1.5, -2.5);
        let json = serde_json::to_value(coord).unwrap();
        assert_eq!(json, serde_json::json!({ "lat": 1.5, "lng": -2.5 }));
        assert_eq!(LatLng::from_literal(&json), Some(coord));
        assert_eq!(LatLng::from_literal(&serde_json::json!({ "lat": 1.0 })), None);
    }

    #[test]
    fn test_bounds_contains() {
        let bounds = LatLngBounds::from_coords(40.0, -75.0, 41.0, -73.0);
        let point_inside = LatLng::new(40.5, -74.0);
        let point_outside = LatLng::new(42.0, -74.0);

        assert!(bounds.contains(&point_inside));
        assert!(!bounds.contains(&point_outside));
    }

    #[test]
    fn test_bounds_literal_round_trip() {
        let bounds = LatLngBounds::from_coords(1.0, 2.0, 3.0, 4.0);
        let literal = bounds.to_literal();
        assert_eq!(literal["south"], 1.0);
        assert_eq!(literal["east"], 4.0);
        assert_eq!(LatLngBounds::from_literal(&literal), Some(bounds));
    }

    #[test]
    fn test_bounds_from_points() {
        let path = [
            LatLng::new(1.0, 5.0),
            LatLng::new(-2.0, 3.0),
            LatLng::new(4.0, -1.0),
        ];
        let bounds = LatLngBounds::from_points(&path).unwrap();
        assert_eq!(bounds, LatLngBounds::from_coords(-2.0, -1.0, 4.0, 5.0));
        assert_eq!(LatLngBounds::from_points(&[]), None);
    }
}
