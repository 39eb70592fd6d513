use geo::{Distance, Haversine, Point};

use crate::error::FetchError;

/// Degrees added on each side of the property's point.
pub const BBOX_MARGIN_DEG: f64 = 0.002;
/// Ground sampling distance in metres per pixel.
pub const RESOLUTION_M: f64 = 10.0;

/// Rectangle in WGS84 degrees, longitude/latitude order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub west: f64,
    pub south: f64,
    pub east: f64,
    pub north: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageSize {
    pub width: u32,
    pub height: u32,
}

impl BoundingBox {
    pub fn around(lat: f64, lon: f64) -> Result<BoundingBox, FetchError> {
        if !lat.is_finite()
            || !lon.is_finite()
            || !(-90.0..=90.0).contains(&lat)
            || !(-180.0..=180.0).contains(&lon)
        {
            return Err(FetchError::InvalidCoordinates { lat, lon });
        }
        Ok(BoundingBox {
            west: lon - BBOX_MARGIN_DEG,
            south: lat - BBOX_MARGIN_DEG,
            east: lon + BBOX_MARGIN_DEG,
            north: lat + BBOX_MARGIN_DEG,
        })
    }

    /// Pixel size of the box at `resolution` metres per pixel.
    ///
    /// Extents are ground distances along the box's centre lines, so the
    /// width shrinks towards the poles. No reprojection is done.
    pub fn dimensions(&self, resolution: f64) -> ImageSize {
        let mid_lat = (self.south + self.north) / 2.0;
        let mid_lon = (self.west + self.east) / 2.0;

        let width_m = Haversine::distance(
            Point::new(self.west, mid_lat),
            Point::new(self.east, mid_lat),
        );
        let height_m = Haversine::distance(
            Point::new(mid_lon, self.south),
            Point::new(mid_lon, self.north),
        );

        ImageSize {
            width: to_pixels(width_m, resolution),
            height: to_pixels(height_m, resolution),
        }
    }

    pub fn to_array(&self) -> [f64; 4] {
        [self.west, self.south, self.east, self.north]
    }
}

fn to_pixels(extent_m: f64, resolution: f64) -> u32 {
    ((extent_m / resolution).round() as u32).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn around_new_york() {
        let bbox = BoundingBox::around(40.0, -74.0).unwrap();

        assert_relative_eq!(bbox.west, -74.002, epsilon = 1e-9);
        assert_relative_eq!(bbox.south, 39.998, epsilon = 1e-9);
        assert_relative_eq!(bbox.east, -73.998, epsilon = 1e-9);
        assert_relative_eq!(bbox.north, 40.002, epsilon = 1e-9);
    }

    #[test]
    fn array_order_is_west_south_east_north() {
        let bbox = BoundingBox::around(1.0, 2.0).unwrap();
        let [w, s, e, n] = bbox.to_array();

        assert!(w < e);
        assert!(s < n);
        assert_relative_eq!(w, 1.998, epsilon = 1e-9);
        assert_relative_eq!(s, 0.998, epsilon = 1e-9);
    }

    #[test]
    fn rejects_out_of_range() {
        assert!(BoundingBox::around(90.5, 0.0).is_err());
        assert!(BoundingBox::around(0.0, -180.5).is_err());
        assert!(BoundingBox::around(f64::NAN, 0.0).is_err());
        assert!(BoundingBox::around(0.0, f64::INFINITY).is_err());
    }

    #[test]
    fn accepts_range_limits() {
        assert!(BoundingBox::around(90.0, 180.0).is_ok());
        assert!(BoundingBox::around(-90.0, -180.0).is_ok());
    }

    #[test]
    fn dimensions_at_mid_latitude() {
        // 0.004 deg of latitude is ~445 m, of longitude at 40N ~341 m
        let size = BoundingBox::around(40.0, -74.0)
            .unwrap()
            .dimensions(RESOLUTION_M);

        assert_eq!(size.height, 44);
        assert_eq!(size.width, 34);
    }

    #[test]
    fn dimensions_narrow_towards_pole() {
        let equator = BoundingBox::around(0.0, 0.0).unwrap().dimensions(RESOLUTION_M);
        let north = BoundingBox::around(80.0, 0.0).unwrap().dimensions(RESOLUTION_M);

        assert_eq!(equator.width, equator.height);
        assert!(north.width < equator.width);
        assert_eq!(north.height, equator.height);
    }

    #[test]
    fn dimensions_never_zero() {
        let size = BoundingBox::around(0.0, 0.0).unwrap().dimensions(1.0e6);

        assert_eq!(size, ImageSize { width: 1, height: 1 });
    }
}
