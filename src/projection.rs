//! Web-mercator tile math: world <-> tile, and tile <-> quantised local coordinates.

use geo_types::Coord;

/// Quantisation resolution per axis: 12 bits, `(1 << 12) - 1`.
pub const RESOLUTION: u32 = (1 << 12) - 1;

/// A web-mercator tile at a given zoom level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tile {
    pub x: u32,
    pub y: u32,
    pub zoom: u8,
}

impl Tile {
    pub fn new(x: u32, y: u32, zoom: u8) -> Self {
        Self { x, y, zoom }
    }

    /// `localId = y * 2^zoom + x`.
    pub fn local_id(&self) -> u32 {
        self.y * (1u32 << self.zoom) + self.x
    }

    pub fn from_local_id(local_id: u32, zoom: u8) -> Self {
        let n = 1u32 << zoom;
        Self {
            x: local_id % n,
            y: local_id / n,
            zoom,
        }
    }

    /// Slippy-map tile containing `(lon, lat)` at `zoom`.
    pub fn world_to_tile(lon: f64, lat: f64, zoom: u8) -> Tile {
        let n = (1u64 << zoom) as f64;
        let x = ((lon + 180.0) / 360.0 * n).floor() as u32;
        let lat_rad = lat.to_radians();
        let y = ((1.0 - (lat_rad.tan() + 1.0 / lat_rad.cos()).ln() / std::f64::consts::PI) / 2.0
            * n)
            .floor() as u32;
        Tile::new(x, y, zoom)
    }

    /// Geographic bounds of this tile as `(left, bottom, right, top)`.
    pub fn bounds(&self) -> (f64, f64, f64, f64) {
        let n = (1u64 << self.zoom) as f64;
        let lon_of = |x: f64| x / n * 360.0 - 180.0;
        let lat_of = |y: f64| {
            let a = std::f64::consts::PI * (1.0 - 2.0 * y / n);
            a.sinh().atan().to_degrees()
        };
        let left = lon_of(self.x as f64);
        let right = lon_of(self.x as f64 + 1.0);
        let top = lat_of(self.y as f64);
        let bottom = lat_of(self.y as f64 + 1.0);
        (left, bottom, right, top)
    }

    /// Quantise `(lon, lat)` into this tile's local `[0, resolution]` grid.
    ///
    /// Inputs outside the tile are clamped rather than left to wrap or overflow the
    /// 3-byte pack, which would otherwise collide with the all-`0xFF` empty sentinel.
    pub fn to_local_coordinates(&self, lon: f64, lat: f64, resolution: u32) -> (u32, u32) {
        let (left, bottom, right, top) = self.bounds();
        let lon_step = (right - left) / resolution as f64;
        let lat_step = (top - bottom) / resolution as f64;
        let ix = ((lon - left) / lon_step).floor().clamp(0.0, resolution as f64);
        let iy = ((top - lat) / lat_step).floor().clamp(0.0, resolution as f64);
        (ix as u32, iy as u32)
    }

    /// Inverse of [`Tile::to_local_coordinates`].
    pub fn from_local_coordinates(&self, ix: u32, iy: u32, resolution: u32) -> Coord<f64> {
        let (left, bottom, right, top) = self.bounds();
        let lon_step = (right - left) / resolution as f64;
        let lat_step = (top - bottom) / resolution as f64;
        Coord {
            x: left + ix as f64 * lon_step,
            y: top - iy as f64 * lat_step,
        }
    }
}
