//! Mapping between continuous positions and periodic cell ids.

use glam::Vec3;

use crate::bounds3d::{Bounds3D, Bounds3DIter};
use crate::error::{ConfigError, ConfigResult};
use crate::error_messages::*;

/// Cell size and per-axis cell counts of a periodic grid.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HashConfig {
    cell_size: f32,
    nx: u32,
    ny: u32,
    nz: u32,
}

impl HashConfig {
    /// Validate and create a configuration.
    ///
    /// The cell size must be finite and positive, every count must be
    /// positive, and `nx * ny * nz` must fit in an `i32`.
    pub fn new(cell_size: f32, nx: u32, ny: u32, nz: u32) -> ConfigResult<Self> {
        if !(cell_size.is_finite() && cell_size > 0.0) {
            return Err(ConfigError::CellSizeNotPositive(cell_size));
        }
        if nx == 0 || ny == 0 || nz == 0 {
            return Err(ConfigError::ZeroCellCount { nx, ny, nz });
        }
        let cells = nx as u64 * ny as u64 * nz as u64;
        if cells > i32::MAX as u64 {
            return Err(ConfigError::TooManyCells { nx, ny, nz });
        }
        let extent_finite = [nx, ny, nz]
            .into_iter()
            .all(|n| (n as f32 * cell_size).is_finite());
        if !extent_finite {
            return Err(ConfigError::ExtentNotFinite { cell_size, nx, ny, nz });
        }
        Ok(Self { cell_size, nx, ny, nz })
    }

    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    pub fn nx(&self) -> u32 {
        self.nx
    }

    pub fn ny(&self) -> u32 {
        self.ny
    }

    pub fn nz(&self) -> u32 {
        self.nz
    }

    /// `(nx, ny, nz)`
    pub fn dims(&self) -> (u32, u32, u32) {
        (self.nx, self.ny, self.nz)
    }

    /// Total number of cells, `nx * ny * nz`.
    pub fn cell_count(&self) -> usize {
        self.nx as usize * self.ny as usize * self.nz as usize
    }

    /// Size of the periodic domain along each axis.
    pub fn extent(&self) -> Vec3 {
        Vec3::new(
            self.nx as f32 * self.cell_size,
            self.ny as f32 * self.cell_size,
            self.nz as f32 * self.cell_size,
        )
    }
}

impl std::fmt::Display for HashConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "cell size {}, {}x{}x{} cells",
            self.cell_size, self.nx, self.ny, self.nz
        )
    }
}

/// Coordinate mapper for a periodic grid.
///
/// Every axis wraps independently: a position is reduced modulo the domain
/// extent before it is bucketed, so `-0.5` and `extent - 0.5` land in the
/// same cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hash {
    config: HashConfig,
    extent: Vec3,
}

impl Hash {
    pub fn new(config: HashConfig) -> Self {
        Self {
            config,
            extent: config.extent(),
        }
    }

    pub fn config(&self) -> HashConfig {
        self.config
    }

    pub fn extent(&self) -> Vec3 {
        self.extent
    }

    pub fn cell_count(&self) -> usize {
        self.config.cell_count()
    }

    /// Discrete coordinate of `pos` on an axis of length `extent`.
    ///
    /// Uses true modulo, so negative positions wrap forward. Float rounding
    /// can produce exactly `n` for positions just below zero; [Hash::cell_id_of]
    /// wraps that back to `0`.
    #[inline]
    pub fn cell_coord(pos: f32, extent: f32, cell_size: f32) -> i32 {
        (pos.rem_euclid(extent) / cell_size).floor() as i32
    }

    /// Per-axis coordinates of the cell containing `position`, each in `[0, n)`.
    pub fn cell_coords(&self, position: Vec3) -> (i32, i32, i32) {
        let cell_size = self.config.cell_size;
        (
            Self::cell_coord(position.x, self.extent.x, cell_size).rem_euclid(self.config.nx as i32),
            Self::cell_coord(position.y, self.extent.y, cell_size).rem_euclid(self.config.ny as i32),
            Self::cell_coord(position.z, self.extent.z, cell_size).rem_euclid(self.config.nz as i32),
        )
    }

    /// Linear id of the cell at `(x, y, z)`. Coordinates outside the grid wrap.
    #[inline]
    pub fn cell_id_of(&self, x: i32, y: i32, z: i32) -> usize {
        let (nx, ny, nz) = self.config.dims();
        let x = x.rem_euclid(nx as i32) as usize;
        let y = y.rem_euclid(ny as i32) as usize;
        let z = z.rem_euclid(nz as i32) as usize;
        x + (y + z * ny as usize) * nx as usize
    }

    /// Linear id of the cell containing `position`.
    pub fn cell_id(&self, position: Vec3) -> usize {
        let (x, y, z) = self.cell_coords(position);
        self.cell_id_of(x, y, z)
    }

    /// Inverse of [Hash::cell_id_of].
    pub fn coords_of(&self, id: usize) -> (u32, u32, u32) {
        CELL_ID_OUT_OF_RANGE.panic_if(id >= self.cell_count());
        let (nx, ny, _) = self.config.dims();
        let (nx, ny) = (nx as usize, ny as usize);
        ((id % nx) as u32, ((id / nx) % ny) as u32, (id / (nx * ny)) as u32)
    }

    /// Ids of every cell overlapping the bounding box of the sphere at
    /// `center` with `radius`, x fastest, then y, then z.
    ///
    /// The box is a superset of the sphere, so callers still need an exact
    /// distance test. When the box is as wide as the grid on an axis, that
    /// axis is scanned once from the box's first cell, so every id is
    /// yielded at most once however large `radius` gets. A negative or NaN
    /// radius yields nothing.
    pub fn cell_ids(&self, center: Vec3, radius: f32) -> CellIds {
        if radius.is_nan() || radius < 0.0 {
            return CellIds {
                hash: *self,
                coords: Bounds3D::default().iter(),
            };
        }
        let (sx, wx) = self.axis_span(center.x, radius, self.extent.x, self.config.nx);
        let (sy, wy) = self.axis_span(center.y, radius, self.extent.y, self.config.ny);
        let (sz, wz) = self.axis_span(center.z, radius, self.extent.z, self.config.nz);
        CellIds {
            hash: *self,
            coords: Bounds3D::from_span((sx, sy, sz), (wx, wy, wz)).iter(),
        }
    }

    /// Start coordinate and span (in cells, inclusive) covering
    /// `[pos - radius, pos + radius]` on one axis.
    fn axis_span(&self, pos: f32, radius: f32, extent: f32, n: u32) -> (i32, u32) {
        let cell_size = self.config.cell_size;
        let from = Self::cell_coord(pos - radius, extent, cell_size);
        let to = Self::cell_coord(pos + radius, extent, cell_size);
        let mut width = to - from;
        if width < 0 {
            width += n as i32;
        }
        // A box this wide wraps onto itself and the wrapped difference loses
        // whole laps of the grid. One lap already covers the axis.
        let unwrapped = ((pos + radius) / cell_size).floor() as i64
            - ((pos - radius) / cell_size).floor() as i64;
        let width = if unwrapped >= n as i64 {
            n - 1
        } else {
            width as u32
        };
        (from.rem_euclid(n as i32), width)
    }

    /// Offset from `from` to `to` along the shortest periodic path, each
    /// axis in `[-extent / 2, extent / 2]`.
    pub fn wrapped_delta(&self, from: Vec3, to: Vec3) -> Vec3 {
        let axis = |delta: f32, extent: f32| {
            let delta = delta.rem_euclid(extent);
            if delta > extent * 0.5 {
                delta - extent
            } else {
                delta
            }
        };
        let delta = to - from;
        Vec3::new(
            axis(delta.x, self.extent.x),
            axis(delta.y, self.extent.y),
            axis(delta.z, self.extent.z),
        )
    }

    /// Squared periodic distance between two positions.
    pub fn distance_squared(&self, a: Vec3, b: Vec3) -> f32 {
        self.wrapped_delta(a, b).length_squared()
    }
}

/// Lazy sequence of cell ids produced by [Hash::cell_ids].
#[derive(Debug, Clone)]
pub struct CellIds {
    hash: Hash,
    coords: Bounds3DIter,
}

impl Iterator for CellIds {
    type Item = usize;

    fn next(&mut self) -> Option<Self::Item> {
        let (x, y, z) = self.coords.next()?;
        Some(self.hash.cell_id_of(x, y, z))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.coords.size_hint()
    }
}

impl std::iter::FusedIterator for CellIds {}

#[cfg(test)]
mod tests {
    use super::*;

    fn hash(cell_size: f32, nx: u32, ny: u32, nz: u32) -> Hash {
        Hash::new(HashConfig::new(cell_size, nx, ny, nz).unwrap())
    }

    #[test]
    fn config_rejects_degenerate_values() {
        assert_eq!(
            HashConfig::new(0.0, 4, 4, 4),
            Err(ConfigError::CellSizeNotPositive(0.0))
        );
        assert_eq!(
            HashConfig::new(-1.0, 4, 4, 4),
            Err(ConfigError::CellSizeNotPositive(-1.0))
        );
        assert!(matches!(
            HashConfig::new(f32::NAN, 4, 4, 4),
            Err(ConfigError::CellSizeNotPositive(_))
        ));
        assert_eq!(
            HashConfig::new(1.0, 4, 0, 4),
            Err(ConfigError::ZeroCellCount { nx: 4, ny: 0, nz: 4 })
        );
        assert_eq!(
            HashConfig::new(1.0, 65536, 65536, 1),
            Err(ConfigError::TooManyCells { nx: 65536, ny: 65536, nz: 1 })
        );
        assert!(matches!(
            HashConfig::new(f32::MAX, 4, 1, 1),
            Err(ConfigError::ExtentNotFinite { .. })
        ));
    }

    #[test]
    fn config_accessors() {
        let config = HashConfig::new(0.5, 2, 3, 4).unwrap();
        assert_eq!(config.dims(), (2, 3, 4));
        assert_eq!(config.cell_count(), 24);
        assert_eq!(config.extent(), Vec3::new(1.0, 1.5, 2.0));
        assert_eq!(config.to_string(), "cell size 0.5, 2x3x4 cells");
    }

    #[test]
    fn cell_coord_wraps_negative_positions_forward() {
        assert_eq!(Hash::cell_coord(-1.0, 10.0, 1.0), Hash::cell_coord(9.0, 10.0, 1.0));
        assert_eq!(Hash::cell_coord(-1.0, 10.0, 1.0), 9);
        assert_eq!(Hash::cell_coord(10.5, 10.0, 1.0), 0);
        assert_eq!(Hash::cell_coord(25.0, 10.0, 2.0), 2);
        assert_eq!(Hash::cell_coord(0.0, 10.0, 2.0), 0);
    }

    #[test]
    fn cell_id_linearizes_x_fastest() {
        let hash = hash(1.0, 4, 3, 2);
        assert_eq!(hash.cell_id_of(0, 0, 0), 0);
        assert_eq!(hash.cell_id_of(1, 0, 0), 1);
        assert_eq!(hash.cell_id_of(0, 1, 0), 4);
        assert_eq!(hash.cell_id_of(0, 0, 1), 12);
        assert_eq!(hash.cell_id_of(3, 2, 1), 23);
        // wrapping
        assert_eq!(hash.cell_id_of(-1, 0, 0), 3);
        assert_eq!(hash.cell_id_of(4, 3, 2), 0);
        assert_eq!(hash.cell_id_of(-1, -1, -1), 23);
    }

    #[test]
    fn coords_of_inverts_cell_id() {
        let hash = hash(1.0, 4, 3, 2);
        for id in 0..hash.cell_count() {
            let (x, y, z) = hash.coords_of(id);
            assert_eq!(hash.cell_id_of(x as i32, y as i32, z as i32), id);
        }
    }

    #[test]
    #[should_panic]
    fn coords_of_out_of_range() {
        hash(1.0, 2, 2, 2).coords_of(8);
    }

    #[test]
    fn cell_id_of_position() {
        let hash = hash(1.0, 4, 4, 4);
        assert_eq!(hash.cell_id(Vec3::new(0.1, 0.0, 0.1)), 0);
        assert_eq!(hash.cell_id(Vec3::new(3.95, 0.0, 0.05)), 3);
        assert_eq!(hash.cell_id(Vec3::new(2.0, 0.0, 2.0)), 2 + 2 * 16);
        assert_eq!(hash.cell_id(Vec3::new(-0.05, 0.0, 0.0)), 3);
        assert_eq!(hash.cell_id(Vec3::new(4.5, 8.5, -3.5)), hash.cell_id(Vec3::new(0.5, 0.5, 0.5)));
    }

    #[test]
    fn cell_ids_cover_wrap_boundary() {
        let hash = hash(1.0, 4, 4, 4);
        let ids: Vec<_> = hash.cell_ids(Vec3::ZERO, 0.3).collect();
        // x in {3, 0}, y in {3, 0}, z in {3, 0}, x fastest
        assert_eq!(
            ids,
            vec![
                hash.cell_id_of(3, 3, 3),
                hash.cell_id_of(0, 3, 3),
                hash.cell_id_of(3, 0, 3),
                hash.cell_id_of(0, 0, 3),
                hash.cell_id_of(3, 3, 0),
                hash.cell_id_of(0, 3, 0),
                hash.cell_id_of(3, 0, 0),
                hash.cell_id_of(0, 0, 0),
            ]
        );
    }

    #[test]
    fn cell_ids_single_cell_for_small_radius() {
        let hash = hash(1.0, 4, 4, 4);
        let ids: Vec<_> = hash.cell_ids(Vec3::splat(1.5), 0.2).collect();
        assert_eq!(ids, vec![hash.cell_id_of(1, 1, 1)]);
        assert_eq!(hash.cell_ids(Vec3::splat(1.5), 0.0).count(), 1);
    }

    #[test]
    fn cell_ids_huge_radius_scans_each_cell_once() {
        let hash = hash(1.0, 4, 4, 4);
        for &(center, radius) in &[
            (Vec3::splat(0.5), 3.0),
            (Vec3::ZERO, 50.0),
            (Vec3::new(-7.3, 2.0, 11.9), 1e6),
        ] {
            let mut ids: Vec<_> = hash.cell_ids(center, radius).collect();
            assert_eq!(ids.len(), hash.cell_count());
            ids.sort_unstable();
            ids.dedup();
            assert_eq!(ids, (0..hash.cell_count()).collect::<Vec<_>>());
        }
    }

    #[test]
    fn cell_ids_full_axis_keeps_other_axes_narrow() {
        let hash = hash(1.0, 2, 8, 8);
        // x wraps onto itself, y and z span three cells
        assert_eq!(hash.cell_ids(Vec3::new(0.5, 4.5, 4.5), 1.2).count(), 2 * 3 * 3);
    }

    #[test]
    fn cell_ids_negative_radius_is_empty() {
        let hash = hash(1.0, 4, 4, 4);
        assert_eq!(hash.cell_ids(Vec3::ZERO, -1.0).count(), 0);
        assert_eq!(hash.cell_ids(Vec3::ZERO, f32::NAN).count(), 0);
    }

    #[test]
    fn cell_ids_are_fresh_per_call() {
        let hash = hash(0.5, 8, 8, 8);
        let a: Vec<_> = hash.cell_ids(Vec3::new(1.0, 2.0, 3.0), 0.7).collect();
        let b: Vec<_> = hash.cell_ids(Vec3::new(1.0, 2.0, 3.0), 0.7).collect();
        assert_eq!(a, b);
        assert_eq!(hash.cell_ids(Vec3::new(1.0, 2.0, 3.0), 0.7).size_hint().0, a.len());
    }

    #[test]
    fn wrapped_delta_takes_short_way_round() {
        let hash = hash(1.0, 4, 4, 4);
        let delta = hash.wrapped_delta(Vec3::ZERO, Vec3::new(3.95, 0.0, 0.05));
        assert!((delta.x + 0.05).abs() < 1e-5);
        assert!((delta.z - 0.05).abs() < 1e-5);
        let d2 = hash.distance_squared(Vec3::new(0.01, 0.0, 0.0), Vec3::new(3.99, 0.0, 0.0));
        assert!((d2 - 0.0004).abs() < 1e-5);
        assert_eq!(hash.distance_squared(Vec3::splat(1.0), Vec3::splat(1.0)), 0.0);
    }
}
