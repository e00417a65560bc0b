//! A toroidal spatial hash grid.
//!
//! [HashGrid] indexes points in a periodic 3D domain for proximity queries.
//! The domain is `nx * cell_size` by `ny * cell_size` by `nz * cell_size`
//! and wraps on every axis, so a point just past one face is a neighbor of
//! points just inside the opposite face.
//!
//! Positions are never stored. The grid asks a position accessor for them,
//! and the caller calls [HashGrid::update] once per tick after things move.

pub mod bounds3d;
pub mod error;
mod error_messages;
pub mod grid3d;
pub mod hash;
pub mod hashgrid;

pub use bounds3d::{Bounds3D, Bounds3DIter};
pub use error::{ConfigError, ConfigResult};
pub use glam::Vec3;
pub use grid3d::Grid3D;
pub use hash::{CellIds, Hash, HashConfig};
pub use hashgrid::{HashGrid, Neighbors};
