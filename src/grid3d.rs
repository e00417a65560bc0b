use crate::bounds3d::Bounds3D;
use crate::error_messages::*;

/// A dense 3-Dimensional matrix of values indexed by `(x, y, z)`.
///
/// Values are laid out x fastest, then y, then z, the same layout the hash
/// grid uses for its cell ids.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid3D<T: Sized> {
    cells: Box<[T]>,
    size: (u32, u32, u32),
}

impl<T: Sized> Grid3D<T> {
    /// Create a new [Grid3D] filled by calling `init` for each coordinate in
    /// layout order.
    pub fn new<F: FnMut((u32, u32, u32)) -> T>(size: (u32, u32, u32), mut init: F) -> Self {
        let bounds = Bounds3D::from_dims(size);
        VOLUME_IS_ZERO.panic_if(bounds.volume() == 0);
        SIZE_TOO_LARGE.panic_if(bounds.volume() > i32::MAX as u128);
        Self {
            cells: bounds
                .iter()
                .map(|(x, y, z)| init((x as u32, y as u32, z as u32)))
                .collect(),
            size,
        }
    }

    fn offset_index(&self, (x, y, z): (u32, u32, u32)) -> Option<usize> {
        // coordinates past i32::MAX turn negative and fall outside
        if !Bounds3D::from_dims(self.size).contains((x as i32, y as i32, z as i32)) {
            return None;
        }
        let (width, height, _) = self.size;
        Some(x as usize + (y as usize + z as usize * height as usize) * width as usize)
    }

    pub fn get(&self, coord: (u32, u32, u32)) -> Option<&T> {
        let index = self.offset_index(coord)?;
        Some(&self.cells[index])
    }

    pub fn get_mut(&mut self, coord: (u32, u32, u32)) -> Option<&mut T> {
        let index = self.offset_index(coord)?;
        Some(&mut self.cells[index])
    }

    pub fn size(&self) -> (u32, u32, u32) {
        self.size
    }

    pub fn width(&self) -> u32 {
        self.size.0
    }

    pub fn height(&self) -> u32 {
        self.size.1
    }

    pub fn depth(&self) -> u32 {
        self.size.2
    }

    /// Number of values, `width * height * depth`.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Values in layout order.
    pub fn as_slice(&self) -> &[T] {
        &self.cells
    }

    /// Iterate over `((x, y, z), &value)` in layout order.
    pub fn iter(&self) -> impl Iterator<Item = ((u32, u32, u32), &T)> + '_ {
        Bounds3D::from_dims(self.size)
            .iter()
            .map(|(x, y, z)| (x as u32, y as u32, z as u32))
            .zip(self.cells.iter())
    }
}

impl Grid3D<usize> {
    /// Sum of all values.
    pub fn total(&self) -> usize {
        self.cells.iter().sum()
    }
}

impl<T> std::ops::Index<(u32, u32, u32)> for Grid3D<T> {
    type Output = T;

    fn index(&self, coord: (u32, u32, u32)) -> &Self::Output {
        self.get(coord).expect(OUT_OF_BOUNDS.msg())
    }
}

impl<T> std::ops::IndexMut<(u32, u32, u32)> for Grid3D<T> {
    fn index_mut(&mut self, coord: (u32, u32, u32)) -> &mut Self::Output {
        self.get_mut(coord).expect(OUT_OF_BOUNDS.msg())
    }
}
