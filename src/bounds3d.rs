#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
/// A 3D box of discrete cell coordinates.
///
/// Coordinates inside the box are not wrapped. A box produced by a query may
/// start anywhere in `[0, n)` and run past `n` on any axis; callers wrap each
/// coordinate when they turn it into a cell id.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Bounds3D {
    /// Inclusive minimum bound.
    pub min: (i32, i32, i32),
    /// Exclusive maximum bound.
    pub max: (i32, i32, i32),
}

impl Bounds3D {
    /// Create a new [Bounds3D] with the specified minimum and maximum bounds.
    pub fn new(min: (i32, i32, i32), max: (i32, i32, i32)) -> Self {
        Self { min, max }
    }

    /// Create a [Bounds3D] starting at `min` that covers `span + 1` cells per
    /// axis, so both ends of the span are included.
    pub fn from_span(min: (i32, i32, i32), span: (u32, u32, u32)) -> Self {
        let end = |start: i32, span: u32| {
            (start as i64 + span as i64 + 1).min(i32::MAX as i64) as i32
        };
        Self {
            min,
            max: (end(min.0, span.0), end(min.1, span.1), end(min.2, span.2)),
        }
    }

    /// The box of all cells in a `(nx, ny, nz)` grid.
    pub fn from_dims(dims: (u32, u32, u32)) -> Self {
        Self {
            min: (0, 0, 0),
            max: (dims.0 as i32, dims.1 as i32, dims.2 as i32),
        }
    }

    /// The size along the X axis.
    pub fn width(&self) -> u32 {
        (self.max.0 as i64 - self.min.0 as i64).max(0) as u32
    }

    /// The size along the Y axis.
    pub fn height(&self) -> u32 {
        (self.max.1 as i64 - self.min.1 as i64).max(0) as u32
    }

    /// The size along the Z axis.
    pub fn depth(&self) -> u32 {
        (self.max.2 as i64 - self.min.2 as i64).max(0) as u32
    }

    /// The volume is `width * height * depth`.
    pub fn volume(&self) -> u128 {
        self.width() as u128 * self.height() as u128 * self.depth() as u128
    }

    /// Determine if a point is within the [Bounds3D].
    pub fn contains(self, point: (i32, i32, i32)) -> bool {
        point.0 >= self.min.0
            && point.1 >= self.min.1
            && point.2 >= self.min.2
            && point.0 < self.max.0
            && point.1 < self.max.1
            && point.2 < self.max.2
    }

    /// Iterate over the points in the [Bounds3D], x fastest, then y, then z.
    pub fn iter(self) -> Bounds3DIter {
        Bounds3DIter {
            bounds: self,
            current: self.min,
            done: self.volume() == 0,
        }
    }
}

impl IntoIterator for Bounds3D {
    type Item = (i32, i32, i32);
    type IntoIter = Bounds3DIter;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator for all points within a [Bounds3D].
#[derive(Debug, Clone)]
pub struct Bounds3DIter {
    bounds: Bounds3D,
    current: (i32, i32, i32),
    done: bool,
}

impl Bounds3DIter {
    fn remaining(&self) -> u128 {
        if self.done {
            return 0;
        }
        let (x, y, z) = (
            (self.current.0 as i64 - self.bounds.min.0 as i64) as u128,
            (self.current.1 as i64 - self.bounds.min.1 as i64) as u128,
            (self.current.2 as i64 - self.bounds.min.2 as i64) as u128,
        );
        let width = self.bounds.width() as u128;
        let height = self.bounds.height() as u128;
        let index = x + (y + z * height) * width;
        self.bounds.volume() - index
    }
}

impl Iterator for Bounds3DIter {
    type Item = (i32, i32, i32);

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.remaining();
        match usize::try_from(remaining) {
            Ok(remaining) => (remaining, Some(remaining)),
            Err(_) => (usize::MAX, None),
        }
    }

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let result = self.current;
        // inc x, then y, then z
        self.current = if result.0 + 1 == self.bounds.max.0 {
            if result.1 + 1 == self.bounds.max.1 {
                if result.2 + 1 == self.bounds.max.2 {
                    self.done = true;
                    result
                } else {
                    (self.bounds.min.0, self.bounds.min.1, result.2 + 1)
                }
            } else {
                (self.bounds.min.0, result.1 + 1, result.2)
            }
        } else {
            (result.0 + 1, result.1, result.2)
        };
        Some(result)
    }
}

impl std::iter::FusedIterator for Bounds3DIter {}
