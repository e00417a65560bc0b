//! The grid index: membership, cell binding and neighbor queries.

use glam::Vec3;

use crate::error::ConfigResult;
use crate::grid3d::Grid3D;
use crate::hash::{CellIds, Hash, HashConfig};

/// A spatial index over a periodic 3D domain.
///
/// The grid stores handles of type `T` (ids, indices, `Rc`s and the like) and
/// never owns the objects behind them. Positions are read through
/// `position_of` whenever an element is bound or tested, and are never
/// cached. When positions change outside the grid, call [HashGrid::update] to
/// move every element into the cell for its new position.
///
/// ```
/// use glam::Vec3;
/// use hashgrid::HashGrid;
///
/// let positions = [
///     Vec3::new(0.1, 0.0, 0.1),
///     Vec3::new(3.95, 0.0, 0.05),
///     Vec3::new(2.0, 0.0, 2.0),
/// ];
/// let mut grid = HashGrid::new(|&i: &usize| positions[i], 1.0, 4, 4, 4);
/// grid.extend(0..positions.len());
///
/// let mut found: Vec<usize> = grid.nearby(Vec3::ZERO, 0.3).copied().collect();
/// found.sort();
/// assert_eq!(found, vec![0, 1]);
/// ```
pub struct HashGrid<T, F> {
    position_of: F,
    elements: Vec<T>,
    cells: Vec<Vec<T>>,
    hash: Hash,
}

impl<T, F> HashGrid<T, F>
where
    F: Fn(&T) -> Vec3,
{
    /// Create an empty grid.
    ///
    /// # Panics
    /// If the configuration is rejected by [HashConfig::new].
    pub fn new(position_of: F, cell_size: f32, nx: u32, ny: u32, nz: u32) -> Self {
        match Self::try_new(position_of, cell_size, nx, ny, nz) {
            Ok(grid) => grid,
            Err(err) => panic!("{err}"),
        }
    }

    /// Create an empty grid, or report why the configuration is invalid.
    pub fn try_new(
        position_of: F,
        cell_size: f32,
        nx: u32,
        ny: u32,
        nz: u32,
    ) -> ConfigResult<Self> {
        let config = HashConfig::new(cell_size, nx, ny, nz)?;
        Ok(Self::with_config(position_of, config))
    }

    /// Create an empty grid from an already validated configuration.
    pub fn with_config(position_of: F, config: HashConfig) -> Self {
        tracing::debug!(%config, "creating hash grid");
        Self {
            position_of,
            elements: Vec::new(),
            cells: (0..config.cell_count()).map(|_| Vec::new()).collect(),
            hash: Hash::new(config),
        }
    }

    /// Current position of `element`, as the grid sees it.
    pub fn position_of(&self, element: &T) -> Vec3 {
        (self.position_of)(element)
    }

    /// Id of the cell for the element's current position. This is the cell
    /// the element will be bound to at the next update, not necessarily the
    /// one it is in now.
    pub fn cell_of(&self, element: &T) -> usize {
        self.hash.cell_id(self.position_of(element))
    }

    /// First element in insertion order that matches `predicate`.
    pub fn find<P>(&self, mut predicate: P) -> Option<&T>
    where
        P: FnMut(&T) -> bool,
    {
        self.elements.iter().find(|element| predicate(element))
    }

    /// Elements within `distance` of `center`, narrowed by `narrow`.
    ///
    /// `narrow` picks out the elements the caller cares about and converts
    /// them to `S`; elements it maps to `None` are skipped. Distance is
    /// measured along the shortest periodic path and must be strictly less
    /// than `distance`.
    ///
    /// Results come in cell order, then in insertion order within a cell.
    /// Each cell is visited at most once, so an element bound once is
    /// yielded at most once even when `distance` exceeds the domain extent.
    pub fn neighbors<'a, S, N>(
        &'a self,
        center: Vec3,
        distance: f32,
        narrow: N,
    ) -> Neighbors<'a, T, F, N>
    where
        N: FnMut(&'a T) -> Option<S>,
    {
        Neighbors {
            grid: self,
            center,
            distance_squared: distance * distance,
            cell_ids: self.hash.cell_ids(center, distance),
            bucket: std::slice::Iter::default(),
            narrow,
        }
    }

    /// Every element within `distance` of `center`. See [HashGrid::neighbors].
    pub fn nearby<'a>(
        &'a self,
        center: Vec3,
        distance: f32,
    ) -> Neighbors<'a, T, F, fn(&'a T) -> Option<&'a T>> {
        self.neighbors(center, distance, Some as fn(&'a T) -> Option<&'a T>)
    }

    /// The element closest to `center` that is strictly within `radius`
    /// and passes `narrow`. Ties go to the first one found.
    pub fn nearest<'a, S, N>(&'a self, center: Vec3, radius: f32, mut narrow: N) -> Option<S>
    where
        N: FnMut(&'a T) -> Option<S>,
    {
        let mut best = None;
        let mut best_distance = radius * radius;
        for id in self.hash.cell_ids(center, radius) {
            for element in &self.cells[id] {
                let Some(narrowed) = narrow(element) else {
                    continue;
                };
                let distance = self.hash.distance_squared(center, self.position_of(element));
                if distance < best_distance {
                    best_distance = distance;
                    best = Some(narrowed);
                }
            }
        }
        best
    }

    /// Occupancy of every cell, indexed by `(x, y, z)` cell coordinates.
    pub fn stat(&self) -> Grid3D<usize> {
        Grid3D::new(self.hash.config().dims(), |(x, y, z)| {
            self.cells[self.hash.cell_id_of(x as i32, y as i32, z as i32)].len()
        })
    }

    /// Elements bound to cell `id`, or `None` if there is no such cell.
    pub fn cell(&self, id: usize) -> Option<&[T]> {
        self.cells.get(id).map(Vec::as_slice)
    }

    /// Number of elements bound to cell `id`, or `None` if there is no such
    /// cell.
    pub fn cell_len(&self, id: usize) -> Option<usize> {
        self.cells.get(id).map(Vec::len)
    }

    pub fn config(&self) -> HashConfig {
        self.hash.config()
    }

    pub fn hash(&self) -> &Hash {
        &self.hash
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Iterate over the elements in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.elements.iter()
    }

    /// Forget every element.
    pub fn clear(&mut self) {
        self.elements.clear();
        self.cells.iter_mut().for_each(Vec::clear);
    }

    /// Give the elements back to the owner, in insertion order.
    pub fn into_elements(self) -> Vec<T> {
        self.elements
    }
}

impl<T, F> HashGrid<T, F>
where
    T: Clone,
    F: Fn(&T) -> Vec3,
{
    /// Add `element` and bind it to the cell for its current position.
    ///
    /// There is no uniqueness check. Adding the same element twice binds it
    /// twice.
    pub fn add(&mut self, element: T) {
        let id = self.cell_of(&element);
        self.cells[id].push(element.clone());
        self.elements.push(element);
    }

    /// Rebind every element to the cell for its current position.
    pub fn update(&mut self) {
        tracing::trace!(elements = self.elements.len(), "rebinding hash grid");
        self.cells.iter_mut().for_each(Vec::clear);
        for element in &self.elements {
            let id = self.hash.cell_id((self.position_of)(element));
            self.cells[id].push(element.clone());
        }
    }

    /// Change the cell size and cell counts, then rebind every element.
    ///
    /// # Panics
    /// If the configuration is rejected by [HashConfig::new].
    pub fn rebuild(&mut self, cell_size: f32, nx: u32, ny: u32, nz: u32) {
        if let Err(err) = self.try_rebuild(cell_size, nx, ny, nz) {
            panic!("{err}");
        }
    }

    /// Change the cell size and cell counts, then rebind every element.
    /// On error the grid is left as it was.
    pub fn try_rebuild(&mut self, cell_size: f32, nx: u32, ny: u32, nz: u32) -> ConfigResult<()> {
        let config = HashConfig::new(cell_size, nx, ny, nz)?;
        self.rebuild_with(config);
        Ok(())
    }

    /// Switch to an already validated configuration and rebind every element.
    pub fn rebuild_with(&mut self, config: HashConfig) {
        self.hash = Hash::new(config);
        let reallocate = self.cells.len() != config.cell_count();
        if reallocate {
            self.cells = (0..config.cell_count()).map(|_| Vec::new()).collect();
        }
        tracing::debug!(%config, reallocate, "rebuilding hash grid");
        self.update();
    }
}

impl<T, F> HashGrid<T, F>
where
    T: PartialEq,
    F: Fn(&T) -> Vec3,
{
    /// Remove one occurrence of `element`.
    ///
    /// The cell is looked up from the element's current position. If the
    /// element moved since the last update it is not in that cell, and its
    /// old cell keeps a stale entry until the next [HashGrid::update] or
    /// [HashGrid::rebuild]. It is removed from the membership either way.
    ///
    /// Returns `false` if `element` was not in the grid.
    pub fn remove(&mut self, element: &T) -> bool {
        let id = self.cell_of(element);
        let bucket = &mut self.cells[id];
        match bucket.iter().position(|bound| bound == element) {
            Some(index) => {
                bucket.remove(index);
            }
            None => {
                tracing::trace!(cell = id, "element not bound to the cell for its position");
            }
        }
        match self.elements.iter().position(|member| member == element) {
            Some(index) => {
                self.elements.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn contains(&self, element: &T) -> bool {
        self.elements.contains(element)
    }
}

impl<T, F> Extend<T> for HashGrid<T, F>
where
    T: Clone,
    F: Fn(&T) -> Vec3,
{
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for element in iter {
            self.add(element);
        }
    }
}

impl<'a, T, F> IntoIterator for &'a HashGrid<T, F>
where
    F: Fn(&T) -> Vec3,
{
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T: std::fmt::Debug, F> std::fmt::Debug for HashGrid<T, F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HashGrid")
            .field("config", &self.hash.config())
            .field("elements", &self.elements)
            .finish_non_exhaustive()
    }
}

/// Lazy neighbor query produced by [HashGrid::neighbors].
pub struct Neighbors<'a, T, F, N> {
    grid: &'a HashGrid<T, F>,
    center: Vec3,
    distance_squared: f32,
    cell_ids: CellIds,
    bucket: std::slice::Iter<'a, T>,
    narrow: N,
}

impl<'a, T, F, N, S> Iterator for Neighbors<'a, T, F, N>
where
    F: Fn(&T) -> Vec3,
    N: FnMut(&'a T) -> Option<S>,
{
    type Item = S;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            for element in self.bucket.by_ref() {
                let Some(narrowed) = (self.narrow)(element) else {
                    continue;
                };
                let position = (self.grid.position_of)(element);
                if self.grid.hash.distance_squared(self.center, position) < self.distance_squared {
                    return Some(narrowed);
                }
            }
            let id = self.cell_ids.next()?;
            self.bucket = self.grid.cells[id].iter();
        }
    }
}
