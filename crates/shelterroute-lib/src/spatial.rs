//! Static KD-tree spatial index for nearest-neighbour queries over planar points.
//!
//! The index is built once from a fixed point set and never mutated. Callers that
//! need a different point set (for example a door reload) build a fresh index and
//! swap it in wholesale.
//!
//! Items are identified by their position in the input sequence, so the owner of
//! the index keeps the payload (node ids, door records) in a parallel `Vec`.
//!
//! Site graphs are full of collinear nodes (long corridors share one axis
//! value), so the immutable kiddo tree is used: unlike the mutable one it
//! accepts any number of items with the same coordinate on an axis.

use kiddo::immutable::float::kdtree::ImmutableKdTree;
use kiddo::SquaredEuclidean;

use crate::geometry::Point;

/// KD-tree bucket size (kiddo default).
const BUCKET_SIZE: usize = 32;

type Tree = ImmutableKdTree<f64, u32, 2, BUCKET_SIZE>;

/// Immutable nearest-neighbour index over 2D points.
pub struct PointIndex {
    /// `None` when there are no points.
    tree: Option<Tree>,
    len: usize,
}

impl PointIndex {
    /// Build an index over `points`. Item `i` refers to the `i`-th input point.
    pub fn build(points: impl IntoIterator<Item = Point>) -> Self {
        let coords: Vec<[f64; 2]> = points.into_iter().map(|point| point.coords()).collect();
        let len = coords.len();
        let tree = (!coords.is_empty()).then(|| Tree::new_from_slice(&coords));
        Self { tree, len }
    }

    /// An index with no points; every query returns nothing.
    pub fn empty() -> Self {
        Self { tree: None, len: 0 }
    }

    /// Number of indexed points.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns true if the index is empty.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Nearest indexed item to `point` together with its distance.
    pub fn nearest(&self, point: Point) -> Option<(usize, f64)> {
        let tree = self.tree.as_ref()?;
        let neighbour = tree.nearest_one::<SquaredEuclidean>(&point.coords());
        Some((neighbour.item as usize, neighbour.distance.sqrt()))
    }

    /// Find all items within `radius` of a point.
    ///
    /// Returns (item, distance) pairs sorted by distance, then by item.
    pub fn within_radius(&self, point: Point, radius: f64) -> Vec<(usize, f64)> {
        let Some(tree) = self.tree.as_ref() else {
            return Vec::new();
        };
        if radius <= 0.0 {
            return Vec::new();
        }

        let mut neighbours: Vec<(usize, f64)> = tree
            .within_unsorted::<SquaredEuclidean>(&point.coords(), radius * radius)
            .into_iter()
            .map(|neighbour| (neighbour.item as usize, neighbour.distance.sqrt()))
            .collect();

        neighbours.sort_by(|a, b| a.1.total_cmp(&b.1).then_with(|| a.0.cmp(&b.0)));
        neighbours
    }
}

impl Default for PointIndex {
    fn default() -> Self {
        Self::empty()
    }
}

impl std::fmt::Debug for PointIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PointIndex")
            .field("point_count", &self.len)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line_index() -> PointIndex {
        PointIndex::build([
            Point::new(0.0, 0.0),
            Point::new(1.0, 0.0),
            Point::new(2.0, 0.0),
            Point::new(15.0, 0.0),
        ])
    }

    #[test]
    fn empty_index_returns_nothing() {
        let index = PointIndex::empty();
        assert!(index.is_empty());
        assert!(index.nearest(Point::new(0.0, 0.0)).is_none());
        assert!(index.within_radius(Point::new(0.0, 0.0), 5.0).is_empty());
    }

    #[test]
    fn nearest_basic() {
        let index = line_index();
        let (item, distance) = index.nearest(Point::new(1.2, 0.0)).expect("non-empty");
        assert_eq!(item, 1);
        assert!((distance - 0.2).abs() < 1e-9);

        let (item, _) = index.nearest(Point::new(9.0, 1.0)).expect("non-empty");
        assert_eq!(item, 3);
    }

    #[test]
    fn radius_filtering() {
        let index = line_index();
        let results = index.within_radius(Point::new(0.0, 0.0), 10.0);
        let items: Vec<_> = results.iter().map(|(item, _)| *item).collect();
        assert_eq!(items, vec![0, 1, 2]);
    }

    #[test]
    fn long_collinear_runs_are_indexed() {
        let index = PointIndex::build((0..200).map(|i| Point::new(i as f64 * 0.5, 3.0)));
        assert_eq!(index.len(), 200);

        let (item, distance) = index.nearest(Point::new(50.1, 3.0)).expect("non-empty");
        assert_eq!(item, 100);
        assert!((distance - 0.1).abs() < 1e-9);
        assert_eq!(index.within_radius(Point::new(0.0, 3.0), 0.9).len(), 2);
    }
}
