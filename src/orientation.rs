//! This module generates the distinct rotations of a shape.

use std::{fmt, iter::FusedIterator};

use hashbrown::HashSet;

use crate::{
    geometry::{rotate_points, Axis, Point, Rotation},
    shape::Shape,
};

/// Quarter turns applied about X, then Y, then Z.
#[derive(PartialEq, Eq, Hash, Clone, Copy, Debug, Default)]
pub struct RotationTriple {
    pub x: Rotation,
    pub y: Rotation,
    pub z: Rotation,
}

impl RotationTriple {
    /// Iterate over all 64 triples, with the Z rotation varying fastest.
    pub fn all() -> impl Iterator<Item = RotationTriple> + ExactSizeIterator {
        (0..64).map(|i| RotationTriple {
            x: Rotation::ALL[i / 16],
            y: Rotation::ALL[(i / 4) % 4],
            z: Rotation::ALL[i % 4],
        })
    }

    /// Apply the rotations to `points`, normalizing to the origin after each
    /// axis step.
    pub fn apply(&self, points: &[Point]) -> Vec<Point> {
        let points = rotate_points(points, Axis::X, self.x, true);
        let points = rotate_points(&points, Axis::Y, self.y, true);
        rotate_points(&points, Axis::Z, self.z, true)
    }
}

impl fmt::Display for RotationTriple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

/// One distinct orientation of a shape, normalized to touch the origin.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Orientation {
    rotation: RotationTriple,
    points: Vec<Point>,
    leading: Point,
}

impl Orientation {
    fn new(rotation: RotationTriple, points: Vec<Point>) -> Self {
        let leading = points
            .iter()
            .copied()
            .min_by_key(Point::scan_key)
            .unwrap_or_default();

        Self {
            rotation,
            points,
            leading,
        }
    }

    pub fn rotation(&self) -> RotationTriple {
        self.rotation
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// The point that comes first in cube scan order.
    ///
    /// When the lowest empty cell of the cube is filled by this orientation,
    /// it is always this point that covers it.
    pub fn leading(&self) -> Point {
        self.leading
    }

    /// The points of this orientation with its local origin placed at `anchor`.
    pub fn placed_at(&self, anchor: Point) -> impl Iterator<Item = Point> + '_ {
        self.points.iter().map(move |p| *p + anchor)
    }

    fn key(&self) -> Vec<Point> {
        let mut key = self.points.clone();
        key.sort_unstable();
        key
    }
}

/// The distinct orientations of a shape, in the order they were first found.
///
/// No two entries contain exactly the same set of points.
#[derive(Clone, Debug)]
pub struct OrientationSet {
    orientations: Vec<Orientation>,
}

impl OrientationSet {
    /// Generate every distinct orientation of `shape` under the 24 proper
    /// rotations of the cube.
    ///
    /// All 64 rotation triples are applied; the 40 redundant compositions
    /// are dropped because their point sets match one already kept.
    pub fn generate(shape: &Shape) -> Self {
        let mut seen = HashSet::new();

        let orientations = RotationTriple::all()
            .map(|rotation| Orientation::new(rotation, rotation.apply(shape.points())))
            .filter(|orientation| seen.insert(orientation.key()))
            .collect();

        Self { orientations }
    }

    pub fn len(&self) -> usize {
        self.orientations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orientations.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Orientation> {
        self.orientations.get(index)
    }

    pub fn iter(&self) -> Iter<'_> {
        Iter {
            inner: self.orientations.iter(),
        }
    }
}

impl std::ops::Index<usize> for OrientationSet {
    type Output = Orientation;

    fn index(&self, index: usize) -> &Orientation {
        &self.orientations[index]
    }
}

/// Iterator over the orientations of an [`OrientationSet`].
pub struct Iter<'a> {
    inner: std::slice::Iter<'a, Orientation>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = &'a Orientation;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl ExactSizeIterator for Iter<'_> {}

impl FusedIterator for Iter<'_> {}

impl<'a> IntoIterator for &'a OrientationSet {
    type Item = &'a Orientation;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
use crate::geometry::reset_origin;

#[cfg(test)]
fn sorted(points: &[Point]) -> Vec<Point> {
    let mut points = points.to_vec();
    points.sort();
    points
}

#[test]
fn asymmetric_shape_has_24_orientations() {
    let set = OrientationSet::generate(&Shape::preset("tee").unwrap());
    assert_eq!(set.len(), 24, "There should be 24 possible orientations");
}

#[test]
fn symmetric_shapes_collapse() {
    let bar = OrientationSet::generate(&Shape::from_size(1, 1, 2).unwrap());
    assert_eq!(bar.len(), 3, "There should be 3 possible orientations");

    let unit = OrientationSet::generate(&Shape::from_size(1, 1, 1).unwrap());
    assert_eq!(unit.len(), 1);

    let plate = OrientationSet::generate(&Shape::from_size(2, 2, 1).unwrap());
    assert_eq!(plate.len(), 3);

    let tripod = OrientationSet::generate(&Shape::preset("tripod").unwrap());
    assert_eq!(tripod.len(), 8);
}

#[test]
fn first_orientation_is_the_identity() {
    let shape = Shape::preset("ell").unwrap();
    let set = OrientationSet::generate(&shape);

    assert_eq!(set[0].rotation(), RotationTriple::default());
    assert_eq!(set[0].points(), shape.points());
}

#[test]
fn orientations_are_distinct_and_closed() {
    for name in Shape::PRESETS {
        let set = OrientationSet::generate(&Shape::preset(name).unwrap());
        let keys: Vec<_> = set.iter().map(|o| sorted(o.points())).collect();

        for (i, a) in keys.iter().enumerate() {
            for b in &keys[i + 1..] {
                assert_ne!(a, b, "duplicate orientation of {name}");
            }
        }

        // Every rotation of every orientation is itself in the set.
        for orientation in &set {
            for rotation in RotationTriple::all() {
                let rotated = sorted(&rotation.apply(orientation.points()));
                assert!(keys.contains(&rotated), "{name} not closed under {rotation}");
            }
        }
    }
}

#[test]
fn orientations_touch_the_origin() {
    let set = OrientationSet::generate(&Shape::preset("tee").unwrap());

    for orientation in &set {
        assert_eq!(reset_origin(orientation.points(), None), orientation.points());
        assert_eq!(orientation.leading().z, 0);
        assert!(orientation.points().contains(&orientation.leading()));
        assert!(orientation
            .points()
            .iter()
            .all(|p| p.scan_key() >= orientation.leading().scan_key()));
    }
}

#[test]
fn placed_at_translates() {
    let set = OrientationSet::generate(&Shape::from_size(1, 1, 2).unwrap());
    let placed: Vec<_> = set[0].placed_at(Point::new(1, 2, 0)).collect();
    assert_eq!(placed, vec![Point::new(1, 2, 0), Point::new(1, 2, 1)]);
}

#[test]
fn triples_cover_every_combination() {
    let all: HashSet<_> = RotationTriple::all().collect();
    assert_eq!(all.len(), 64);
}
