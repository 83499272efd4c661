//! Integer point geometry: quarter-turn rotations about the three axes,
//! origin normalization and bounding boxes.

use std::fmt;

/// A single unit cell, addressed by its integer coordinates.
#[derive(PartialEq, Eq, Hash, Clone, Copy, Debug, PartialOrd, Ord, Default)]
pub struct Point {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl Point {
    pub const ORIGIN: Point = Point { x: 0, y: 0, z: 0 };

    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Key ordering points in cube scan order: x varies fastest, then y, then z.
    pub fn scan_key(&self) -> (i32, i32, i32) {
        (self.z, self.y, self.x)
    }
}

impl From<(i32, i32, i32)> for Point {
    fn from((x, y, z): (i32, i32, i32)) -> Self {
        Self { x, y, z }
    }
}

impl From<[i32; 3]> for Point {
    fn from([x, y, z]: [i32; 3]) -> Self {
        Self { x, y, z }
    }
}

impl std::ops::Add for Point {
    type Output = Point;

    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl std::ops::Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}, {}]", self.x, self.y, self.z)
    }
}

#[derive(PartialEq, Eq, Hash, Clone, Copy, Debug)]
pub enum Axis {
    X,
    Y,
    Z,
}

/// A rotation by a whole number of quarter turns.
#[derive(PartialEq, Eq, Hash, Clone, Copy, Debug, PartialOrd, Ord, Default)]
pub enum Rotation {
    #[default]
    R0,
    R90,
    R180,
    R270,
}

impl Rotation {
    pub const ALL: [Rotation; 4] = [Rotation::R0, Rotation::R90, Rotation::R180, Rotation::R270];

    pub fn degrees(&self) -> u32 {
        match self {
            Rotation::R0 => 0,
            Rotation::R90 => 90,
            Rotation::R180 => 180,
            Rotation::R270 => 270,
        }
    }
}

impl fmt::Display for Rotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.degrees())
    }
}

/// Rotate `point` about `axis` using the right hand rule.
///
/// About X the plane `(y, z)` turns: 90 maps it to `(-z, y)`, 180 to
/// `(-y, -z)` and 270 to `(z, -y)`. Y turns `(z, x)` and Z turns `(x, y)`
/// with the same formulas.
pub fn rotate_point(point: Point, axis: Axis, rotation: Rotation) -> Point {
    #[inline]
    fn turn(a: i32, b: i32, rotation: Rotation) -> (i32, i32) {
        match rotation {
            Rotation::R0 => (a, b),
            Rotation::R90 => (-b, a),
            Rotation::R180 => (-a, -b),
            Rotation::R270 => (b, -a),
        }
    }

    let Point { x, y, z } = point;
    match axis {
        Axis::X => {
            let (y, z) = turn(y, z, rotation);
            Point { x, y, z }
        }
        Axis::Y => {
            let (z, x) = turn(z, x, rotation);
            Point { x, y, z }
        }
        Axis::Z => {
            let (x, y) = turn(x, y, rotation);
            Point { x, y, z }
        }
    }
}

/// Rotate every point, optionally normalizing the result back to the origin.
pub fn rotate_points(points: &[Point], axis: Axis, rotation: Rotation, normalize: bool) -> Vec<Point> {
    let rotated: Vec<Point> = points
        .iter()
        .map(|p| rotate_point(*p, axis, rotation))
        .collect();

    if normalize {
        reset_origin(&rotated, None)
    } else {
        rotated
    }
}

/// Translate a point set.
///
/// Without an offset the set is shifted so that its minimum on every axis
/// becomes zero. With an offset every point has that offset added, which
/// places a local point set at a world position.
pub fn reset_origin(points: &[Point], offset: Option<Point>) -> Vec<Point> {
    let shift = match offset {
        Some(offset) => offset,
        None => match bounds(points) {
            Some(b) => Point::ORIGIN - b.min,
            None => return Vec::new(),
        },
    };

    points.iter().map(|p| *p + shift).collect()
}

/// Per-axis minimum and maximum of a point set.
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub struct Bounds {
    pub min: Point,
    pub max: Point,
}

impl Bounds {
    /// Number of cells spanned on each axis (`max - min + 1`).
    pub fn extents(&self) -> (usize, usize, usize) {
        (
            (self.max.x - self.min.x + 1) as usize,
            (self.max.y - self.min.y + 1) as usize,
            (self.max.z - self.min.z + 1) as usize,
        )
    }
}

/// Returns `None` for an empty point set.
pub fn bounds(points: &[Point]) -> Option<Bounds> {
    let first = *points.first()?;

    let bounds = points.iter().fold(
        Bounds {
            min: first,
            max: first,
        },
        |mut b, p| {
            b.min.x = b.min.x.min(p.x);
            b.min.y = b.min.y.min(p.y);
            b.min.z = b.min.z.min(p.z);
            b.max.x = b.max.x.max(p.x);
            b.max.y = b.max.y.max(p.y);
            b.max.z = b.max.z.max(p.z);
            b
        },
    );

    Some(bounds)
}

#[cfg(test)]
fn pts(raw: &[[i32; 3]]) -> Vec<Point> {
    raw.iter().copied().map(Point::from).collect()
}

#[test]
fn rotate_about_x() {
    let r = |p: [i32; 3], rot| rotate_point(p.into(), Axis::X, rot);

    assert_eq!(r([0, 0, 0], Rotation::R90), Point::new(0, 0, 0));
    assert_eq!(r([1, 0, 0], Rotation::R90), Point::new(1, 0, 0));
    assert_eq!(r([1, 1, 0], Rotation::R90), Point::new(1, 0, 1));
    assert_eq!(r([1, 1, 0], Rotation::R180), Point::new(1, -1, 0));
    assert_eq!(r([1, 0, 1], Rotation::R180), Point::new(1, 0, -1));
    assert_eq!(r([1, 0, 1], Rotation::R270), Point::new(1, 1, 0));
}

#[test]
fn rotate_about_y_and_z() {
    assert_eq!(
        rotate_point(Point::new(1, 0, 0), Axis::Y, Rotation::R90),
        Point::new(0, 0, -1)
    );
    assert_eq!(
        rotate_point(Point::new(0, 0, 1), Axis::Y, Rotation::R270),
        Point::new(-1, 0, 0)
    );
    assert_eq!(
        rotate_point(Point::new(1, 0, 0), Axis::Z, Rotation::R90),
        Point::new(0, 1, 0)
    );
    assert_eq!(
        rotate_point(Point::new(2, 3, 4), Axis::Z, Rotation::R180),
        Point::new(-2, -3, 4)
    );
}

#[test]
fn four_quarter_turns_are_identity() {
    let p = Point::new(3, -2, 5);
    for axis in [Axis::X, Axis::Y, Axis::Z] {
        let mut q = p;
        for _ in 0..4 {
            q = rotate_point(q, axis, Rotation::R90);
        }
        assert_eq!(q, p);
    }
}

#[test]
fn reset_origin_normalizes() {
    let points = pts(&[[0, 0, 0], [-1, 0, 0]]);

    assert_eq!(reset_origin(&points, None), pts(&[[1, 0, 0], [0, 0, 0]]));
    // input untouched
    assert_eq!(points, pts(&[[0, 0, 0], [-1, 0, 0]]));
}

#[test]
fn reset_origin_is_idempotent_on_normalized_sets() {
    let points = pts(&[[0, 0, 1], [1, 0, 1], [2, 0, 1], [3, 0, 1], [1, 0, 0]]);
    assert_eq!(reset_origin(&points, None), points);
}

#[test]
fn reset_origin_with_offset() {
    let points = pts(&[[0, 0, 0], [1, 0, 2]]);
    let shifted = reset_origin(&points, Some(Point::new(2, 1, 0)));
    assert_eq!(shifted, pts(&[[2, 1, 0], [3, 1, 2]]));
    assert!(reset_origin(&[], None).is_empty());
}

#[test]
fn rotate_points_x_180_round_trips() {
    let shape = pts(&[[0, 0, 0], [1, 0, 0], [2, 0, 0], [3, 0, 0], [1, 0, 1]]);
    let expected = pts(&[[0, 0, 1], [1, 0, 1], [2, 0, 1], [3, 0, 1], [1, 0, 0]]);

    let rotated = rotate_points(&shape, Axis::X, Rotation::R180, true);
    assert!(expected.iter().all(|p| rotated.contains(p)));

    let back = rotate_points(&expected, Axis::X, Rotation::R180, true);
    assert!(shape.iter().all(|p| back.contains(p)));
}

#[test]
fn bounds_of_points() {
    assert_eq!(bounds(&[]), None);

    let b = bounds(&pts(&[[1, -2, 0], [3, 0, 4], [2, 1, 1]])).unwrap();
    assert_eq!(b.min, Point::new(1, -2, 0));
    assert_eq!(b.max, Point::new(3, 1, 4));
    assert_eq!(b.extents(), (3, 4, 5));
}
