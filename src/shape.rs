//! Polycube shapes: an immutable list of distinct unit cells.

use std::{fmt, str::FromStr};

use hashbrown::HashSet;

use crate::{
    error::{Error, Result},
    geometry::{bounds, Point},
};

/// Largest absolute coordinate a shape point may have. Rotating and placing
/// a shape within this range cannot overflow an `i32`.
pub const MAX_COORDINATE: i32 = 1 << 20;

/// Largest number of cells in a box built by [`Shape::from_size`].
pub const MAX_CELLS: usize = 1 << 24;

/// The extents of a shape along each axis, stored as `len()` per axis,
/// so the unit cube has a size of (1, 1, 1) and a 1x1x2 bar (1, 1, 2).
#[derive(PartialEq, Eq, Hash, Clone, Copy, Debug, PartialOrd, Ord)]
pub struct Dim {
    pub x: usize,
    pub y: usize,
    pub z: usize,
}

impl Dim {
    pub fn volume(&self) -> usize {
        self.x * self.y * self.z
    }
}

/// A polycube.
///
/// Points keep the order they were given in; the order carries no geometric
/// meaning.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Shape {
    points: Vec<Point>,
    dims: Dim,
}

impl Shape {
    /// Create a shape from an explicit list of points.
    ///
    /// The list must be non-empty, free of duplicates and every coordinate
    /// must be within [`MAX_COORDINATE`].
    pub fn new(points: Vec<Point>) -> Result<Self> {
        let in_range = |c: i32| (-MAX_COORDINATE..=MAX_COORDINATE).contains(&c);
        if let Some(p) = points.iter().find(|p| ![p.x, p.y, p.z].into_iter().all(in_range)) {
            return Err(Error::CoordinateOutOfRange(*p));
        }

        let bounds = bounds(&points).ok_or(Error::EmptyShape)?;

        let mut seen = HashSet::with_capacity(points.len());
        if let Some(dup) = points.iter().find(|p| !seen.insert(**p)) {
            return Err(Error::DuplicatePoint(*dup));
        }

        let (x, y, z) = bounds.extents();

        Ok(Self {
            points,
            dims: Dim { x, y, z },
        })
    }

    /// Create a solid `length_x` x `length_y` x `length_z` box.
    pub fn from_size(length_x: usize, length_y: usize, length_z: usize) -> Result<Self> {
        let invalid = || Error::InvalidExtent(length_x, length_y, length_z);

        let cells = length_x
            .checked_mul(length_y)
            .and_then(|c| c.checked_mul(length_z))
            .filter(|c| (1..=MAX_CELLS).contains(c))
            .ok_or_else(invalid)?;

        let extent = |l: usize| i32::try_from(l).map_err(|_| invalid());
        let (lx, ly, lz) = (extent(length_x)?, extent(length_y)?, extent(length_z)?);

        let mut points = Vec::with_capacity(cells);
        for x in 0..lx {
            for y in 0..ly {
                for z in 0..lz {
                    points.push(Point::new(x, y, z));
                }
            }
        }

        Self::new(points)
    }

    /// Look up one of the built-in shapes by name.
    pub fn preset(name: &str) -> Result<Self> {
        let raw: &[[i32; 3]] = match name {
            "bar" => &[[0, 0, 0], [0, 0, 1]],
            "tee" => &[[0, 0, 0], [1, 0, 0], [2, 0, 0], [3, 0, 0], [1, 0, 1]],
            "ell" => &[
                [0, 0, 0],
                [1, 0, 0],
                [2, 0, 0],
                [0, 0, 1],
                [1, 0, 1],
                [2, 0, 1],
                [0, 0, 2],
                [0, 0, 3],
            ],
            "tripod" => &[[0, 0, 0], [1, 0, 0], [0, 1, 0], [0, 0, 1]],
            _ => return Err(Error::UnknownPreset(name.to_string())),
        };

        Self::new(raw.iter().copied().map(Point::from).collect())
    }

    pub const PRESETS: [&'static str; 4] = ["bar", "tee", "ell", "tripod"];

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn dims(&self) -> Dim {
        self.dims
    }

    /// The number of unit cells in this shape.
    pub fn size(&self) -> usize {
        self.points.len()
    }
}

/// Parses `x,y,z;x,y,z;...`. Whitespace around numbers is ignored.
impl FromStr for Shape {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let points = s
            .split(';')
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(|p| {
                let coords = p
                    .split(',')
                    .map(|c| {
                        c.trim()
                            .parse::<i32>()
                            .map_err(|e| Error::ParseShape(format!("`{c}` in `{p}`: {e}")))
                    })
                    .collect::<Result<Vec<_>>>()?;

                match coords[..] {
                    [x, y, z] => Ok(Point::new(x, y, z)),
                    _ => Err(Error::ParseShape(format!(
                        "`{p}` has {} coordinates, expected 3",
                        coords.len()
                    ))),
                }
            })
            .collect::<Result<Vec<_>>>()?;

        Self::new(points)
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text: Vec<String> = self
            .points
            .iter()
            .map(|p| format!("{},{},{}", p.x, p.y, p.z))
            .collect();
        write!(f, "{}", text.join(";"))
    }
}

#[test]
fn from_size() {
    let shape = Shape::from_size(2, 2, 2).unwrap();
    assert_eq!(shape.dims(), Dim { x: 2, y: 2, z: 2 });
    assert_eq!(shape.size(), 8);

    let bar = Shape::from_size(1, 1, 2).unwrap();
    assert_eq!(bar.points(), &[Point::new(0, 0, 0), Point::new(0, 0, 1)]);
}

#[test]
fn from_points() {
    let shape = Shape::new(
        [
            [0, 0, 0],
            [1, 0, 0],
            [0, 1, 0],
            [1, 1, 0],
            [0, 0, 1],
            [1, 0, 1],
            [0, 1, 1],
            [1, 1, 1],
        ]
        .into_iter()
        .map(Point::from)
        .collect(),
    )
    .unwrap();

    assert_eq!(shape.dims(), Dim { x: 2, y: 2, z: 2 });
    assert_eq!(shape.size(), 8);
}

#[test]
fn invalid_shapes() {
    assert!(matches!(Shape::new(Vec::new()), Err(Error::EmptyShape)));
    assert!(matches!(
        Shape::new(vec![Point::new(0, 0, 0), Point::new(1, 0, 0), Point::new(0, 0, 0)]),
        Err(Error::DuplicatePoint(p)) if p == Point::ORIGIN
    ));
    assert!(matches!(
        Shape::from_size(1, 0, 2),
        Err(Error::InvalidExtent(1, 0, 2))
    ));
    assert!(matches!(Shape::preset("blob"), Err(Error::UnknownPreset(_))));
}

#[test]
fn oversized_boxes_are_rejected() {
    assert!(matches!(
        Shape::from_size(usize::MAX, 1, 1),
        Err(Error::InvalidExtent(usize::MAX, 1, 1))
    ));
    assert!(matches!(
        Shape::from_size(1 << 40, 1 << 40, 1 << 40),
        Err(Error::InvalidExtent(..))
    ));
    assert!(matches!(
        Shape::from_size(MAX_CELLS + 1, 1, 1),
        Err(Error::InvalidExtent(..))
    ));
    assert_eq!(Shape::from_size(1, 1, 300).unwrap().dims().z, 300);
}

#[test]
fn coordinates_out_of_range() {
    assert!(matches!(
        "0,0,-2147483648".parse::<Shape>(),
        Err(Error::CoordinateOutOfRange(p)) if p == Point::new(0, 0, i32::MIN)
    ));
    assert!(matches!(
        Shape::new(vec![Point::ORIGIN, Point::new(i32::MAX, 0, 0)]),
        Err(Error::CoordinateOutOfRange(_))
    ));
    assert!(matches!(
        Shape::new(vec![Point::new(0, MAX_COORDINATE + 1, 0)]),
        Err(Error::CoordinateOutOfRange(_))
    ));

    let edge = Shape::new(vec![Point::new(-MAX_COORDINATE, 0, MAX_COORDINATE)]).unwrap();
    assert_eq!(edge.dims(), Dim { x: 1, y: 1, z: 1 });
}

#[test]
fn parse_shape() {
    let shape: Shape = "0,0,0; 1,0,0 ;2,0,0;3,0,0;1,0,1".parse().unwrap();
    assert_eq!(shape, Shape::preset("tee").unwrap());
    assert_eq!(shape.dims(), Dim { x: 4, y: 1, z: 2 });
    assert_eq!(shape.to_string().parse::<Shape>().unwrap(), shape);

    assert!(matches!("0,0".parse::<Shape>(), Err(Error::ParseShape(_))));
    assert!(matches!("0,a,0".parse::<Shape>(), Err(Error::ParseShape(_))));
    assert!(matches!("".parse::<Shape>(), Err(Error::EmptyShape)));
}

#[test]
fn presets_are_valid() {
    for name in Shape::PRESETS {
        assert!(Shape::preset(name).is_ok(), "{name}");
    }
    assert_eq!(Shape::preset("ell").unwrap().size(), 8);
}
