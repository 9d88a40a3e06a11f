//! Point-in-shape containment tests.
//!
//! Each shape variant answers containment its own way: points and
//! multipoints by exact coordinate equality, polylines by their bounding
//! box alone (a line has no interior), and polygons by a nearest-edge side
//! test. The polygon test is not a crossing-number or winding algorithm:
//! it rescales everything into a fixed grid, finds the edge nearest the
//! query point, and classifies the point by which side of that edge it
//! falls on. The tie-break and orientation rules below are part of the
//! contract and are preserved as is, including their behavior near concave
//! vertices and interior rings.

use super::constants::POLYGON_GRID_SPAN;
use super::shape::{PolyShape, Shape};

impl Shape {
    /// Returns true when this shape contains the query point.
    pub fn contains(&self, x: f64, y: f64) -> bool {
        match self {
            Shape::Point(point) => point.x == x && point.y == y,
            Shape::MultiPoint(multi) => {
                multi.bbox.contains_point(x, y)
                    && multi.points.iter().any(|p| p.x == x && p.y == y)
            }
            // A polyline never reports containment beyond its box.
            Shape::PolyLine(line) => line.bbox.contains_point(x, y),
            Shape::Polygon(polygon) => polygon_contains(polygon, x, y),
        }
    }
}

/// A 2D vector in the rescaled grid space.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Vec2 {
    x: f64,
    y: f64,
}

impl Vec2 {
    fn sub(self, other: Vec2) -> Vec2 {
        Vec2 {
            x: self.x - other.x,
            y: self.y - other.y,
        }
    }

    fn add(self, other: Vec2) -> Vec2 {
        Vec2 {
            x: self.x + other.x,
            y: self.y + other.y,
        }
    }

    fn scale(self, s: f64) -> Vec2 {
        Vec2 {
            x: self.x * s,
            y: self.y * s,
        }
    }

    fn dot(self, other: Vec2) -> f64 {
        self.x * other.x + self.y * other.y
    }

    fn distance(self, other: Vec2) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// Projection parameter of `p` onto the segment `a..b`: 0 at `a`, 1 at
/// `b`. The direction vector is end minus start; a zero-length edge would
/// leave this undefined, so callers must filter coincident endpoints
/// before asking.
fn projection(p: Vec2, a: Vec2, b: Vec2) -> f64 {
    let v = b.sub(a);
    p.sub(a).dot(v) / v.dot(v)
}

/// Distance from `p` to the segment `a..b`: the perpendicular foot when
/// the projection falls strictly between the endpoints, otherwise the
/// nearer endpoint.
fn segment_distance(p: Vec2, a: Vec2, b: Vec2) -> f64 {
    let s = projection(p, a, b);
    if s > 0.0 && s < 1.0 {
        p.distance(a.add(b.sub(a).scale(s)))
    } else if s >= 1.0 {
        p.distance(b)
    } else {
        p.distance(a)
    }
}

/// Tie-break metric: how far the projection parameter sits from the
/// segment midpoint. Smaller means the point faces the edge more squarely.
fn midpoint_bias(p: Vec2, a: Vec2, b: Vec2) -> f64 {
    (projection(p, a, b) - 0.5).abs()
}

/// The nearest-edge side test.
///
/// All ring vertices and the query point are rescaled into a fixed
/// 1000-unit grid so the distance comparisons behave the same across
/// wildly different coordinate magnitudes. Edges are consecutive vertex
/// pairs that stay within one part; the edge from vertex 0 to vertex 1 is
/// the initial candidate. The point is inside iff the signed area of
/// (edge start, edge end, point) is strictly positive:
/// cross(start - end, point - end) > 0.
fn polygon_contains(polygon: &PolyShape, x: f64, y: f64) -> bool {
    if !polygon.bbox.contains_point(x, y) {
        return false;
    }
    // No vertex pair means no edge to classify against.
    if polygon.points.len() < 2 {
        return false;
    }

    let x_ratio = POLYGON_GRID_SPAN / polygon.bbox.width();
    let y_ratio = POLYGON_GRID_SPAN / polygon.bbox.height();
    let rescale = |px: f64, py: f64| Vec2 {
        x: (px - polygon.bbox.min_x) * x_ratio,
        y: (py - polygon.bbox.min_y) * y_ratio,
    };

    let vertices: Vec<Vec2> = polygon.points.iter().map(|p| rescale(p.x, p.y)).collect();
    let p = rescale(x, y);

    let mut closest = 1;
    let mut part = 1;
    for i in 2..vertices.len() {
        if part < polygon.parts.len() && polygon.parts[part] == i as i32 {
            // Vertex i starts a new ring; the edge ending here spans two
            // parts and is not a real boundary segment.
            part += 1;
        } else if vertices[i] != vertices[i - 1] {
            let mag = segment_distance(p, vertices[i - 1], vertices[i])
                - segment_distance(p, vertices[closest - 1], vertices[closest]);
            if mag < 0.0 {
                closest = i;
            } else if mag == 0.0
                && midpoint_bias(p, vertices[i - 1], vertices[i])
                    < midpoint_bias(p, vertices[closest - 1], vertices[closest])
            {
                closest = i;
            }
        }
    }

    let first = vertices[closest - 1];
    let second = vertices[closest];
    (first.x - second.x) * (p.y - second.y) - (first.y - second.y) * (p.x - second.x) > 0.0
}
