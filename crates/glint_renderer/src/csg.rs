//! Constructive solid geometry evaluation trees.
//!
//! A CSG tree combines primitives with boolean operations and answers the
//! same [`Shape`] contract the primitives do, so composites nest freely.
//! Operations never materialize geometry: they combine the children's
//! crossing lists per ray. Intersection and difference reduce each child to
//! the (min, max) extremes of its crossings - a two-interval approximation
//! that handles primitives crossing a ray more than twice (the torus) only
//! approximately.

use std::str::FromStr;

use glint_core::Material;
use glint_math::{Color, Ray, Vec3};
use thiserror::Error;

use crate::shape::{Hit, Shape};

/// The three boolean combination operators.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BooleanOp {
    Union,
    Intersection,
    Difference,
}

/// Error for unrecognized operation names in scene descriptions.
#[derive(Error, Debug)]
#[error("unknown CSG operation `{0}`, expected union, intersection or difference")]
pub struct OpParseError(pub String);

impl FromStr for BooleanOp {
    type Err = OpParseError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name {
            "union" => Ok(BooleanOp::Union),
            "intersection" => Ok(BooleanOp::Intersection),
            "difference" => Ok(BooleanOp::Difference),
            other => Err(OpParseError(other.to_string())),
        }
    }
}

/// A node of a CSG evaluation tree.
///
/// A `Value` wraps exactly one shape; an `Operation` owns exactly two child
/// subtrees. Both operands are required by construction, so a malformed
/// tree cannot exist at query time. Nodes are immutable once built and drop
/// recursively with their owner.
pub enum CsgNode {
    Value(Box<dyn Shape>),
    Operation {
        op: BooleanOp,
        left: Box<CsgNode>,
        right: Box<CsgNode>,
    },
}

impl CsgNode {
    /// Wrap a single shape as a leaf.
    pub fn value(shape: Box<dyn Shape>) -> Self {
        CsgNode::Value(shape)
    }

    /// Combine two subtrees with a boolean operation.
    pub fn operation(op: BooleanOp, left: CsgNode, right: CsgNode) -> Self {
        CsgNode::Operation {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }
}

impl Shape for CsgNode {
    fn intersect(&self, ray: &Ray) -> Option<Hit<'_>> {
        match self {
            CsgNode::Value(shape) => shape.intersect(ray),
            CsgNode::Operation { op, left, right } => {
                // Post-order traversal; both children are evaluated
                // unconditionally, no short-circuiting
                let l = left.intersect(ray);
                let r = right.intersect(ray);
                match op {
                    BooleanOp::Union => union_of(l, r),
                    BooleanOp::Intersection => intersection_of(l, r),
                    BooleanOp::Difference => difference_of(l, r),
                }
            }
        }
    }

    fn material(&self) -> Option<&Material> {
        match self {
            CsgNode::Value(shape) => shape.material(),
            CsgNode::Operation { .. } => None,
        }
    }

    fn normal(&self, ray: &Ray, distance: f32, hit: Option<&Hit>) -> Vec3 {
        match self {
            CsgNode::Value(shape) => shape.normal(ray, distance, hit),
            // The combined surface normal was resolved during intersection
            CsgNode::Operation { .. } => hit.map_or(Vec3::ZERO, |h| h.normal),
        }
    }

    fn set_light(&mut self, light: bool) {
        match self {
            CsgNode::Value(shape) => shape.set_light(light),
            // Composites can't be lights
            CsgNode::Operation { .. } => {}
        }
    }

    fn is_light(&self) -> bool {
        match self {
            CsgNode::Value(shape) => shape.is_light(),
            CsgNode::Operation { .. } => false,
        }
    }

    fn texture_coordinates(&self, point: Vec3, hit: Option<&Hit>) -> Vec3 {
        match self {
            CsgNode::Value(shape) => shape.texture_coordinates(point, hit),
            CsgNode::Operation { .. } => {
                hit.map_or(Vec3::ZERO, |h| h.shape.texture_coordinates(point, hit))
            }
        }
    }

    fn ambient_color(&self, point: Vec3, hit: Option<&Hit>) -> Color {
        match self {
            CsgNode::Value(shape) => shape.ambient_color(point, hit),
            CsgNode::Operation { .. } => composite_color(hit, |s| s.ambient_color(point, hit)),
        }
    }

    fn diffuse_color(&self, point: Vec3, hit: Option<&Hit>) -> Color {
        match self {
            CsgNode::Value(shape) => shape.diffuse_color(point, hit),
            CsgNode::Operation { .. } => composite_color(hit, |s| s.diffuse_color(point, hit)),
        }
    }

    fn specular_color(&self, point: Vec3, hit: Option<&Hit>) -> Color {
        match self {
            CsgNode::Value(shape) => shape.specular_color(point, hit),
            CsgNode::Operation { .. } => composite_color(hit, |s| s.specular_color(point, hit)),
        }
    }
}

/// Composites defer color queries to the primitive cached in the hit.
fn composite_color<'a>(hit: Option<&Hit<'a>>, query: impl Fn(&'a dyn Shape) -> Color) -> Color {
    hit.map_or(Color::ZERO, |h| query(h.shape))
}

/// Union: exists iff either child exists; the nearer surface wins.
fn union_of<'a>(l: Option<Hit<'a>>, r: Option<Hit<'a>>) -> Option<Hit<'a>> {
    // The combined crossing list keeps every child boundary, not just the
    // winner's
    let mut crossings = Vec::new();
    if let Some(h) = &l {
        crossings.extend_from_slice(&h.crossings);
    }
    if let Some(h) = &r {
        crossings.extend_from_slice(&h.crossings);
    }

    // An absent side cannot win the closest comparison; equal distances
    // resolve to the left child. The winner keeps its own shape reference
    // so callers can recover which primitive produced the surface.
    let mut hit = match (l, r) {
        (Some(lh), Some(rh)) => {
            if rh.distance < lh.distance {
                rh
            } else {
                lh
            }
        }
        (Some(lh), None) => lh,
        (None, Some(rh)) => rh,
        (None, None) => return None,
    };

    hit.crossings = crossings;
    hit.inside.clear();
    Some(hit)
}

/// Intersection: both children must exist and their crossing ranges must
/// overlap; the surface belongs to the later-starting range.
fn intersection_of<'a>(l: Option<Hit<'a>>, r: Option<Hit<'a>>) -> Option<Hit<'a>> {
    let (mut lh, mut rh) = match (l, r) {
        (Some(lh), Some(rh)) => (lh, rh),
        _ => return None,
    };

    lh.crossings.sort_by(f32::total_cmp);
    rh.crossings.sort_by(f32::total_cmp);

    let (l_min, l_max) = extremes(&lh.crossings)?;
    let (r_min, r_max) = extremes(&rh.crossings)?;

    if l_min < r_min && l_max > r_min {
        // Left is entered first; the composite starts where right begins
        rh.distance = r_min;
        rh.crossings = vec![r_min, l_max.min(r_max)];
        rh.inside.clear();
        Some(rh)
    } else if r_min < l_min && r_max > l_min {
        lh.distance = l_min;
        lh.crossings = vec![l_min, l_max.min(r_max)];
        lh.inside.clear();
        Some(lh)
    } else {
        None
    }
}

/// Difference (left minus right): non-commutative.
fn difference_of<'a>(l: Option<Hit<'a>>, r: Option<Hit<'a>>) -> Option<Hit<'a>> {
    let mut lh = l?;

    // Nothing to subtract: the left child passes through verbatim
    let Some(mut rh) = r else {
        return Some(lh);
    };

    lh.crossings.sort_by(f32::total_cmp);
    rh.crossings.sort_by(f32::total_cmp);

    let Some((l_min, l_max)) = extremes(&lh.crossings) else {
        return Some(lh);
    };
    let Some((r_min, r_max)) = extremes(&rh.crossings) else {
        return Some(lh);
    };

    // Disjoint ranges: the cut misses the left object entirely
    if r_max < l_min || l_max < r_min {
        return Some(lh);
    }

    let mut crossings = lh.crossings.clone();
    crossings.extend_from_slice(&rh.crossings);

    if l_min < r_min {
        // The left surface is exposed before the cut begins
        Some(Hit {
            shape: lh.shape,
            distance: l_min,
            normal: lh.normal,
            u: lh.u,
            v: lh.v,
            tex_coords: lh.tex_coords,
            crossings,
            inside: Vec::new(),
        })
    } else if r_max < l_max {
        // The cut ends inside the left object: its exit face becomes the
        // visible surface, with the negative object's normal flipped
        Some(Hit {
            shape: rh.shape,
            distance: r_max,
            normal: -rh.normal,
            u: lh.u,
            v: lh.v,
            tex_coords: lh.tex_coords,
            crossings,
            inside: Vec::new(),
        })
    } else {
        // The cut swallows the left object completely
        None
    }
}

/// Smallest and largest crossing of a sorted list.
fn extremes(sorted: &[f32]) -> Option<(f32, f32)> {
    match (sorted.first(), sorted.last()) {
        (Some(&min), Some(&max)) => Some((min, max)),
        _ => None,
    }
}

/// A complete CSG tree: owns the root node and forwards the shape contract
/// to it.
pub struct CsgTree {
    root: CsgNode,
}

impl CsgTree {
    /// Wrap a root node into a tree.
    pub fn new(root: CsgNode) -> Self {
        Self { root }
    }
}

impl Shape for CsgTree {
    fn intersect(&self, ray: &Ray) -> Option<Hit<'_>> {
        self.root.intersect(ray)
    }

    fn material(&self) -> Option<&Material> {
        None
    }

    fn normal(&self, _ray: &Ray, _distance: f32, hit: Option<&Hit>) -> Vec3 {
        hit.map_or(Vec3::ZERO, |h| h.normal)
    }

    fn set_light(&mut self, _light: bool) {
        // Trees can't be lights
    }

    fn is_light(&self) -> bool {
        false
    }

    fn texture_coordinates(&self, point: Vec3, hit: Option<&Hit>) -> Vec3 {
        hit.map_or(Vec3::ZERO, |h| h.shape.texture_coordinates(point, hit))
    }

    fn ambient_color(&self, point: Vec3, hit: Option<&Hit>) -> Color {
        composite_color(hit, |s| s.ambient_color(point, hit))
    }

    fn diffuse_color(&self, point: Vec3, hit: Option<&Hit>) -> Color {
        composite_color(hit, |s| s.diffuse_color(point, hit))
    }

    fn specular_color(&self, point: Vec3, hit: Option<&Hit>) -> Color {
        composite_color(hit, |s| s.specular_color(point, hit))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Sphere;
    use approx::assert_relative_eq;

    fn sphere(center: Vec3, radius: f32, diffuse: Color) -> Box<dyn Shape> {
        let material = Material {
            diffuse,
            ..Default::default()
        };
        Box::new(Sphere::new(center, radius, material))
    }

    fn value(center: Vec3, radius: f32, diffuse: Color) -> CsgNode {
        CsgNode::value(sphere(center, radius, diffuse))
    }

    const RED: Color = Color::new(1.0, 0.0, 0.0);
    const BLUE: Color = Color::new(0.0, 0.0, 1.0);

    #[test]
    fn test_value_delegates_verbatim() {
        let standalone = Sphere::new(Vec3::new(0.0, 0.0, -4.0), 1.0, Material::default());
        let node = value(Vec3::new(0.0, 0.0, -4.0), 1.0, Color::new(0.5, 0.5, 0.5));
        let ray = Ray::new(Vec3::ZERO, Vec3::NEG_Z);

        let direct = standalone.intersect(&ray).unwrap();
        let wrapped = node.intersect(&ray).unwrap();

        assert_eq!(direct.distance, wrapped.distance);
        assert_eq!(direct.normal, wrapped.normal);
        assert_eq!(direct.crossings, wrapped.crossings);
    }

    #[test]
    fn test_op_names_parse() {
        assert_eq!("union".parse::<BooleanOp>().unwrap(), BooleanOp::Union);
        assert_eq!(
            "intersection".parse::<BooleanOp>().unwrap(),
            BooleanOp::Intersection
        );
        assert_eq!(
            "difference".parse::<BooleanOp>().unwrap(),
            BooleanOp::Difference
        );
        assert!("xor".parse::<BooleanOp>().is_err());
    }

    #[test]
    fn test_union_picks_nearer_child() {
        // Two disjoint spheres along the ray; the near one wins
        let near = value(Vec3::new(0.0, 0.0, -3.0), 1.0, RED);
        let far = value(Vec3::new(0.0, 0.0, -8.0), 1.0, BLUE);
        let union = CsgNode::operation(BooleanOp::Union, far, near);
        let ray = Ray::new(Vec3::ZERO, Vec3::NEG_Z);

        let hit = union.intersect(&ray).expect("union of two hits exists");
        assert_relative_eq!(hit.distance, 2.0, epsilon = 1e-4);
        // The winner is the concrete primitive, not the composite
        assert_eq!(hit.shape.diffuse_color(ray.at(hit.distance), Some(&hit)), RED);
        // Crossings of both children survive the combination
        assert_eq!(hit.crossings.len(), 4);
    }

    #[test]
    fn test_union_through_one_sphere_only() {
        // Ray only passes through sphere A of a disjoint pair
        let a = value(Vec3::new(0.0, 0.0, -3.0), 1.0, RED);
        let b = value(Vec3::new(0.0, 5.0, -3.0), 1.0, BLUE);
        let union = CsgNode::operation(BooleanOp::Union, a, b);
        let ray = Ray::new(Vec3::ZERO, Vec3::NEG_Z);

        let hit = union.intersect(&ray).expect("A alone keeps the union alive");
        assert_relative_eq!(hit.distance, 2.0, epsilon = 1e-4);
        assert_eq!(hit.shape.diffuse_color(ray.at(hit.distance), Some(&hit)), RED);
        assert_eq!(hit.crossings.len(), 2);
    }

    #[test]
    fn test_union_misses_when_both_miss() {
        let a = value(Vec3::new(0.0, 5.0, -3.0), 1.0, RED);
        let b = value(Vec3::new(0.0, -5.0, -3.0), 1.0, BLUE);
        let union = CsgNode::operation(BooleanOp::Union, a, b);
        let ray = Ray::new(Vec3::ZERO, Vec3::NEG_Z);

        assert!(union.intersect(&ray).is_none());
    }

    #[test]
    fn test_intersection_requires_both() {
        let a = value(Vec3::new(0.0, 0.0, -3.0), 1.0, RED);
        let b = value(Vec3::new(0.0, 5.0, -3.0), 1.0, BLUE);
        let isect = CsgNode::operation(BooleanOp::Intersection, a, b);
        let ray = Ray::new(Vec3::ZERO, Vec3::NEG_Z);

        assert!(isect.intersect(&ray).is_none());
    }

    #[test]
    fn test_intersection_of_overlapping_spheres() {
        // A spans t in [2, 4], B spans t in [3.5, 5.5] along the ray
        let a = value(Vec3::ZERO, 1.0, RED);
        let b = value(Vec3::new(1.5, 0.0, 0.0), 1.0, BLUE);
        let isect = CsgNode::operation(BooleanOp::Intersection, a, b);
        let ray = Ray::new(Vec3::new(-3.0, 0.0, 0.0), Vec3::X);

        let hit = isect.intersect(&ray).expect("overlap exists");
        // The later-starting range (B) owns the entry surface
        assert_relative_eq!(hit.distance, 3.5, epsilon = 1e-4);
        assert_eq!(hit.shape.diffuse_color(ray.at(hit.distance), Some(&hit)), BLUE);
        // Two-element [entry, exit] crossing pair
        assert_eq!(hit.crossings.len(), 2);
        assert_relative_eq!(hit.crossings[0], 3.5, epsilon = 1e-4);
        assert_relative_eq!(hit.crossings[1], 4.0, epsilon = 1e-4);
    }

    #[test]
    fn test_intersection_of_disjoint_ranges() {
        let a = value(Vec3::ZERO, 1.0, RED);
        let b = value(Vec3::new(5.0, 0.0, 0.0), 1.0, BLUE);
        let isect = CsgNode::operation(BooleanOp::Intersection, a, b);
        let ray = Ray::new(Vec3::new(-3.0, 0.0, 0.0), Vec3::X);

        assert!(isect.intersect(&ray).is_none());
    }

    #[test]
    fn test_difference_needs_left() {
        let a = value(Vec3::new(0.0, 5.0, 0.0), 1.0, RED);
        let b = value(Vec3::ZERO, 1.0, BLUE);
        let diff = CsgNode::operation(BooleanOp::Difference, a, b);
        let ray = Ray::new(Vec3::new(-3.0, 0.0, 0.0), Vec3::X);

        assert!(diff.intersect(&ray).is_none());
    }

    #[test]
    fn test_difference_without_right_equals_left() {
        let left_sphere = Sphere::new(Vec3::ZERO, 1.0, Material::default());
        let a = value(Vec3::ZERO, 1.0, RED);
        let b = value(Vec3::new(0.0, 5.0, 0.0), 1.0, BLUE);
        let diff = CsgNode::operation(BooleanOp::Difference, a, b);
        let ray = Ray::new(Vec3::new(-3.0, 0.0, 0.0), Vec3::X);

        let hit = diff.intersect(&ray).expect("left passes through");
        let reference = left_sphere.intersect(&ray).unwrap();

        assert_eq!(hit.distance, reference.distance);
        assert_eq!(hit.normal, reference.normal);
        assert_eq!(hit.crossings, reference.crossings);
    }

    #[test]
    fn test_difference_exposes_left_entry() {
        // B is enclosed in A; from outside the ray still sees A's entry
        let a = value(Vec3::ZERO, 2.0, RED);
        let b = value(Vec3::ZERO, 1.0, BLUE);
        let diff = CsgNode::operation(BooleanOp::Difference, a, b);
        let ray = Ray::new(Vec3::new(-5.0, 0.0, 0.0), Vec3::X);

        let hit = diff.intersect(&ray).expect("shell surface");
        assert_relative_eq!(hit.distance, 3.0, epsilon = 1e-4);
        assert_eq!(hit.shape.diffuse_color(ray.at(hit.distance), Some(&hit)), RED);
        // All four boundaries survive in the crossing list
        assert_eq!(hit.crossings.len(), 4);
    }

    #[test]
    fn test_difference_exposes_carved_boundary() {
        // From inside the cavity the visible surface is B's far boundary
        // with its normal flipped inward
        let a = value(Vec3::ZERO, 2.0, RED);
        let b = value(Vec3::ZERO, 1.0, BLUE);
        let diff = CsgNode::operation(BooleanOp::Difference, a, b);
        let ray = Ray::new(Vec3::ZERO, Vec3::X);

        let hit = diff.intersect(&ray).expect("cavity wall");
        assert_relative_eq!(hit.distance, 1.0, epsilon = 1e-4);
        assert_eq!(hit.shape.diffuse_color(ray.at(hit.distance), Some(&hit)), BLUE);
        assert_relative_eq!(hit.normal.x, -1.0, epsilon = 1e-4);
    }

    #[test]
    fn test_nested_composite() {
        // (A ∪ B) − C still answers the shape contract
        let a = value(Vec3::ZERO, 1.0, RED);
        let b = value(Vec3::new(1.0, 0.0, 0.0), 1.0, BLUE);
        let c = value(Vec3::new(0.5, 0.0, 0.0), 0.5, BLUE);
        let tree = CsgTree::new(CsgNode::operation(
            BooleanOp::Difference,
            CsgNode::operation(BooleanOp::Union, a, b),
            c,
        ));
        let ray = Ray::new(Vec3::new(-4.0, 0.0, 0.0), Vec3::X);

        let hit = tree.intersect(&ray).expect("composite hit");
        // The union is entered at A's near surface, untouched by the cut
        assert_relative_eq!(hit.distance, 3.0, epsilon = 1e-4);
        assert!(tree.material().is_none());
    }
}
