use crate::error::{Error, Result};
use crate::point::{Landmark, Point, PredictedPoint};
use crate::skeleton::{Node, NodeRef, Skeleton};

use nalgebra as na;
use ndarray::prelude::*;
use std::collections::HashMap;
use std::hash::BuildHasher;
use std::rc::Rc;

/// A single point as supplied by a caller: bare coordinates or an
/// already-built point of the instance's point type.
#[derive(Debug, Clone, PartialEq)]
pub enum RawPoint<P> {
    Coords(f64, f64),
    Point(P),
}

impl<P> From<(f64, f64)> for RawPoint<P> {
    #[inline]
    fn from((x, y): (f64, f64)) -> Self {
        RawPoint::Coords(x, y)
    }
}

impl<P> From<[f64; 2]> for RawPoint<P> {
    #[inline]
    fn from([x, y]: [f64; 2]) -> Self {
        RawPoint::Coords(x, y)
    }
}

impl From<Point> for RawPoint<Point> {
    #[inline]
    fn from(pt: Point) -> Self {
        RawPoint::Point(pt)
    }
}

impl From<PredictedPoint> for RawPoint<PredictedPoint> {
    #[inline]
    fn from(pt: PredictedPoint) -> Self {
        RawPoint::Point(pt)
    }
}

/// The accepted input shapes for an instance's points.
#[derive(Debug, Clone)]
pub enum RawPoints<P> {
    /// `(n_nodes, 2)` coordinates in skeleton node order.
    Array(Array2<f64>),
    /// One entry per skeleton node, in node order.
    List(Vec<RawPoint<P>>),
    /// Entries keyed by node, node name or node index; may be partial.
    Map(Vec<(NodeRef, RawPoint<P>)>),
}

impl<P> RawPoints<P> {
    pub fn map<K, V, I>(entries: I) -> Self
    where
        K: Into<NodeRef>,
        V: Into<RawPoint<P>>,
        I: IntoIterator<Item = (K, V)>,
    {
        RawPoints::Map(
            entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl<P> From<Array2<f64>> for RawPoints<P> {
    fn from(arr: Array2<f64>) -> Self {
        RawPoints::Array(arr)
    }
}

impl<P> From<ArrayView2<'_, f64>> for RawPoints<P> {
    fn from(arr: ArrayView2<'_, f64>) -> Self {
        RawPoints::Array(arr.to_owned())
    }
}

impl<P, T> From<Vec<T>> for RawPoints<P>
where
    T: Into<RawPoint<P>>,
{
    fn from(list: Vec<T>) -> Self {
        RawPoints::List(list.into_iter().map(Into::into).collect())
    }
}

impl<P, K, V, S> From<HashMap<K, V, S>> for RawPoints<P>
where
    K: Into<NodeRef>,
    V: Into<RawPoint<P>>,
    S: BuildHasher,
{
    fn from(map: HashMap<K, V, S>) -> Self {
        RawPoints::map(map)
    }
}

fn zip_nodes<P>(
    skeleton: &Skeleton,
    list: Vec<RawPoint<P>>,
) -> Result<Vec<(NodeRef, RawPoint<P>)>> {
    if list.len() != skeleton.len() {
        return Err(Error::LengthMismatch {
            expected: skeleton.len(),
            actual: list.len(),
        });
    }

    Ok(skeleton
        .nodes()
        .iter()
        .cloned()
        .map(NodeRef::Node)
        .zip(list)
        .collect())
}

fn array_rows<P>(arr: &Array2<f64>) -> Result<Vec<RawPoint<P>>> {
    if arr.ncols() != 2 {
        return Err(Error::ShapeMismatch {
            expected: 2,
            actual: arr.ncols(),
        });
    }

    Ok(arr
        .outer_iter()
        .map(|row| RawPoint::Coords(row[0], row[1]))
        .collect())
}

/// Normalizes raw points into a mapping holding exactly one point per
/// skeleton node. Nodes that were not supplied get an invisible NaN point.
pub fn convert_points<P: Landmark>(
    skeleton: &Skeleton,
    raw: RawPoints<P>,
) -> Result<HashMap<Node, P>> {
    let entries = match raw {
        RawPoints::Array(arr) => zip_nodes(skeleton, array_rows(&arr)?)?,
        RawPoints::List(list) => zip_nodes(skeleton, list)?,
        RawPoints::Map(map) => map,
    };

    let mut points = HashMap::with_capacity(skeleton.len());
    for (key, value) in entries {
        let node = skeleton.node(key)?;
        let point = match value {
            RawPoint::Coords(x, y) => P::from_coords(x, y),
            RawPoint::Point(pt) => pt,
        };

        points.insert(node, point);
    }

    let mut missing = 0;
    for node in skeleton.nodes() {
        if !points.contains_key(node) {
            points.insert(node.clone(), P::missing());
            missing += 1;
        }
    }

    if missing > 0 {
        log::debug!(
            "filled {} of {} nodes with missing points",
            missing,
            skeleton.len()
        );
    }

    Ok(points)
}

/// Node sets must match exactly, then every pair of points must be equal.
pub fn compare_points<P: PartialEq, S: BuildHasher>(
    a: &HashMap<Node, P, S>,
    b: &HashMap<Node, P, S>,
) -> bool {
    if a.len() != b.len() || !a.keys().all(|node| b.contains_key(node)) {
        return false;
    }

    for (node, point) in a {
        if b.get(node) != Some(point) {
            log::debug!("points differ at node {}", node);
            return false;
        }
    }

    true
}

/// A normalized node-to-point mapping bound to its skeleton.
///
/// The mapping can only be replaced through [`PointSet::set`], which runs
/// the same normalization as construction.
#[derive(Debug, Clone)]
pub struct PointSet<P> {
    skeleton: Rc<Skeleton>,
    points: HashMap<Node, P>,
}

impl<P: Landmark> PointSet<P> {
    pub fn new(skeleton: Rc<Skeleton>, raw: impl Into<RawPoints<P>>) -> Result<Self> {
        let points = convert_points(&skeleton, raw.into())?;

        Ok(Self { skeleton, points })
    }

    /// Replaces all points. On error the current points are left untouched.
    pub fn set(&mut self, raw: impl Into<RawPoints<P>>) -> Result<()> {
        let points = convert_points(&self.skeleton, raw.into())?;
        log::trace!("re-normalized {} points", points.len());
        self.points = points;

        Ok(())
    }

    #[inline]
    pub fn skeleton(&self) -> &Rc<Skeleton> {
        &self.skeleton
    }

    /// Looks up the point of a node.
    ///
    /// Indices and names are resolved through the skeleton first, so unknown
    /// ones fail with the skeleton's lookup error. A node from another
    /// skeleton yields `None`.
    pub fn get(&self, selector: impl Into<NodeRef>) -> Result<Option<&P>> {
        let node = match selector.into() {
            NodeRef::Node(node) => node,
            other => self.skeleton.node(other)?,
        };

        Ok(self.points.get(&node))
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[inline]
    pub fn n_visible(&self) -> usize {
        self.points.values().filter(|pt| pt.is_visible()).count()
    }

    /// `true` when no point is visible.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.n_visible() == 0
    }

    /// Points in skeleton node order.
    pub fn iter(&self) -> impl Iterator<Item = (&Node, &P)> {
        self.skeleton
            .nodes()
            .iter()
            .filter_map(move |node| self.points.get(node).map(|pt| (node, pt)))
    }

    pub fn visible_positions(&self) -> impl Iterator<Item = (&Node, na::Point2<f64>)> {
        self.iter().filter(|(_, pt)| pt.is_visible()).map(|(node, pt)| {
            let (x, y) = pt.coords();
            (node, na::Point2::new(x, y))
        })
    }

    #[inline]
    pub fn as_map(&self) -> &HashMap<Node, P> {
        &self.points
    }

    /// `(n_nodes, P::WIDTH)` array with NaN rows for invisible points.
    pub fn numpy(&self) -> Array2<f64> {
        let mut arr = Array2::from_elem((self.skeleton.len(), P::WIDTH), f64::NAN);

        for (idx, node) in self.skeleton.nodes().iter().enumerate() {
            if let Some(pt) = self.points.get(node) {
                if pt.is_visible() {
                    pt.write_row(arr.row_mut(idx));
                }
            }
        }

        arr
    }

    /// Converts every point while keeping the node mapping.
    pub fn map_points<Q: Landmark, F: FnMut(&P) -> Q>(&self, mut f: F) -> PointSet<Q> {
        PointSet {
            skeleton: self.skeleton.clone(),
            points: self
                .points
                .iter()
                .map(|(node, pt)| (node.clone(), f(pt)))
                .collect(),
        }
    }
}

impl<P: PartialEq> PartialEq for PointSet<P> {
    fn eq(&self, other: &Self) -> bool {
        compare_points(&self.points, &other.points)
    }
}
