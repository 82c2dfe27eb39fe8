use crate::error::Result;
use crate::point::Point;
use crate::points::{PointSet, RawPoints};
use crate::predicted::PredictedInstance;
use crate::skeleton::{Node, NodeRef, Skeleton};
use crate::track::Track;

use ndarray::prelude::*;
use std::rc::Rc;

/// A ground truth instance, such as one labeled animal.
///
/// Holds one [`Point`] per node of its skeleton. Equality only looks at the
/// points; skeleton, track and `from_predicted` are ignored.
#[derive(Debug, Clone)]
pub struct Instance {
    points: PointSet<Point>,
    track: Option<Track>,
    from_predicted: Option<Rc<PredictedInstance>>,
}

pub struct InstanceBuilder {
    skeleton: Rc<Skeleton>,
    points: RawPoints<Point>,
    track: Option<Track>,
    from_predicted: Option<Rc<PredictedInstance>>,
}

impl InstanceBuilder {
    pub fn new(skeleton: Rc<Skeleton>) -> Self {
        Self {
            skeleton,
            points: RawPoints::Map(Vec::new()),
            track: None,
            from_predicted: None,
        }
    }

    pub fn points(mut self, points: impl Into<RawPoints<Point>>) -> Self {
        self.points = points.into();
        self
    }

    pub fn track(mut self, track: Track) -> Self {
        self.track = Some(track);
        self
    }

    pub fn from_predicted(mut self, predicted: Rc<PredictedInstance>) -> Self {
        self.from_predicted = Some(predicted);
        self
    }

    pub fn build(self) -> Result<Instance> {
        Ok(Instance {
            points: PointSet::new(self.skeleton, self.points)?,
            track: self.track,
            from_predicted: self.from_predicted,
        })
    }
}

impl Instance {
    pub fn new(points: impl Into<RawPoints<Point>>, skeleton: Rc<Skeleton>) -> Result<Self> {
        Self::builder(skeleton).points(points).build()
    }

    #[inline]
    pub fn builder(skeleton: Rc<Skeleton>) -> InstanceBuilder {
        InstanceBuilder::new(skeleton)
    }

    /// Builds an instance from an `(n_nodes, 2)` array; NaN rows become
    /// invisible points.
    pub fn from_numpy(
        points: ArrayView2<'_, f64>,
        skeleton: Rc<Skeleton>,
        track: Option<Track>,
    ) -> Result<Self> {
        let mut builder = Self::builder(skeleton).points(points);
        if let Some(track) = track {
            builder = builder.track(track);
        }

        builder.build()
    }

    /// Starts a ground truth instance from a prediction, e.g. for a labeler
    /// to correct. The prediction is kept as `from_predicted`.
    pub fn from_predicted_instance(predicted: &Rc<PredictedInstance>) -> Self {
        Self {
            points: predicted
                .points()
                .map_points(|pt| pt.as_point().with_complete(false)),
            track: predicted.track().cloned(),
            from_predicted: Some(predicted.clone()),
        }
    }

    #[inline]
    pub fn skeleton(&self) -> &Rc<Skeleton> {
        self.points.skeleton()
    }

    #[inline]
    pub fn points(&self) -> &PointSet<Point> {
        &self.points
    }

    /// Replaces the points, normalizing them the same way as construction.
    pub fn set_points(&mut self, points: impl Into<RawPoints<Point>>) -> Result<()> {
        self.points.set(points)
    }

    #[inline]
    pub fn track(&self) -> Option<&Track> {
        self.track.as_ref()
    }

    #[inline]
    pub fn set_track(&mut self, track: Option<Track>) {
        self.track = track;
    }

    #[inline]
    pub fn from_predicted(&self) -> Option<&Rc<PredictedInstance>> {
        self.from_predicted.as_ref()
    }

    #[inline]
    pub fn get(&self, selector: impl Into<NodeRef>) -> Result<Option<&Point>> {
        self.points.get(selector)
    }

    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = (&Node, &Point)> {
        self.points.iter()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[inline]
    pub fn n_visible(&self) -> usize {
        self.points.n_visible()
    }

    /// `true` when no point is visible.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// `(n_nodes, 2)` array of visible coordinates, NaN elsewhere.
    #[inline]
    pub fn numpy(&self) -> Array2<f64> {
        self.points.numpy()
    }
}

impl PartialEq for Instance {
    fn eq(&self, other: &Self) -> bool {
        self.points == other.points
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use std::collections::HashMap;

    fn skeleton() -> Rc<Skeleton> {
        Rc::new(Skeleton::new(&["head", "tail", "thorax"]).unwrap())
    }

    #[test]
    fn test_partial_dict_fills_missing() {
        let skel = skeleton();
        let inst = Instance::new(HashMap::from([("head", (1.0, 1.0))]), skel).unwrap();

        assert_eq!(inst.len(), 3);
        assert_eq!(inst.n_visible(), 1);
        assert!(!inst.is_empty());

        let head = inst.get("head").unwrap().unwrap();
        assert!(head.visible);
        assert_eq!((head.x, head.y), (1.0, 1.0));

        let tail = inst.get("tail").unwrap().unwrap();
        assert!(!tail.visible);
        assert!(tail.x.is_nan() && tail.y.is_nan());
    }

    #[test]
    fn test_list_length_mismatch() {
        let err = Instance::new(vec![(1.0, 1.0), (2.0, 2.0)], skeleton()).unwrap_err();

        assert_eq!(
            err,
            Error::LengthMismatch {
                expected: 3,
                actual: 2
            }
        );
    }

    #[test]
    fn test_indexing_agrees() {
        let skel = skeleton();
        let inst = Instance::new(vec![(1.0, 2.0), (3.0, 4.0), (5.0, 6.0)], skel.clone()).unwrap();

        for node in skel.nodes() {
            let idx = skel.index(node).unwrap();
            let by_node = inst.get(node).unwrap();

            assert_eq!(by_node, inst.get(node.name()).unwrap());
            assert_eq!(by_node, inst.get(idx).unwrap());
        }

        assert_eq!(
            inst.get(7usize).unwrap_err(),
            Error::IndexOutOfRange { index: 7, len: 3 }
        );
        assert_eq!(
            inst.get("wing").unwrap_err(),
            Error::NodeNotFound("wing".into())
        );
    }

    #[test]
    fn test_foreign_node_is_not_present() {
        let inst = Instance::new(vec![(1.0, 2.0); 3], skeleton()).unwrap();
        let other = skeleton();

        assert_eq!(inst.get(&other.nodes()[0]).unwrap(), None);
    }

    #[test]
    fn test_empty_instance() {
        let inst = Instance::new(RawPoints::Map(Vec::new()), skeleton()).unwrap();

        assert!(inst.is_empty());
        assert_eq!(inst.len(), 3);
        assert!(inst.numpy().iter().all(|v| v.is_nan()));
    }

    #[test]
    fn test_equality_ignores_track() {
        let skel = skeleton();
        let a = Instance::builder(skel.clone())
            .points(vec![(1.0, 2.0); 3])
            .track(Track::new("a"))
            .build()
            .unwrap();
        let b = Instance::new(vec![(1.0, 2.0); 3], skel.clone()).unwrap();
        let c = Instance::new(vec![(1.0, 2.5); 3], skel).unwrap();

        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_set_points_renormalizes() {
        let mut inst = Instance::new(vec![(1.0, 2.0); 3], skeleton()).unwrap();

        inst.set_points(HashMap::from([("thorax", (9.0, 9.0))])).unwrap();
        assert_eq!(inst.len(), 3);
        assert_eq!(inst.n_visible(), 1);

        assert!(inst.set_points(vec![(0.0, 0.0)]).is_err());
        assert_eq!(inst.n_visible(), 1);
    }

    #[test]
    fn test_numpy_places_by_skeleton_index() {
        let skel = skeleton();
        let inst = Instance::new(
            HashMap::from([("thorax", (5.0, 6.0)), ("head", (1.0, 2.0))]),
            skel,
        )
        .unwrap();
        let arr = inst.numpy();

        assert_eq!(arr.shape(), &[3, 2]);
        assert_eq!(arr.row(0).to_vec(), vec![1.0, 2.0]);
        assert!(arr.row(1).iter().all(|v| v.is_nan()));
        assert_eq!(arr.row(2).to_vec(), vec![5.0, 6.0]);
    }

    #[test]
    fn test_hidden_point_with_coords_is_nan_in_numpy() {
        let skel = skeleton();
        let inst = Instance::new(
            RawPoints::map([("head", Point::new(1.0, 1.0).with_visible(false))]),
            skel,
        )
        .unwrap();

        assert_eq!(inst.n_visible(), 0);
        assert!(inst.numpy().row(0).iter().all(|v| v.is_nan()));
    }
}
