use crate::error::{Error, Result};
use crate::point::PredictedPoint;
use crate::points::{PointSet, RawPoints};
use crate::skeleton::{Node, NodeRef, Skeleton};
use crate::track::Track;

use ndarray::prelude::*;
use std::rc::Rc;

/// An instance estimated by a model.
///
/// `score` is the instance-level confidence, `tracking_score` the score of
/// the identity assignment that picked `track`.
#[derive(Debug, Clone)]
pub struct PredictedInstance {
    points: PointSet<PredictedPoint>,
    track: Option<Track>,
    score: f64,
    tracking_score: Option<f64>,
}

pub struct PredictedInstanceBuilder {
    skeleton: Rc<Skeleton>,
    points: RawPoints<PredictedPoint>,
    track: Option<Track>,
    from_predicted: Option<Rc<PredictedInstance>>,
    score: f64,
    tracking_score: Option<f64>,
}

impl PredictedInstanceBuilder {
    pub fn new(skeleton: Rc<Skeleton>) -> Self {
        Self {
            skeleton,
            points: RawPoints::Map(Vec::new()),
            track: None,
            from_predicted: None,
            score: 0.0,
            tracking_score: Some(0.0),
        }
    }

    pub fn points(mut self, points: impl Into<RawPoints<PredictedPoint>>) -> Self {
        self.points = points.into();
        self
    }

    pub fn track(mut self, track: Track) -> Self {
        self.track = Some(track);
        self
    }

    pub fn score(mut self, score: f64) -> Self {
        self.score = score;
        self
    }

    pub fn tracking_score(mut self, tracking_score: Option<f64>) -> Self {
        self.tracking_score = tracking_score;
        self
    }

    /// Predictions cannot come from other predictions; setting this makes
    /// [`build`](Self::build) fail.
    pub fn from_predicted(mut self, predicted: Rc<PredictedInstance>) -> Self {
        self.from_predicted = Some(predicted);
        self
    }

    pub fn build(self) -> Result<PredictedInstance> {
        if self.from_predicted.is_some() {
            return Err(Error::FromPredictedNotAllowed);
        }

        Ok(PredictedInstance {
            points: PointSet::new(self.skeleton, self.points)?,
            track: self.track,
            score: self.score,
            tracking_score: self.tracking_score,
        })
    }
}

impl PredictedInstance {
    pub fn new(
        points: impl Into<RawPoints<PredictedPoint>>,
        skeleton: Rc<Skeleton>,
    ) -> Result<Self> {
        Self::builder(skeleton).points(points).build()
    }

    #[inline]
    pub fn builder(skeleton: Rc<Skeleton>) -> PredictedInstanceBuilder {
        PredictedInstanceBuilder::new(skeleton)
    }

    /// Builds a prediction from `(n_nodes, 2)` coordinates and `(n_nodes,)`
    /// point scores.
    ///
    /// Every point is created visible, NaN coordinates included; only
    /// [`Instance::from_numpy`](crate::Instance::from_numpy) infers
    /// visibility from NaN.
    pub fn from_numpy(
        points: ArrayView2<'_, f64>,
        point_scores: ArrayView1<'_, f64>,
        instance_score: f64,
        skeleton: Rc<Skeleton>,
        tracking_score: Option<f64>,
        track: Option<Track>,
    ) -> Result<Self> {
        if points.ncols() != 2 {
            return Err(Error::ShapeMismatch {
                expected: 2,
                actual: points.ncols(),
            });
        }

        if points.nrows() != skeleton.len() {
            return Err(Error::LengthMismatch {
                expected: skeleton.len(),
                actual: points.nrows(),
            });
        }

        if point_scores.len() != points.nrows() {
            return Err(Error::ShapeMismatch {
                expected: points.nrows(),
                actual: point_scores.len(),
            });
        }

        let node_points: Vec<(Node, PredictedPoint)> = skeleton
            .nodes()
            .iter()
            .zip(points.outer_iter().zip(point_scores.iter()))
            .map(|(node, (pt, &score))| (node.clone(), PredictedPoint::new(pt[0], pt[1], score)))
            .collect();

        let mut builder = Self::builder(skeleton)
            .points(RawPoints::map(node_points))
            .score(instance_score)
            .tracking_score(tracking_score);

        if let Some(track) = track {
            builder = builder.track(track);
        }

        builder.build()
    }

    #[inline]
    pub fn skeleton(&self) -> &Rc<Skeleton> {
        self.points.skeleton()
    }

    #[inline]
    pub fn points(&self) -> &PointSet<PredictedPoint> {
        &self.points
    }

    /// Replaces the points, normalizing them the same way as construction.
    pub fn set_points(&mut self, points: impl Into<RawPoints<PredictedPoint>>) -> Result<()> {
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
    pub fn score(&self) -> f64 {
        self.score
    }

    #[inline]
    pub fn tracking_score(&self) -> Option<f64> {
        self.tracking_score
    }

    #[inline]
    pub fn set_tracking_score(&mut self, tracking_score: Option<f64>) {
        self.tracking_score = tracking_score;
    }

    /// Always `None`: a prediction is never derived from another one.
    #[inline]
    pub fn from_predicted(&self) -> Option<&Rc<PredictedInstance>> {
        None
    }

    #[inline]
    pub fn get(&self, selector: impl Into<NodeRef>) -> Result<Option<&PredictedPoint>> {
        self.points.get(selector)
    }

    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = (&Node, &PredictedPoint)> {
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

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// `(n_nodes, 3)` array of `[x, y, score]`, NaN for invisible points.
    #[inline]
    pub fn numpy(&self) -> Array2<f64> {
        self.points.numpy()
    }
}

impl PartialEq for PredictedInstance {
    fn eq(&self, other: &Self) -> bool {
        self.points == other.points
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn skeleton() -> Rc<Skeleton> {
        Rc::new(Skeleton::new(&["head", "tail", "thorax"]).unwrap())
    }

    #[test]
    fn test_defaults() {
        let inst = PredictedInstance::new(vec![(1.0, 1.0); 3], skeleton()).unwrap();

        assert_eq!(inst.score(), 0.0);
        assert_eq!(inst.tracking_score(), Some(0.0));
        assert!(inst.track().is_none());
        assert!(inst.from_predicted().is_none());
    }

    #[test]
    fn test_from_predicted_is_rejected() {
        let skel = skeleton();
        let first = Rc::new(PredictedInstance::new(vec![(1.0, 1.0); 3], skel.clone()).unwrap());
        let err = PredictedInstance::builder(skel)
            .points(vec![(1.0, 1.0); 3])
            .from_predicted(first)
            .build()
            .unwrap_err();

        assert_eq!(err, Error::FromPredictedNotAllowed);
    }

    #[test]
    fn test_from_numpy_keeps_nan_points_visible() {
        let track = Track::new("mouse");
        let inst = PredictedInstance::from_numpy(
            array![[1.0, 2.0], [f64::NAN, f64::NAN], [5.0, 6.0]].view(),
            array![0.9, 0.1, 0.8].view(),
            0.7,
            skeleton(),
            Some(0.5),
            Some(track.clone()),
        )
        .unwrap();

        assert_eq!(inst.n_visible(), 3);
        assert_eq!(inst.score(), 0.7);
        assert_eq!(inst.tracking_score(), Some(0.5));
        assert_eq!(inst.track(), Some(&track));

        let arr = inst.numpy();
        assert_eq!(arr.shape(), &[3, 3]);
        assert_eq!(arr.row(0).to_vec(), vec![1.0, 2.0, 0.9]);
        assert!(arr[[1, 0]].is_nan() && arr[[1, 1]].is_nan());
        assert_eq!(arr[[1, 2]], 0.1);
        assert_eq!(arr.row(2).to_vec(), vec![5.0, 6.0, 0.8]);
    }

    #[test]
    fn test_from_numpy_shape_checks() {
        let skel = skeleton();

        let err = PredictedInstance::from_numpy(
            Array2::<f64>::zeros((2, 2)).view(),
            Array1::<f64>::zeros(2).view(),
            0.0,
            skel.clone(),
            None,
            None,
        )
        .unwrap_err();
        assert_eq!(
            err,
            Error::LengthMismatch {
                expected: 3,
                actual: 2
            }
        );

        let err = PredictedInstance::from_numpy(
            Array2::<f64>::zeros((3, 2)).view(),
            Array1::<f64>::zeros(2).view(),
            0.0,
            skel,
            None,
            None,
        )
        .unwrap_err();
        assert_eq!(
            err,
            Error::ShapeMismatch {
                expected: 3,
                actual: 2
            }
        );
    }

    #[test]
    fn test_coordinate_input_is_invisible_when_nan() {
        let inst = PredictedInstance::new(
            array![[1.0, 2.0], [f64::NAN, 3.0], [5.0, 6.0]],
            skeleton(),
        )
        .unwrap();

        assert_eq!(inst.n_visible(), 2);

        let arr = inst.numpy();
        assert_eq!(arr.row(0).to_vec(), vec![1.0, 2.0, 0.0]);
        assert!(arr.row(1).iter().all(|v| v.is_nan()));
    }

    #[test]
    fn test_equality_ignores_scores() {
        let skel = skeleton();
        let a = PredictedInstance::builder(skel.clone())
            .points(vec![PredictedPoint::new(1.0, 1.0, 0.9); 3])
            .score(0.9)
            .build()
            .unwrap();
        let b = PredictedInstance::builder(skel)
            .points(vec![PredictedPoint::new(1.0, 1.0, 0.1); 3])
            .score(0.1)
            .build()
            .unwrap();

        assert_eq!(a, b);
    }
}
