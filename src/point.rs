use nalgebra as na;
use ndarray::ArrayViewMut1;
use num_traits::Float;
use serde_derive::{Deserialize, Serialize};
use std::fmt;

/// Relative/absolute tolerance used when comparing coordinates.
///
/// Defaults match numpy's `isclose`.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct Tolerance {
    pub rtol: f64,
    pub atol: f64,
}

impl Tolerance {
    pub const DEFAULT: Tolerance = Tolerance {
        rtol: 1e-5,
        atol: 1e-8,
    };

    #[inline]
    pub fn new(rtol: f64, atol: f64) -> Self {
        Self { rtol, atol }
    }
}

impl Default for Tolerance {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// `|a - b| <= atol + rtol * |b|`, with NaN equal to NaN.
pub fn is_close<F: Float>(a: F, b: F, rtol: F, atol: F) -> bool {
    if a.is_nan() || b.is_nan() {
        return a.is_nan() && b.is_nan();
    }

    if a.is_infinite() || b.is_infinite() {
        return a == b;
    }

    (a - b).abs() <= atol + rtol * b.abs()
}

#[inline]
pub fn coords_eq(a: (f64, f64), b: (f64, f64), tol: Tolerance) -> bool {
    is_close(a.0, b.0, tol.rtol, tol.atol) && is_close(a.1, b.1, tol.rtol, tol.atol)
}

/// Behaviour shared by the point variants an instance can hold.
pub trait Landmark: Clone + PartialEq + fmt::Debug {
    /// Number of columns this point occupies in an instance array.
    const WIDTH: usize;

    /// Builds a point from raw coordinates, invisible iff either one is NaN.
    fn from_coords(x: f64, y: f64) -> Self;

    fn coords(&self) -> (f64, f64);

    fn is_visible(&self) -> bool;

    /// Writes the array form of the point into `row`, which has `WIDTH` elements.
    fn write_row(&self, row: ArrayViewMut1<'_, f64>);

    /// Placeholder used for nodes that were not supplied.
    #[inline]
    fn missing() -> Self {
        Self::from_coords(f64::NAN, f64::NAN)
    }
}

/// A 2D landmark placed on an image.
#[derive(Serialize, Deserialize, Debug, Clone, Copy)]
pub struct Point {
    pub x: f64,
    pub y: f64,
    pub visible: bool,
    /// Verified by a human labeler.
    pub complete: bool,
}

impl Point {
    #[inline]
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            visible: true,
            complete: false,
        }
    }

    #[inline]
    pub fn with_visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    #[inline]
    pub fn with_complete(mut self, complete: bool) -> Self {
        self.complete = complete;
        self
    }

    /// `[x, y]` when visible, `[NaN, NaN]` otherwise.
    #[inline]
    pub fn numpy(&self) -> [f64; 2] {
        if self.visible {
            [self.x, self.y]
        } else {
            [f64::NAN; 2]
        }
    }

    #[inline]
    pub fn position(&self) -> Option<na::Point2<f64>> {
        if self.visible {
            Some(na::Point2::new(self.x, self.y))
        } else {
            None
        }
    }

    pub fn approx_eq(&self, other: &Point, tol: Tolerance) -> bool {
        coords_eq((self.x, self.y), (other.x, other.y), tol)
    }
}

impl PartialEq for Point {
    fn eq(&self, other: &Self) -> bool {
        self.approx_eq(other, Tolerance::DEFAULT)
    }
}

impl Landmark for Point {
    const WIDTH: usize = 2;

    #[inline]
    fn from_coords(x: f64, y: f64) -> Self {
        Point::new(x, y).with_visible(!(x.is_nan() || y.is_nan()))
    }

    #[inline]
    fn coords(&self) -> (f64, f64) {
        (self.x, self.y)
    }

    #[inline]
    fn is_visible(&self) -> bool {
        self.visible
    }

    fn write_row(&self, mut row: ArrayViewMut1<'_, f64>) {
        for (dst, src) in row.iter_mut().zip(self.numpy()) {
            *dst = src;
        }
    }
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Point::from_coords(x, y)
    }
}

/// A point produced by a model, carrying its confidence.
///
/// Equality ignores `score`, the same way [`Point`] ignores its flags.
#[derive(Serialize, Deserialize, Debug, Clone, Copy)]
pub struct PredictedPoint {
    pub x: f64,
    pub y: f64,
    pub visible: bool,
    pub complete: bool,
    pub score: f64,
}

impl PredictedPoint {
    #[inline]
    pub fn new(x: f64, y: f64, score: f64) -> Self {
        Self {
            x,
            y,
            visible: true,
            complete: false,
            score,
        }
    }

    #[inline]
    pub fn with_visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    #[inline]
    pub fn with_complete(mut self, complete: bool) -> Self {
        self.complete = complete;
        self
    }

    /// `[x, y, score]` when visible, `[NaN, NaN, NaN]` otherwise.
    #[inline]
    pub fn numpy(&self) -> [f64; 3] {
        if self.visible {
            [self.x, self.y, self.score]
        } else {
            [f64::NAN; 3]
        }
    }

    #[inline]
    pub fn position(&self) -> Option<na::Point2<f64>> {
        self.as_point().position()
    }

    /// Drops the score, keeping coordinates and flags.
    #[inline]
    pub fn as_point(&self) -> Point {
        Point {
            x: self.x,
            y: self.y,
            visible: self.visible,
            complete: self.complete,
        }
    }

    pub fn approx_eq(&self, other: &PredictedPoint, tol: Tolerance) -> bool {
        coords_eq((self.x, self.y), (other.x, other.y), tol)
    }
}

impl PartialEq for PredictedPoint {
    fn eq(&self, other: &Self) -> bool {
        self.approx_eq(other, Tolerance::DEFAULT)
    }
}

impl Landmark for PredictedPoint {
    const WIDTH: usize = 3;

    #[inline]
    fn from_coords(x: f64, y: f64) -> Self {
        PredictedPoint::new(x, y, 0.0).with_visible(!(x.is_nan() || y.is_nan()))
    }

    #[inline]
    fn coords(&self) -> (f64, f64) {
        (self.x, self.y)
    }

    #[inline]
    fn is_visible(&self) -> bool {
        self.visible
    }

    fn write_row(&self, mut row: ArrayViewMut1<'_, f64>) {
        for (dst, src) in row.iter_mut().zip(self.numpy()) {
            *dst = src;
        }
    }
}

impl From<PredictedPoint> for Point {
    fn from(pt: PredictedPoint) -> Self {
        pt.as_point()
    }
}
