pub mod error;
pub mod instance;
pub mod point;
pub mod points;
pub mod predicted;
pub mod skeleton;

mod track;

pub use error::{Error, Result};
pub use instance::{Instance, InstanceBuilder};
pub use point::{Landmark, Point, PredictedPoint, Tolerance};
pub use points::{compare_points, convert_points, PointSet, RawPoint, RawPoints};
pub use predicted::{PredictedInstance, PredictedInstanceBuilder};
pub use skeleton::{Edge, Node, NodeRef, Skeleton};
pub use track::Track;
