pub mod geom;
pub mod id;
pub mod metrics;
pub mod model;
pub mod session;
pub mod store;

pub use geom::{CoordinateMapper, Surface};
pub use id::{IdGenerator, LabelId};
pub use metrics::{ApproxMetrics, TextMetrics, label_bounds};
pub use model::*;
pub use session::{Mode, SessionState};
pub use store::{LabelMutation, TextLabelStore};

// Re-export kurbo geometry so downstream crates share one Point/Rect type
pub use kurbo::{Point, Rect, Size, Vec2};
