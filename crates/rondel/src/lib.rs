use std::time::Duration;

pub mod canvas;
pub mod detail;
pub mod geometry;
pub mod image;
pub mod palette;
pub mod scheduler;
pub mod state;
pub mod view;

pub use canvas::WheelCanvas;
pub use detail::DetailPolicy;
pub use palette::Palette;
pub use scheduler::{FrameScheduler, SchedulerState};
pub use state::{CenterImageSize, DeviceProfile, RenderState, Segment};

pub const WHEEL_PADDING: f64 = 20.0; // gap between rim and viewport edge
pub const TEXT_EDGE_INSET: f64 = 25.0; // label right edge, measured from center
pub const TEXT_ARC_INSET: f64 = 20.0; // radius used for arc-length font sizing
pub const HUB_RADIUS: f64 = 70.0;
pub const HUB_RADIUS_MOBILE: f64 = 35.0;
pub const MOBILE_BREAKPOINT: f64 = 768.0; // viewport width
pub const IMAGE_SETTLE_DELAY: Duration = Duration::from_millis(50); // redraw after decode
