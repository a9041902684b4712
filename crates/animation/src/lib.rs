pub mod camera;
pub mod config;
pub mod controller;
pub mod export;
pub mod interpolator;
pub mod keyframe;
pub mod selection;
pub mod speed_curve;
pub mod timeline;

pub use camera::*;
pub use config::*;
pub use controller::*;
pub use export::*;
pub use interpolator::*;
pub use keyframe::*;
pub use selection::*;
pub use speed_curve::*;
pub use timeline::*;
