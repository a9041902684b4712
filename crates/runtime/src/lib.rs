pub mod clock;
pub mod event_bus;
pub mod frame;

pub use clock::*;
pub use event_bus::*;
pub use frame::*;
