pub mod bridge;
pub mod config;
pub mod design;
pub mod event;
pub mod step;

pub use bridge::*;
pub use config::*;
pub use design::*;
pub use event::*;
pub use step::*;
