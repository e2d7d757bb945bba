//! Camera state for the globe: orientation, zoom, animated transitions and
//! the 3D/2D presentation switch.

pub mod config;
pub mod mode;
pub mod orientation;
pub mod transition;

pub use config::*;
pub use mode::*;
pub use orientation::*;
pub use transition::*;
