pub mod angle;
pub mod geo;

pub use angle::*;
pub use geo::*;
