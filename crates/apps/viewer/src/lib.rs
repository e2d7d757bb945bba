//! Orientation and viewport engine for an interactive globe.
//!
//! The [`Viewer`] owns camera orientation and zoom, animated transitions, the
//! switch between the rendered 3D globe and fetched 2D imagery, and the policy
//! for requesting that imagery. Rendering and HTTP transport are collaborators
//! behind the [`RenderSurface`] and [`streaming::ImageryTransport`] traits.

pub mod config;
pub mod host;
pub mod script;
pub mod surface;
pub mod viewer;

pub use config::*;
pub use surface::*;
pub use viewer::*;
