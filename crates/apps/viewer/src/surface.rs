use streaming::TextureMode;
use view::{Orientation, ViewMode};

/// The rendering pipeline as seen by the engine.
///
/// The engine only pushes state into the surface; it never reads back.
pub trait RenderSurface {
    /// Rotate the rendered globe.
    fn set_orientation(&mut self, orientation: Orientation);

    /// Move the 3D camera; see [`view::camera_distance`].
    fn set_camera_distance(&mut self, distance: f64);

    /// Switch what is on screen. `Fetched2D` is only requested once an image
    /// is ready to show, so the last 3D frame stays visible until then.
    fn set_mode(&mut self, mode: ViewMode);

    /// Restore the procedural globe texture for a texture product.
    fn set_texture(&mut self, texture: TextureMode);

    /// Replace the displayed 2D image with an encoded image.
    fn show_image(&mut self, bytes: &[u8]);

    fn set_loading(&mut self, loading: bool);

    fn request_redraw(&mut self);

    /// Advance purely cosmetic animation (starfield drift and the like).
    fn advance_decoration(&mut self, _dt_s: f64) {}
}
