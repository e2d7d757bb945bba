//! Scripted input for driving the engine without a pointer or a wheel.
//!
//! A script is a JSON array of events tagged by `"event"`:
//!
//! ```json
//! [
//!   { "event": "goto", "lat": 51.5, "lon": -0.12 },
//!   { "event": "wait", "seconds": 2.0 },
//!   { "event": "drag_begin", "x": 400, "y": 300 },
//!   { "event": "drag_move", "x": 460, "y": 300 },
//!   { "event": "drag_end" },
//!   { "event": "wheel", "delta": -300 },
//!   { "event": "set_year", "year": 2015 },
//!   { "event": "set_texture", "texture": "1km" }
//! ]
//! ```

use std::path::Path;

use foundation::math::CoordinateError;
use serde::Deserialize;
use streaming::{ImageryTransport, TextureMode};

use crate::config::ConfigError;
use crate::surface::RenderSurface;
use crate::viewer::Viewer;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum InputEvent {
    DragBegin { x: f64, y: f64 },
    DragMove { x: f64, y: f64 },
    DragEnd,
    Wheel { delta: f64 },
    Goto {
        lat: f64,
        lon: f64,
        #[serde(default)]
        zoom: Option<f64>,
    },
    SetYear { year: i32 },
    SetTexture { texture: TextureMode },
    /// Let engine time pass before the next event.
    Wait { seconds: f64 },
}

impl InputEvent {
    /// Feed one event to the engine. `Wait` is the caller's business and is
    /// ignored here.
    pub fn apply<S: RenderSurface, T: ImageryTransport>(
        &self,
        viewer: &mut Viewer<S, T>,
    ) -> Result<(), CoordinateError> {
        match *self {
            InputEvent::DragBegin { x, y } => viewer.pointer_down([x, y]),
            InputEvent::DragMove { x, y } => viewer.pointer_move([x, y]),
            InputEvent::DragEnd => viewer.pointer_up(),
            InputEvent::Wheel { delta } => {
                viewer.wheel(delta);
            }
            InputEvent::Goto { lat, lon, zoom } => {
                viewer.navigate_to_coordinates(lat, lon, zoom)?
            }
            InputEvent::SetYear { year } => viewer.set_year(year),
            InputEvent::SetTexture { texture } => viewer.set_texture_mode(texture),
            InputEvent::Wait { .. } => {}
        }
        Ok(())
    }
}

pub fn parse_script(text: &str) -> Result<Vec<InputEvent>, serde_json::Error> {
    serde_json::from_str(text)
}

pub fn load_script(path: impl AsRef<Path>) -> Result<Vec<InputEvent>, ConfigError> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_script(&text).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_every_event_kind() {
        let events = parse_script(
            r#"[
                { "event": "drag_begin", "x": 1, "y": 2 },
                { "event": "drag_move", "x": 3.5, "y": 2 },
                { "event": "drag_end" },
                { "event": "wheel", "delta": -120 },
                { "event": "goto", "lat": 51.5, "lon": -0.12 },
                { "event": "goto", "lat": 0, "lon": 0, "zoom": 6 },
                { "event": "set_year", "year": 2015 },
                { "event": "set_texture", "texture": "2km" },
                { "event": "wait", "seconds": 0.5 }
            ]"#,
        )
        .expect("parse");

        assert_eq!(
            events,
            vec![
                InputEvent::DragBegin { x: 1.0, y: 2.0 },
                InputEvent::DragMove { x: 3.5, y: 2.0 },
                InputEvent::DragEnd,
                InputEvent::Wheel { delta: -120.0 },
                InputEvent::Goto {
                    lat: 51.5,
                    lon: -0.12,
                    zoom: None
                },
                InputEvent::Goto {
                    lat: 0.0,
                    lon: 0.0,
                    zoom: Some(6.0)
                },
                InputEvent::SetYear { year: 2015 },
                InputEvent::SetTexture {
                    texture: TextureMode::Coarse2km
                },
                InputEvent::Wait { seconds: 0.5 },
            ]
        );
    }

    #[test]
    fn unknown_event_is_rejected() {
        assert!(parse_script(r#"[{ "event": "pinch", "scale": 2 }]"#).is_err());
        assert!(parse_script(r#"[{ "event": "set_texture", "texture": "10m" }]"#).is_err());
    }
}
