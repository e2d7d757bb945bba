//! Headless host: runs the engine on a tokio runtime without a window.
//!
//! Requests go out as spawned tasks on [`ImageryClient`]; their outcomes come
//! back over an unbounded channel that [`drive`] drains at the top of every
//! frame, so the engine itself only ever runs on the driving task.

use std::collections::VecDeque;
use std::path::PathBuf;
use std::time::Duration;

use foundation::time::Time;
use streaming::{
    FetchOutcome, FetchRequestDescriptor, FetchTicket, ImageryClient, ImageryTransport,
    TextureMode,
};
use tokio::sync::mpsc;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, error, info, warn};
use view::{Orientation, ViewMode};

use crate::script::InputEvent;
use crate::surface::RenderSurface;
use crate::viewer::Viewer;

pub const FRAME_INTERVAL: Duration = Duration::from_micros(16_667);

/// Starfield drift in radians per second.
const STAR_DRIFT_RAD_PER_S: f64 = 0.006;

pub type Completion = (FetchTicket, FetchOutcome);

/// Dispatches each request as its own task and reports back over a channel.
#[derive(Debug, Clone)]
pub struct ChannelTransport {
    client: ImageryClient,
    completions: mpsc::UnboundedSender<Completion>,
}

impl ChannelTransport {
    pub fn new(client: ImageryClient) -> (Self, mpsc::UnboundedReceiver<Completion>) {
        let (completions, rx) = mpsc::unbounded_channel();
        (
            Self {
                client,
                completions,
            },
            rx,
        )
    }
}

impl ImageryTransport for ChannelTransport {
    fn dispatch(&mut self, ticket: FetchTicket, request: FetchRequestDescriptor) {
        let client = self.client.clone();
        let completions = self.completions.clone();
        tokio::spawn(async move {
            let outcome = client.fetch(&request).await;
            if completions.send((ticket, outcome)).is_err() {
                debug!(ticket = ticket.0, "engine gone before fetch completed");
            }
        });
    }
}

/// Surface that logs what a real renderer would draw and writes fetched
/// images to disk.
#[derive(Debug, Default)]
pub struct HeadlessSurface {
    out_dir: Option<PathBuf>,
    written: Vec<PathBuf>,
    mode: ViewMode,
    orientation: Option<Orientation>,
    camera_distance: f64,
    texture: TextureMode,
    loading: bool,
    redraws: u64,
    star_yaw: f64,
}

impl HeadlessSurface {
    pub fn new(out_dir: Option<PathBuf>) -> Self {
        Self {
            out_dir,
            ..Self::default()
        }
    }

    /// Image files written so far, in arrival order.
    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }

    pub fn mode(&self) -> ViewMode {
        self.mode
    }

    pub fn redraws(&self) -> u64 {
        self.redraws
    }
}

fn image_extension(bytes: &[u8]) -> &'static str {
    if bytes.starts_with(&[0x89, b'P', b'N', b'G']) {
        "png"
    } else if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
        "jpg"
    } else {
        "bin"
    }
}

impl RenderSurface for HeadlessSurface {
    fn set_orientation(&mut self, orientation: Orientation) {
        self.orientation = Some(orientation);
    }

    fn set_camera_distance(&mut self, distance: f64) {
        self.camera_distance = distance;
    }

    fn set_mode(&mut self, mode: ViewMode) {
        info!(mode = mode.as_str(), "presentation switched");
        self.mode = mode;
    }

    fn set_texture(&mut self, texture: TextureMode) {
        debug!(texture = %texture, "globe texture");
        self.texture = texture;
    }

    fn show_image(&mut self, bytes: &[u8]) {
        let Some(dir) = &self.out_dir else {
            info!(len = bytes.len(), "image received");
            return;
        };
        let path = dir.join(format!(
            "view-{:03}.{}",
            self.written.len(),
            image_extension(bytes)
        ));
        match std::fs::create_dir_all(dir).and_then(|()| std::fs::write(&path, bytes)) {
            Ok(()) => {
                info!(path = %path.display(), len = bytes.len(), "image written");
                self.written.push(path);
            }
            Err(err) => error!(path = %path.display(), error = %err, "failed to write image"),
        }
    }

    fn set_loading(&mut self, loading: bool) {
        if loading != self.loading {
            debug!(loading, "loading indicator");
        }
        self.loading = loading;
    }

    fn request_redraw(&mut self) {
        self.redraws += 1;
    }

    fn advance_decoration(&mut self, dt_s: f64) {
        self.star_yaw += STAR_DRIFT_RAD_PER_S * dt_s;
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct DriveSummary {
    pub frames: u64,
    pub engine_time: Time,
    /// Whether the run stopped because the engine settled, rather than
    /// hitting the time limit.
    pub settled: bool,
}

/// Tick `viewer` at roughly 60 Hz, replaying `script` on the way, until the
/// script is exhausted and the engine has settled or `max_s` of engine time
/// has passed.
///
/// Invalid `goto` events are logged and skipped.
pub async fn drive<S: RenderSurface, T: ImageryTransport>(
    viewer: &mut Viewer<S, T>,
    completions: &mut mpsc::UnboundedReceiver<Completion>,
    script: Vec<InputEvent>,
    max_s: f64,
) -> DriveSummary {
    let mut interval = tokio::time::interval(FRAME_INTERVAL);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let mut queue: VecDeque<InputEvent> = script.into();
    let mut resume_at: Option<Time> = None;
    let mut last = Instant::now();

    loop {
        interval.tick().await;
        let now = Instant::now();
        let dt_s = now.duration_since(last).as_secs_f64();
        last = now;

        while let Ok((ticket, outcome)) = completions.try_recv() {
            viewer.on_fetch_complete(ticket, outcome);
        }

        while resume_at.is_none_or(|t| viewer.now().has_reached(t)) {
            resume_at = None;
            let Some(event) = queue.pop_front() else {
                break;
            };
            if let InputEvent::Wait { seconds } = event {
                resume_at = Some(viewer.now().after(seconds));
                continue;
            }
            if let Err(err) = event.apply(viewer) {
                warn!(error = %err, ?event, "skipping invalid input");
            }
        }

        let report = viewer.tick(dt_s);

        let script_done = queue.is_empty() && resume_at.is_none();
        if script_done && viewer.is_settled() {
            return DriveSummary {
                frames: report.frame.index,
                engine_time: report.frame.time,
                settled: true,
            };
        }
        if report.frame.time.0 >= max_s {
            warn!(max_s, "stopping before the engine settled");
            return DriveSummary {
                frames: report.frame.index,
                engine_time: report.frame.time,
                settled: false,
            };
        }
    }
}
