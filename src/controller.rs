//! Ruler controller - owns one backend and mirrors the host's scroll,
//! resize, scale and style changes onto it

use std::sync::Arc;
use std::time::Duration;

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::backend::{BackendKind, OffscreenBackend, RenderBackend, ScreenBackend};
use crate::config::{OnScroll, RulerConfig, RulerType};
use crate::consts::MAX_RATIO;
use crate::container::Container;
use crate::error::{Result, RulerError};
use crate::geometry::{Axis, ModePreference, RenderMode, RulerGeometry, ScrollOffset, Size};
use crate::host::{Host, MountTarget, ScrollTargetId, ScrollTargetRef};
use crate::render::SurfacePair;
use crate::scheduler::FrameScheduler;
use crate::style::{RulerStyle, StylePatch};

/// Arguments of [`Ruler::resize`]; at least one of width and height is
/// required
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResizeRequest {
    pub width: Option<f32>,
    pub height: Option<f32>,
    pub size: Option<f32>,
}

impl ResizeRequest {
    #[must_use]
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width: Some(width),
            height: Some(height),
            size: None,
        }
    }

    #[must_use]
    pub fn with_size(mut self, size: f32) -> Self {
        self.size = Some(size);
        self
    }
}

/// What a scroll frame did
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScrollDispatch {
    /// Bounded: the container moved, nothing was redrawn
    Translated,
    /// Infinite: the backend redrew the visible window
    Redrawn,
}

/// Backend for a mode preference and the resolved render mode
#[must_use]
pub fn select_backend(
    preference: ModePreference,
    mode: RenderMode,
    offscreen_supported: bool,
) -> BackendKind {
    match preference {
        ModePreference::Screen | ModePreference::Infinite => BackendKind::Screen,
        ModePreference::Offscreen if offscreen_supported => BackendKind::Offscreen,
        ModePreference::Offscreen => {
            warn!("Off-thread surfaces unsupported, drawing on screen");
            BackendKind::Screen
        }
        ModePreference::Auto if mode.is_infinite() && offscreen_supported => {
            BackendKind::Offscreen
        }
        ModePreference::Auto => BackendKind::Screen,
    }
}

fn valid_extent(value: f32) -> bool {
    value.is_finite() && value > 0.0
}

pub struct Ruler {
    id: String,
    host: Arc<dyn Host>,
    kind: RulerType,
    direction: Axis,
    preference: ModePreference,
    mount: MountTarget,
    style: RulerStyle,
    geometry: RulerGeometry,
    backend: Box<dyn RenderBackend>,
    container: Container,
    scroll_ref: Option<ScrollTargetRef>,
    scroll_target: Option<ScrollTargetId>,
    scheduler: FrameScheduler<ScrollOffset>,
    on_scroll: Option<OnScroll>,
    destroyed: bool,
}

impl Ruler {
    /// Validate `config`, pick render mode and backend, draw both rulers and
    /// bind the scroll target.
    pub fn new(config: RulerConfig, host: Arc<dyn Host>) -> Result<Self> {
        let mount = config.mount_target().ok_or(RulerError::MissingWrapper)?;
        let viewport = host
            .mount_size(&mount)
            .ok_or_else(|| RulerError::UnresolvedWrapper(mount.to_string()))?;
        let kind = config.ruler_type()?;
        let style = RulerStyle::from_patch(&config.style)?;

        let content = config.content();
        if !valid_extent(content.width) || !valid_extent(content.height) {
            return Err(RulerError::invalid_style(format!(
                "content {}x{}",
                content.width, content.height
            )));
        }

        let scroll_ref = config.scroll_target();
        let scroll_target = match &scroll_ref {
            Some(target) => Some(
                host.resolve_scroll_target(target)
                    .ok_or_else(|| RulerError::UnresolvedScrollTarget(target.to_string()))?,
            ),
            None => None,
        };

        let mut pixel_ratio = host.device_pixel_ratio();
        if !valid_extent(pixel_ratio) {
            warn!("Ignoring device pixel ratio {pixel_ratio}, using 1");
            pixel_ratio = 1.0;
        }

        let mode = RenderMode::select(content, config.mode);
        let geometry = RulerGeometry {
            content,
            viewport,
            scroll: ScrollOffset::default(),
            pixel_ratio,
            mode,
        };
        let surfaces = geometry.surfaces(style.size);

        let backend_kind = select_backend(config.mode, mode, host.supports_offscreen());
        let mut backend: Box<dyn RenderBackend> = match backend_kind {
            BackendKind::Screen => Box::new(ScreenBackend::new(
                config.ruler_id.as_str(),
                &surfaces,
                &style,
                pixel_ratio,
                geometry.scroll,
            )?),
            BackendKind::Offscreen => Box::new(OffscreenBackend::new(
                config.ruler_id.as_str(),
                &surfaces,
                &style,
                pixel_ratio,
                geometry.scroll,
            )?),
        };
        backend.draw_canvas()?;

        let container = Container::render(
            &config.ruler_id,
            kind,
            config.direction,
            &style,
            &surfaces,
        );

        info!(
            "Created ruler {} ({:?}, {} backend, {}x{} content, ratio {pixel_ratio})",
            config.ruler_id,
            mode,
            backend_kind.as_str(),
            content.width,
            content.height
        );

        Ok(Self {
            id: config.ruler_id,
            host,
            kind,
            direction: config.direction,
            preference: config.mode,
            mount,
            style,
            geometry,
            backend,
            container,
            scroll_ref,
            scroll_target,
            scheduler: FrameScheduler::new(),
            on_scroll: config.on_scroll,
            destroyed: false,
        })
    }

    fn ensure_alive(&self) -> Result<()> {
        if self.destroyed {
            return Err(RulerError::Destroyed(self.id.clone()));
        }
        Ok(())
    }

    /// Change the label scale. Equal scales are a no-op.
    pub fn scale(&mut self, scale: f32) -> Result<()> {
        self.ensure_alive()?;
        if !valid_extent(scale) {
            return Err(RulerError::InvalidScale(scale));
        }
        if scale == self.style.scale {
            return Ok(());
        }
        let mut next = self.style.clone();
        next.scale = scale;
        self.backend.scale(&next)?;
        self.style = next;
        debug!("Ruler {} scaled to {scale}", self.id);
        Ok(())
    }

    /// Resize the content. Returns false when nothing visible changed and no
    /// redraw happened.
    pub fn resize(&mut self, request: ResizeRequest) -> Result<bool> {
        self.ensure_alive()?;
        if request.width.is_none() && request.height.is_none() {
            return Err(RulerError::InvalidResize);
        }
        let width = request.width.unwrap_or(self.geometry.content.width);
        let height = request.height.unwrap_or(self.geometry.content.height);
        if !valid_extent(width) || !valid_extent(height) {
            return Err(RulerError::InvalidResize);
        }
        let style = match request.size {
            Some(size) => self.style.merged(&StylePatch {
                size: Some(size),
                ..StylePatch::default()
            })?,
            None => self.style.clone(),
        };
        self.apply_resize(Size::new(width, height), style)
    }

    fn apply_resize(&mut self, content: Size, style: RulerStyle) -> Result<bool> {
        let oversized = content.width > MAX_RATIO || content.height > MAX_RATIO;
        let mode = if oversized {
            RenderMode::Infinite
        } else {
            RenderMode::select(content, self.preference)
        };
        let was_infinite = self.geometry.mode.is_infinite();
        let track_unchanged = style.size == self.style.size;

        if !was_infinite
            && !mode.is_infinite()
            && track_unchanged
            && self.geometry.content.contains(content)
        {
            debug!(
                "Ruler {}: {}x{} fits the current surfaces, skipping redraw",
                self.id, content.width, content.height
            );
            return Ok(false);
        }

        let mut geometry = self.geometry;
        geometry.content = content;
        geometry.mode = mode;
        if mode.is_infinite() {
            match self.host.mount_size(&self.mount) {
                Some(viewport) => geometry.viewport = viewport,
                None => warn!("Ruler {}: {} vanished, keeping viewport", self.id, self.mount),
            }
        }
        let surfaces = geometry.surfaces(style.size);
        if surfaces == self.geometry.surfaces(self.style.size) {
            debug!(
                "Ruler {}: surfaces unchanged for {}x{}, skipping redraw",
                self.id, content.width, content.height
            );
            self.geometry = geometry;
            return Ok(false);
        }

        self.backend.resize(&surfaces, &style)?;

        self.geometry = geometry;
        self.style = style;
        self.container.resize(&surfaces, self.style.size);
        self.container.update_unit(&self.style);
        if mode.is_infinite() {
            self.container.reset_translate();
        } else if was_infinite {
            self.container.translate(self.geometry.scroll);
        }

        info!(
            "Ruler {} resized to {}x{} ({:?}, track {})",
            self.id, content.width, content.height, mode, self.style.size
        );
        Ok(true)
    }

    /// Merge a partial style. A changed track size resizes the surfaces.
    pub fn update(&mut self, patch: &StylePatch) -> Result<()> {
        self.ensure_alive()?;
        let next = self.style.merged(patch)?;
        if next.size != self.style.size {
            self.apply_resize(self.geometry.content, next)?;
        } else {
            self.backend.update(&next)?;
            self.style = next;
        }
        self.container.update_unit(&self.style);
        if patch.show.is_some() {
            self.container.set_visible(self.style.show);
        }
        Ok(())
    }

    pub fn show(&mut self) -> Result<()> {
        self.ensure_alive()?;
        self.style.show = true;
        self.container.set_visible(true);
        Ok(())
    }

    pub fn hide(&mut self) -> Result<()> {
        self.ensure_alive()?;
        self.style.show = false;
        self.container.set_visible(false);
        Ok(())
    }

    /// Release the backend, unbind the scroll target and unmount. Every
    /// later call fails with [`RulerError::Destroyed`].
    pub fn destroy(&mut self) -> Result<()> {
        self.ensure_alive()?;
        self.destroyed = true;
        self.scheduler.cancel();
        self.scroll_target = None;
        self.container.unmount();
        let result = self.backend.destroy();
        info!("Ruler {} destroyed", self.id);
        result
    }

    /// Rebind scrolling to `target`
    pub fn change_scroll_element(&mut self, target: ScrollTargetRef) -> Result<()> {
        self.ensure_alive()?;
        let resolved = self
            .host
            .resolve_scroll_target(&target)
            .ok_or_else(|| RulerError::UnresolvedScrollTarget(target.to_string()))?;
        if let Some(old) = &self.scroll_ref {
            debug!("Ruler {}: unbinding scroll from {old}", self.id);
        }
        info!("Ruler {}: scroll bound to {target}", self.id);
        self.scroll_target = Some(resolved);
        self.scroll_ref = Some(target);
        Ok(())
    }

    /// Feed a scroll event. Returns true when it was queued for the next
    /// frame; events for other targets, or arriving while a frame is
    /// already queued, are dropped.
    pub fn handle_scroll(&mut self, target: ScrollTargetId, scroll: ScrollOffset) -> bool {
        if self.destroyed || self.scroll_target != Some(target) {
            return false;
        }
        if !self.scheduler.schedule(scroll) {
            debug!("Ruler {}: scroll event dropped, frame pending", self.id);
            return false;
        }
        true
    }

    /// Apply finished worker frames, then run the queued scroll redraw, if
    /// any
    pub fn animation_frame(&mut self) -> Result<Option<ScrollDispatch>> {
        self.ensure_alive()?;
        self.backend.poll()?;
        let Some(scroll) = self.scheduler.begin_frame() else {
            return Ok(None);
        };
        let result = self.dispatch_scroll(scroll);
        self.scheduler.finish_frame();
        result.map(Some)
    }

    /// Apply a scroll position directly, bypassing the frame throttle
    pub fn scroll_to(&mut self, scroll: ScrollOffset) -> Result<ScrollDispatch> {
        self.ensure_alive()?;
        self.dispatch_scroll(scroll)
    }

    fn dispatch_scroll(&mut self, scroll: ScrollOffset) -> Result<ScrollDispatch> {
        if let Some(callback) = &self.on_scroll {
            callback.call(scroll.scroll_left, scroll.scroll_top);
        }
        if self.geometry.mode.is_infinite() {
            self.backend.translate(scroll)?;
            self.geometry.scroll = scroll;
            Ok(ScrollDispatch::Redrawn)
        } else {
            self.backend.set_scroll(scroll);
            self.geometry.scroll = scroll;
            self.container.translate(scroll);
            Ok(ScrollDispatch::Translated)
        }
    }

    /// Apply finished worker frames
    pub fn poll(&mut self) -> Result<usize> {
        self.ensure_alive()?;
        self.backend.poll()
    }

    /// Wait for in-flight worker frames
    pub fn flush(&mut self, timeout: Duration) -> Result<usize> {
        self.ensure_alive()?;
        self.backend.flush(timeout)
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[must_use]
    pub fn style(&self) -> &RulerStyle {
        &self.style
    }

    #[must_use]
    pub fn geometry(&self) -> &RulerGeometry {
        &self.geometry
    }

    #[must_use]
    pub fn render_mode(&self) -> RenderMode {
        self.geometry.mode
    }

    #[must_use]
    pub fn ruler_type(&self) -> RulerType {
        self.kind
    }

    #[must_use]
    pub fn direction(&self) -> Axis {
        self.direction
    }

    #[must_use]
    pub fn backend_kind(&self) -> BackendKind {
        self.backend.kind()
    }

    #[must_use]
    pub fn container(&self) -> &Container {
        &self.container
    }

    #[must_use]
    pub fn surfaces(&self) -> &SurfacePair {
        self.backend.surfaces()
    }

    /// Times the visible surfaces received a new raster
    #[must_use]
    pub fn redraws(&self) -> u64 {
        self.backend.redraws()
    }

    #[must_use]
    pub fn scroll_target(&self) -> Option<ScrollTargetId> {
        self.scroll_target
    }

    /// Scroll events dropped by the frame throttle
    #[must_use]
    pub fn dropped_scroll_events(&self) -> u64 {
        self.scheduler.dropped()
    }

    #[must_use]
    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }
}
