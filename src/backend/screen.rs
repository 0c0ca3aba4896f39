//! Synchronous backend: renders straight into the visible surfaces

use std::time::Duration;

use log::{debug, info};

use super::{BackendKind, RenderBackend};
use crate::error::{Result, RulerError};
use crate::geometry::{ScrollOffset, SurfaceGeometry};
use crate::render::SurfacePair;
use crate::style::RulerStyle;

pub struct ScreenBackend {
    ruler_id: String,
    surfaces: SurfacePair,
    style: RulerStyle,
    scroll: ScrollOffset,
    infinite: bool,
    redraws: u64,
    destroyed: bool,
}

impl ScreenBackend {
    pub fn new(
        ruler_id: impl Into<String>,
        geometry: &SurfaceGeometry,
        style: &RulerStyle,
        pixel_ratio: f32,
        scroll: ScrollOffset,
    ) -> Result<Self> {
        Ok(Self {
            ruler_id: ruler_id.into(),
            surfaces: SurfacePair::new(geometry, pixel_ratio)?,
            style: style.clone(),
            scroll,
            infinite: geometry.infinite,
            redraws: 0,
            destroyed: false,
        })
    }

    fn ensure_alive(&self) -> Result<()> {
        if self.destroyed {
            return Err(RulerError::Destroyed(self.ruler_id.clone()));
        }
        Ok(())
    }

    fn redraw(&mut self) {
        self.surfaces.draw(&self.style, self.infinite, self.scroll);
        self.redraws += 1;
        debug!("Ruler {} redrawn on screen ({})", self.ruler_id, self.redraws);
    }
}

impl RenderBackend for ScreenBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Screen
    }

    fn draw_canvas(&mut self) -> Result<()> {
        self.ensure_alive()?;
        self.redraw();
        Ok(())
    }

    fn scale(&mut self, style: &RulerStyle) -> Result<()> {
        self.ensure_alive()?;
        self.style = style.clone();
        self.redraw();
        Ok(())
    }

    fn update(&mut self, style: &RulerStyle) -> Result<()> {
        self.ensure_alive()?;
        self.style = style.clone();
        self.redraw();
        Ok(())
    }

    fn resize(&mut self, geometry: &SurfaceGeometry, style: &RulerStyle) -> Result<()> {
        self.ensure_alive()?;
        self.surfaces.rescale(geometry)?;
        self.infinite = geometry.infinite;
        self.style = style.clone();
        self.redraw();
        Ok(())
    }

    fn translate(&mut self, scroll: ScrollOffset) -> Result<()> {
        self.ensure_alive()?;
        self.scroll = scroll;
        self.redraw();
        Ok(())
    }

    fn set_scroll(&mut self, scroll: ScrollOffset) {
        self.scroll = scroll;
    }

    fn poll(&mut self) -> Result<usize> {
        self.ensure_alive()?;
        Ok(0)
    }

    fn flush(&mut self, _timeout: Duration) -> Result<usize> {
        self.ensure_alive()?;
        Ok(0)
    }

    fn surfaces(&self) -> &SurfacePair {
        &self.surfaces
    }

    fn redraws(&self) -> u64 {
        self.redraws
    }

    fn destroy(&mut self) -> Result<()> {
        self.ensure_alive()?;
        self.surfaces.clear();
        self.destroyed = true;
        info!("Screen backend for ruler {} destroyed", self.ruler_id);
        Ok(())
    }
}
