//! Drawing surfaces and their backing stores

use log::debug;
use resvg::tiny_skia::{Color, FilterQuality, Pixmap, PixmapPaint, Transform};

use super::paint;
use super::tick::{self, TickWindow};
use crate::consts::OVERSAMPLE;
use crate::error::{Result, RulerError};
use crate::geometry::{Axis, ScrollOffset, Size, SurfaceGeometry};
use crate::style::RulerStyle;

/// Physical pixels for `logical` CSS pixels at `pixel_ratio`
#[must_use]
pub fn backing_dimension(logical: f32, pixel_ratio: f32) -> u32 {
    let physical = (logical * pixel_ratio * OVERSAMPLE).ceil();
    if physical.is_finite() && physical >= 1.0 {
        physical as u32
    } else {
        1
    }
}

fn allocate(logical: Size, pixel_ratio: f32) -> Result<Pixmap> {
    let width = backing_dimension(logical.width, pixel_ratio);
    let height = backing_dimension(logical.height, pixel_ratio);
    Pixmap::new(width, height).ok_or(RulerError::Surface { width, height })
}

/// A rendered ruler raster moved between threads.
///
/// Moving a `Bitmap` moves its pixel buffer; nothing is copied.
#[derive(Debug)]
pub struct Bitmap {
    pub axis: Axis,
    pub logical: Size,
    pub pixmap: Pixmap,
    /// Tick window of the paint that produced this raster
    pub window: Option<TickWindow>,
}

impl Bitmap {
    #[must_use]
    pub fn width(&self) -> u32 {
        self.pixmap.width()
    }

    #[must_use]
    pub fn height(&self) -> u32 {
        self.pixmap.height()
    }
}

/// One ruler drawing surface
#[derive(Debug)]
pub struct Surface {
    axis: Axis,
    logical: Size,
    pixel_ratio: f32,
    pixmap: Pixmap,
    window: Option<TickWindow>,
}

impl Surface {
    pub fn new(axis: Axis, logical: Size, pixel_ratio: f32) -> Result<Self> {
        Ok(Self {
            axis,
            logical,
            pixel_ratio,
            pixmap: allocate(logical, pixel_ratio)?,
            window: None,
        })
    }

    /// Resize the backing store to match `logical`. Prior raster content is
    /// discarded whenever the backing size changes.
    pub fn rescale(&mut self, logical: Size) -> Result<()> {
        let width = backing_dimension(logical.width, self.pixel_ratio);
        let height = backing_dimension(logical.height, self.pixel_ratio);
        if width != self.pixmap.width() || height != self.pixmap.height() {
            self.pixmap = allocate(logical, self.pixel_ratio)?;
            self.window = None;
        }
        self.logical = logical;
        Ok(())
    }

    pub fn clear(&mut self) {
        self.pixmap.fill(Color::TRANSPARENT);
        self.window = None;
    }

    /// Lay out and paint the ruler at scroll offset `offset`
    pub fn draw(&mut self, style: &RulerStyle, infinite: bool, offset: f32) {
        let list = tick::layout(
            self.axis,
            self.logical,
            style,
            offset,
            infinite,
            self.pixel_ratio,
        );
        debug!(
            "Painting {} ruler: {} ticks, {} labels, offset {offset}",
            self.axis.as_str(),
            list.ticks.len(),
            list.labels.len()
        );
        paint::paint(&mut self.pixmap, &list);
        self.window = Some(list.window);
    }

    /// Move the raster out, leaving a blank backing store of the same size
    pub fn take_bitmap(&mut self) -> Result<Bitmap> {
        let blank = allocate(self.logical, self.pixel_ratio)?;
        Ok(Bitmap {
            axis: self.axis,
            logical: self.logical,
            pixmap: std::mem::replace(&mut self.pixmap, blank),
            window: self.window.take(),
        })
    }

    /// Rescale to the bitmap's logical size and copy it in, stretched to the
    /// full backing store
    pub fn blit(&mut self, bitmap: &Bitmap) -> Result<()> {
        self.rescale(bitmap.logical)?;
        self.window = bitmap.window;
        if self.backing_size() == (bitmap.width(), bitmap.height()) {
            self.pixmap.data_mut().copy_from_slice(bitmap.pixmap.data());
            return Ok(());
        }
        self.pixmap.fill(Color::TRANSPARENT);
        let sx = self.pixmap.width() as f32 / bitmap.width() as f32;
        let sy = self.pixmap.height() as f32 / bitmap.height() as f32;
        let paint = PixmapPaint {
            quality: FilterQuality::Nearest,
            ..PixmapPaint::default()
        };
        self.pixmap.draw_pixmap(
            0,
            0,
            bitmap.pixmap.as_ref(),
            &paint,
            Transform::from_scale(sx, sy),
            None,
        );
        Ok(())
    }

    #[must_use]
    pub fn axis(&self) -> Axis {
        self.axis
    }

    #[must_use]
    pub fn logical(&self) -> Size {
        self.logical
    }

    #[must_use]
    pub fn pixel_ratio(&self) -> f32 {
        self.pixel_ratio
    }

    /// Backing store size in physical pixels
    #[must_use]
    pub fn backing_size(&self) -> (u32, u32) {
        (self.pixmap.width(), self.pixmap.height())
    }

    /// Tick window of the last paint, if the raster is current
    #[must_use]
    pub fn last_window(&self) -> Option<TickWindow> {
        self.window
    }

    #[must_use]
    pub fn pixmap(&self) -> &Pixmap {
        &self.pixmap
    }
}

/// The horizontal and vertical ruler surfaces of one backend
#[derive(Debug)]
pub struct SurfacePair {
    pub horizontal: Surface,
    pub vertical: Surface,
}

impl SurfacePair {
    pub fn new(geometry: &SurfaceGeometry, pixel_ratio: f32) -> Result<Self> {
        Ok(Self {
            horizontal: Surface::new(Axis::Horizontal, geometry.horizontal, pixel_ratio)?,
            vertical: Surface::new(Axis::Vertical, geometry.vertical, pixel_ratio)?,
        })
    }

    pub fn rescale(&mut self, geometry: &SurfaceGeometry) -> Result<()> {
        self.horizontal.rescale(geometry.horizontal)?;
        self.vertical.rescale(geometry.vertical)
    }

    pub fn clear(&mut self) {
        self.horizontal.clear();
        self.vertical.clear();
    }

    pub fn draw(&mut self, style: &RulerStyle, infinite: bool, scroll: ScrollOffset) {
        self.horizontal
            .draw(style, infinite, scroll.along(Axis::Horizontal));
        self.vertical.draw(style, infinite, scroll.along(Axis::Vertical));
    }

    /// Move both rasters out
    pub fn take_bitmaps(&mut self) -> Result<[Bitmap; 2]> {
        Ok([self.horizontal.take_bitmap()?, self.vertical.take_bitmap()?])
    }

    #[must_use]
    pub fn get(&self, axis: Axis) -> &Surface {
        match axis {
            Axis::Horizontal => &self.horizontal,
            Axis::Vertical => &self.vertical,
        }
    }

    pub fn get_mut(&mut self, axis: Axis) -> &mut Surface {
        match axis {
            Axis::Horizontal => &mut self.horizontal,
            Axis::Vertical => &mut self.vertical,
        }
    }

    #[must_use]
    pub fn geometry(&self, infinite: bool) -> SurfaceGeometry {
        SurfaceGeometry {
            horizontal: self.horizontal.logical,
            vertical: self.vertical.logical,
            infinite,
        }
    }
}
