use crate::error::{Result, SvgError};
use crate::style::{Color, affine_to_skia};
use crate::view::BBox;
use glam::{Affine2, IVec2, Vec2};
use resvg::tiny_skia;
use std::ops::{Deref, DerefMut};
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceOptions {
    pub width: u32,
    pub height: u32,
    pub background: Color,
    pub anti_alias: bool,
    /// Position of the surface inside its window, added to viewport boxes to
    /// produce window boxes.
    pub window_offset: IVec2,
}

impl Default for SurfaceOptions {
    fn default() -> Self {
        Self {
            width: 300,
            height: 150,
            background: Color::transparent(),
            anti_alias: true,
            window_offset: IVec2::ZERO,
        }
    }
}

impl SurfaceOptions {
    pub fn sized(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            ..Self::default()
        }
    }
}

/// Raster target of a render pass together with its transform stack.
pub struct Surface {
    pixmap: tiny_skia::Pixmap,
    options: SurfaceOptions,
    /// Saved transform, opacity and clip depth per push.
    stack: Vec<(Affine2, f32, usize)>,
    /// Nested clip masks; the last one applies.
    clips: Vec<tiny_skia::Mask>,
    xform: Affine2,
    opacity: f32,
    last_render_bbox: BBox,
}

impl Surface {
    pub fn new(options: SurfaceOptions) -> Result<Self> {
        let mut pixmap = tiny_skia::Pixmap::new(options.width, options.height).ok_or(
            SvgError::InvalidSurfaceSize {
                width: options.width,
                height: options.height,
            },
        )?;
        pixmap.fill(options.background.to_skia());
        Ok(Self {
            pixmap,
            options,
            stack: Vec::new(),
            clips: Vec::new(),
            xform: Affine2::IDENTITY,
            opacity: 1.0,
            last_render_bbox: BBox::EMPTY,
        })
    }

    pub fn options(&self) -> &SurfaceOptions {
        &self.options
    }

    pub fn width(&self) -> u32 {
        self.pixmap.width()
    }

    pub fn height(&self) -> u32 {
        self.pixmap.height()
    }

    pub fn bounds(&self) -> BBox {
        BBox::from_xywh(0, 0, self.width() as i32, self.height() as i32)
    }

    pub fn window_offset(&self) -> IVec2 {
        self.options.window_offset
    }

    pub fn clear(&mut self) {
        self.pixmap.fill(self.options.background.to_skia());
    }

    /// Composes `xform` onto the current transform and multiplies `opacity`
    /// into the current opacity. Clips added after the push are dropped by
    /// the matching pop.
    pub fn push_xform(&mut self, xform: Affine2, opacity: f32) {
        self.stack.push((self.xform, self.opacity, self.clips.len()));
        self.xform = self.xform * xform;
        self.opacity *= opacity.clamp(0.0, 1.0);
    }

    pub fn pop_xform(&mut self) {
        match self.stack.pop() {
            Some((xform, opacity, clips)) => {
                self.xform = xform;
                self.opacity = opacity;
                self.clips.truncate(clips);
            }
            None => log::error!(target: "rfgui_svg", "pop_xform on an empty transform stack"),
        }
    }

    /// Pushes and returns a guard that pops when dropped.
    pub fn scoped_xform(&mut self, xform: Affine2, opacity: f32) -> XformGuard<'_> {
        self.push_xform(xform, opacity);
        XformGuard { surface: self }
    }

    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    pub fn current_xform(&self) -> Affine2 {
        self.xform
    }

    pub fn current_opacity(&self) -> f32 {
        self.opacity
    }

    /// Restricts drawing to the rectangle `min..max` in current user space,
    /// intersected with any clip already in effect.
    pub fn clip_to(&mut self, min: Vec2, max: Vec2) {
        let Some(mut mask) = tiny_skia::Mask::new(self.width(), self.height()) else {
            return;
        };
        if let Some(rect) = tiny_skia::Rect::from_ltrb(min.x, min.y, max.x, max.y) {
            let path = tiny_skia::PathBuilder::from_rect(rect);
            let transform = affine_to_skia(self.xform);
            let anti_alias = self.options.anti_alias;
            match self.clips.last() {
                Some(current) => {
                    mask = current.clone();
                    mask.intersect_path(&path, tiny_skia::FillRule::Winding, anti_alias, transform);
                }
                None => mask.fill_path(&path, tiny_skia::FillRule::Winding, anti_alias, transform),
            }
        }
        self.clips.push(mask);
    }

    pub fn clip_depth(&self) -> usize {
        self.clips.len()
    }

    pub fn last_render_bbox(&self) -> BBox {
        self.last_render_bbox
    }

    pub fn reset_last_render_bbox(&mut self) {
        self.last_render_bbox = BBox::EMPTY;
    }

    /// Runs `draw` without growing the tracked render region.
    pub fn untracked(&mut self, draw: impl FnOnce(&mut Surface)) {
        let saved = self.last_render_bbox;
        draw(self);
        self.last_render_bbox = saved;
    }

    /// Device-space box of `rect` (in current user space) under the current
    /// transform.
    pub fn device_bbox(&self, min: Vec2, max: Vec2) -> BBox {
        let corners = [
            min,
            Vec2::new(max.x, min.y),
            max,
            Vec2::new(min.x, max.y),
        ]
        .map(|p| self.xform.transform_point2(p));
        let lo = corners.iter().copied().reduce(Vec2::min).unwrap_or(Vec2::ZERO);
        let hi = corners.iter().copied().reduce(Vec2::max).unwrap_or(Vec2::ZERO);
        BBox::round_out(lo, hi)
    }

    pub fn fill_path(&mut self, path: &tiny_skia::Path, paint: &tiny_skia::Paint<'_>, rule: tiny_skia::FillRule) {
        let transform = affine_to_skia(self.xform);
        self.pixmap.fill_path(path, paint, rule, transform, self.clips.last());
        self.record_path(path, transform, 0.0);
    }

    pub fn stroke_path(&mut self, path: &tiny_skia::Path, paint: &tiny_skia::Paint<'_>, stroke: &tiny_skia::Stroke) {
        let transform = affine_to_skia(self.xform);
        self.pixmap.stroke_path(path, paint, stroke, transform, self.clips.last());
        self.record_path(path, transform, stroke.width * 0.5);
    }

    fn record_path(&mut self, path: &tiny_skia::Path, transform: tiny_skia::Transform, half_width: f32) {
        let Some(device) = path.clone().transform(transform) else {
            return;
        };
        let rect = device.bounds();
        let pad = half_width * self.xform.matrix2.determinant().abs().sqrt();
        let bounds = BBox::round_out(
            Vec2::new(rect.left() - pad, rect.top() - pad),
            Vec2::new(rect.right() + pad, rect.bottom() + pad),
        );
        self.last_render_bbox = self.last_render_bbox.union(bounds);
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<Color> {
        let pixel = self.pixmap.pixel(x, y)?.demultiply();
        Some(Color::rgba(pixel.red(), pixel.green(), pixel.blue(), pixel.alpha()))
    }

    pub fn to_image(&self) -> image::RgbaImage {
        image::RgbaImage::from_fn(self.width(), self.height(), |x, y| {
            let [r, g, b, a] = self
                .pixel(x, y)
                .unwrap_or(Color::transparent())
                .to_rgba_u8();
            image::Rgba([r, g, b, a])
        })
    }

    pub fn save_png(&self, path: impl AsRef<Path>) -> Result<()> {
        self.to_image().save_with_format(path, image::ImageFormat::Png)?;
        Ok(())
    }

    pub(crate) fn anti_alias(&self) -> bool {
        self.options.anti_alias
    }
}

pub struct XformGuard<'a> {
    surface: &'a mut Surface,
}

impl Deref for XformGuard<'_> {
    type Target = Surface;

    fn deref(&self) -> &Surface {
        self.surface
    }
}

impl DerefMut for XformGuard<'_> {
    fn deref_mut(&mut self) -> &mut Surface {
        self.surface
    }
}

impl Drop for XformGuard<'_> {
    fn drop(&mut self) {
        self.surface.pop_xform();
    }
}
