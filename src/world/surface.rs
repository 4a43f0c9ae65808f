//! Owned RGBA pixel buffers.
//!
//! A [`Surface`] is used both for textures (read through
//! [`Surface::sample_filtered`]) and for the destination frame the rasterizer
//! writes into. Pixels use **straight** alpha in R, G, B, A byte order.

use std::collections::HashMap;
use std::fmt;

use glam::{IVec2, Vec2};
use thiserror::Error;

/// One straight-alpha pixel. `a == 0` is fully transparent, `a == 255` opaque.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const TRANSPARENT: Rgba = Rgba::new(0, 0, 0, 0);
    pub const BLACK: Rgba = Rgba::new(0, 0, 0, 255);

    #[inline]
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    #[inline]
    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }

    /// `0x00RRGGBB`, the layout `minifb` expects.
    #[inline]
    pub const fn to_0rgb(self) -> u32 {
        ((self.r as u32) << 16) | ((self.g as u32) << 8) | self.b as u32
    }

    /// Blend the colour channels of `self` onto `dst`, weighted by `self.a`.
    #[inline]
    fn mix(self, dst: Rgba) -> (u8, u8, u8) {
        let a = self.a as u32;
        let ia = 255 - a;
        (
            ((self.r as u32 * a + dst.r as u32 * ia) >> 8) as u8,
            ((self.g as u32 * a + dst.g as u32 * ia) >> 8) as u8,
            ((self.b as u32 * a + dst.b as u32 * ia) >> 8) as u8,
        )
    }

    /// `self` drawn over `dst`; the result is always opaque.
    ///
    /// `a == 255` returns `self` and `a == 0` returns `dst` untouched.
    #[inline]
    pub fn over(self, dst: Rgba) -> Rgba {
        match self.a {
            255 => self,
            0 => dst,
            _ => {
                let (r, g, b) = self.mix(dst);
                Rgba::new(r, g, b, 255)
            }
        }
    }

    /// Composite rule used by 2D blits: channels blend, alpha takes the max.
    ///
    /// Taking the max keeps an opaque destination opaque forever.
    #[inline]
    pub fn composite(self, dst: Rgba) -> Rgba {
        match self.a {
            255 => self,
            0 => dst,
            _ => {
                let (r, g, b) = self.mix(dst);
                Rgba::new(r, g, b, self.a.max(dst.a))
            }
        }
    }
}

/// Axis-aligned pixel rectangle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SurfaceRect {
    pub x: usize,
    pub y: usize,
    pub w: usize,
    pub h: usize,
}

impl SurfaceRect {
    pub const fn new(x: usize, y: usize, w: usize, h: usize) -> Self {
        Self { x, y, w, h }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SurfaceError {
    #[error("pixel data holds {got} bytes, {w}x{h} RGBA needs {expected}")]
    SizeMismatch {
        w: usize,
        h: usize,
        expected: usize,
        got: usize,
    },

    #[error("block copy needs equal widths (destination {dst}, source {src})")]
    WidthMismatch { dst: usize, src: usize },

    #[error("block of {rows} rows at y={dst_y} overflows destination height {height}")]
    BlockTooTall {
        rows: usize,
        dst_y: usize,
        height: usize,
    },
}

/// Memo of filtered texels keyed by (texel index, window width, window height).
///
/// The key only describes the window shape, never the content, so it stays
/// valid for as long as the texture pixels do.
#[derive(Clone, Default)]
struct TexelCache {
    map: HashMap<(u32, u32, u32), Rgba>,
}

/// Row-major RGBA buffer. `pixels.len() == w * h` always holds.
#[derive(Clone)]
pub struct Surface {
    w: usize,
    h: usize,
    pixels: Vec<Rgba>,
    cache: TexelCache,
}

impl fmt::Debug for Surface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Surface")
            .field("w", &self.w)
            .field("h", &self.h)
            .field("cached_texels", &self.cache.map.len())
            .finish()
    }
}

impl Surface {
    // ---------------------------------------------------------------------
    // Constructors
    // ---------------------------------------------------------------------

    /// Transparent-black surface of `w * h` pixels.
    pub fn new(w: usize, h: usize) -> Self {
        Self {
            w,
            h,
            pixels: vec![Rgba::TRANSPARENT; w * h],
            cache: TexelCache::default(),
        }
    }

    /// Surface filled with a single colour.
    pub fn filled(w: usize, h: usize, colour: Rgba) -> Self {
        let mut s = Self::new(w, h);
        s.fill(colour);
        s
    }

    /// Wrap already-decoded RGBA8 bytes (4 per pixel, row-major).
    pub fn from_rgba(w: usize, h: usize, bytes: &[u8]) -> Result<Self, SurfaceError> {
        let expected = w * h * 4;
        if bytes.len() != expected {
            return Err(SurfaceError::SizeMismatch {
                w,
                h,
                expected,
                got: bytes.len(),
            });
        }
        let pixels = bytes
            .chunks_exact(4)
            .map(|p| Rgba::new(p[0], p[1], p[2], p[3]))
            .collect();
        Ok(Self {
            w,
            h,
            pixels,
            cache: TexelCache::default(),
        })
    }

    // ---------------------------------------------------------------------
    // Plain access
    // ---------------------------------------------------------------------

    #[inline]
    pub fn width(&self) -> usize {
        self.w
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.h
    }

    #[inline]
    pub fn pixels(&self) -> &[Rgba] {
        &self.pixels
    }

    /// Direct mutable access for the rasterizer's hot loop.
    ///
    /// Texture surfaces must not be edited through this after sampling
    /// started: the texel cache is never invalidated.
    #[inline]
    pub(crate) fn pixels_mut(&mut self) -> &mut [Rgba] {
        &mut self.pixels
    }

    #[inline]
    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x as usize >= self.w || y as usize >= self.h {
            return None;
        }
        Some(x as usize + y as usize * self.w)
    }

    pub fn pixel(&self, x: i32, y: i32) -> Option<Rgba> {
        self.index(x, y).map(|i| self.pixels[i])
    }

    /// Returns `false` (and writes nothing) when `(x, y)` is outside.
    pub fn set_pixel(&mut self, x: i32, y: i32, colour: Rgba) -> bool {
        match self.index(x, y) {
            Some(i) => {
                self.pixels[i] = colour;
                true
            }
            None => false,
        }
    }

    pub fn fill(&mut self, colour: Rgba) {
        self.pixels.fill(colour);
    }

    pub fn reset(&mut self) {
        self.fill(Rgba::TRANSPARENT);
    }

    // ---------------------------------------------------------------------
    // Block copies and blits
    // ---------------------------------------------------------------------

    /// Raw row copy of a same-width surface to the top of `self`.
    pub fn overwrite_block(&mut self, src: &Surface) -> Result<(), SurfaceError> {
        self.overwrite_block_at(src, 0)
    }

    /// Raw row copy of a same-width surface starting at row `dst_y`.
    ///
    /// No blending; used for whole-frame background fills.
    pub fn overwrite_block_at(&mut self, src: &Surface, dst_y: usize) -> Result<(), SurfaceError> {
        if src.w != self.w {
            return Err(SurfaceError::WidthMismatch {
                dst: self.w,
                src: src.w,
            });
        }
        if dst_y + src.h > self.h {
            return Err(SurfaceError::BlockTooTall {
                rows: src.h,
                dst_y,
                height: self.h,
            });
        }
        let start = dst_y * self.w;
        self.pixels[start..start + src.pixels.len()].copy_from_slice(&src.pixels);
        Ok(())
    }

    /// Clip `rect` placed at `dst` against both surfaces.
    fn clip(&self, src: &Surface, rect: SurfaceRect, dst: (usize, usize)) -> (usize, usize) {
        let w = rect
            .w
            .min(self.w.saturating_sub(dst.0))
            .min(src.w.saturating_sub(rect.x));
        let h = rect
            .h
            .min(self.h.saturating_sub(dst.1))
            .min(src.h.saturating_sub(rect.y));
        (w, h)
    }

    /// Unconditional per-pixel copy of `rect` from `src` to `dst` in `self`.
    pub fn copy_rect(&mut self, src: &Surface, rect: SurfaceRect, dst: (usize, usize)) {
        let (w, h) = self.clip(src, rect, dst);
        for j in 0..h {
            let s = rect.x + (rect.y + j) * src.w;
            let d = dst.0 + (dst.1 + j) * self.w;
            self.pixels[d..d + w].copy_from_slice(&src.pixels[s..s + w]);
        }
    }

    /// Alpha-composite `rect` from `src` onto `self` at `dst`.
    pub fn composite_rect(&mut self, src: &Surface, rect: SurfaceRect, dst: (usize, usize)) {
        let (w, h) = self.clip(src, rect, dst);
        for j in 0..h {
            let s_row = rect.x + (rect.y + j) * src.w;
            let d_row = dst.0 + (dst.1 + j) * self.w;
            for i in 0..w {
                let px = &mut self.pixels[d_row + i];
                *px = src.pixels[s_row + i].composite(*px);
            }
        }
    }

    /// Composite the whole of `src` at `dst`.
    pub fn composite(&mut self, src: &Surface, dst: (usize, usize)) {
        self.composite_rect(src, SurfaceRect::new(0, 0, src.w, src.h), dst);
    }

    /// Straight line, one pixel per unit of length; clipped per pixel.
    pub fn line(&mut self, from: IVec2, to: IVec2, colour: Rgba) {
        let diff = (to - from).as_dvec2();
        let length = diff.length();
        if length == 0.0 {
            self.set_pixel(from.x, from.y, colour);
            return;
        }
        let step = diff / length;
        let mut p = from.as_dvec2();
        let mut t = 0.0;
        while t <= length {
            self.set_pixel(p.x as i32, p.y as i32, colour);
            p += step;
            t += 1.0;
        }
    }

    // ---------------------------------------------------------------------
    // Texture sampling
    // ---------------------------------------------------------------------

    /// Box-filtered texel lookup.
    ///
    /// `pos` and `size` are normalised to the surface (`0..=1`). `size`
    /// describes how much of the texture one destination pixel covers; the
    /// window grows with minification, which is a cheap stand-in for mipmaps.
    ///
    /// Only fully opaque texels are averaged. A window without any of them
    /// comes back fully transparent, partially transparent texels never leak
    /// into a filtered result.
    pub fn sample_filtered(&mut self, pos: Vec2, size: Vec2) -> Rgba {
        if self.pixels.is_empty() {
            return Rgba::TRANSPARENT;
        }

        let win_w = ((size.x * self.w as f32) as i32).max(1);
        let win_h = ((size.y * self.h as f32) as i32).max(1);

        let x = (pos.x.clamp(0.0, 1.0) * (self.w - 1) as f32) as i32;
        let y = (pos.y.clamp(0.0, 1.0) * (self.h - 1) as f32) as i32;
        let idx = x as usize + y as usize * self.w;

        if win_w == 1 && win_h == 1 {
            return self.pixels[idx];
        }

        let key = (idx as u32, win_w as u32, win_h as u32);
        if let Some(&hit) = self.cache.map.get(&key) {
            return hit;
        }

        let res = self.average_opaque(x, y, win_w, win_h);
        self.cache.map.insert(key, res);
        res
    }

    fn average_opaque(&self, x: i32, y: i32, win_w: i32, win_h: i32) -> Rgba {
        let x0 = (x - win_w / 2).max(0);
        let x1 = (x + win_w / 2).min(self.w as i32 - 1);
        let y0 = (y - win_h / 2).max(0);
        let y1 = (y + win_h / 2).min(self.h as i32 - 1);

        let (mut r, mut g, mut b) = (0u32, 0u32, 0u32);
        let mut count = 0u32;
        let mut a = 0u8;

        for j in y0..=y1 {
            let row = j as usize * self.w;
            for i in x0..=x1 {
                let px = self.pixels[row + i as usize];
                if px.a != 255 {
                    continue;
                }
                r += px.r as u32;
                g += px.g as u32;
                b += px.b as u32;
                a = a.max(px.a);
                count += 1;
            }
        }

        if count == 0 || a != 255 {
            return Rgba::TRANSPARENT;
        }
        Rgba::new((r / count) as u8, (g / count) as u8, (b / count) as u8, a)
    }

    #[cfg(test)]
    pub(crate) fn cached_texels(&self) -> usize {
        self.cache.map.len()
    }
}

/*======================================================================*/
/*                               Tests                                  */
/*======================================================================*/
#[cfg(test)]
mod tests {
    use super::*;
    use glam::{ivec2, vec2};

    const RED: Rgba = Rgba::opaque(255, 0, 0);
    const BLUE: Rgba = Rgba::opaque(0, 0, 255);

    fn checker(w: usize, h: usize) -> Surface {
        let mut s = Surface::new(w, h);
        for y in 0..h as i32 {
            for x in 0..w as i32 {
                let c = if (x ^ y) & 1 == 0 { RED } else { BLUE };
                s.set_pixel(x, y, c);
            }
        }
        s
    }

    #[test]
    fn new_is_transparent() {
        let s = Surface::new(3, 2);
        assert_eq!(s.pixels().len(), 6);
        assert!(s.pixels().iter().all(|p| *p == Rgba::TRANSPARENT));
    }

    #[test]
    fn from_rgba_checks_length() {
        let err = Surface::from_rgba(2, 2, &[0; 15]).unwrap_err();
        assert_eq!(
            err,
            SurfaceError::SizeMismatch {
                w: 2,
                h: 2,
                expected: 16,
                got: 15
            }
        );
        let ok = Surface::from_rgba(1, 1, &[1, 2, 3, 4]).unwrap();
        assert_eq!(ok.pixel(0, 0), Some(Rgba::new(1, 2, 3, 4)));
    }

    #[test]
    fn out_of_bounds_access_is_ignored() {
        let mut s = Surface::new(2, 2);
        assert!(!s.set_pixel(-1, 0, RED));
        assert!(!s.set_pixel(2, 0, RED));
        assert_eq!(s.pixel(0, 5), None);
    }

    #[test]
    fn composite_opaque_source_reproduces_it() {
        let src = checker(4, 4);
        let mut dst = Surface::filled(6, 6, Rgba::opaque(10, 20, 30));
        dst.composite_rect(&src, SurfaceRect::new(0, 0, 4, 4), (1, 1));
        for y in 0..4 {
            for x in 0..4 {
                assert_eq!(dst.pixel(x + 1, y + 1), src.pixel(x, y));
            }
        }
        assert_eq!(dst.pixel(0, 0), Some(Rgba::opaque(10, 20, 30)));
    }

    #[test]
    fn composite_transparent_source_is_noop() {
        let src = Surface::new(4, 4);
        let mut dst = checker(4, 4);
        let before = dst.pixels().to_vec();
        dst.composite(&src, (0, 0));
        assert_eq!(dst.pixels(), &before[..]);
    }

    #[test]
    fn composite_alpha_takes_max() {
        let src = Surface::filled(1, 1, Rgba::new(200, 0, 0, 100));
        let mut dst = Surface::filled(1, 1, Rgba::new(0, 0, 200, 40));
        dst.composite(&src, (0, 0));
        let px = dst.pixel(0, 0).unwrap();
        assert_eq!(px.a, 100);
        assert_eq!(px.r, ((200 * 100) >> 8) as u8);
        assert_eq!(px.b, ((200 * 155) >> 8) as u8);
    }

    #[test]
    fn copy_rect_clips_to_destination() {
        let src = checker(8, 8);
        let mut dst = Surface::new(4, 4);
        dst.copy_rect(&src, SurfaceRect::new(2, 2, 8, 8), (2, 2));
        assert_eq!(dst.pixel(2, 2), src.pixel(2, 2));
        assert_eq!(dst.pixel(3, 3), src.pixel(3, 3));
        assert_eq!(dst.pixel(1, 1), Some(Rgba::TRANSPARENT));
    }

    #[test]
    fn overwrite_block_copies_rows() {
        let src = Surface::filled(4, 2, RED);
        let mut dst = Surface::filled(4, 4, BLUE);
        dst.overwrite_block_at(&src, 1).unwrap();
        assert_eq!(dst.pixel(0, 0), Some(BLUE));
        assert_eq!(dst.pixel(3, 1), Some(RED));
        assert_eq!(dst.pixel(3, 2), Some(RED));
        assert_eq!(dst.pixel(0, 3), Some(BLUE));

        let wide = Surface::new(5, 1);
        assert!(matches!(
            dst.overwrite_block(&wide),
            Err(SurfaceError::WidthMismatch { dst: 4, src: 5 })
        ));
        assert!(matches!(
            dst.overwrite_block_at(&src, 3),
            Err(SurfaceError::BlockTooTall { .. })
        ));
    }

    #[test]
    fn line_stays_inside() {
        let mut s = Surface::new(4, 4);
        s.line(ivec2(-3, 0), ivec2(10, 0), RED);
        assert!((0..4).all(|x| s.pixel(x, 0) == Some(RED)));
        assert_eq!(s.pixel(0, 1), Some(Rgba::TRANSPARENT));
    }

    #[test]
    fn point_sample_returns_exact_texel() {
        let mut s = checker(4, 4);
        s.set_pixel(3, 0, Rgba::new(1, 2, 3, 77));
        let px = s.sample_filtered(vec2(1.0, 0.0), vec2(0.1, 0.1));
        assert_eq!(px, Rgba::new(1, 2, 3, 77));
        assert_eq!(s.cached_texels(), 0, "1x1 windows bypass the cache");
    }

    #[test]
    fn filter_averages_opaque_texels() {
        let mut s = checker(4, 4);
        let px = s.sample_filtered(vec2(0.5, 0.5), vec2(0.5, 0.5));
        assert_eq!(px.a, 255);
        assert!(px.r > 0 && px.b > 0, "window mixes both colours: {px:?}");
        assert_eq!(s.cached_texels(), 1);
        assert_eq!(s.sample_filtered(vec2(0.5, 0.5), vec2(0.5, 0.5)), px);
        assert_eq!(s.cached_texels(), 1);
    }

    #[test]
    fn filter_without_opaque_texel_is_transparent() {
        let mut s = Surface::filled(4, 4, Rgba::new(255, 255, 255, 254));
        let px = s.sample_filtered(vec2(0.5, 0.5), vec2(1.0, 1.0));
        assert_eq!(px, Rgba::TRANSPARENT);
    }

    #[test]
    fn filter_skips_translucent_texels() {
        let mut s = Surface::filled(2, 1, Rgba::new(0, 0, 0, 128));
        s.set_pixel(1, 0, RED);
        let px = s.sample_filtered(vec2(0.0, 0.0), vec2(1.0, 1.0));
        assert_eq!(px, RED);
    }

    #[test]
    fn over_has_exact_endpoints() {
        let dst = Rgba::opaque(9, 8, 7);
        assert_eq!(Rgba::new(1, 2, 3, 0).over(dst), dst);
        assert_eq!(RED.over(dst), RED);
        assert_eq!(Rgba::new(255, 0, 0, 128).over(dst).a, 255);
    }
}
