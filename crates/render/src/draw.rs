//! Rasterisation primitives on an RGB image.
//!
//! Every shape is sampled at pixel centres and clipped to the image, so
//! callers may pass geometry that lies partly or wholly off-screen.

use glam::DVec2;
use image::{Rgb, RgbImage};

pub const WHITE: Rgb<u8> = Rgb([255, 255, 255]);
pub const BLACK: Rgb<u8> = Rgb([0, 0, 0]);
pub const RED: Rgb<u8> = Rgb([255, 0, 0]);
pub const GREEN: Rgb<u8> = Rgb([0, 255, 0]);
pub const BLUE: Rgb<u8> = Rgb([0, 0, 255]);
pub const ORANGE: Rgb<u8> = Rgb([255, 165, 0]);

/// Pixel range covering `[lo, hi]` along one axis, clipped to `[0, size)`.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn span(lo: f64, hi: f64, size: u32) -> std::ops::Range<u32> {
    let start = lo.floor().max(0.0);
    let end = (hi.ceil() + 1.0).min(f64::from(size));
    if end <= start {
        return 0..0;
    }
    start as u32..end as u32
}

/// Paint every pixel inside the box `[min, max]` whose centre satisfies `inside`.
fn fill_where(img: &mut RgbImage, min: DVec2, max: DVec2, colour: Rgb<u8>, inside: impl Fn(DVec2) -> bool) {
    let (w, h) = img.dimensions();
    for y in span(min.y, max.y, h) {
        for x in span(min.x, max.x, w) {
            let centre = DVec2::new(f64::from(x) + 0.5, f64::from(y) + 0.5);
            if inside(centre) {
                img.put_pixel(x, y, colour);
            }
        }
    }
}

pub fn fill_disc(img: &mut RgbImage, centre: DVec2, radius: f64, colour: Rgb<u8>) {
    let r = DVec2::splat(radius);
    fill_where(img, centre - r, centre + r, colour, |p| p.distance_squared(centre) <= radius * radius);
}

/// Annulus between `inner` and `outer` radii.
pub fn ring(img: &mut RgbImage, centre: DVec2, inner: f64, outer: f64, colour: Rgb<u8>) {
    let r = DVec2::splat(outer);
    fill_where(img, centre - r, centre + r, colour, |p| {
        let d2 = p.distance_squared(centre);
        d2 <= outer * outer && d2 >= inner * inner
    });
}

/// Square outline of half-side `half`, `thickness` pixels wide, drawn inwards.
pub fn square_outline(img: &mut RgbImage, centre: DVec2, half: f64, thickness: f64, colour: Rgb<u8>) {
    let h = DVec2::splat(half);
    fill_where(img, centre - h, centre + h, colour, |p| {
        let d = (p - centre).abs();
        d.max_element() <= half && d.max_element() >= half - thickness
    });
}

/// Segment from `a` to `b` with round caps.
pub fn thick_line(img: &mut RgbImage, a: DVec2, b: DVec2, width: f64, colour: Rgb<u8>) {
    let r = width / 2.0;
    let pad = DVec2::splat(r);
    let ab = b - a;
    let len2 = ab.length_squared();
    fill_where(img, a.min(b) - pad, a.max(b) + pad, colour, |p| {
        let t = if len2 > 0.0 { ((p - a).dot(ab) / len2).clamp(0.0, 1.0) } else { 0.0 };
        p.distance_squared(a + ab * t) <= r * r
    });
}

/// Axis-aligned filled rectangle with corners `min` and `max`.
pub fn fill_rect(img: &mut RgbImage, min: DVec2, max: DVec2, colour: Rgb<u8>) {
    fill_where(img, min, max, colour, |p| p.cmpge(min).all() && p.cmple(max).all());
}
