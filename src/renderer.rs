use glam::DVec2;

use crate::raycast::{HitResult, NO_HIT_DISTANCE, Orientation};
use crate::viewpoint::Viewpoint;
use crate::world::{CELL_WIDTH, WorldMap};

/// Pixels per map cell in the top-down overlay.
const OVERLAY_CELL_PX: usize = 4;
const OVERLAY_MARGIN_PX: usize = 8;
/// Draw every Nth cast ray on the overlay; all of them would just smear.
const OVERLAY_RAY_STRIDE: usize = 8;

#[inline]
fn pack_rgb(r: u8, g: u8, b: u8) -> u32 {
    // BGRA8 in little-endian memory
    (b as u32) | ((g as u32) << 8) | ((r as u32) << 16)
}

/// Wall palette keyed by material code, matching the map asset's codes 1..=3.
/// Horizontal and corner faces draw 25 levels darker than vertical ones so
/// adjoining walls stay distinguishable; unknown codes fall back to grey.
fn material_color(material: u8, orientation: Orientation) -> u32 {
    let level = match orientation {
        Orientation::Vertical => 175,
        _ => 150,
    };
    match material {
        1 => pack_rgb(level, 0, 0),
        2 => pack_rgb(0, level, 0),
        3 => pack_rgb(0, 0, level),
        _ => pack_rgb(level, level, level),
    }
}

/// Draw one frame: sky and ground halves, a wall column per hit result, and
/// the top-down overlay in the corner. Consumes only the viewpoint state and
/// the finished hit sequence; no traversal happens here.
pub fn render_frame(
    buf: &mut [u32],
    width: usize,
    height: usize,
    map: &WorldMap,
    viewpoint: &Viewpoint,
    hits: &[HitResult],
) {
    let sky = pack_rgb(30, 30, 70);
    let ground = pack_rgb(40, 40, 40);

    let mid = height / 2;
    for y in 0..mid {
        let row = y * width;
        for x in 0..width {
            buf[row + x] = sky;
        }
    }
    for y in mid..height {
        let row = y * width;
        for x in 0..width {
            buf[row + x] = ground;
        }
    }

    for (x, hit) in hits.iter().take(width).enumerate() {
        draw_wall_column(buf, width, height, x, hit);
    }

    draw_overlay(buf, width, height, map, viewpoint, hits);
}

/// One screen column: height scales with the reciprocal of the hit distance,
/// centered on the horizon.
fn draw_wall_column(buf: &mut [u32], width: usize, height: usize, x: usize, hit: &HitResult) {
    if hit.material == 0 {
        return;
    }

    let line_height = (1.0 / hit.distance) * height as f64 * CELL_WIDTH;
    let mid = height as f64 / 2.0;
    let top = (mid - line_height / 2.0).floor().max(0.0) as usize;
    let bottom = ((mid + line_height / 2.0).floor() as usize).min(height - 1);

    let color = material_color(hit.material, hit.orientation);
    let mut idx = top * width + x;
    for _y in top..=bottom {
        buf[idx] = color;
        idx += width;
    }
}

/// Top-down map overlay: filled wall cells, sampled ray lines out to their
/// strike positions, and the viewpoint marker.
fn draw_overlay(
    buf: &mut [u32],
    width: usize,
    height: usize,
    map: &WorldMap,
    viewpoint: &Viewpoint,
    hits: &[HitResult],
) {
    let origin = DVec2::new(OVERLAY_MARGIN_PX as f64, OVERLAY_MARGIN_PX as f64);
    let scale = OVERLAY_CELL_PX as f64 / CELL_WIDTH;

    for row in 0..map.height() {
        for col in 0..map.width() {
            let material = map.material(col as i64, row as i64);
            if material == 0 {
                continue;
            }
            let color = material_color(material, Orientation::Vertical);
            let px = OVERLAY_MARGIN_PX + col * OVERLAY_CELL_PX;
            let py = OVERLAY_MARGIN_PX + row * OVERLAY_CELL_PX;
            // leave a one-pixel gap so the gridlines read through
            for y in py..py + OVERLAY_CELL_PX - 1 {
                for x in px..px + OVERLAY_CELL_PX - 1 {
                    put_pixel(buf, width, height, x as i64, y as i64, color);
                }
            }
        }
    }

    let ray_color = pack_rgb(100, 250, 50);
    let eye = origin + viewpoint.position * scale;
    if hits.len() > 1 {
        let screen_width = hits.len() - 1;
        for (column, hit) in hits.iter().enumerate().step_by(OVERLAY_RAY_STRIDE) {
            if hit.distance >= NO_HIT_DISTANCE {
                continue;
            }
            let dir = viewpoint.ray_direction(column, screen_width).normalize_or_zero();
            let strike = origin + (viewpoint.position + dir * hit.distance) * scale;
            draw_line(buf, width, height, eye, strike, ray_color);
        }
    }

    let marker = pack_rgb(250, 250, 250);
    for dy in -1..=1 {
        for dx in -1..=1 {
            put_pixel(
                buf,
                width,
                height,
                eye.x as i64 + dx,
                eye.y as i64 + dy,
                marker,
            );
        }
    }
}

#[inline]
fn put_pixel(buf: &mut [u32], width: usize, height: usize, x: i64, y: i64, color: u32) {
    if x >= 0 && y >= 0 && (x as usize) < width && (y as usize) < height {
        buf[y as usize * width + x as usize] = color;
    }
}

/// Plot a line by stepping the longer axis one pixel at a time.
fn draw_line(buf: &mut [u32], width: usize, height: usize, from: DVec2, to: DVec2, color: u32) {
    let span = to - from;
    let steps = span.x.abs().max(span.y.abs()).ceil() as usize;
    if steps == 0 {
        put_pixel(buf, width, height, from.x as i64, from.y as i64, color);
        return;
    }
    let step = span / steps as f64;
    let mut point = from;
    for _ in 0..=steps {
        put_pixel(buf, width, height, point.x as i64, point.y as i64, color);
        point += step;
    }
}
