//! Raster work on page images: rotation, table and cell extraction, row
//! prediction, and the annotation overlay drawn with tiny-skia.

use image::{GrayImage, Rgba, RgbaImage, imageops};
use tiny_skia::{Paint, PathBuilder, Pixmap, Stroke, Transform};

use super::geometry::{self, knob, raster};
use crate::config::{AnnotatorConfig, ShapeColor};
use crate::domain::cells::{CellGrid, map_cells};
use crate::domain::{Point, Rect, Rotation, TableOutline};
use crate::session::state::AnnotationStore;

/// Convert RgbaImage to Pixmap, apply drawing function, and copy back
fn with_pixmap(img: &mut RgbaImage, f: impl FnOnce(&mut Pixmap)) {
    let (w, h) = (img.width(), img.height());
    let Some(size) = tiny_skia::IntSize::from_wh(w, h) else {
        return;
    };
    let Some(mut pixmap) = Pixmap::from_vec(img.as_raw().clone(), size) else {
        return;
    };

    f(&mut pixmap);

    img.copy_from_slice(pixmap.data());
}

/// Render the page as displayed at `rotation`: same size, turned about the
/// image center with nearest-neighbour sampling. Uncovered pixels are black.
pub fn rotate_about_center(img: &RgbaImage, rotation: Rotation) -> RgbaImage {
    if rotation == Rotation::ZERO {
        return img.clone();
    }
    let (w, h) = img.dimensions();
    let pivot = Point::new(w as f32 / 2.0, h as f32 / 2.0);
    RgbaImage::from_fn(w, h, |x, y| {
        let center = Point::new(x as f32 + 0.5, y as f32 + 0.5);
        let source = geometry::frame_to_document(center, rotation, pivot);
        let (sx, sy) = (source.x.floor(), source.y.floor());
        if sx < 0.0 || sy < 0.0 || sx >= w as f32 || sy >= h as f32 {
            Rgba([0, 0, 0, 255])
        } else {
            *img.get_pixel(sx as u32, sy as u32)
        }
    })
}

/// Cut `rect` out of the image. Coordinates are clamped to the image; an
/// empty intersection gives an empty image.
pub fn crop(img: &RgbaImage, rect: Rect) -> RgbaImage {
    let bounds = Rect::new(0.0, 0.0, img.width() as f32, img.height() as f32);
    let Some(visible) = rect.intersect(bounds) else {
        return RgbaImage::new(0, 0);
    };
    let left = visible.left.round() as u32;
    let top = visible.top.round() as u32;
    let width = (visible.right.round() as u32).saturating_sub(left);
    let height = (visible.bottom.round() as u32).saturating_sub(top);
    imageops::crop_imm(img, left, top, width, height).to_image()
}

/// The table region as an upright image
pub fn extract_table_image(page: &RgbaImage, table: &TableOutline) -> RgbaImage {
    let rotated = rotate_about_center(page, table.rotation);
    crop(&rotated, table.outline)
}

/// Every cell of the table as its own image
pub fn cell_images(page: &RgbaImage, table: &TableOutline) -> CellGrid<RgbaImage> {
    let table_image = extract_table_image(page, table);
    map_cells(&table.cell_grid(), |cell| crop(&table_image, *cell))
}

/// Grey-level histogram of a horizontal strip, in five bins of width 51
fn strip_histogram(img: &GrayImage, top: u32) -> [f32; 5] {
    let mut bins = [0.0; 5];
    let bottom = (top + raster::ROW_STRIP_HEIGHT).min(img.height());
    for y in top..bottom {
        for x in 0..img.width() {
            let value = img.get_pixel(x, y).0[0] as usize;
            bins[(value / 51).min(4)] += 1.0;
        }
    }
    bins
}

fn cosine_similarity(a: &[f32; 5], b: &[f32; 5]) -> f32 {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm = |v: &[f32; 5]| v.iter().map(|x| x * x).sum::<f32>().sqrt();
    let denominator = norm(a) * norm(b);
    if denominator == 0.0 {
        0.0
    } else {
        dot / denominator
    }
}

/// Guess where the row after the last boundary starts.
///
/// Assumes the next row is as tall as the last one and searches a small
/// window around that position for the pixel strip that looks most like the
/// strip at the last boundary. Returns a frame y coordinate.
pub fn predict_next_row_position(page: &RgbaImage, table: &TableOutline) -> Option<f32> {
    let top = table.outline.top;
    let rows: Vec<i32> = table
        .rows()
        .iter()
        .map(|row| (row - top).round() as i32)
        .collect();
    let last = *rows.last()?;
    let last_height = match rows.as_slice() {
        [only] => *only,
        [.., previous, last] => last - previous,
        [] => return None,
    };

    let table_image = imageops::grayscale(&extract_table_image(page, table));
    let table_height = table_image.height() as i32;
    let center = last + last_height;
    let candidates: Vec<i32> = (center - raster::ROW_SEARCH_AREA..center + raster::ROW_SEARCH_AREA)
        .filter(|candidate| *candidate >= 0 && *candidate < table_height)
        .collect();
    if candidates.is_empty() || last < 0 {
        return None;
    }

    let reference = strip_histogram(&table_image, last as u32);
    let mut best: Option<(i32, f32)> = None;
    for candidate in candidates {
        let similarity = cosine_similarity(&reference, &strip_histogram(&table_image, candidate as u32));
        if best.is_none_or(|(_, score)| similarity > score) {
            best = Some((candidate, similarity));
        }
    }
    best.map(|(candidate, _)| top + candidate as f32)
}

fn paint(color: ShapeColor) -> Paint<'static> {
    let [r, g, b, a] = color.to_rgba_u8();
    let mut paint = Paint::default();
    paint.set_color_rgba8(r, g, b, a);
    paint.anti_alias = true;
    paint
}

fn polyline(points: &[Point], close: bool) -> Option<tiny_skia::Path> {
    let (first, rest) = points.split_first()?;
    let mut pb = PathBuilder::new();
    pb.move_to(first.x, first.y);
    for point in rest {
        pb.line_to(point.x, point.y);
    }
    if close {
        pb.close();
    }
    pb.finish()
}

/// Draw every table outline, its boundaries and row knobs onto the page
/// (document space) for a static preview.
pub fn render_overlay(
    page: &RgbaImage,
    store: &AnnotationStore,
    config: &AnnotatorConfig,
) -> RgbaImage {
    let mut img = page.clone();
    let pivot = store.page().center();
    let selected = store.selected_table();
    let selected_row = store.selected_row();

    with_pixmap(&mut img, |pixmap| {
        let stroke = Stroke {
            width: 2.0,
            ..Default::default()
        };
        let thin = Stroke {
            width: 1.0,
            ..Default::default()
        };

        for table in store.tables() {
            let is_selected = selected == Some(table.id);
            let outline_color = if is_selected {
                config.selected_outline_color
            } else {
                config.outline_color
            };
            let to_document = |p: Point| geometry::frame_to_document(p, table.rotation, pivot);

            if let Some(path) = polyline(&table.polygon(pivot), true) {
                pixmap.stroke_path(&path, &paint(outline_color), &stroke, Transform::identity(), None);
            }

            let outline = table.outline;
            for (index, row) in table.rows().iter().enumerate() {
                let line = [
                    to_document(Point::new(outline.left, *row)),
                    to_document(Point::new(outline.right, *row)),
                ];
                if let Some(path) = polyline(&line, false) {
                    pixmap.stroke_path(&path, &paint(outline_color), &thin, Transform::identity(), None);
                }

                if !is_selected {
                    continue;
                }
                let knob_color = if selected_row == Some(index) {
                    config.selected_knob_color
                } else {
                    config.knob_color
                };
                let center = to_document(Point::new(outline.left - knob::OFFSET, *row));
                let square = Rect::centered(center, knob::SIZE);
                if let Some(rect) =
                    tiny_skia::Rect::from_ltrb(square.left, square.top, square.right, square.bottom)
                {
                    pixmap.fill_rect(rect, &paint(knob_color), Transform::identity(), None);
                }
            }

            for column in table.columns() {
                let line = [
                    to_document(Point::new(*column, outline.top)),
                    to_document(Point::new(*column, outline.bottom)),
                ];
                if let Some(path) = polyline(&line, false) {
                    pixmap.stroke_path(&path, &paint(outline_color), &thin, Transform::identity(), None);
                }
            }
        }
    });

    img
}
