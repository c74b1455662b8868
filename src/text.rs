use ab_glyph::{point, Font, FontVec, Glyph, GlyphId, Point, PxScale, ScaleFont};
use image::{GrayImage, Luma, Pixel, Rgba, RgbaImage};

#[derive(Clone, Debug)]
pub struct GlyphData {
    pub glyphs: Vec<Glyph>,
    pub width: u32,
    pub height: u32,
}

/// Lays out `text` as a single line of positioned glyphs and measures the
/// bounding box the renderer will reserve for it.
pub fn text_to_glyphs(text: &str, font: &FontVec, scale: PxScale) -> GlyphData {
    let scaled_font = font.as_scaled(scale);

    let mut glyphs: Vec<Glyph> = vec![];
    layout_line(scaled_font, point(0.0, 0.0), text, &mut glyphs);

    let glyphs_height = scaled_font.height().ceil() as u32;
    let glyphs_width = match (glyphs.first(), glyphs.last()) {
        (Some(first), Some(last)) => {
            let min_x = first.position.x;
            let max_x = last.position.x + scaled_font.h_advance(last.id);
            (max_x - min_x).ceil() as u32
        }
        _ => 0,
    };

    GlyphData {
        glyphs,
        width: glyphs_width,
        height: glyphs_height,
    }
}

/// Maps a pixel in glyph space to the buffer, honoring a 90 degree
/// clockwise rotation: rotated words occupy a `height x width` box and read
/// bottom to top.
fn project(
    origin: Point,
    glyph_data: &GlyphData,
    glyph_x: u32,
    glyph_y: u32,
    rotated: bool,
) -> (u32, u32) {
    if rotated {
        (
            origin.x as u32 + glyph_data.height.saturating_sub(glyph_y + 1),
            origin.y as u32 + glyph_x,
        )
    } else {
        (origin.x as u32 + glyph_x, origin.y as u32 + glyph_y)
    }
}

/// Marks every covered pixel in the occupancy buffer.
pub fn draw_glyphs_to_gray_buffer(
    buffer: &mut GrayImage,
    glyph_data: GlyphData,
    font: &FontVec,
    position: Point,
    rotated: bool,
) {
    for glyph in &glyph_data.glyphs {
        if let Some(outlined) = font.outline_glyph(glyph.clone()) {
            let bounds = outlined.px_bounds();

            outlined.draw(|x, y, v| {
                if v <= 0.0 {
                    return;
                }
                let glyph_x = bounds.min.x as u32 + x;
                let glyph_y = bounds.min.y as u32 + y;
                let (final_x, final_y) = project(position, &glyph_data, glyph_x, glyph_y, rotated);
                if final_x < buffer.width() && final_y < buffer.height() {
                    let px = buffer.get_pixel_mut(final_x, final_y);
                    *px = Luma([1])
                }
            })
        }
    }
}

/// Blends the glyph coverage into the color buffer. Coverage values act as
/// per-pixel alpha against whatever is already in the buffer.
pub fn draw_glyphs_to_rgba_buffer(
    buffer: &mut RgbaImage,
    glyph_data: GlyphData,
    font: &FontVec,
    position: Point,
    rotated: bool,
    color: Rgba<u8>,
) {
    for glyph in &glyph_data.glyphs {
        if let Some(outlined) = font.outline_glyph(glyph.clone()) {
            let bounds = outlined.px_bounds();

            outlined.draw(|x, y, v| {
                if v <= 0.0 {
                    return;
                }
                let glyph_x = bounds.min.x as u32 + x;
                let glyph_y = bounds.min.y as u32 + y;
                let (final_x, final_y) = project(position, &glyph_data, glyph_x, glyph_y, rotated);
                if final_x < buffer.width() && final_y < buffer.height() {
                    let px = buffer.get_pixel_mut(final_x, final_y);
                    px.apply2(&color, |old, new| {
                        ((v * new as f32) + (1.0 - v) * old as f32) as u8
                    });
                    px.0[3] = 0xFF;
                }
            })
        }
    }
}

pub fn layout_line<F, SF>(font: SF, position: Point, text: &str, target: &mut Vec<Glyph>)
where
    F: Font,
    SF: ScaleFont<F>,
{
    let mut caret = position + point(0.0, font.ascent());
    let mut last_glyph: Option<GlyphId> = None;
    for c in text.chars() {
        if c.is_control() {
            continue;
        }

        let mut glyph = font.scaled_glyph(c);
        if let Some(previous) = last_glyph.take() {
            caret.x += font.kern(previous, glyph.id);
        }
        glyph.position = caret;
        last_glyph = Some(glyph.id);
        caret.x += font.h_advance(glyph.id);

        target.push(glyph);
    }
}
