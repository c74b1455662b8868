//! Word-frequency cloud generation: normalize text, count and rank words,
//! then pack them into a raster with sizes proportional to frequency.

use std::{fs, io::Cursor, path::PathBuf};

use ab_glyph::{point, FontVec, Point, PxScale};
use image::{GrayImage, ImageOutputFormat, Luma, Rgba, RgbaImage};
use nanorand::{Rng, WyRand};

use crate::sat::Rect;

mod colors;
mod error;
mod normalize;
mod sat;
mod text;
mod tokenizer;

pub use colors::ColorScheme;
pub use error::{Error, Result};
pub use normalize::normalize;
pub use text::GlyphData;
pub use tokenizer::Tokenizer;

/// Caller input, either uploaded file bytes or an in-memory string.
pub enum TextSource {
    FileBytes(Vec<u8>),
    InlineString(String),
}

impl TextSource {
    /// Decodes the source into text; file bytes must be UTF-8.
    pub fn into_text(self) -> Result<String> {
        match self {
            TextSource::FileBytes(bytes) => Ok(String::from_utf8(bytes)?),
            TextSource::InlineString(text) => Ok(text),
        }
    }
}

/// A placed word, as handed to color functions.
pub struct Word<'a> {
    pub text: &'a str,
    pub font: &'a FontVec,
    pub font_size: PxScale,
    pub glyphs: GlyphData,
    pub rotated: bool,
    pub position: Point,
    pub frequency: f32,
    pub index: usize,
}

/// Canvas specification: explicit dimensions, or a mask raster whose
/// dimensions become the canvas and whose zero pixels are excluded from
/// placement.
pub enum WordCloudSize {
    FromDimensions { width: u32, height: u32 },
    FromMask(GrayImage),
}

/// The two outputs of a generation run: the rasterized cloud and the
/// ranked (word, weight) table of everything that was actually placed.
/// Weights are counts scaled by the maximum count, so they fall in (0, 1]
/// and the top word carries 1.0.
pub struct RenderedCloud {
    pub image: RgbaImage,
    pub frequencies: Vec<(String, f32)>,
}

impl RenderedCloud {
    /// Losslessly encodes the image for transport or download.
    pub fn png_bytes(&self) -> Result<Vec<u8>> {
        let mut bytes = Vec::new();
        self.image
            .write_to(&mut Cursor::new(&mut bytes), ImageOutputFormat::Png)?;
        Ok(bytes)
    }
}

/// The cloud generator. Construct it with a font, adjust it through the
/// `with_*` methods, then call [`WordCloud::generate_from_text`].
pub struct WordCloud {
    tokenizer: Tokenizer,
    background_color: Rgba<u8>,
    pub font: FontVec,
    min_font_size: f32,
    max_font_size: Option<f32>,
    font_step: f32,
    word_margin: u32,
    word_rotate_chance: f64,
    color_scheme: ColorScheme,
    rng_seed: Option<u64>,
}

impl WordCloud {
    pub fn new(font: FontVec) -> Self {
        WordCloud {
            tokenizer: Tokenizer::default(),
            background_color: Rgba([255, 255, 255, 255]),
            font,
            min_font_size: 4.0,
            max_font_size: None,
            font_step: 1.0,
            word_margin: 2,
            word_rotate_chance: 0.10,
            color_scheme: ColorScheme::Viridis,
            rng_seed: None,
        }
    }

    pub fn from_font_bytes(bytes: Vec<u8>) -> Result<Self> {
        Ok(WordCloud::new(FontVec::try_from_vec(bytes)?))
    }

    pub fn from_font_path(path: impl Into<PathBuf>) -> Result<Self> {
        let font_file = fs::read(path.into())?;
        WordCloud::from_font_bytes(font_file)
    }

    pub fn with_tokenizer(mut self, value: Tokenizer) -> Self {
        self.tokenizer = value;
        self
    }

    pub fn with_background_color(mut self, value: Rgba<u8>) -> Self {
        self.background_color = value;
        self
    }

    pub fn with_color_scheme(mut self, value: ColorScheme) -> Self {
        self.color_scheme = value;
        self
    }

    pub fn with_min_font_size(mut self, value: f32) -> Self {
        self.min_font_size = value;
        self
    }

    /// Caps the largest font size. Without a cap the canvas height bounds
    /// the top word.
    pub fn with_max_font_size(mut self, value: f32) -> Self {
        self.max_font_size = Some(value);
        self
    }

    pub fn with_font_step(mut self, value: f32) -> Self {
        self.font_step = value;
        self
    }

    pub fn with_word_margin(mut self, value: u32) -> Self {
        self.word_margin = value;
        self
    }

    pub fn with_word_rotate_chance(mut self, value: f64) -> Self {
        self.word_rotate_chance = value;
        self
    }

    pub fn with_rng_seed(mut self, value: u64) -> Self {
        self.rng_seed = Some(value);
        self
    }

    fn check_config(&self, size: &WordCloudSize, scale: f32) -> Result<()> {
        let max = self.max_font_size.unwrap_or(self.min_font_size);
        if self.min_font_size <= 0.0 || max < self.min_font_size {
            return Err(Error::FontSizeRange {
                min: self.min_font_size,
                max,
            });
        }
        if self.font_step <= 0.0 {
            return Err(Error::FontStep(self.font_step));
        }
        if self.tokenizer.max_words == 0 {
            return Err(Error::MaxWords);
        }
        if scale <= 0.0 {
            return Err(Error::Scale(scale));
        }
        if let WordCloudSize::FromMask(mask) = size {
            if mask.width() == 0 || mask.height() == 0 {
                return Err(Error::MaskDimensions {
                    width: mask.width(),
                    height: mask.height(),
                });
            }
        }
        Ok(())
    }

    /// Generates a cloud from `text`, coloring words with the configured
    /// scheme. `scale` multiplies the output resolution without changing
    /// the layout.
    pub fn generate_from_text(
        &self,
        text: &str,
        size: WordCloudSize,
        scale: f32,
    ) -> Result<RenderedCloud> {
        let scheme = self.color_scheme;
        self.generate_from_text_with_color_func(text, size, scale, move |_word, rng| {
            scheme.pick(rng)
        })
    }

    /// Like [`WordCloud::generate_from_text`] but with a caller-supplied
    /// color function.
    pub fn generate_from_text_with_color_func(
        &self,
        text: &str,
        size: WordCloudSize,
        scale: f32,
        color_func: impl Fn(&Word, &mut WyRand) -> Rgba<u8>,
    ) -> Result<RenderedCloud> {
        self.check_config(&size, scale)?;

        let words = self.tokenizer.get_normalized_word_frequencies(text);
        if words.is_empty() {
            return Err(Error::EmptyInput);
        }

        let (mut summed_area_table, mut gray_buffer) = match size {
            WordCloudSize::FromDimensions { width, height } => {
                let buf = GrayImage::from_pixel(width, height, Luma([0]));
                let table = vec![0u32; (width * height) as usize];

                (table, buf)
            }
            WordCloudSize::FromMask(mask) => {
                let mut buf = GrayImage::from_pixel(mask.width(), mask.height(), Luma([0]));
                for (src, dst) in mask.pixels().zip(buf.pixels_mut()) {
                    if src.0[0] == 0 {
                        *dst = Luma([1]);
                    }
                }

                let mut table = buf.as_raw().iter().map(|&e| e as u32).collect::<Vec<_>>();
                sat::to_summed_area_table(&mut table, buf.width() as usize, 0);

                (table, buf)
            }
        };

        let width = gray_buffer.width();
        let height = gray_buffer.height();

        let max_font_size = self.max_font_size.unwrap_or(height as f32 * 0.95);
        if max_font_size < self.min_font_size {
            return Err(Error::FontSizeRange {
                min: self.min_font_size,
                max: max_font_size,
            });
        }

        let mut rng = match self.rng_seed {
            Some(seed) => WyRand::new_seed(seed),
            None => WyRand::new(),
        };

        let mut final_words = Vec::with_capacity(words.len());
        let mut frequencies = Vec::with_capacity(words.len());

        for (index, &(word, frequency)) in words.iter().enumerate() {
            let mut font_size =
                self.min_font_size + (max_font_size - self.min_font_size) * frequency;
            let prefer_rotated =
                rng.generate_range(0..1000u32) as f64 / 1000.0 < self.word_rotate_chance;

            let mut placement = None;
            while font_size >= self.min_font_size {
                let glyphs = text::text_to_glyphs(word, &self.font, PxScale::from(font_size));
                let rotated = prefer_rotated || glyphs.width + self.word_margin > width;

                let rect = if rotated {
                    Rect {
                        width: glyphs.height + self.word_margin,
                        height: glyphs.width + self.word_margin,
                    }
                } else {
                    Rect {
                        width: glyphs.width + self.word_margin,
                        height: glyphs.height + self.word_margin,
                    }
                };

                if rect.width <= width && rect.height <= height {
                    if let Some(pos) = sat::find_space_for_rect(
                        &summed_area_table,
                        width,
                        height,
                        &rect,
                        &mut rng,
                    ) {
                        placement = Some((glyphs, rotated, pos));
                        break;
                    }
                }

                font_size -= self.font_step;
            }

            let Some((glyphs, rotated, pos)) = placement else {
                log::warn!("not enough room left to place {word:?}, skipping it");
                continue;
            };

            let half_margin = self.word_margin / 2;
            let position = point((pos.x + half_margin) as f32, (pos.y + half_margin) as f32);

            text::draw_glyphs_to_gray_buffer(
                &mut gray_buffer,
                glyphs.clone(),
                &self.font,
                position,
                rotated,
            );
            refresh_occupancy(&mut summed_area_table, &gray_buffer, pos.y as usize);

            frequencies.push((word.to_string(), frequency));
            final_words.push(Word {
                text: word,
                font: &self.font,
                font_size: PxScale::from(font_size),
                glyphs,
                rotated,
                position,
                frequency,
                index,
            });
        }

        if final_words.is_empty() {
            return Err(Error::NothingPlaced);
        }
        if final_words.len() < words.len() {
            log::warn!("placed {} of {} words", final_words.len(), words.len());
        }

        let image = WordCloud::generate_from_word_positions(
            &mut rng,
            width,
            height,
            final_words,
            scale,
            self.background_color,
            color_func,
        );

        Ok(RenderedCloud { image, frequencies })
    }

    fn generate_from_word_positions(
        rng: &mut WyRand,
        width: u32,
        height: u32,
        word_positions: Vec<Word>,
        scale: f32,
        background_color: Rgba<u8>,
        color_func: impl Fn(&Word, &mut WyRand) -> Rgba<u8>,
    ) -> RgbaImage {
        let mut final_image_buffer = RgbaImage::from_pixel(
            (width as f32 * scale) as u32,
            (height as f32 * scale) as u32,
            background_color,
        );

        for word in &word_positions {
            let col = color_func(word, rng);

            let glyphs = if scale == 1.0 {
                word.glyphs.clone()
            } else {
                text::text_to_glyphs(
                    word.text,
                    word.font,
                    PxScale::from(word.font_size.x * scale),
                )
            };
            let position = point(word.position.x * scale, word.position.y * scale);

            text::draw_glyphs_to_rgba_buffer(
                &mut final_image_buffer,
                glyphs,
                word.font,
                position,
                word.rotated,
                col,
            )
        }

        final_image_buffer
    }
}

/// Re-syncs the summed-area table with the occupancy buffer after a word
/// was drawn at `start_row`. Rows above it cannot have changed.
fn refresh_occupancy(table: &mut [u32], buffer: &GrayImage, start_row: usize) {
    let width = buffer.width() as usize;
    let raw = buffer.as_raw();
    let offset = start_row * width;

    table[offset..]
        .iter_mut()
        .zip(raw[offset..].iter())
        .for_each(|(cell, &px)| *cell = px as u32);

    sat::to_summed_area_table(table, width, start_row);
}

#[cfg(test)]
mod tests {
    use super::{normalize, Error, TextSource, Tokenizer, WordCloud, WordCloudSize};
    use ab_glyph::FontVec;
    use image::{GrayImage, Luma};
    use std::fs;

    // The crate ships no font binary, so rendering tests borrow one from
    // the host and bail out quietly on machines without any of these.
    const FONT_CANDIDATES: &[&str] = &[
        "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
        "/usr/share/fonts/TTF/DejaVuSans.ttf",
        "/usr/share/fonts/dejavu/DejaVuSans.ttf",
        "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
        "/System/Library/Fonts/Supplemental/Arial.ttf",
        "C:\\Windows\\Fonts\\arial.ttf",
    ];

    fn test_font() -> Option<FontVec> {
        FONT_CANDIDATES
            .iter()
            .filter_map(|path| fs::read(path).ok())
            .find_map(|bytes| FontVec::try_from_vec(bytes).ok())
    }

    fn test_cloud() -> Option<WordCloud> {
        test_font().map(WordCloud::new)
    }

    const SAMPLE: &str = "The cat sat on the mat. The cat ran.";

    #[test]
    fn text_source_decodes_file_bytes() {
        let source = TextSource::FileBytes(b"hello there".to_vec());
        assert_eq!(source.into_text().unwrap(), "hello there");

        let inline = TextSource::InlineString("typed text".to_string());
        assert_eq!(inline.into_text().unwrap(), "typed text");

        let invalid = TextSource::FileBytes(vec![0xff, 0xfe, 0x00]);
        assert!(matches!(invalid.into_text(), Err(Error::Utf8(_))));
    }

    #[test]
    fn empty_input_is_an_error() {
        let Some(cloud) = test_cloud() else { return };
        let size = WordCloudSize::FromDimensions {
            width: 100,
            height: 100,
        };

        let result = cloud.generate_from_text("", size, 1.0);
        assert!(matches!(result, Err(Error::EmptyInput)));
    }

    #[test]
    fn stopword_only_input_is_an_error() {
        let Some(cloud) = test_cloud() else { return };
        let size = WordCloudSize::FromDimensions {
            width: 100,
            height: 100,
        };

        let result = cloud.generate_from_text("the and of but", size, 1.0);
        assert!(matches!(result, Err(Error::EmptyInput)));
    }

    #[test]
    fn inverted_font_bounds_are_rejected() {
        let Some(cloud) = test_cloud() else { return };
        let cloud = cloud.with_min_font_size(50.0).with_max_font_size(10.0);
        let size = WordCloudSize::FromDimensions {
            width: 100,
            height: 100,
        };

        let result = cloud.generate_from_text(SAMPLE, size, 1.0);
        assert!(matches!(result, Err(Error::FontSizeRange { .. })));
    }

    #[test]
    fn zero_max_words_is_rejected() {
        let Some(cloud) = test_cloud() else { return };
        let cloud = cloud.with_tokenizer(Tokenizer::default().with_max_words(0));
        let size = WordCloudSize::FromDimensions {
            width: 100,
            height: 100,
        };

        let result = cloud.generate_from_text(SAMPLE, size, 1.0);
        assert!(matches!(result, Err(Error::MaxWords)));
    }

    #[test]
    fn non_positive_scale_is_rejected() {
        let Some(cloud) = test_cloud() else { return };
        let size = WordCloudSize::FromDimensions {
            width: 100,
            height: 100,
        };

        let result = cloud.generate_from_text(SAMPLE, size, 0.0);
        assert!(matches!(result, Err(Error::Scale(_))));
    }

    #[test]
    fn empty_mask_dimensions_are_rejected() {
        let Some(cloud) = test_cloud() else { return };
        let mask = GrayImage::new(0, 0);

        let result = cloud.generate_from_text(SAMPLE, WordCloudSize::FromMask(mask), 1.0);
        assert!(matches!(result, Err(Error::MaskDimensions { .. })));
    }

    #[test]
    fn all_zero_mask_places_nothing() {
        let Some(cloud) = test_cloud() else { return };
        let cloud = cloud.with_rng_seed(1);
        let mask = GrayImage::from_pixel(120, 80, Luma([0]));

        let result = cloud.generate_from_text(SAMPLE, WordCloudSize::FromMask(mask), 1.0);
        assert!(matches!(result, Err(Error::NothingPlaced)));
    }

    #[test]
    fn generates_image_and_ranked_table() {
        let Some(cloud) = test_cloud() else { return };
        let cloud = cloud
            .with_rng_seed(42)
            .with_min_font_size(8.0)
            .with_max_font_size(64.0);
        let size = WordCloudSize::FromDimensions {
            width: 400,
            height: 200,
        };

        let rendered = cloud
            .generate_from_text(&normalize(SAMPLE), size, 1.0)
            .unwrap();

        assert_eq!(rendered.image.dimensions(), (400, 200));

        assert_eq!(
            rendered.frequencies.first().map(|(word, _)| word.as_str()),
            Some("cat")
        );
        assert_eq!(rendered.frequencies.first().map(|(_, w)| *w), Some(1.0));
        for pair in rendered.frequencies.windows(2) {
            assert!(pair[0].1 >= pair[1].1);
        }
        for (_, weight) in &rendered.frequencies {
            assert!(*weight > 0.0 && *weight <= 1.0);
        }

        let png = rendered.png_bytes().unwrap();
        assert!(png.starts_with(b"\x89PNG\r\n\x1a\n"));
    }

    #[test]
    fn frequency_table_respects_max_words() {
        let Some(cloud) = test_cloud() else { return };
        let cloud = cloud
            .with_rng_seed(7)
            .with_max_font_size(32.0)
            .with_tokenizer(Tokenizer::default().with_max_words(3));
        let size = WordCloudSize::FromDimensions {
            width: 400,
            height: 200,
        };

        let text = "alpha beta gamma delta epsilon zeta alpha beta alpha";
        let rendered = cloud.generate_from_text(text, size, 1.0).unwrap();

        assert!(rendered.frequencies.len() <= 3);
    }

    #[test]
    fn scale_multiplies_output_dimensions() {
        let Some(cloud) = test_cloud() else { return };
        let cloud = cloud.with_rng_seed(3).with_max_font_size(32.0);
        let size = WordCloudSize::FromDimensions {
            width: 200,
            height: 100,
        };

        let rendered = cloud
            .generate_from_text("fish fowl fish", size, 2.0)
            .unwrap();
        assert_eq!(rendered.image.dimensions(), (400, 200));
    }

    #[test]
    fn open_mask_allows_placement() {
        let Some(cloud) = test_cloud() else { return };
        let cloud = cloud.with_rng_seed(9).with_max_font_size(24.0);
        let mask = GrayImage::from_pixel(300, 150, Luma([255]));

        let rendered = cloud
            .generate_from_text("stone river stone", WordCloudSize::FromMask(mask), 1.0)
            .unwrap();
        assert_eq!(rendered.image.dimensions(), (300, 150));
        assert!(!rendered.frequencies.is_empty());
    }
}
