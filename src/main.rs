use std::fs;
use std::io::Read;
use std::path::PathBuf;
use std::time::Instant;

use anyhow::{anyhow, Context};
use clap::{value_parser, Arg, ArgAction, Command};
use image::Rgba;
use textcloud::{normalize, ColorScheme, TextSource, Tokenizer, WordCloud, WordCloudSize};

// Probed when no --font is given; the crate does not embed a font.
const SYSTEM_FONTS: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

fn cli() -> Command<'static> {
    Command::new("textcloud")
        .about("Generate a word-frequency cloud image from text")
        .arg(
            Arg::new("input")
                .value_name("TEXT_FILE")
                .value_parser(value_parser!(PathBuf))
                .help("Text file to read; stdin when omitted"),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .value_name("PNG")
                .default_value("cloud.png")
                .value_parser(value_parser!(PathBuf))
                .help("Where to write the rendered image"),
        )
        .arg(
            Arg::new("font")
                .long("font")
                .value_name("FILE")
                .value_parser(value_parser!(PathBuf))
                .help("TTF/OTF font to render with; common system fonts are probed when omitted"),
        )
        .arg(
            Arg::new("width")
                .long("width")
                .default_value("800")
                .value_parser(value_parser!(u32))
                .help("Canvas width in pixels"),
        )
        .arg(
            Arg::new("height")
                .long("height")
                .default_value("600")
                .value_parser(value_parser!(u32))
                .help("Canvas height in pixels"),
        )
        .arg(
            Arg::new("mask")
                .long("mask")
                .value_name("IMAGE")
                .value_parser(value_parser!(PathBuf))
                .help("Mask image; zero pixels are excluded and the mask fixes the canvas size"),
        )
        .arg(
            Arg::new("invert-mask")
                .long("invert-mask")
                .action(ArgAction::SetTrue)
                .help("Treat zero mask pixels as eligible instead of excluded"),
        )
        .arg(
            Arg::new("colormap")
                .long("colormap")
                .default_value("viridis")
                .help("viridis, plasma, inferno, magma, cividis, coolwarm, bone, copper or gray"),
        )
        .arg(
            Arg::new("background")
                .long("background")
                .default_value("white")
                .help("Background color, any CSS color"),
        )
        .arg(
            Arg::new("min-font-size")
                .long("min-font-size")
                .default_value("10")
                .value_parser(value_parser!(f32)),
        )
        .arg(
            Arg::new("max-font-size")
                .long("max-font-size")
                .default_value("100")
                .value_parser(value_parser!(f32)),
        )
        .arg(
            Arg::new("max-words")
                .long("max-words")
                .default_value("200")
                .value_parser(value_parser!(usize)),
        )
        .arg(
            Arg::new("scale")
                .long("scale")
                .default_value("1.0")
                .value_parser(value_parser!(f32))
                .help("Output resolution multiplier"),
        )
        .arg(
            Arg::new("seed")
                .long("seed")
                .value_parser(value_parser!(u64))
                .help("Seed for reproducible layouts"),
        )
        .arg(
            Arg::new("stopwords")
                .long("stopwords")
                .value_name("FILE")
                .value_parser(value_parser!(PathBuf))
                .help("Replace the built-in stop-word list, one word per line"),
        )
        .arg(
            Arg::new("frequencies")
                .long("frequencies")
                .action(ArgAction::SetTrue)
                .help("Print the ranked frequency table"),
        )
}

fn find_system_font() -> Option<PathBuf> {
    SYSTEM_FONTS.iter().map(PathBuf::from).find(|p| p.exists())
}

fn main() -> anyhow::Result<()> {
    let matches = cli().get_matches();

    let source = match matches.get_one::<PathBuf>("input") {
        Some(path) => TextSource::FileBytes(
            fs::read(path).with_context(|| format!("reading text from {}", path.display()))?,
        ),
        None => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            TextSource::InlineString(buf)
        }
    };

    let raw_text = source.into_text()?;
    let normalized = normalize(&raw_text);

    let font_path = matches
        .get_one::<PathBuf>("font")
        .cloned()
        .or_else(find_system_font)
        .ok_or_else(|| anyhow!("no --font given and no system font found"))?;

    let stopword_file = match matches.get_one::<PathBuf>("stopwords") {
        Some(path) => Some(
            fs::read_to_string(path)
                .with_context(|| format!("reading stop-words from {}", path.display()))?,
        ),
        None => None,
    };

    let mut tokenizer =
        Tokenizer::default().with_max_words(*matches.get_one::<usize>("max-words").unwrap());
    if let Some(content) = &stopword_file {
        tokenizer = tokenizer.with_stopwords(content.lines());
    }

    let color_scheme: ColorScheme = matches
        .get_one::<String>("colormap")
        .unwrap()
        .parse()
        .context("parsing --colormap")?;

    let background = csscolorparser::parse(matches.get_one::<String>("background").unwrap())
        .context("parsing --background")?;
    let [bg_r, bg_g, bg_b, bg_a] = background.to_rgba8();

    let mut cloud = WordCloud::from_font_path(&font_path)
        .with_context(|| format!("loading font from {}", font_path.display()))?
        .with_tokenizer(tokenizer)
        .with_color_scheme(color_scheme)
        .with_background_color(Rgba([bg_r, bg_g, bg_b, bg_a]))
        .with_min_font_size(*matches.get_one::<f32>("min-font-size").unwrap())
        .with_max_font_size(*matches.get_one::<f32>("max-font-size").unwrap());
    if let Some(seed) = matches.get_one::<u64>("seed") {
        cloud = cloud.with_rng_seed(*seed);
    }

    let size = match matches.get_one::<PathBuf>("mask") {
        Some(path) => {
            let mut mask = image::open(path)
                .with_context(|| format!("loading mask from {}", path.display()))?
                .to_luma8();
            if matches.get_one::<bool>("invert-mask").copied().unwrap_or(false) {
                for px in mask.pixels_mut() {
                    px.0[0] = if px.0[0] == 0 { 255 } else { 0 };
                }
            }
            WordCloudSize::FromMask(mask)
        }
        None => WordCloudSize::FromDimensions {
            width: *matches.get_one::<u32>("width").unwrap(),
            height: *matches.get_one::<u32>("height").unwrap(),
        },
    };

    let scale = *matches.get_one::<f32>("scale").unwrap();

    let started = Instant::now();
    let rendered = cloud.generate_from_text(&normalized, size, scale)?;
    let elapsed = started.elapsed().as_millis();

    let output = matches.get_one::<PathBuf>("output").unwrap();
    fs::write(output, rendered.png_bytes()?)
        .with_context(|| format!("writing {}", output.display()))?;

    println!(
        "placed {} words in {elapsed}ms -> {}",
        rendered.frequencies.len(),
        output.display()
    );

    if matches.get_one::<bool>("frequencies").copied().unwrap_or(false) {
        // Counts are approximated from the normalized weights the same way
        // the table is usually displayed: weight times total token count.
        let total_tokens = normalized.split_whitespace().count();
        for (word, weight) in &rendered.frequencies {
            let approx_count = (weight * total_tokens as f32).round() as usize;
            println!("{word}\t{weight:.3}\t~{approx_count}");
        }
    }

    Ok(())
}
