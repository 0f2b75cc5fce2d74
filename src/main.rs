use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, ValueEnum};

use pixel_pencil::utils::exporter::{self, ExportFormat};
use pixel_pencil::{
    ColorComponents, Document, DocumentSettings, Palette, PencilError, PixelBuffer, Result,
    RotateDirection,
};

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum RotateArg {
    Left,
    Right,
}

impl From<RotateArg> for RotateDirection {
    fn from(arg: RotateArg) -> Self {
        match arg {
            RotateArg::Left => RotateDirection::Left,
            RotateArg::Right => RotateDirection::Right,
        }
    }
}

/// Headless pixel-art batch editor.
///
/// Loads a sprite (or starts a blank canvas), applies whole-canvas edits in a fixed order
/// (flip, rotate, posterize, outline, trim) and writes a scaled export.
#[derive(Parser, Debug)]
#[command(name = "pixel-pencil", version, about = "Headless pixel-art batch editor")]
struct CliArgs {
    /// Sprite to edit. Without it a blank canvas is created from the settings.
    input: Option<PathBuf>,

    /// Output image; `.tif`/`.tiff` writes TIFF, anything else PNG.
    #[arg(short, long, value_name = "FILE")]
    output: PathBuf,

    /// JSON document settings (canvas size, palette, tool color, drawing modes).
    #[arg(long, value_name = "SETTINGS.json")]
    config: Option<PathBuf>,

    /// Built-in palette key or a 1 pixel high palette strip image.
    #[arg(long, value_name = "NAME|FILE")]
    palette: Option<String>,

    #[arg(long)]
    flip_vertical: bool,

    #[arg(long)]
    flip_horizontal: bool,

    #[arg(long, value_enum)]
    rotate: Option<RotateArg>,

    /// Quantize every channel to four levels.
    #[arg(long)]
    posterize: bool,

    /// Outline shapes, with the given hex color or the palette shadow of each edge.
    #[arg(long, value_name = "HEX", num_args = 0..=1)]
    outline: Option<Option<String>>,

    /// Crop to the opaque content.
    #[arg(long)]
    trim: bool,

    /// Export scale factor, nearest-neighbor.
    #[arg(long, default_value_t = 1.0)]
    scale: f64,

    /// Flatten the export onto this hex color.
    #[arg(long, value_name = "HEX")]
    background: Option<String>,
}

fn parse_hex(hex: &str) -> Result<ColorComponents> {
    ColorComponents::from_hex(hex).ok_or_else(|| PencilError::InvalidHex(hex.to_string()))
}

fn load_palette(source: &str) -> Result<Palette> {
    let path = Path::new(source);
    if path.is_file() {
        Palette::load_strip(path)
    } else {
        Palette::builtin(source)
    }
}

fn open_document(args: &CliArgs) -> Result<Document> {
    let settings = match &args.config {
        Some(path) => DocumentSettings::load(path)?,
        None => DocumentSettings::default(),
    };
    let mut document = match &args.input {
        Some(path) => {
            let image = image::open(path)?.to_rgba8();
            log::info!("loaded {} ({}x{})", path.display(), image.width(), image.height());
            let mut document = Document::from_buffer(PixelBuffer::from_image(&image)?);
            document.set_palette(Palette::builtin(&settings.palette)?);
            document.set_tool_color(settings.tool_color());
            *document.modes_mut() = settings.modes;
            document
        }
        None => Document::from_settings(&settings)?,
    };
    if let Some(source) = &args.palette {
        document.set_palette(load_palette(source)?);
    }
    Ok(document)
}

fn run(args: CliArgs) -> Result<()> {
    let mut document = open_document(&args)?;

    if args.flip_vertical {
        document.request_flip(true);
    }
    if args.flip_horizontal {
        document.request_flip(false);
    }
    if let Some(direction) = args.rotate {
        document.request_rotate(direction.into());
    }
    if args.posterize {
        let changed = document.request_posterize();
        log::info!("posterized {} pixels", changed);
    }
    if let Some(outline) = &args.outline {
        let color = outline.as_deref().map(parse_hex).transpose()?;
        let painted = document.request_outline(color);
        log::info!("outlined {} pixels", painted);
    }
    if args.trim && !document.request_trim() {
        log::info!("nothing to trim");
    }

    let background = args.background.as_deref().map(parse_hex).transpose()?;
    let image = document.export(args.scale, background);
    exporter::save_image(&image, &args.output, ExportFormat::from_path(&args.output))?;
    log::info!(
        "{} edits applied, canvas now {}x{}",
        document.history().undo_entries().len(),
        document.width(),
        document.height()
    );
    Ok(())
}

fn main() -> ExitCode {
    env_logger::init();
    let args = CliArgs::parse();
    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{}", err);
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}
