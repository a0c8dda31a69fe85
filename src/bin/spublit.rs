use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use image::DynamicImage;
use spublit::{
    BlitPath, DestinationFrame, FourCc, Outcome, Overlay, PlaneMut, RenderRequest, Size, preview,
    y_to_rv16,
};

#[derive(Parser, Debug)]
#[command(name = "spublit", version, about = "Composite a decoded subpicture onto a frame")]
struct Cli {
    /// Log filter used when RUST_LOG is not set.
    #[arg(long, default_value = "info", global = true)]
    log_level: String,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render an overlay onto a blank frame and save it as a PNG.
    Frame(FrameArgs),
}

#[derive(Parser, Debug)]
struct FrameArgs {
    /// Overlay JSON (width, height, origin, samples, optional crop).
    #[arg(long)]
    overlay: PathBuf,

    /// Destination FourCC, e.g. I420 or RV16.
    #[arg(long, default_value = "I420")]
    format: FourCc,

    /// Native (render) frame width.
    #[arg(long)]
    width: u32,

    /// Native (render) frame height.
    #[arg(long)]
    height: u32,

    /// Displayed width for scaled formats. Defaults to --width.
    #[arg(long)]
    output_width: Option<u32>,

    /// Displayed height for scaled formats. Defaults to --height.
    #[arg(long)]
    output_height: Option<u32>,

    /// Luma the frame is cleared to before compositing.
    #[arg(long, default_value_t = 0)]
    fill: u8,

    /// Only draw the overlay's crop box.
    #[arg(long)]
    crop: bool,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.cmd {
        Command::Frame(args) => cmd_frame(args),
    }
}

fn read_overlay_json(path: &Path) -> anyhow::Result<Overlay> {
    let f = File::open(path).with_context(|| format!("open overlay '{}'", path.display()))?;
    let r = BufReader::new(f);
    let overlay: Overlay = serde_json::from_reader(r).with_context(|| "parse overlay JSON")?;
    Ok(overlay)
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let overlay = read_overlay_json(&args.overlay)?;
    let render = Size::new(args.width, args.height);
    let output = Size::new(
        args.output_width.unwrap_or(args.width),
        args.output_height.unwrap_or(args.height),
    );

    tracing::info!(
        format = %args.format,
        overlay_width = overlay.width(),
        overlay_height = overlay.height(),
        "compositing onto {}x{} (displayed {}x{})",
        render.width,
        render.height,
        output.width,
        output.height
    );

    let packed = matches!(BlitPath::for_fourcc(args.format), Ok(BlitPath::Rv16));
    let (outcome, image) = if packed {
        let pitch = output.width as usize * 2;
        let mut buf = y_to_rv16(args.fill)
            .to_ne_bytes()
            .repeat(output.width as usize * output.height as usize);
        let plane = PlaneMut::words(&mut buf, pitch, output.width, output.height)?;
        let frame = DestinationFrame::packed_rgb16(args.format, plane, render)?;
        let outcome = spublit::render(RenderRequest::new(&overlay, frame).with_crop(args.crop));

        let plane = PlaneMut::words(&mut buf, pitch, output.width, output.height)?;
        (outcome, DynamicImage::from(preview::rv16_to_rgb(&plane)))
    } else {
        // Unsupported formats still get a planar frame so the compositor can report them.
        let pitch = render.width as usize;
        let mut buf = vec![args.fill; pitch * render.height as usize];
        let plane = PlaneMut::bytes(&mut buf, pitch, render.width, render.height)?;
        let frame = DestinationFrame::planar(args.format, plane)?;
        let outcome = spublit::render(RenderRequest::new(&overlay, frame).with_crop(args.crop));

        let plane = PlaneMut::bytes(&mut buf, pitch, render.width, render.height)?;
        (outcome, DynamicImage::from(preview::luma_to_gray(&plane)))
    };

    if outcome == Outcome::SkippedUnsupportedFormat {
        anyhow::bail!("format {} is not supported, nothing rendered", args.format);
    }

    if let Some(parent) = args.out.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    image
        .save_with_format(&args.out, image::ImageFormat::Png)
        .with_context(|| format!("write png '{}'", args.out.display()))?;
    eprintln!("wrote {}", args.out.display());

    if outcome == Outcome::AbortedOutOfBounds {
        anyhow::bail!("render aborted on an out-of-range source sample");
    }
    Ok(())
}
