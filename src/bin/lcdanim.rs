use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand};
use lcdanim::{
    AnimFile, DirFetcher, EncodeStats, Fps, PipelineConfig, RasterFrame, Timeline, assets,
    encode_anim, encode_mjpeg_stream,
};

#[derive(Parser, Debug)]
#[command(name = "lcdanim", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Encode an indexed-colour RLE animation (.anim).
    Anim(AnimArgs),
    /// Encode a concatenated motion-JPEG stream.
    Mjpeg(MjpegArgs),
    /// Print and verify the header and frames of an .anim file.
    ///
    /// Every frame is checked; malformed RLE blocks are listed before failing.
    Inspect(InspectArgs),
}

#[derive(Args, Debug)]
struct JobArgs {
    /// Timeline JSON (intro/loop/exit slots).
    #[arg(long)]
    timeline: PathBuf,

    /// Directory mask image URLs resolve against. Defaults to the timeline's directory.
    #[arg(long)]
    assets_root: Option<PathBuf>,

    /// Pipeline configuration JSON; missing fields take defaults.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Source video (requires the `media-ffmpeg` feature and `ffmpeg` on PATH).
    #[arg(long)]
    video: Option<PathBuf>,

    /// Output path.
    #[arg(long)]
    out: PathBuf,

    /// Write each output frame's hardware actions as JSON.
    #[arg(long)]
    actions_out: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct AnimArgs {
    #[command(flatten)]
    job: JobArgs,

    /// Directory of still images used as source frames, in file-name order.
    #[arg(long, conflicts_with = "video", required_unless_present = "video")]
    frames_dir: Option<PathBuf>,

    /// Override dither strength in [0, 1].
    #[arg(long)]
    dither: Option<f32>,

    /// Override unsharp-mask amount.
    #[arg(long)]
    sharpen: Option<f32>,

    /// Worker threads for quantisation.
    #[arg(long)]
    threads: Option<usize>,
}

#[derive(Args, Debug)]
struct MjpegArgs {
    #[command(flatten)]
    job: JobArgs,

    /// Raw MJPEG stream used as source frames.
    #[arg(long, conflicts_with = "video", required_unless_present = "video")]
    mjpeg: Option<PathBuf>,

    /// Write the per-frame byte index as JSON.
    #[arg(long)]
    index: Option<PathBuf>,

    /// Override quality of composited frames (1..=100).
    #[arg(long)]
    quality: Option<u8>,
}

#[derive(Args, Debug)]
struct InspectArgs {
    /// Input .anim file.
    #[arg(long = "in")]
    in_path: PathBuf,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Anim(args) => cmd_anim(args),
        Command::Mjpeg(args) => cmd_mjpeg(args),
        Command::Inspect(args) => cmd_inspect(args),
    }
}

struct Job {
    timeline: Timeline,
    cfg: PipelineConfig,
    fetcher: DirFetcher,
}

fn load_job(args: &JobArgs) -> anyhow::Result<Job> {
    let timeline = Timeline::from_path(&args.timeline)?;
    let cfg = match &args.config {
        Some(path) => {
            let f = std::fs::File::open(path)
                .with_context(|| format!("open config '{}'", path.display()))?;
            serde_json::from_reader(std::io::BufReader::new(f))
                .with_context(|| format!("parse config '{}'", path.display()))?
        }
        None => PipelineConfig::default(),
    };
    let root = args.assets_root.clone().unwrap_or_else(|| {
        args.timeline
            .parent()
            .unwrap_or_else(|| Path::new("."))
            .to_path_buf()
    });
    Ok(Job {
        timeline,
        cfg,
        fetcher: DirFetcher::new(root),
    })
}

fn cmd_anim(args: AnimArgs) -> anyhow::Result<()> {
    let Job {
        timeline,
        mut cfg,
        fetcher,
    } = load_job(&args.job)?;
    if let Some(d) = args.dither {
        cfg.dither_strength = d;
    }
    if let Some(s) = args.sharpen {
        cfg.sharpen_amount = s;
    }
    if args.threads.is_some() {
        cfg.encode_threads = args.threads;
    }

    let frames: Vec<RasterFrame> = match (&args.frames_dir, &args.job.video) {
        (Some(dir), _) => assets::decode::load_frames_dir(dir)?,
        (None, Some(video)) => {
            let info = assets::media::probe_video(video)?;
            assets::media::decode_video_frames_rgb8(&info, timeline.fps)?
        }
        (None, None) => anyhow::bail!("one of --frames-dir or --video is required"),
    };

    let out = encode_anim(&timeline, &frames, &fetcher, &cfg)?;
    write_output(&args.job.out, &out.bytes)?;
    if let Some(path) = &args.job.actions_out {
        write_output(path, serde_json::to_string_pretty(&out.actions)?.as_bytes())?;
    }

    report_written(&args.job.out, &out.stats, timeline.fps);
    Ok(())
}

fn cmd_mjpeg(args: MjpegArgs) -> anyhow::Result<()> {
    let Job {
        timeline,
        mut cfg,
        fetcher,
    } = load_job(&args.job)?;
    if let Some(q) = args.quality {
        cfg.jpeg_quality = q;
    }

    let source = match (&args.mjpeg, &args.job.video) {
        (Some(path), _) => {
            std::fs::read(path).with_context(|| format!("read mjpeg '{}'", path.display()))?
        }
        (None, Some(video)) => {
            assets::media::extract_mjpeg(video, timeline.fps, cfg.jpeg_quality)?
        }
        (None, None) => anyhow::bail!("one of --mjpeg or --video is required"),
    };

    let out = encode_mjpeg_stream(&timeline, &source, &fetcher, &cfg)?;
    write_output(&args.job.out, &out.bytes)?;
    if let Some(path) = &args.index {
        write_output(path, out.index.to_json()?.as_bytes())?;
    }
    if let Some(path) = &args.job.actions_out {
        write_output(path, serde_json::to_string_pretty(&out.actions)?.as_bytes())?;
    }

    report_written(&args.job.out, &out.stats, timeline.fps);
    Ok(())
}

fn cmd_inspect(args: InspectArgs) -> anyhow::Result<()> {
    let bytes = std::fs::read(&args.in_path)
        .with_context(|| format!("read anim '{}'", args.in_path.display()))?;
    let file = AnimFile::parse(&bytes)?;
    let h = file.header();
    println!(
        "version {} | {}x{} | {} frames | {} palette entries",
        h.version, h.width, h.height, h.frame_count, h.palette_size
    );
    let mut malformed = 0usize;
    for i in 0..file.frame_count() {
        let block_len = file.block(i).map_or(0, <[u8]>::len);
        match file.decode_frame(i) {
            Ok(_) => println!("frame {i}: {block_len} bytes"),
            Err(err) if !err.is_fatal() => {
                println!("frame {i}: {block_len} bytes, {err}");
                malformed += 1;
            }
            Err(err) => return Err(err).with_context(|| format!("decode frame {i}")),
        }
    }
    if malformed > 0 {
        anyhow::bail!("{malformed} of {} frames failed to decode", file.frame_count());
    }
    Ok(())
}

fn report_written(path: &Path, stats: &EncodeStats, fps: Fps) {
    eprintln!(
        "wrote {} ({} frames, {:.2}s at {} fps, {} fallback, {} bytes)",
        path.display(),
        stats.frames_total,
        stats.frames_total as f64 * fps.frame_duration_secs(),
        fps.0,
        stats.frames_fallback,
        stats.output_bytes
    );
}

fn write_output(path: &Path, bytes: &[u8]) -> anyhow::Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    std::fs::write(path, bytes).with_context(|| format!("write '{}'", path.display()))
}
