// backdrop-preview - Render either backdrop headlessly to PNG frames
//
// Pipeline:
//   1. Parse options, load renderer config JSON (same shape as the JS options)
//   2. Mount the renderer on a headless host with a manual frame pump
//   3. Pump frames at a fixed 60 Hz timestamp, saving every Nth
//   4. Tear down
//
// Usage: cargo run --bin backdrop-preview -- <starfield|wavegrid> [--width N]
//        [--height N] [--frames N] [--every N] [--out DIR] [--config FILE]

use backdrop_engine::render::raster::{HeadlessHost, RasterCanvas, RasterPoints};
use backdrop_engine::{
    Backdrop, BackdropResult, ManualFrames, Renderer, StarField, StarFieldConfig, WaveGrid,
    WaveGridConfig,
};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

const FRAME_MS: f64 = 1000.0 / 60.0;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Mode {
    StarField,
    WaveGrid,
}

impl Mode {
    fn name(self) -> &'static str {
        match self {
            Mode::StarField => "starfield",
            Mode::WaveGrid => "wavegrid",
        }
    }
}

#[derive(Debug)]
struct Args {
    mode: Mode,
    width: u32,
    height: u32,
    frames: u64,
    every: u64,
    out: PathBuf,
    config: Option<PathBuf>,
}

impl Args {
    fn parse(args: &[String]) -> Option<Args> {
        let mode = match args.get(1)?.as_str() {
            "starfield" | "stars" => Mode::StarField,
            "wavegrid" | "dots" => Mode::WaveGrid,
            _ => return None,
        };
        let mut parsed = Args {
            mode,
            width: 1280,
            height: 720,
            frames: 120,
            every: 30,
            out: PathBuf::from("preview"),
            config: None,
        };

        let mut i = 2;
        while i < args.len() {
            let value = args.get(i + 1);
            match args[i].as_str() {
                "--width" => { parsed.width = parse_or(value, 1280); i += 2; }
                "--height" => { parsed.height = parse_or(value, 720); i += 2; }
                "--frames" => { parsed.frames = parse_or(value, 120); i += 2; }
                "--every" => { parsed.every = parse_or(value, 30); i += 2; }
                "--out" => { parsed.out = value.map(PathBuf::from)?; i += 2; }
                "--config" => { parsed.config = Some(value.map(PathBuf::from)?); i += 2; }
                _ => i += 1,
            }
        }
        parsed.every = parsed.every.max(1);
        Some(parsed)
    }
}

fn parse_or<T: std::str::FromStr>(value: Option<&String>, default: T) -> T {
    value.and_then(|s| s.parse().ok()).unwrap_or(default)
}

fn main() {
    let argv: Vec<String> = env::args().collect();
    let Some(args) = Args::parse(&argv) else {
        eprintln!(
            "Usage: {} <starfield|wavegrid> [--width N] [--height N] [--frames N] [--every N] \
             [--out DIR] [--config FILE]",
            argv.first().map(String::as_str).unwrap_or("backdrop-preview")
        );
        std::process::exit(1);
    };

    if let Err(e) = run(&args) {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn run(args: &Args) -> BackdropResult<()> {
    println!(
        "Rendering {} at {}x{} ({} frames, saving every {})...",
        args.mode.name(),
        args.width,
        args.height,
        args.frames,
        args.every
    );
    fs::create_dir_all(&args.out)?;
    let json = match &args.config {
        Some(path) => fs::read_to_string(path)?,
        None => "{}".to_string(),
    };
    let host = HeadlessHost::new(args.width, args.height);

    let written = match args.mode {
        Mode::StarField => {
            let config = StarFieldConfig::from_json(&json)?;
            let mut backdrop: Backdrop<StarField<RasterCanvas>, _, _> =
                Backdrop::new(config, ManualFrames::new(), host);
            backdrop.attach()?;
            pump(&mut backdrop, args, |r, path| r.canvas().save(path))?
        }
        Mode::WaveGrid => {
            let config = WaveGridConfig::from_json(&json)?;
            let mut backdrop: Backdrop<WaveGrid<RasterPoints>, _, _> =
                Backdrop::new(config, ManualFrames::new(), host);
            backdrop.attach()?;
            pump(&mut backdrop, args, |r, path| r.backend().save(path))?
        }
    };

    println!("Done! {} frame(s) in {}", written, args.out.display());
    Ok(())
}

fn pump<R: Renderer>(
    backdrop: &mut Backdrop<R, ManualFrames, HeadlessHost>,
    args: &Args,
    save: impl Fn(&R, &Path) -> BackdropResult<()>,
) -> BackdropResult<u64> {
    let mut written = 0;
    for i in 0..args.frames {
        let Some(frame) = backdrop.on_frame(i as f64 * FRAME_MS) else { break };
        let last = i + 1 == args.frames;
        if (frame.index + 1) % args.every != 0 && !last {
            continue;
        }
        if let Some(renderer) = backdrop.renderer() {
            let path = args.out.join(format!("{}-{:05}.png", args.mode.name(), frame.index));
            save(renderer, &path)?;
            println!("  wrote {}", path.display());
            written += 1;
        }
    }
    backdrop.teardown();
    Ok(written)
}
