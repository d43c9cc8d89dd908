//! Matrix Image CLI - Build, inspect and preview matrix animations.

#[cfg(feature = "dhat-heap")]
#[global_allocator]
static ALLOC: dhat::Alloc = dhat::Alloc;

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant};

use matrix_image::{
    color::{Hsl, hsl_to_rgb},
    decoder::{BackendMode, probe},
    encoder::{Encoder, RgbFrame},
    format::{AssetHeader, Transport},
    playback::TerminalSink,
    schema::PlayerConfig,
    MatrixContext,
};

fn main() {
    #[cfg(feature = "dhat-heap")]
    let _profiler = dhat::Profiler::new_heap();

    env_logger::init();

    let args: Vec<String> = std::env::args().collect();

    match args.get(1).map(String::as_str) {
        Some("info") => cmd_info(&args[2..]),
        Some("play") => cmd_play(&args[2..]),
        Some("demo") => cmd_demo(&args[2..]),
        Some("wrap") => cmd_transport(&args[2..], true),
        Some("unwrap") => cmd_transport(&args[2..], false),
        Some("--example-config") => print_example_config(),
        _ => {
            print_usage(&args[0]);
            std::process::exit(1);
        }
    }
}

fn print_usage(program: &str) {
    eprintln!("Usage: {} <command> [options]", program);
    eprintln!();
    eprintln!("Build, inspect and preview palette-indexed matrix animations.");
    eprintln!();
    eprintln!("Commands:");
    eprintln!("  info <asset>              Print header and layout of an asset");
    eprintln!("  play <asset> [options]    Preview an asset in the terminal");
    eprintln!("      --config <file>       Player configuration (JSON)");
    eprintln!("      --memory              Decode from RAM instead of streaming");
    eprintln!("      --brightness <0-1>    Override brightness");
    eprintln!("      --seconds <n>         Stop after n seconds (default: 5)");
    eprintln!("  demo <out> [options]      Write a generated demo animation");
    eprintln!("      --size <n>            Width and height (default: 16)");
    eprintln!("      --frames <n>          Frame count (default: 12)");
    eprintln!("      --fps <n>             Frame rate (default: 8)");
    eprintln!("      --base64              Wrap the output in base64");
    eprintln!("  wrap <in> <out>           Base64-wrap an asset for upload");
    eprintln!("  unwrap <in> <out>         Undo base64 wrapping");
    eprintln!("  --example-config          Print the default configuration");
    eprintln!();
    eprintln!("Set RUST_LOG=debug for decoder and scheduler logs.");
}

fn fail(msg: impl std::fmt::Display) -> ! {
    eprintln!("Error: {}", msg);
    std::process::exit(1);
}

/// Value following `flag`, if present.
fn option<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.iter()
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .map(String::as_str)
}

fn parsed_option<T: std::str::FromStr>(args: &[String], flag: &str, default: T) -> T {
    match option(args, flag) {
        Some(v) => v
            .parse()
            .unwrap_or_else(|_| fail(format!("Invalid value for {}: {}", flag, v))),
        None => default,
    }
}

fn positional(args: &[String], index: usize, name: &str) -> PathBuf {
    args.get(index)
        .filter(|a| !a.starts_with("--"))
        .map(PathBuf::from)
        .unwrap_or_else(|| fail(format!("Missing <{}> argument", name)))
}

fn cmd_info(args: &[String]) {
    let path = positional(args, 0, "asset");
    let header = probe(&path).unwrap_or_else(|e| fail(e));

    println!("Matrix Image Asset");
    println!("==================");
    println!("File: {}", path.display());
    println!("Size: {}x{}", header.width, header.height);
    println!("Frames: {}", header.frame_count);
    println!("Colors: {}", header.color_count);
    println!("Frame rate: {} fps", header.fps);
    println!(
        "Loop length: {:.2}s",
        header.frame_interval().as_secs_f64() * header.frame_count as f64
    );
    println!();
    println!("Layout:");
    println!("  Header:  {} bytes", AssetHeader::SIZE);
    println!(
        "  Palette: {} bytes at offset {}",
        header.palette_len(),
        header.palette_offset()
    );
    println!(
        "  Frames:  {} x {} bytes at offset {}",
        header.frame_count,
        header.frame_len(),
        header.frame_offset(0)
    );
    println!("  Total:   {} bytes", header.payload_len());
}

fn load_config(args: &[String]) -> PlayerConfig {
    let Some(path) = option(args, "--config") else {
        return PlayerConfig::default();
    };
    let text = fs::read_to_string(path)
        .unwrap_or_else(|e| fail(format!("Error reading config file: {}", e)));
    serde_json::from_str(&text).unwrap_or_else(|e| fail(format!("Error parsing config: {}", e)))
}

fn cmd_play(args: &[String]) {
    let path = positional(args, 0, "asset");
    let seconds: f64 = parsed_option(args, "--seconds", 5.0);

    let mut config = load_config(args);
    if args.iter().any(|a| a == "--memory") {
        config.mode = BackendMode::Memory;
    }
    config.brightness = parsed_option(args, "--brightness", config.brightness);

    let mut ctx = MatrixContext::new(config).unwrap_or_else(|e| fail(e));
    let header = ctx.load_file(&path).unwrap_or_else(|e| fail(e));

    // Clear once; each present homes the cursor and overdraws.
    print!("\x1b[2J");
    let stdout = io::stdout();
    let mut sink = TerminalSink::new(stdout.lock());

    let deadline = Duration::from_secs_f64(seconds.max(0.0));
    let start = Instant::now();
    while start.elapsed() < deadline {
        ctx.update_display(&mut sink);
        thread::sleep(Duration::from_millis(1));
    }
    drop(sink);

    let stats = ctx.scheduler().stats();
    println!();
    println!(
        "Played {}x{} asset ({} frames at {} fps) from {:?} backend",
        header.width,
        header.height,
        header.frame_count,
        header.fps,
        ctx.mode()
    );
    println!("{}", stats);
    if let Some(fps) = stats.achievable_fps() {
        println!("Achievable: {:.1} fps", fps);
    }
}

fn cmd_demo(args: &[String]) {
    let out = positional(args, 0, "out");
    let size: usize = parsed_option(args, "--size", 16);
    let frame_count: usize = parsed_option(args, "--frames", 12);
    let fps: u8 = parsed_option(args, "--fps", 8);
    let transport = if args.iter().any(|a| a == "--base64") {
        Transport::Base64
    } else {
        Transport::Raw
    };

    // Diagonal rainbow bands scrolling one step per frame. Hues are
    // quantized so the palette stays small.
    const BANDS: usize = 16;
    let frames: Vec<RgbFrame> = (0..frame_count)
        .map(|f| {
            RgbFrame::from_fn(size, size, |x, y| {
                let band = (x + y + f) % BANDS;
                hsl_to_rgb(Hsl {
                    h: band as f64 / BANDS as f64,
                    s: 1.0,
                    l: 0.5,
                })
            })
        })
        .collect();

    let asset = Encoder::new(fps)
        .encode(&frames)
        .unwrap_or_else(|e| fail(e));
    write_output(&out, &transport.encode(&asset));

    println!(
        "Wrote {}x{} demo ({} frames at {} fps, {:?}) to {}",
        size,
        size,
        frame_count,
        fps,
        transport,
        out.display()
    );
}

fn cmd_transport(args: &[String], wrap: bool) {
    let input = positional(args, 0, "in");
    let out = positional(args, 1, "out");
    let data = fs::read(&input).unwrap_or_else(|e| fail(format!("Error reading input: {}", e)));

    let converted = if wrap {
        Transport::Base64.encode(&data)
    } else {
        Transport::Base64
            .decode(&data)
            .unwrap_or_else(|e| fail(e))
            .into_owned()
    };
    write_output(&out, &converted);
    println!(
        "{} {} bytes -> {} bytes",
        if wrap { "Wrapped" } else { "Unwrapped" },
        data.len(),
        converted.len()
    );
}

fn write_output(path: &Path, data: &[u8]) {
    fs::write(path, data).unwrap_or_else(|e| fail(format!("Error writing output: {}", e)));
}

fn print_example_config() {
    let config = PlayerConfig::default();

    println!("Example configuration (player.json):");
    match serde_json::to_string_pretty(&config) {
        Ok(json) => println!("{}", json),
        Err(e) => fail(e),
    }
}
