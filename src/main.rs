//! Bouncing Balls native entry point
//!
//! Runs a session in real time on the main thread. Commands typed on stdin
//! (`space`, `click X Y`, `quit`) are read on a helper thread and forwarded
//! over a channel, so only the main thread ever touches the session.

use std::io::{self, BufRead};
use std::path::PathBuf;
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result, bail};
use clap::{Parser, ValueEnum};
use glam::Vec2;

use bouncing_balls::memory::SystemSampler;
use bouncing_balls::render::{AsciiRenderer, JsonLinesRenderer};
use bouncing_balls::sim::Viewport;
use bouncing_balls::{InputEvent, Key, Renderer, Session, SimConfig, Variant};

/// How frames are written to stdout
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Ascii,
    Json,
    Quiet,
}

#[derive(Parser)]
#[command(name = "bouncing-balls")]
#[command(about = "Bouncing balls sized by memory pressure", long_about = None)]
#[command(version)]
struct Cli {
    /// Preset: tracking, snapshot or fixed
    #[arg(long, default_value = "tracking")]
    variant: String,

    /// JSON config file (overrides --variant)
    #[arg(long)]
    config: Option<PathBuf>,

    /// RNG seed for a reproducible run
    #[arg(long)]
    seed: Option<u64>,

    /// Viewport width in pixels
    #[arg(long)]
    width: Option<f32>,

    /// Viewport height in pixels
    #[arg(long)]
    height: Option<f32>,

    /// Stop after this many seconds (0 = run until `quit`)
    #[arg(long, default_value_t = 30.0)]
    seconds: f64,

    /// Frame output format
    #[arg(long, value_enum, default_value = "ascii")]
    format: Format,

    /// ASCII grid size
    #[arg(long, default_value_t = 80)]
    cols: usize,
    #[arg(long, default_value_t = 24)]
    rows: usize,
}

/// A line of stdin, parsed
#[derive(Debug, Clone, Copy, PartialEq)]
enum Command {
    Event(InputEvent),
    Quit,
}

fn parse_command(line: &str) -> Option<Command> {
    let mut parts = line.split_whitespace();
    match parts.next() {
        // Bare Enter behaves like the space bar
        None => Some(Command::Event(InputEvent::KeyDown {
            key: Key::Space,
            repeat: false,
        })),
        Some("space") | Some("pause") => Some(Command::Event(InputEvent::KeyDown {
            key: Key::Space,
            repeat: false,
        })),
        Some("click") => {
            let x = parts.next()?.parse().ok()?;
            let y = parts.next()?.parse().ok()?;
            Some(Command::Event(InputEvent::Click(Vec2::new(x, y))))
        }
        Some("quit") | Some("q") => Some(Command::Quit),
        Some(_) => None,
    }
}

fn build_config(cli: &Cli) -> Result<SimConfig> {
    let mut config = match &cli.config {
        Some(path) => SimConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => match Variant::from_str(&cli.variant) {
            Some(variant) => SimConfig::from_variant(variant),
            None => bail!("unknown variant '{}'", cli.variant),
        },
    };

    if cli.seed.is_some() {
        config.seed = cli.seed;
    }
    config.viewport = Viewport::new(
        cli.width.unwrap_or(config.viewport.width),
        cli.height.unwrap_or(config.viewport.height),
    );
    config.validate()?;
    Ok(config)
}

fn make_renderer(cli: &Cli, viewport: Viewport) -> Box<dyn Renderer> {
    match cli.format {
        Format::Ascii => Box::new(AsciiRenderer::new(io::stdout(), viewport, cli.cols, cli.rows)),
        Format::Json => Box::new(JsonLinesRenderer::new(io::stdout())),
        Format::Quiet => Box::new(bouncing_balls::render::NullRenderer),
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let config = build_config(&cli)?;
    let renderer = make_renderer(&cli, config.viewport);
    let mut session = Session::new(config, SystemSampler, renderer)?;
    log::info!("Bouncing Balls running (seed {})", session.seed());

    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            match parse_command(&line) {
                Some(command) => {
                    if tx.send(command).is_err() {
                        break;
                    }
                }
                None => log::warn!("Unknown command: {line}"),
            }
        }
    });

    let limit = (cli.seconds > 0.0).then(|| Duration::from_secs_f64(cli.seconds));
    let start = Instant::now();
    let mut last = start;

    'run: loop {
        for command in rx.try_iter() {
            match command {
                Command::Event(event) => session.handle_event(event),
                Command::Quit => break 'run,
            }
        }

        let now = Instant::now();
        session.advance(now - last);
        last = now;

        if limit.is_some_and(|limit| now - start >= limit) {
            break;
        }
        thread::sleep(Duration::from_millis(5));
    }

    log::info!(
        "Stopped after {} ticks ({:.1}s)",
        session.ticks(),
        session.elapsed().as_secs_f64()
    );
    Ok(())
}
