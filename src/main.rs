use anyhow::{anyhow, Result};
use clap::{Arg, ArgAction, ArgMatches, Command};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use transcript_sync::{
    ChunkView, Config, FilePreferences, GroupingMode, LlmSummarizer, MemoryPreferences,
    PlaybackSource, PlayerHandle, PreferenceStore, SegmentGrouper, SimulatedPlayer, Summary,
    SummaryCache, TranscriptPanel, TranscriptSource, TranscriptState,
};
use transcript_sync::transcript::{full_text, FileTranscriptSource};

/// Prints panel updates to stdout
struct TerminalView {
    chunks: std::sync::Mutex<Vec<String>>,
}

impl TerminalView {
    fn new() -> Self {
        Self {
            chunks: std::sync::Mutex::new(Vec::new()),
        }
    }
}

impl ChunkView for TerminalView {
    fn render(&self, state: &TranscriptState<'_>) {
        let mut labels = match self.chunks.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        labels.clear();

        match state {
            TranscriptState::Loading => println!("⏳ Loading transcript..."),
            TranscriptState::Empty => println!("📜 No transcript available."),
            TranscriptState::Closed => println!("👋 Panel closed."),
            TranscriptState::Chunks(chunks) => {
                for chunk in chunks.iter() {
                    labels.push(chunk.label());
                }
                println!("📜 {} chunks loaded", chunks.len());
            }
        }
    }

    fn set_highlighted(&self, index: usize, highlighted: bool) {
        if !highlighted {
            return;
        }
        let labels = match self.chunks.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Some(label) = labels.get(index) {
            println!("▶ chunk {} {}", index, label);
        }
    }

    fn scroll_to_center(&self, _index: usize) {}
}

fn input_arg() -> Arg {
    Arg::new("input")
        .value_name("FILE")
        .help("Transcript file (.json segments/rows or 'M:SS text' lines)")
        .required(true)
}

fn input_path(matches: &ArgMatches) -> Result<PathBuf> {
    matches
        .get_one::<String>("input")
        .map(PathBuf::from)
        .ok_or_else(|| anyhow!("missing input"))
}

#[tokio::main]
async fn main() -> Result<()> {
    let matches = Command::new("Transcript Sync")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Transcript chunking, playback sync and summary demo")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Configuration file (TOML)")
                .global(true),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Enable verbose logging")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .subcommand_required(true)
        .subcommand(
            Command::new("chunks")
                .about("Group a transcript into chunks and print them")
                .arg(input_arg())
                .arg(
                    Arg::new("window")
                        .short('w')
                        .long("window")
                        .value_name("SECONDS")
                        .help("Chunk window width")
                        .value_parser(clap::value_parser!(u32)),
                )
                .arg(
                    Arg::new("aligned")
                        .long("aligned")
                        .help("Align windows to multiples of the window width")
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("json")
                        .long("json")
                        .help("Print chunks as JSON")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new("play")
                .about("Simulate playback and follow the active chunk")
                .arg(input_arg())
                .arg(
                    Arg::new("from")
                        .long("from")
                        .value_name("SECONDS")
                        .help("Start position")
                        .default_value("0")
                        .value_parser(clap::value_parser!(f64)),
                )
                .arg(
                    Arg::new("speed")
                        .long("speed")
                        .value_name("RATE")
                        .help("Media seconds per wall second")
                        .default_value("10")
                        .value_parser(clap::value_parser!(f64)),
                )
                .arg(
                    Arg::new("duration")
                        .long("duration")
                        .value_name("SECONDS")
                        .help("Wall-clock seconds to run")
                        .default_value("5")
                        .value_parser(clap::value_parser!(u64)),
                ),
        )
        .subcommand(
            Command::new("summarize")
                .about("Summarize a transcript with the configured LLM")
                .arg(input_arg())
                .arg(
                    Arg::new("video-id")
                        .long("video-id")
                        .value_name("ID")
                        .help("Video identifier used as the cache key")
                        .default_value("local"),
                ),
        )
        .get_matches();

    let config = match matches.get_one::<String>("config") {
        Some(path) => Config::from_file(path)?,
        None => Config::load().unwrap_or_else(|e| {
            eprintln!("Failed to load config, using defaults: {}", e);
            Config::default()
        }),
    };
    config.validate()?;

    let filter = if matches.get_flag("verbose") {
        EnvFilter::new("transcript_sync=debug,info")
    } else {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(&config.logging.level))
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match matches.subcommand() {
        Some(("chunks", sub)) => {
            let input = input_path(sub)?;
            let window = sub
                .get_one::<u32>("window")
                .copied()
                .unwrap_or(config.segmentation.window_seconds);
            let mode = if sub.get_flag("aligned") {
                GroupingMode::Aligned
            } else {
                config.segmentation.mode
            };
            run_chunks(input, window, mode, sub.get_flag("json")).await
        }
        Some(("play", sub)) => {
            let input = input_path(sub)?;
            let from = sub.get_one::<f64>("from").copied().unwrap_or(0.0);
            let speed = sub.get_one::<f64>("speed").copied().unwrap_or(1.0);
            let duration = sub.get_one::<u64>("duration").copied().unwrap_or(5);
            run_play(&config, input, from, speed, Duration::from_secs(duration)).await
        }
        Some(("summarize", sub)) => {
            let input = input_path(sub)?;
            let video_id = sub
                .get_one::<String>("video-id")
                .cloned()
                .unwrap_or_else(|| "local".to_string());
            run_summarize(&config, input, &video_id).await
        }
        _ => Err(anyhow!("unknown command")),
    }
}

async fn run_chunks(input: PathBuf, window: u32, mode: GroupingMode, json: bool) -> Result<()> {
    let source = FileTranscriptSource::new(input);
    let Some(segments) = source.fetch_raw_segments().await else {
        println!("📜 No transcript available.");
        return Ok(());
    };

    let chunks = SegmentGrouper::new(window).with_mode(mode).group(&segments);

    if json {
        println!("{}", serde_json::to_string_pretty(&chunks)?);
    } else {
        for chunk in &chunks {
            println!("{} {}", chunk.label(), chunk.text);
        }
    }

    Ok(())
}

async fn run_play(
    config: &Config,
    input: PathBuf,
    from: f64,
    speed: f64,
    duration: Duration,
) -> Result<()> {
    let preferences: Arc<dyn PreferenceStore> = match &config.sync.preferences_file {
        Some(path) => Arc::new(FilePreferences::open(path)),
        None => Arc::new(MemoryPreferences::new()),
    };

    let player = Arc::new(SimulatedPlayer::with_rate(speed));
    let mut panel = TranscriptPanel::new(
        config,
        Arc::new(TerminalView::new()),
        preferences,
        PlayerHandle::new(player.clone()),
    );

    let source = FileTranscriptSource::new(input);
    panel.open("local", &source).await;

    if !panel.is_tracking() {
        warn!("Nothing to play");
        panel.close().await;
        return Ok(());
    }

    player.seek_to(from);
    player.play();
    info!("▶️ Playing from {}s at {}x for {:?}", from, speed, duration);

    tokio::time::sleep(duration).await;
    panel.close().await;

    Ok(())
}

async fn run_summarize(config: &Config, input: PathBuf, video_id: &str) -> Result<()> {
    let source = FileTranscriptSource::new(input);
    let Some(segments) = source.fetch_raw_segments().await else {
        println!("📜 No transcript available.");
        return Ok(());
    };

    let summarizer = LlmSummarizer::new(config.summary.clone())?;
    let cache = SummaryCache::new();

    match cache.get_summary(video_id, &full_text(&segments), &summarizer).await {
        Summary::Ready { title, body, .. } => {
            println!("✨ {}\n\n{}", title, body);
        }
        Summary::Failed { error, .. } => {
            println!("⚠️ {}", error);
        }
    }

    Ok(())
}
