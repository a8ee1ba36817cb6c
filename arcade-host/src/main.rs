use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::{Instant, SystemTime, UNIX_EPOCH};

use anyhow::{anyhow, Context, Result};
use arcade_core::audio::DEFAULT_SAMPLE_RATE;
use arcade_core::render::HudOverlay;
use arcade_core::{Cue, CuePlayer, Features, ReplayResult, Theme};
use arcade_host::autopilot::{bot_ids, create_bot, describe_bots, read_inputs, run_bot, write_inputs};
use arcade_host::benchmark::{run_benchmark, BenchmarkConfig};
use arcade_host::headless::{replay_session, write_frame_ppm};
use arcade_host::play::{self, PlayOptions};
use arcade_host::sound::{write_cue_wav, WavSink};
use arcade_host::transport::DEFAULT_API_URL;
use arcade_host::util::{parse_seed, parse_seed_csv, seed_range, seed_to_hex};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "arcade")]
#[command(about = "Loading-screen shooter: terminal play, headless runs and cue export")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Play in the terminal
    Play(PlayArgs),
    /// List available autopilot bots
    ListBots,
    /// Run one headless game, driven by a bot or a recorded input tape
    Simulate {
        #[arg(long, default_value = "0x00000001")]
        seed: String,
        #[arg(long, default_value = "tracker")]
        bot: String,
        /// Replay this input tape instead of running a bot
        #[arg(long)]
        inputs: Option<PathBuf>,
        #[arg(long, default_value_t = 18_000)]
        max_frames: u32,
        /// Save the run's input tape
        #[arg(long)]
        save_inputs: Option<PathBuf>,
        /// Capture every cue the run sounds as numbered WAV files
        #[arg(long)]
        cue_dir: Option<PathBuf>,
        /// Write the final frame as a PPM image
        #[arg(long)]
        frame_out: Option<PathBuf>,
        #[arg(long)]
        json_out: Option<PathBuf>,
    },
    /// Run bots across many seeds in parallel
    Bench {
        /// Comma-separated bot ids (default: all)
        #[arg(long)]
        bots: Option<String>,
        /// Comma-separated seeds; overrides --seed-start/--seed-count
        #[arg(long)]
        seeds: Option<String>,
        #[arg(long, default_value = "0x00000001")]
        seed_start: String,
        #[arg(long, default_value_t = 12)]
        seed_count: u32,
        #[arg(long, default_value_t = 18_000)]
        max_frames: u32,
        #[arg(long)]
        jobs: Option<usize>,
        #[arg(long)]
        json_out: Option<PathBuf>,
    },
    /// Render sound cues to WAV files
    Cue {
        /// Cue name, or `all`
        #[arg(long, default_value = "all")]
        cue: String,
        #[arg(long, default_value = "cues")]
        out_dir: PathBuf,
        #[arg(long, default_value_t = DEFAULT_SAMPLE_RATE)]
        sample_rate: u32,
    },
}

#[derive(Args, Debug)]
struct PlayArgs {
    /// Defaults to the current time
    #[arg(long)]
    seed: Option<String>,
    #[arg(long, default_value = "space")]
    theme: Theme,
    #[arg(long, default_value = DEFAULT_API_URL)]
    api_url: String,
    #[arg(long, default_value_t = 60)]
    fps: u32,
    #[arg(long)]
    no_audio: bool,
    #[arg(long)]
    no_leaderboard: bool,
    #[arg(long)]
    no_bosses: bool,
    /// Plain shooter: no audio, leaderboard or bosses
    #[arg(long)]
    basic: bool,
    /// The terminal is in use while playing, so logs only go to this file
    #[arg(long)]
    log_file: Option<PathBuf>,
}

impl PlayArgs {
    fn features(&self) -> Features {
        if self.basic {
            return Features::BASIC;
        }
        Features {
            audio: !self.no_audio,
            leaderboard: !self.no_leaderboard,
            bosses: !self.no_bosses,
        }
    }
}

#[derive(Serialize)]
struct SimulateJson<'a> {
    seed: u32,
    seed_hex: String,
    source: &'a str,
    input_frames: usize,
    result: ReplayResult,
    cues_played: usize,
    elapsed_ms: u128,
}

fn main() -> Result<()> {
    let Cli { command } = Cli::parse();

    match command {
        Commands::Play(args) => {
            init_play_tracing(args.log_file.as_deref())?;
            let seed = match args.seed.as_deref() {
                Some(seed) => parse_seed(seed)?,
                None => time_seed(),
            };
            play::run(&PlayOptions {
                seed,
                theme: args.theme,
                features: args.features(),
                api_url: args.api_url.clone(),
                fps: args.fps,
            })?;
        }
        Commands::ListBots => {
            init_tracing();
            for (id, description) in describe_bots() {
                println!("{id:10} {description}");
            }
        }
        Commands::Simulate {
            seed,
            bot,
            inputs,
            max_frames,
            save_inputs,
            cue_dir,
            frame_out,
            json_out,
        } => {
            init_tracing();
            let seed = parse_seed(&seed)?;
            let start = Instant::now();

            let (source, tape) = match &inputs {
                Some(path) => (path.display().to_string(), read_inputs(path)?),
                None => {
                    if create_bot(&bot).is_none() {
                        let available = bot_ids().join(", ");
                        return Err(anyhow!("unknown bot '{bot}'. available: {available}"));
                    }
                    (bot.clone(), run_bot(&bot, seed, max_frames)?.inputs)
                }
            };

            let mut cues = CuePlayer::new(Features::default());
            if let Some(dir) = &cue_dir {
                let sink = WavSink::create(dir, DEFAULT_SAMPLE_RATE)?;
                cues.unlock_with(|| Some(sink));
            }
            let (session, cues_played) = replay_session(seed, &tape, &mut cues);
            let result = session.result();
            let elapsed = start.elapsed();

            println!("Simulation complete!");
            println!("  Source:        {source}");
            println!("  Seed:          {}", seed_to_hex(seed));
            println!("  Input frames:  {}", tape.len());
            println!("  Frames:        {}", result.frame_count);
            println!("  Score:         {}", result.final_score);
            println!("  Phase:         {}", result.final_phase);
            println!("  RNG:           0x{:08x}", result.final_rng_state);
            println!("  Game over:     {}", result.game_over);
            println!("  Elapsed:       {elapsed:.2?}");

            if let Some(path) = &save_inputs {
                write_inputs(path, &tape)?;
                println!("  Inputs:        {}", path.display());
            }
            if let Some(dir) = &cue_dir {
                println!("  Cues:          {cues_played} -> {}", dir.display());
            }
            if let Some(path) = &frame_out {
                write_frame_ppm(path, &session, &HudOverlay::default())?;
                println!("  Frame:         {}", path.display());
            }
            if let Some(path) = &json_out {
                let json = SimulateJson {
                    seed,
                    seed_hex: seed_to_hex(seed),
                    source: &source,
                    input_frames: tape.len(),
                    result,
                    cues_played,
                    elapsed_ms: elapsed.as_millis(),
                };
                write_json(path, &json)?;
                println!("  JSON:          {}", path.display());
            }
        }
        Commands::Bench {
            bots,
            seeds,
            seed_start,
            seed_count,
            max_frames,
            jobs,
            json_out,
        } => {
            init_tracing();
            let bots = resolve_bots(bots.as_deref())?;
            let seeds = match seeds.as_deref() {
                Some(csv) => parse_seed_csv(csv)?,
                None => seed_range(parse_seed(&seed_start)?, seed_count),
            };

            tracing::info!(bots = bots.len(), seeds = seeds.len(), max_frames, "running benchmark");
            let start = Instant::now();
            let summary = run_benchmark(&BenchmarkConfig {
                bots,
                seeds,
                max_frames,
                jobs,
            })?;

            println!("runs={}", summary.runs.len());
            println!(
                "jobs={}",
                jobs.map(|value| value.to_string())
                    .unwrap_or_else(|| "auto".to_string())
            );
            println!("elapsed={:.2?}", start.elapsed());
            println!("rankings:");
            for (rank, bot) in summary.rankings.iter().enumerate() {
                println!(
                    "  {}. {:10} avg_score={:.1} max_score={} avg_frames={:.0} max_phase={} survived={}/{}",
                    rank + 1,
                    bot.bot_id,
                    bot.avg_score,
                    bot.max_score,
                    bot.avg_frames,
                    bot.max_phase,
                    bot.survived,
                    bot.runs
                );
            }

            if let Some(path) = &json_out {
                write_json(path, &summary)?;
                println!("json={}", path.display());
            }
        }
        Commands::Cue {
            cue,
            out_dir,
            sample_rate,
        } => {
            init_tracing();
            let cues: Vec<Cue> = if cue == "all" {
                Cue::ALL.to_vec()
            } else {
                vec![cue.parse::<Cue>().map_err(|err| anyhow!(err))?]
            };

            fs::create_dir_all(&out_dir)
                .with_context(|| format!("failed creating {}", out_dir.display()))?;
            for cue in cues {
                let path = out_dir.join(format!("{}.wav", cue.as_str()));
                let samples = write_cue_wav(&path, cue, sample_rate)?;
                println!("{:13} samples={samples:6} -> {}", cue.as_str(), path.display());
            }
        }
    }

    Ok(())
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();
}

fn init_play_tracing(log_file: Option<&Path>) -> Result<()> {
    let Some(path) = log_file else {
        return Ok(());
    };
    let file = fs::File::create(path)
        .with_context(|| format!("failed creating log file {}", path.display()))?;
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()),
        )
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .init();
    Ok(())
}

fn resolve_bots(bots: Option<&str>) -> Result<Vec<String>> {
    let Some(csv) = bots else {
        return Ok(bot_ids().iter().map(|id| id.to_string()).collect());
    };
    let mut resolved = Vec::new();
    for id in csv.split(',').map(str::trim).filter(|id| !id.is_empty()) {
        if create_bot(id).is_none() {
            let available = bot_ids().join(", ");
            return Err(anyhow!("unknown bot '{id}'. available: {available}"));
        }
        resolved.push(id.to_string());
    }
    if resolved.is_empty() {
        return Err(anyhow!("no bots parsed from --bots"));
    }
    Ok(resolved)
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed creating {}", parent.display()))?;
        }
    }
    let encoded = serde_json::to_vec_pretty(value)?;
    fs::write(path, encoded).with_context(|| format!("failed writing {}", path.display()))
}

fn time_seed() -> u32 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as u32)
        .unwrap_or(1)
}
