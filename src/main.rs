// main.rs
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use clap::{Args, Parser, Subcommand, ValueEnum};
use log::{error, info};

use fretmap::guitar::DEFAULT_MAX_FRET;
use fretmap::music_representation::DEFAULT_CHORD_WINDOW_MS;
use fretmap::renderer::{tab_info, DEFAULT_EVENTS_PER_LINE};
use fretmap::session::PROCESSING_STAGES;
use fretmap::{
    load_events_from_file, map_sequence, render_json, render_tab, FretboardConfig, InputKind,
    LoadedInput, MappedEvent, Message, Result, Session, SessionState, TabLayout, Tuning,
    TuningPreset,
};

const TICK: Duration = Duration::from_millis(20);
const MIN_SPEED: f64 = 0.01;
const MAX_SPEED: f64 = 100.0;

#[derive(Parser)]
#[command(name = "fretmap")]
#[command(about = "Map note events onto a guitar fretboard and render tablature")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render tablature for an input file
    Tab {
        #[command(flatten)]
        input: InputArgs,

        #[arg(long, value_enum, default_value_t = OutputFormat::Ascii)]
        format: OutputFormat,

        /// Events per tab line
        #[arg(long, default_value_t = DEFAULT_EVENTS_PER_LINE)]
        per_line: usize,

        /// Prefix the tab with a title, tuning and note count
        #[arg(long)]
        header: bool,

        /// Write to a file instead of stdout
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
    /// Step through the mapped events in real time
    Play {
        #[command(flatten)]
        input: InputArgs,

        /// Playback speed multiplier
        #[arg(long, default_value_t = 1.0, value_parser = parse_speed)]
        speed: f64,
    },
    /// List the tuning presets
    Tunings,
}

#[derive(Args)]
struct InputArgs {
    /// Events JSON, detected-notes JSON or MusicXML file
    input: PathBuf,

    /// Input kind; guessed from the file extension when omitted
    #[arg(long, value_enum)]
    from: Option<InputKind>,

    #[arg(long, value_enum, default_value_t = TuningPreset::Standard)]
    tuning: TuningPreset,

    /// Six notes, lowest string first, e.g. "E2 A2 D3 G3 B3 E4"
    #[arg(long, conflicts_with = "tuning")]
    custom_tuning: Option<String>,

    #[arg(long, default_value_t = DEFAULT_MAX_FRET)]
    max_fret: u8,

    /// Notes starting this close together form one chord (notes input only)
    #[arg(long, default_value_t = DEFAULT_CHORD_WINDOW_MS)]
    chord_window_ms: f64,
}

fn parse_speed(s: &str) -> std::result::Result<f64, String> {
    let speed: f64 = s.parse().map_err(|_| format!("'{}' is not a number", s))?;
    if speed.is_finite() && (MIN_SPEED..=MAX_SPEED).contains(&speed) {
        Ok(speed)
    } else {
        Err(format!("speed must be between {} and {}", MIN_SPEED, MAX_SPEED))
    }
}

impl InputArgs {
    fn tuning(&self) -> Result<Tuning> {
        match &self.custom_tuning {
            Some(spec) => Tuning::parse_custom(spec),
            None => Ok(self.tuning.tuning()),
        }
    }

    fn config(&self) -> FretboardConfig {
        FretboardConfig {
            max_fret: self.max_fret,
        }
    }

    fn load(&self) -> Result<LoadedInput> {
        load_events_from_file(&self.input, self.from, self.chord_window_ms)
    }
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Ascii,
    Json,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::from(1)
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Tab {
            input,
            format,
            per_line,
            header,
            output,
        } => {
            let tuning = input.tuning()?;
            let loaded = input.load()?;
            let mapped = map_sequence(&loaded.events, &tuning, &input.config());
            info!("Mapped {}", tab_info(&mapped));

            let rendered = match format {
                OutputFormat::Ascii => {
                    let layout = TabLayout {
                        events_per_line: per_line,
                        title: header.then(|| "fretmap transcription".to_string()),
                        ..TabLayout::default()
                    };
                    render_tab(&mapped, &tuning, &layout)
                }
                OutputFormat::Json => render_json(&mapped, &tuning, loaded.bpm)?,
            };

            match output {
                Some(path) => {
                    fs::write(&path, rendered)?;
                    info!("Output saved to: {}", path.display());
                }
                None => println!("{}", rendered),
            }
        }
        Commands::Play { input, speed } => {
            let tuning = input.tuning()?;
            let loaded = input.load()?;
            play(loaded, tuning, input.config(), speed);
        }
        Commands::Tunings => {
            for preset in TuningPreset::ALL {
                let tuning = preset.tuning();
                println!("{:<10} {}  {:?}", preset.key(), tuning, tuning.open_strings);
            }
        }
    }
    Ok(())
}

fn play(loaded: LoadedInput, tuning: Tuning, config: FretboardConfig, speed: f64) {
    let names = tuning.string_names.clone();
    let mut session = Session::new(tuning, config, TabLayout::default());

    session.update(Message::Submit(loaded.events));
    for _ in 0..PROCESSING_STAGES.len() {
        if let Some(stage) = session.stage_name() {
            info!("{}...", stage);
        }
        session.update(Message::StageComplete);
    }
    println!("{}", session.tab_text());

    let (tx, rx) = mpsc::channel();
    let step = TICK.mul_f64(speed);
    thread::spawn(move || loop {
        thread::sleep(TICK);
        if tx.send(Message::Tick(step)).is_err() {
            break;
        }
    });

    let mut last_shown = None;
    session.update(Message::Play);
    for tick in rx {
        let state = session.update(tick).clone();
        let SessionState::Result {
            playing,
            active_index,
        } = state
        else {
            break;
        };

        if active_index != last_shown {
            if let Some(event) = session.active_event() {
                println!("{}", describe(event, &names));
            }
            last_shown = active_index;
        }
        if !playing {
            break;
        }
    }
}

fn describe(event: &MappedEvent, names: &[String]) -> String {
    let frets: Vec<String> = event
        .positions
        .iter()
        .map(|p| format!("{}{}", names[p.string as usize], p.fret))
        .collect();
    format!(
        "{:>8.2}s  {:<6} {}",
        event.time,
        event.label.as_deref().unwrap_or(""),
        frets.join(" ")
    )
}
