//! syncbook - EPUB Media Overlay chapter builder

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};

use syncbook::util::{read_text, write_text};
use syncbook::{
    ClockFormat, Composer, ComposerConfig, OverlayTarget, build_clips, render_smil, render_srt,
    renumber_placeholders,
};

#[derive(Parser)]
#[command(name = "syncbook")]
#[command(version, about = "Build EPUB Media Overlay chapters", long_about = None)]
#[command(after_help = "EXAMPLES:
    syncbook compose ch1.html --timings ch1.txt    Write ch1.xhtml and ch1.xhtml.smil
    syncbook compose ch1.html --raw --srt          Preview with text ranges
    syncbook srt labels.txt --offset -0.2          Print captions for a label export
    syncbook renumber ch1.xhtml                    Number f000000 placeholders")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Log more (repeat for trace output)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress output messages
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Compose an XHTML chapter (and its overlay) from exported HTML
    Compose(ComposeArgs),
    /// Print the overlay for a label export without a chapter
    Smil {
        /// Label export with begin/end pairs
        timings: PathBuf,
        #[arg(long)]
        text_path: String,
        #[arg(long)]
        audio_path: String,
        #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
        offset: f64,
        #[arg(long, value_enum, default_value_t = Clock::Smil)]
        clock: Clock,
    },
    /// Print SubRip captions for a label export
    Srt {
        timings: PathBuf,
        #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
        offset: f64,
    },
    /// Replace f000000 placeholder ids with sequential fragment ids
    Renumber { input: PathBuf },
}

#[derive(clap::Args)]
struct ComposeArgs {
    /// Exported HTML chapter
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Label export with narration timings
    #[arg(long)]
    timings: Option<PathBuf>,

    /// Output directory (defaults to the input's directory)
    #[arg(long)]
    out_dir: Option<PathBuf>,

    /// Output base name (defaults to the input's file stem)
    #[arg(long)]
    name: Option<String>,

    /// JSON job file with composer settings
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long)]
    title: Option<String>,

    #[arg(long = "lang")]
    language: Option<String>,

    /// Seconds added to every timestamp
    #[arg(long, allow_hyphen_values = true)]
    offset: Option<f64>,

    /// Preview mode: bare image paths and text range attributes
    #[arg(long)]
    raw: bool,

    #[arg(long)]
    no_hyphenate: bool,

    #[arg(long, value_enum)]
    clock: Option<Clock>,

    #[arg(long)]
    text_path: Option<String>,

    #[arg(long)]
    audio_path: Option<String>,

    /// Also write SubRip captions
    #[arg(long)]
    srt: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum Clock {
    Smil,
    Seconds,
}

impl From<Clock> for ClockFormat {
    fn from(clock: Clock) -> Self {
        match clock {
            Clock::Smil => ClockFormat::Smil,
            Clock::Seconds => ClockFormat::Seconds,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Command::Compose(args) => compose(&args, cli.quiet),
        Command::Smil {
            timings,
            text_path,
            audio_path,
            offset,
            clock,
        } => print_smil(&timings, text_path, audio_path, offset, clock.into()),
        Command::Srt { timings, offset } => print_srt(&timings, offset),
        Command::Renumber { input } => renumber(&input, cli.quiet),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level)),
        )
        .init();
}

fn chapter_text_path(name: &str) -> String {
    format!("{name}.xhtml")
}

fn chapter_audio_path(name: &str) -> String {
    format!("../Audio/{name}.mp3")
}

/// Read a JSON job file. Overlay paths the job leaves out derive from `name`.
fn load_config(path: &Path, name: &str) -> Result<ComposerConfig, String> {
    let text = read_text(path).map_err(|e| e.to_string())?;
    let mut job: serde_json::Value =
        serde_json::from_str(&text).map_err(|e| format!("{}: {e}", path.display()))?;
    if let Some(fields) = job.as_object_mut() {
        fields
            .entry("text_path")
            .or_insert_with(|| chapter_text_path(name).into());
        fields
            .entry("audio_path")
            .or_insert_with(|| chapter_audio_path(name).into());
    }
    serde_json::from_value(job).map_err(|e| format!("{}: {e}", path.display()))
}

fn compose(args: &ComposeArgs, quiet: bool) -> Result<(), String> {
    let name = match &args.name {
        Some(name) => name.clone(),
        None => args
            .input
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .ok_or_else(|| format!("{}: no file name", args.input.display()))?,
    };
    let out_dir = match &args.out_dir {
        Some(dir) => dir.clone(),
        None => args
            .input
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default(),
    };

    let mut config = match &args.config {
        Some(path) => load_config(path, &name)?,
        None => ComposerConfig {
            text_path: chapter_text_path(&name),
            audio_path: chapter_audio_path(&name),
            ..ComposerConfig::default()
        },
    };
    if let Some(title) = &args.title {
        config.title = Some(title.clone());
    }
    if let Some(language) = &args.language {
        config.language = language.clone();
    }
    if let Some(offset) = args.offset {
        config.timing_offset = offset;
    }
    if let Some(clock) = args.clock {
        config.clock = clock.into();
    }
    if let Some(text_path) = &args.text_path {
        config.text_path = text_path.clone();
    }
    if let Some(audio_path) = &args.audio_path {
        config.audio_path = audio_path.clone();
    }
    config.raw |= args.raw;
    config.hyphenate &= !args.no_hyphenate;

    let html = read_text(&args.input).map_err(|e| e.to_string())?;
    let timings = match &args.timings {
        Some(path) => Some(read_text(path).map_err(|e| e.to_string())?),
        None => None,
    };

    let composition = Composer::new()
        .with_config(config)
        .compose(&html, timings.as_deref())
        .map_err(|e| e.to_string())?;

    // Everything is rendered before anything is written.
    let mut outputs = vec![(out_dir.join(format!("{name}.xhtml")), composition.xhtml.clone())];
    if let Some(overlay) = &composition.overlay {
        outputs.push((out_dir.join(format!("{name}.xhtml.smil")), overlay.markup.clone()));
    }
    if args.srt {
        let srt = render_srt(&composition.clips, Some(composition.cue_texts.as_slice()));
        outputs.push((out_dir.join(format!("{name}.srt")), srt));
    }

    for (path, contents) in &outputs {
        write_text(path, contents).map_err(|e| format!("{}: {e}", path.display()))?;
    }

    if !quiet {
        println!("Cues: {}", composition.cue_count());
        if composition.overlay.is_some() {
            println!("Clips: {}", composition.clips.len());
        }
        for (path, _) in &outputs {
            println!("Wrote {}", path.display());
        }
    }
    Ok(())
}

fn print_smil(
    timings: &Path,
    text_path: String,
    audio_path: String,
    offset: f64,
    clock: ClockFormat,
) -> Result<(), String> {
    let raw = read_text(timings).map_err(|e| e.to_string())?;
    let clips = build_clips(&raw, offset);
    let target = OverlayTarget {
        text_path,
        audio_path,
    };
    print!("{}", render_smil(&clips, &target, clock).markup);
    Ok(())
}

fn print_srt(timings: &Path, offset: f64) -> Result<(), String> {
    let raw = read_text(timings).map_err(|e| e.to_string())?;
    print!("{}", render_srt(&build_clips(&raw, offset), None));
    Ok(())
}

fn renumber(input: &Path, quiet: bool) -> Result<(), String> {
    let text = read_text(input).map_err(|e| e.to_string())?;
    let (output, count) = renumber_placeholders(&text);
    print!("{output}");
    if !quiet {
        eprintln!("Renumbered {count} fragment ids");
    }
    Ok(())
}
