//! PromptCut CLI
//!
//! Headless entry point for prompt-driven video editing: probe media, list
//! the operation catalog, apply prompts in one shot, or drive an interactive
//! session with undo/redo and preview frames.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use promptcut_core::ai::{create_provider, AIProvider, MockProvider};
use promptcut_core::descriptor::OperationDescriptor;
use promptcut_core::ffmpeg::{detect, FFmpegRunner};
use promptcut_core::preview::PreviewDriver;
use promptcut_core::registry;
use promptcut_core::session::{EditOutcome, EditSession};
use promptcut_core::settings::Settings;
use promptcut_core::EditError;

#[derive(Parser)]
#[command(name = "promptcut", version, about = "Prompt-driven video editing")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Use the offline mock provider (raw JSON operations only)
    #[arg(long, global = true)]
    offline: bool,

    /// AI provider override (gemini, openai, anthropic)
    #[arg(long, global = true)]
    provider: Option<String>,

    /// Model override
    #[arg(long, global = true)]
    model: Option<String>,

    /// Increase log verbosity (-v, -vv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Command {
    /// Print media metadata for a file
    Probe {
        file: PathBuf,

        /// Emit raw JSON instead of a summary
        #[arg(long)]
        json: bool,
    },

    /// List the supported edit operations
    Ops {
        /// Emit the catalog as JSON
        #[arg(long)]
        json: bool,
    },

    /// Apply one or more prompts to a video and export the result
    Edit {
        file: PathBuf,

        /// Prompt to apply; repeatable, applied in order
        #[arg(short, long = "prompt", required = true)]
        prompts: Vec<String>,

        /// Treat prompts as raw operation JSON, skipping interpretation
        #[arg(long)]
        raw: bool,

        /// Output file
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Interactive editing session
    Repl { file: PathBuf },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli).await {
        Ok(()) => Ok(()),
        Err(err) => {
            if let Some(edit_err) = err.downcast_ref::<EditError>() {
                eprintln!("error [{}]: {}", edit_err.class(), edit_err);
                std::process::exit(1);
            }
            Err(err)
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Probe { ref file, json } => probe(file, json).await,
        Command::Ops { json } => ops(json),
        Command::Edit {
            ref file,
            ref prompts,
            raw,
            ref output,
        } => {
            let file = file.clone();
            let prompts = prompts.clone();
            let output = output.clone();
            let mut session = build_session(&cli)?;
            edit(&mut session, &file, &prompts, raw, &output).await
        }
        Command::Repl { ref file } => {
            let file = file.clone();
            let mut session = build_session(&cli)?;
            repl(&mut session, &file).await
        }
    }
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("promptcut={}", default_level)));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn build_session(cli: &Cli) -> Result<EditSession> {
    let mut settings = Settings::load()?;
    if let Some(provider) = &cli.provider {
        settings.provider = provider
            .parse()
            .map_err(|e: String| EditError::Config(e))?;
    }
    if let Some(model) = &cli.model {
        settings.model = Some(model.clone());
    }

    let provider: Arc<dyn AIProvider> = if cli.offline {
        debug!("Using offline mock provider");
        Arc::new(MockProvider::new("offline"))
    } else {
        create_provider(settings.provider_config()?)?
    };

    Ok(EditSession::new(provider, &settings)?)
}

// =============================================================================
// Subcommands
// =============================================================================

async fn probe(file: &Path, json: bool) -> Result<()> {
    let runner = FFmpegRunner::new(detect().map_err(EditError::from)?);
    let media = runner.probe(file).await.map_err(EditError::from)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&media)?);
        return Ok(());
    }

    println!("file:     {}", file.display());
    println!("format:   {}", media.format);
    println!("duration: {:.3}s", media.duration_sec);
    if let Some((w, h)) = media.resolution() {
        println!("video:    {}x{} @ {:.3} fps", w, h, media.fps().unwrap_or(0.0));
    } else {
        println!("video:    none");
    }
    match &media.audio {
        Some(a) => println!("audio:    {} Hz, {} ch ({})", a.sample_rate, a.channels, a.codec),
        None => println!("audio:    none"),
    }
    Ok(())
}

fn ops(json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(registry::catalog())?);
    } else {
        print!("{}", registry::render_catalog());
    }
    Ok(())
}

async fn edit(
    session: &mut EditSession,
    file: &Path,
    prompts: &[String],
    raw: bool,
    output: &Path,
) -> Result<()> {
    session.load(file).await?;

    for prompt in prompts {
        let outcome = apply(session, prompt, raw).await?;
        report(&outcome);
    }

    let exported = session.export(output).await?;
    println!("exported {}", exported.display());
    Ok(())
}

async fn apply(session: &mut EditSession, input: &str, raw: bool) -> Result<EditOutcome> {
    let outcome = if raw || input.trim_start().starts_with('{') {
        let value: serde_json::Value = serde_json::from_str(input)
            .with_context(|| "raw operations must be valid JSON")?;
        let descriptor = OperationDescriptor::from_ai_value(value)?;
        session.apply_descriptor(descriptor).await?
    } else {
        session.apply_prompt(input).await?
    };
    Ok(outcome)
}

fn report(outcome: &EditOutcome) {
    match outcome {
        EditOutcome::Edited { descriptor, handle } => {
            println!(
                "applied {} -> {} ({:.3}s)",
                descriptor.kind(),
                handle.file_name(),
                handle.duration_sec()
            );
        }
        EditOutcome::SideOutput { descriptor, path } => {
            println!("applied {} -> {}", descriptor.kind(), path.display());
        }
    }
}

// =============================================================================
// Interactive session
// =============================================================================

const REPL_HELP: &str = "\
Type a prompt to edit the video, or a raw {\"action\": ...} JSON operation.
Commands:
  :undo            step back one edit
  :redo            re-apply an undone edit
  :history         list edit states
  :status          show the preview playhead
  :play | :pause | :stop
  :seek <sec>      move the preview playhead
  :frame <sec> <file.png>  extract a still frame
  :export <file>   write the current state
  :ops             list supported operations
  :help            this text
  :quit            exit";

async fn repl(session: &mut EditSession, file: &Path) -> Result<()> {
    let handle = session.load(file).await?.clone();
    println!(
        "loaded {} ({:.3}s, provider {})",
        handle.file_name(),
        handle.duration_sec(),
        session.provider_name()
    );
    println!("type :help for commands");

    let mut preview = PreviewDriver::new(session.runner());
    preview.load(handle);

    let mut stdout = tokio::io::stdout();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        stdout.write_all(b"> ").await?;
        stdout.flush().await?;
        let line = match lines.next_line().await? {
            Some(line) => line,
            None => break,
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line == ":quit" || line == ":q" {
            break;
        }
        if let Err(err) = dispatch(session, &mut preview, line).await {
            match err.downcast_ref::<EditError>() {
                Some(edit_err) => eprintln!("error [{}]: {}", edit_err.class(), edit_err),
                None => eprintln!("error: {}", err),
            }
        }
    }
    Ok(())
}

async fn dispatch(
    session: &mut EditSession,
    preview: &mut PreviewDriver,
    line: &str,
) -> Result<()> {
    let mut parts = line.splitn(3, char::is_whitespace);
    let head = parts.next().unwrap_or("");

    match head {
        ":help" => println!("{}", REPL_HELP),
        ":ops" => print!("{}", registry::render_catalog()),
        ":undo" => {
            let handle = session.undo()?;
            preview.load(handle.clone());
            println!("now at {} ({:.3}s)", handle.file_name(), handle.duration_sec());
        }
        ":redo" => {
            let handle = session.redo()?;
            preview.load(handle.clone());
            println!("now at {} ({:.3}s)", handle.file_name(), handle.duration_sec());
        }
        ":history" => {
            let history = session.history();
            for (i, entry) in history.entries().iter().enumerate() {
                let marker = if i == history.cursor() { "*" } else { " " };
                let kind = entry
                    .descriptor
                    .as_ref()
                    .map(|d| d.kind().to_string())
                    .unwrap_or_else(|| "load".to_string());
                println!(
                    "{} [{}] {} {} ({:.3}s)",
                    marker,
                    i,
                    kind,
                    entry.handle.file_name(),
                    entry.handle.duration_sec()
                );
            }
        }
        ":status" => {
            let status = preview.status();
            println!("{:?} at {:.3}s", status.state, status.position_sec);
        }
        ":play" => preview.play()?,
        ":pause" => preview.pause()?,
        ":stop" => preview.stop(),
        ":seek" => {
            let sec: f64 = parts
                .next()
                .ok_or_else(|| anyhow!("usage: :seek <sec>"))?
                .parse()
                .context("seek position must be a number")?;
            preview.seek(sec)?;
        }
        ":frame" => {
            let sec: f64 = parts
                .next()
                .ok_or_else(|| anyhow!("usage: :frame <sec> <file.png>"))?
                .parse()
                .context("frame position must be a number")?;
            let out = parts
                .next()
                .ok_or_else(|| anyhow!("usage: :frame <sec> <file.png>"))?;
            preview.frame_at(sec, Path::new(out)).await?;
            println!("wrote {}", out);
        }
        ":export" => {
            let dest = parts
                .next()
                .ok_or_else(|| anyhow!("usage: :export <file>"))?;
            let path = session.export(Path::new(dest)).await?;
            println!("exported {}", path.display());
        }
        _ if head.starts_with(':') => {
            println!("unknown command {} (:help for commands)", head);
        }
        _ => {
            let outcome = apply(session, line, false).await?;
            report(&outcome);
            if let Ok(current) = session.current() {
                preview.load(current.clone());
            }
        }
    }
    Ok(())
}
