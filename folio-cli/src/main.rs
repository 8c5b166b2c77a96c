use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Report, Result, WrapErr, eyre};
use serde_json::Value;
use tracing_subscriber::EnvFilter;

use folio::{
    BrowserOptions, Confirm, EditSession, FieldPath, FileStorage, GalleryBrowser, ImageEntry,
    Lightbox, SaveOutcome,
    io::{DocumentFormat, ExportOptions, ExportTarget, LoadOrigin, export_document},
    session::RemoveOutcome,
};

const LOG_ENV: &str = "FOLIO_LOG";

#[derive(Debug, Parser)]
#[command(
    name = "folio",
    version,
    about = "Edit portfolio content and browse its image series"
)]
struct Cli {
    /// Directory holding the saved content
    #[arg(long = "store", value_name = "DIR", default_value = ".folio", global = true)]
    store: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the value at a path (`hero.name` or `/hero/name`)
    Get { path: FieldPath },
    /// Overwrite the value at a path
    Set {
        path: FieldPath,
        value: String,
        /// Parse VALUE as JSON instead of taking it as text
        #[arg(long)]
        json: bool,
    },
    /// Append a JSON value to the sequence at a path
    Append { path: FieldPath, value: String },
    /// Delete one element of the sequence at a path
    Remove {
        path: FieldPath,
        index: usize,
        /// Skip the confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },
    /// Replace an image with a local file, stored inline
    ReplaceImage { path: FieldPath, file: PathBuf },
    /// Restore the built-in content
    Reset {
        /// Skip the confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },
    /// Write the whole document to stdout or a file
    Export {
        #[arg(long, default_value_t = DocumentFormat::Json)]
        format: DocumentFormat,
        /// Emit compact output rather than pretty formatting
        #[arg(long)]
        compact: bool,
        #[arg(short = 'o', long = "output", value_name = "FILE")]
        output: Option<PathBuf>,
    },
    /// Open the terminal lightbox on an image series
    Browse {
        path: FieldPath,
        /// Index of the first image shown
        #[arg(long, default_value_t = 0)]
        start: usize,
        /// Hide the key binding footer
        #[arg(long = "no-help")]
        no_help: bool,
    },
}

fn main() -> Result<()> {
    color_eyre::install()?;
    init_logging();
    let cli = Cli::parse();

    let mut session = EditSession::open(FileStorage::new(&cli.store));
    if let LoadOrigin::DefaultCorrupt { reason } = session.load_origin() {
        eprintln!("saved content was unreadable ({reason}); starting from the built-in content");
    }

    match cli.command {
        Command::Get { path } => {
            let value = session
                .get(&path)
                .ok_or_else(|| eyre!("nothing at {path}"))?;
            println!("{}", render_value(value)?);
        }
        Command::Set { path, value, json } => {
            let value = if json {
                parse_json(&value)?
            } else {
                Value::String(value)
            };
            let outcome = session.update(&path, value)?;
            report(&outcome, &format!("updated {path}"));
        }
        Command::Append { path, value } => {
            let outcome = session.append(&path, parse_json(&value)?)?;
            report(&outcome, &format!("appended to {path}"));
        }
        Command::Remove { path, index, yes } => remove(&mut session, path, index, yes)?,
        Command::ReplaceImage { path, file } => {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .build()
                .wrap_err("failed to start async runtime")?;
            let outcome = runtime.block_on(session.replace_image(&path, &file))?;
            report(&outcome, &format!("replaced {path} with {}", file.display()));
        }
        Command::Reset { yes } => match session.reset_to_default(&mut answer(yes)) {
            Some(outcome) => report(&outcome, "content reset"),
            None => println!("kept current content"),
        },
        Command::Export {
            format,
            compact,
            output,
        } => {
            let target = output.map_or(ExportTarget::Stdout, ExportTarget::file);
            let options = ExportOptions::default()
                .with_format(format)
                .with_pretty(!compact)
                .with_target(target);
            export_document(session.document(), &options).map_err(Report::msg)?;
        }
        Command::Browse {
            path,
            start,
            no_help,
        } => {
            let options = BrowserOptions::default().with_help(!no_help);
            GalleryBrowser::new(session, path)
                .with_start(start)
                .with_options(options)
                .run()
                .map_err(Report::msg)?;
        }
    }
    Ok(())
}

fn init_logging() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

/// Image series go through the lightbox so their size bounds apply.
fn remove(
    session: &mut EditSession<FileStorage>,
    path: FieldPath,
    index: usize,
    yes: bool,
) -> Result<()> {
    let holds_images = session
        .get(&path)
        .and_then(Value::as_array)
        .and_then(|items| items.first())
        .and_then(ImageEntry::from_value)
        .is_some();
    let mut confirm = answer(yes);

    if holds_images {
        let mut lightbox = Lightbox::new();
        lightbox.open(session.document(), path.clone(), index)?;
        match lightbox.remove(session, index, &mut confirm)? {
            RemoveOutcome::Removed { remaining, save } => {
                report(&save, &format!("removed {path}/{index}, {remaining} left"));
            }
            RemoveOutcome::Declined => println!("kept {path}/{index}"),
        }
        return Ok(());
    }

    if !confirm.confirm(&format!("Remove {path}/{index}?")) {
        println!("kept {path}/{index}");
        return Ok(());
    }
    let outcome = session.remove(&path, index)?;
    report(&outcome, &format!("removed {path}/{index}"));
    Ok(())
}

fn parse_json(raw: &str) -> Result<Value> {
    serde_json::from_str(raw).wrap_err_with(|| format!("'{raw}' is not valid JSON"))
}

fn render_value(value: &Value) -> Result<String> {
    match value {
        Value::String(text) => Ok(text.clone()),
        other => serde_json::to_string_pretty(other).wrap_err("failed to serialize value"),
    }
}

fn report(outcome: &SaveOutcome, done: &str) {
    println!("{done}");
    if let Some(warning) = outcome.warning() {
        eprintln!("warning: {warning}");
    }
}

enum Answer {
    Always,
    Ask,
}

fn answer(yes: bool) -> Answer {
    if yes { Answer::Always } else { Answer::Ask }
}

impl Confirm for Answer {
    fn confirm(&mut self, prompt: &str) -> bool {
        match self {
            Answer::Always => true,
            Answer::Ask => ask(prompt),
        }
    }
}

fn ask(prompt: &str) -> bool {
    eprint!("{prompt} [y/N] ");
    let _ = io::stderr().flush();
    let mut line = String::new();
    if io::stdin().lock().read_line(&mut line).is_err() {
        return false;
    }
    matches!(line.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}
