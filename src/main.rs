//! PlotEngine - Command-line entry point
//!
//! Converts, inspects and reformats PlotEngine documents.

use clap::{Parser, Subcommand};
use log::{info, warn};
use plotengine::config::{load_config_or_default, save_config, save_config_to, Settings};
use plotengine::editor::TextStats;
use plotengine::entities::{entity_mentions, NameIndexRecognizer};
use plotengine::export::{export_to_html_file, generate_html_document, HtmlOptions};
use plotengine::serialization::EncodeOptions;
use plotengine::{
    DocumentEditor, DocumentPosition, DocumentSelection, EditRequest, Error, FormatCommand, Result,
};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

/// Application name constant.
const APP_NAME: &str = "PlotEngine";

#[derive(Parser)]
#[command(name = "plotengine", version, about = "Attributed-text document tool")]
struct Cli {
    /// Settings file to use instead of the platform default
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// JSON name index used to highlight entity mentions
    #[arg(long, global = true)]
    entities: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Export a document to standalone HTML
    Html {
        input: PathBuf,

        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Page title
        #[arg(long)]
        title: Option<String>,
    },

    /// Print the plain text of a document
    Text { input: PathBuf },

    /// Print word, character, paragraph, heading and entity counts
    Stats { input: PathBuf },

    /// Re-write a document in the current format version
    Normalize {
        input: PathBuf,

        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Apply formatting commands such as `bold`, `heading2` or `color=#ff0000`
    Format {
        input: PathBuf,

        /// Commands to apply, in order
        #[arg(required = true)]
        commands: Vec<String>,

        /// Block to format (the whole document if omitted)
        #[arg(long)]
        block: Option<String>,

        /// First character of the selection within the block
        #[arg(long, default_value_t = 0, requires = "block")]
        start: usize,

        /// Character after the selection (end of the block if omitted)
        #[arg(long, requires = "block")]
        end: Option<usize>,

        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print the effective settings
    Config {
        /// Also save them to the settings file
        #[arg(long)]
        write: bool,
    },
}

fn main() -> ExitCode {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let settings = load_config_or_default(cli.config.as_deref());
    info!("Starting {}", APP_NAME);

    match cli.command {
        Command::Html {
            input,
            output,
            title,
        } => {
            let editor = open_document(&input, &settings, cli.entities.as_deref())?;
            let options = HtmlOptions::from_settings(&settings);
            let title = title.or_else(|| file_title(&input));
            match output {
                Some(path) => export_to_html_file(editor.document(), &path, title.as_deref(), &options)?,
                None => println!("{}", generate_html_document(editor.document(), title.as_deref(), &options)),
            }
        }
        Command::Text { input } => {
            let editor = open_document(&input, &settings, None)?;
            println!("{}", editor.document().plain_text());
        }
        Command::Stats { input } => {
            let editor = open_document(&input, &settings, cli.entities.as_deref())?;
            print_stats(&editor);
        }
        Command::Normalize { input, output } => {
            let editor = open_document(&input, &settings, cli.entities.as_deref())?;
            write_json(&editor, &settings, output.as_deref())?;
        }
        Command::Format {
            input,
            commands,
            block,
            start,
            end,
            output,
        } => {
            let mut editor = open_document(&input, &settings, None)?;
            let selection = format_selection(&editor, block, start, end)?;
            for name in &commands {
                let command = FormatCommand::parse(name)
                    .ok_or_else(|| Error::Application(format!("Unknown format command '{}'", name)))?;
                let outcome = editor.execute(EditRequest::Format(command), &selection)?;
                if !outcome.changed {
                    warn!("'{}' left the document unchanged", command.label());
                }
            }
            write_json(&editor, &settings, output.as_deref())?;
        }
        Command::Config { write } => {
            println!("{}", serde_json::to_string_pretty(&settings)?);
            if write {
                match cli.config.as_deref() {
                    Some(path) => save_config_to(&settings, path)?,
                    None => save_config(&settings)?,
                }
            }
        }
    }
    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// Helpers
// ─────────────────────────────────────────────────────────────────────────────

/// Read and decode `path`, reporting decode warnings on stderr.
fn open_document(path: &Path, settings: &Settings, entities: Option<&Path>) -> Result<DocumentEditor> {
    let input = read_file(path)?;
    let mut editor = DocumentEditor::new(Default::default(), settings.clone());
    for warning in editor.load_json(&input)? {
        eprintln!("warning: {}: {}", path.display(), warning);
    }

    if let Some(index_path) = entities {
        let recognizer = NameIndexRecognizer::from_json(&read_file(index_path)?)?;
        let highlights = editor.entity_request().fulfill(&recognizer);
        info!("Recognized {} entity mention(s)", highlights.spans.len());
        editor.apply_entity_highlights(&highlights)?;
    }
    Ok(editor)
}

fn format_selection(
    editor: &DocumentEditor,
    block: Option<String>,
    start: usize,
    end: Option<usize>,
) -> Result<DocumentSelection> {
    let document = editor.document();
    match block {
        Some(id) => {
            let block = document.require(&id.as_str().into())?;
            let end = end.unwrap_or_else(|| block.max_offset());
            Ok(DocumentSelection::within_block(id, start, end))
        }
        None => {
            let (first, last) = match (document.blocks().first(), document.blocks().last()) {
                (Some(first), Some(last)) => (first, last),
                _ => return Err(Error::InvalidSelection("document is empty".to_string())),
            };
            Ok(DocumentSelection::new(
                DocumentPosition::new(first.id.clone(), 0),
                DocumentPosition::new(last.id.clone(), last.max_offset()),
            ))
        }
    }
}

fn print_stats(editor: &DocumentEditor) {
    let stats = TextStats::from_document(editor.document());
    println!("words:       {}", stats.words);
    println!("characters:  {}", stats.characters);
    println!("paragraphs:  {}", stats.paragraphs);
    println!("headings:    {}", stats.headings);
    println!("rules:       {}", stats.horizontal_rules);

    let mentions = entity_mentions(editor.document());
    if !mentions.is_empty() {
        println!("entities:");
        for (id, count) in mentions {
            println!("  {:<20} {}", id, count);
        }
    }
}

fn write_json(editor: &DocumentEditor, settings: &Settings, output: Option<&Path>) -> Result<()> {
    let json = editor.save_json(&EncodeOptions::from_settings(settings))?;
    match output {
        Some(path) => std::fs::write(path, json).map_err(|e| Error::FileWrite {
            path: path.to_path_buf(),
            source: e,
        }),
        None => {
            println!("{}", json);
            Ok(())
        }
    }
}

fn read_file(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|e| Error::FileRead {
        path: path.to_path_buf(),
        source: e,
    })
}

fn file_title(path: &Path) -> Option<String> {
    path.file_stem().map(|stem| stem.to_string_lossy().into_owned())
}
