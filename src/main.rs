use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::{Color, ColoredString, Colorize};
use patchpad::config::{load_from_path, HighlightConfig};
use patchpad::persist::{atomic_write, open_history, save_history};
use patchpad::{Buffer, Marker, RenderSink, RenderStream, TextBuffer};
use similar::{ChangeTag, TextDiff};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use walkdir::WalkDir;

#[derive(Parser)]
#[command(name = "patchpad")]
#[command(about = "Edit history and regex highlighting for text buffers", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Highlight a file with a rule profile
    Highlight {
        /// File to highlight
        file: PathBuf,

        /// Highlight profile (TOML)
        #[arg(short, long)]
        rules: PathBuf,

        /// Byte offset of the cursor (selection start)
        #[arg(short, long, default_value_t = 0)]
        cursor: usize,

        /// Byte offset of the selection end (defaults to the cursor)
        #[arg(long)]
        selection_end: Option<usize>,

        /// Print the render stream as JSON instead of colored text
        #[arg(long)]
        json: bool,
    },

    /// List the rules of a profile, or of every profile in a directory
    Rules {
        /// A single highlight profile
        #[arg(short, long, conflicts_with = "dir")]
        rules: Option<PathBuf>,

        /// Directory of *.toml profiles (defaults to ./profiles)
        #[arg(short, long)]
        dir: Option<PathBuf>,
    },

    /// Inspect or replay a saved edit history
    History {
        #[command(subcommand)]
        command: HistoryCommand,
    },
}

#[derive(Subcommand)]
enum HistoryCommand {
    /// Validate a history file and summarize it
    Check {
        /// History file (JSON)
        history: PathBuf,
    },

    /// Undo entries, rewriting the file and the history
    Undo(StepArgs),

    /// Redo entries, rewriting the file and the history
    Redo(StepArgs),
}

#[derive(clap::Args)]
struct StepArgs {
    /// History file (JSON)
    history: PathBuf,

    /// Text file the history belongs to
    file: PathBuf,

    /// Number of entries to step over
    #[arg(short = 'n', long, default_value_t = 1)]
    steps: usize,

    /// Show unified diff of changes
    #[arg(short, long)]
    diff: bool,

    /// Show what would change without writing anything
    #[arg(long)]
    dry_run: bool,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Direction {
    Undo,
    Redo,
}

fn main() -> Result<()> {
    patchpad::logging::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Highlight {
            file,
            rules,
            cursor,
            selection_end,
            json,
        } => cmd_highlight(&file, &rules, (cursor, selection_end.unwrap_or(cursor)), json),

        Commands::Rules { rules, dir } => cmd_rules(rules, dir),

        Commands::History { command } => match command {
            HistoryCommand::Check { history } => cmd_history_check(&history),
            HistoryCommand::Undo(args) => cmd_history_step(&args, Direction::Undo),
            HistoryCommand::Redo(args) => cmd_history_step(&args, Direction::Redo),
        },
    }
}

/// Terminal sink: colors spans by classification, emphasizes selected
/// brackets.
struct AnsiSink {
    colors: HashMap<String, Color>,
    out: String,
}

impl AnsiSink {
    fn new(config: &HighlightConfig) -> Self {
        // Profiles are validated on load, so unknown names never reach here.
        let colors = config
            .colors
            .iter()
            .filter_map(|(class, name)| Color::from_str(name).ok().map(|c| (class.clone(), c)))
            .collect();
        Self {
            colors,
            out: String::new(),
        }
    }
}

impl RenderSink for AnsiSink {
    fn span(&mut self, text: &str, classification: Option<&str>, marker: Option<Marker>) {
        let mut styled: ColoredString = text.normal();
        if let Some(color) = classification.and_then(|class| self.colors.get(class)) {
            styled = styled.color(*color);
        }
        if marker == Some(Marker::SelectedBracket) {
            styled = styled.bold().underline();
        }
        self.out.push_str(&styled.to_string());
    }

    fn end_of_content(&mut self) {
        if !self.out.ends_with('\n') {
            self.out.push('\n');
        }
    }
}

fn cmd_highlight(file: &Path, rules: &Path, selection: (usize, usize), json: bool) -> Result<()> {
    let config = load_from_path(rules)?;
    let tokenizer = config
        .build_tokenizer()
        .with_context(|| format!("failed to compile rules from {}", rules.display()))?;
    let text =
        fs::read_to_string(file).with_context(|| format!("failed to read {}", file.display()))?;

    if json {
        let mut stream = RenderStream::new();
        tokenizer.render(&text, selection, &mut stream);
        println!("{}", serde_json::to_string_pretty(&stream)?);
    } else {
        let mut sink = AnsiSink::new(&config);
        tokenizer.render(&text, selection, &mut sink);
        print!("{}", sink.out);
    }

    Ok(())
}

/// Helper: Discover all .toml profiles directly inside `dir`.
fn discover_profiles(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.exists() {
        anyhow::bail!("Profile directory not found: {}", dir.display());
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(dir).max_depth(1) {
        let entry = entry?;
        if entry.file_type().is_file()
            && entry.path().extension().and_then(|s| s.to_str()) == Some("toml")
        {
            files.push(entry.path().to_path_buf());
        }
    }
    files.sort();

    if files.is_empty() {
        anyhow::bail!("No .toml profiles found in {}", dir.display());
    }
    Ok(files)
}

fn cmd_rules(rules: Option<PathBuf>, dir: Option<PathBuf>) -> Result<()> {
    let profiles = match rules {
        Some(path) => vec![path],
        None => discover_profiles(&dir.unwrap_or_else(|| PathBuf::from("profiles")))?,
    };

    for path in profiles {
        let config = load_from_path(&path)?;
        let name = if config.meta.name.is_empty() {
            path.display().to_string()
        } else {
            config.meta.name.clone()
        };
        println!("{} ({} rules)", name.bold(), config.rules.len());
        if let Some(description) = &config.meta.description {
            println!("  {}", description.dimmed());
        }

        for (index, rule) in config.rules.iter().enumerate() {
            let bracket = rule
                .bracket
                .as_ref()
                .map(|b| format!(" [{} {}]", b.group, b.direction.as_str()))
                .unwrap_or_default();
            let flags = if rule.flags.is_empty() {
                String::new()
            } else {
                format!(" /{}", rule.flags)
            };
            println!(
                "  {:>3}. {:<16} {}{}{}",
                index + 1,
                rule.classification.cyan(),
                rule.pattern,
                flags.dimmed(),
                bracket.yellow()
            );
        }
        println!();
    }

    Ok(())
}

fn cmd_history_check(path: &Path) -> Result<()> {
    let history = open_history(path)?;

    println!("{} {}", "✓".green(), path.display());
    println!("  Entries: {}", history.len());
    println!("  Cursor:  {}", history.cursor());
    println!(
        "  Undo available: {}, redo available: {}",
        history.cursor(),
        history.len() - history.cursor()
    );
    Ok(())
}

fn cmd_history_step(args: &StepArgs, direction: Direction) -> Result<()> {
    let mut history = open_history(&args.history)?;
    let start_cursor = history.cursor();

    let original = fs::read_to_string(&args.file)
        .with_context(|| format!("failed to read {}", args.file.display()))?;
    let mut buffer = Buffer::new(original.clone());

    let mut applied = 0;
    while applied < args.steps {
        // Refuse to replay onto text that no longer matches the history.
        let expected = match direction {
            Direction::Undo if history.can_undo() => {
                Some(history.entries()[history.cursor() - 1].inverse())
            }
            Direction::Redo if history.can_redo() => Some(history.entries()[history.cursor()].clone()),
            _ => None,
        };
        let Some(expected) = expected else {
            break;
        };
        if !expected.matches(buffer.text()) {
            anyhow::bail!(
                "{} does not match its history at byte {} (expected {:?})",
                args.file.display(),
                expected.start,
                expected.old_text
            );
        }

        match direction {
            Direction::Undo => history.undo(&mut buffer),
            Direction::Redo => history.redo(&mut buffer),
        };
        applied += 1;
    }

    let verb = match direction {
        Direction::Undo => "Undid",
        Direction::Redo => "Redid",
    };
    if applied < args.steps {
        println!(
            "{}",
            format!("Only {applied} of {} steps available", args.steps).yellow()
        );
    }

    if args.diff {
        display_diff(&args.file, &original, buffer.text(), (start_cursor, history.cursor()));
    }

    if args.dry_run {
        println!("{}", "[DRY RUN - nothing written]".cyan());
    } else if applied > 0 {
        atomic_write(&args.file, buffer.text().as_bytes())?;
        save_history(&args.history, &history.export())?;
    }

    println!(
        "{} {verb} {applied} entr{} (cursor {}/{})",
        "✓".green(),
        if applied == 1 { "y" } else { "ies" },
        history.cursor(),
        history.len()
    );
    Ok(())
}

/// Print the text change between two history cursors as unified hunks.
fn display_diff(file: &Path, before: &str, after: &str, (from, to): (usize, usize)) {
    println!();
    println!("{}", format!("--- {} @ cursor {from}", file.display()).dimmed());
    println!("{}", format!("+++ {} @ cursor {to}", file.display()).dimmed());

    let diff = TextDiff::from_lines(before, after);
    for hunk in diff.unified_diff().context_radius(2).iter_hunks() {
        println!("{}", hunk.header().to_string().cyan());
        for change in hunk.iter_changes() {
            let line = match change.tag() {
                ChangeTag::Delete => format!("-{}", change.value()).red(),
                ChangeTag::Insert => format!("+{}", change.value()).green(),
                ChangeTag::Equal => format!(" {}", change.value()).normal(),
            };
            print!("{line}");
            if change.missing_newline() {
                println!();
            }
        }
    }
}
