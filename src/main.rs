//! clozewright - author cloze flashcards that mix prose and code.
//!
//! # Usage
//!
//! ```bash
//! clozewright render card.txt --out card.html
//! clozewright render card.txt --mode hidden --active 2 --watch
//! clozewright parse card.txt
//! clozewright edit next-cloze card.txt --start 6 --end 11
//! ```

use std::fs;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;

use clozewright::cloze::{ClozeMatch, parse_clozes};
use clozewright::config::{
    ConfigFlags, ViewMode, clear_config_flags, global_config_path, load_config_flags,
    local_override_path, save_config_flags,
};
use clozewright::document::{Block, parse_content};
use clozewright::editor::{self, EditResult};
use clozewright::highlight::{self, DEFAULT_THEME, HighlighterState};
use clozewright::render::{RenderOptions, cloze_count, render};
use clozewright::watcher::{CardWatcher, DEFAULT_DEBOUNCE};

/// Author cloze flashcards that mix prose and syntax-highlighted code
#[derive(Parser, Debug)]
#[command(name = "clozewright", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Save current command-line flags as defaults in .clozewrightrc
    #[arg(long, global = true)]
    save: bool,

    /// Clear saved defaults in .clozewrightrc
    #[arg(long, global = true)]
    clear: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a card to HTML
    Render(RenderArgs),
    /// Print a card's blocks and clozes as JSON
    Parse {
        /// Card file, or - for stdin
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
    /// Print the highest cloze number in a card
    Count {
        /// Card file, or - for stdin
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
    /// Apply an editor action and print the resulting text and selection
    Edit(EditArgs),
}

#[derive(clap::Args, Debug)]
struct RenderArgs {
    /// Card file, or - for stdin
    #[arg(value_name = "FILE")]
    file: PathBuf,

    /// What to render
    #[arg(long, value_enum)]
    mode: Option<ViewMode>,

    /// Cloze number hidden or revealed by the preview modes
    #[arg(long, default_value_t = 1)]
    active: u32,

    /// Write HTML here instead of stdout
    #[arg(short, long, value_name = "PATH")]
    out: Option<PathBuf>,

    /// Re-render whenever the card changes
    #[arg(short, long)]
    watch: bool,

    /// Render code without syntax highlighting
    #[arg(long)]
    no_highlight: bool,

    /// Highlighting theme
    #[arg(long, value_name = "NAME")]
    theme: Option<String>,

    /// Extra folder of .sublime-syntax files
    #[arg(long, value_name = "DIR")]
    syntax_dir: Option<PathBuf>,

    /// Extra folder of .tmTheme files
    #[arg(long, value_name = "DIR")]
    theme_dir: Option<PathBuf>,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
enum EditAction {
    Indent,
    Dedent,
    Newline,
    CloseBracket,
    Cloze,
    NextCloze,
    CommentCloze,
    Hint,
}

#[derive(clap::Args, Debug)]
struct EditArgs {
    #[arg(value_enum)]
    action: EditAction,

    /// Card file, or - for stdin
    #[arg(value_name = "FILE")]
    file: PathBuf,

    /// Selection start (byte offset)
    #[arg(long)]
    start: usize,

    /// Selection end (byte offset); defaults to --start
    #[arg(long)]
    end: Option<usize>,

    /// Closing bracket typed, for close-bracket
    #[arg(long, default_value_t = '}')]
    key: char,

    /// Hint text, for hint
    #[arg(long)]
    hint: Option<String>,

    /// Cloze number, for cloze; defaults to the next free number
    #[arg(long)]
    number: Option<u32>,
}

#[derive(Serialize)]
struct ParseReport {
    blocks: Vec<Block>,
    clozes: Vec<ClozeMatch>,
    cloze_count: u32,
}

impl RenderArgs {
    fn flags(&self) -> ConfigFlags {
        ConfigFlags {
            watch: self.watch,
            no_highlight: self.no_highlight,
            theme: self.theme.clone(),
            syntax_dir: self.syntax_dir.clone(),
            theme_dir: self.theme_dir.clone(),
            mode: self.mode,
        }
    }
}

fn read_card(path: &Path) -> Result<String> {
    if path == Path::new("-") {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .context("Failed to read card from stdin")?;
        return Ok(text);
    }
    fs::read_to_string(path).with_context(|| format!("Failed to read card {}", path.display()))
}

fn print_json(value: &impl Serialize) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to encode JSON")?;
    println!("{json}");
    Ok(())
}

fn run_edit(args: &EditArgs) -> Result<()> {
    let text = read_card(&args.file)?;
    let start = args.start;
    let end = args.end.unwrap_or(start);

    let result: Option<EditResult> = match args.action {
        EditAction::Indent => Some(editor::indent_selection(&text, start, end)),
        EditAction::Dedent => Some(editor::dedent_selection(&text, start, end)),
        EditAction::Newline => Some(editor::insert_newline_with_indent(&text, start, end)),
        EditAction::CloseBracket => editor::auto_dedent_closing(&text, start, end, args.key),
        EditAction::Cloze => Some(match args.number {
            Some(number) => editor::insert_cloze_at_selection(&text, start, end, number),
            None => editor::insert_next_cloze(&text, start, end),
        }),
        EditAction::NextCloze => Some(editor::insert_next_cloze(&text, start, end)),
        EditAction::CommentCloze => Some(editor::insert_comment_cloze(&text, start)),
        EditAction::Hint => {
            let hint = args.hint.as_deref().context("--hint is required for hint")?;
            editor::add_cloze_hint(&text, start, hint)
        }
    };
    print_json(&result)
}

struct RenderJob<'a> {
    file: &'a Path,
    out: Option<&'a Path>,
    theme: String,
    view: ViewMode,
    active: u32,
    highlight: bool,
}

impl RenderJob<'_> {
    fn run(&self) -> Result<()> {
        let text = read_card(self.file)?;
        let state = self.highlight.then(|| highlight::shared().wait());
        let options = RenderOptions {
            highlighter: state.as_ref().and_then(HighlighterState::as_dyn),
            theme: &self.theme,
            mode: self.view.render_mode(self.active),
        };
        let html = render(&text, &options);

        match self.out {
            Some(path) => fs::write(path, format!("{html}\n"))
                .with_context(|| format!("Failed to write {}", path.display())),
            None => {
                let mut stdout = std::io::stdout().lock();
                writeln!(stdout, "{html}").context("Failed to write HTML")?;
                stdout.flush().context("Failed to write HTML")
            }
        }
    }
}

fn run_render(args: &RenderArgs, flags: &ConfigFlags) -> Result<()> {
    let highlight = !flags.no_highlight;
    if highlight {
        highlight::configure_shared(flags.highlight_source());
    }

    let job = RenderJob {
        file: &args.file,
        out: args.out.as_deref(),
        theme: flags.theme.clone().unwrap_or_else(|| DEFAULT_THEME.to_string()),
        view: flags.mode.unwrap_or_default(),
        active: args.active,
        highlight,
    };
    job.run()?;

    if !flags.watch {
        return Ok(());
    }
    if args.file.as_path() == Path::new("-") {
        anyhow::bail!("--watch needs a card file, not stdin");
    }

    let mut watcher = CardWatcher::new(&args.file, DEFAULT_DEBOUNCE)
        .with_context(|| format!("Failed to watch {}", args.file.display()))?;
    loop {
        watcher.wait_for_change(Duration::from_millis(100));
        tracing::info!(card = %watcher.card_path().display(), "card changed, re-rendering");
        if let Err(err) = job.run() {
            eprintln!("[warn] {err:#}");
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .init();

    let cli = Cli::parse();
    let global_path = global_config_path();
    let local_path = local_override_path();
    let cli_flags = match &cli.command {
        Some(Command::Render(args)) => args.flags(),
        _ => ConfigFlags::default(),
    };

    if cli.clear {
        clear_config_flags(&global_path)?;
    }
    if cli.save {
        save_config_flags(&global_path, &cli_flags)?;
    }

    let file_flags = if cli.clear {
        ConfigFlags::default()
    } else {
        let global_flags = load_config_flags(&global_path)?;
        let local_flags = load_config_flags(&local_path)?;
        global_flags.union(&local_flags)
    };
    let effective = file_flags.union(&cli_flags);

    match &cli.command {
        Some(Command::Render(args)) => run_render(args, &effective),
        Some(Command::Parse { file }) => {
            let text = read_card(file)?;
            print_json(&ParseReport {
                blocks: parse_content(&text),
                clozes: parse_clozes(&text),
                cloze_count: cloze_count(&text),
            })
        }
        Some(Command::Count { file }) => {
            println!("{}", cloze_count(&read_card(file)?));
            Ok(())
        }
        Some(Command::Edit(args)) => run_edit(args),
        None if cli.save || cli.clear => Ok(()),
        None => anyhow::bail!("no command given; try --help"),
    }
}
