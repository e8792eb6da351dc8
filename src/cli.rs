use clap::{Parser, Subcommand};
use std::path::PathBuf;

const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    "

License: MIT
Rust Edition: 2024"
);

#[derive(Parser)]
#[command(name = "fragpatch")]
#[command(about = "One-shot fragment patcher: find a known block of text, replace it once")]
#[command(long_about = "fragpatch performs single, named edits on source files.

Each recipe knows its target file, the fragment to look for and the text that
replaces it. The fragment is matched with whitespace tolerance, so re-indented
or re-wrapped copies still match. At most one occurrence is replaced, and the
file is only written when its text actually changes.

BUILT-IN RECIPES:
  keyboard-nav-test       Update the script generator keyboard navigation test
  script-generator-grid   Collapse the script generator grid to two columns

STATUS:
  Replaced!                            The fragment was replaced
  Not replaced, pattern not matched.   Nothing matched; file untouched

EXAMPLES:
  fragpatch run script-generator-grid            Patch relative to the current directory
  fragpatch run keyboard-nav-test --root ../app  Patch another checkout
  fragpatch run script-generator-grid --dry-run  Show the diff, write nothing
  fragpatch list                                 List available recipes")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(long_version = LONG_VERSION)]
#[command(propagate_version = true)]
struct Cli {
    /// Use this config file instead of ~/.fragpatch/config.toml
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Write a debug log to ~/.fragpatch/fragpatch.log
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a recipe
    #[command(long_about = "Run a recipe against its target file.

The target path is resolved against --root (default: current directory).
Exits 0 whether or not the fragment was found.

EXAMPLES:
  fragpatch run script-generator-grid
  fragpatch run script-generator-grid --dry-run")]
    Run {
        /// Recipe name (see 'fragpatch list')
        #[arg(value_name = "RECIPE")]
        recipe: String,

        /// Directory the recipe target is relative to
        #[arg(long, value_name = "DIR", default_value = ".")]
        root: PathBuf,

        /// Preview the change without writing it
        #[arg(short = 'd', long)]
        dry_run: bool,

        /// Disable colored output
        #[arg(long)]
        no_color: bool,
    },

    /// List available recipes
    List,

    /// Show or create the configuration file
    #[command(long_about = "Show or create the configuration file.

CONFIGURATION OPTIONS:
  [logging]
    debug = false          # Write a debug log

  [display]
    color = true           # Colored dry-run diffs
    context_lines = 3      # Diff context (max 10)

  [[recipes]]              # Extra recipes (name, target, find, replace, mode)

EXAMPLES:
  fragpatch config --show    Print the effective configuration
  fragpatch config --init    Write a commented default config file")]
    Config {
        /// Print the effective configuration
        #[arg(long, conflicts_with = "init")]
        show: bool,

        /// Write the default config file (overwrites an existing one)
        #[arg(long)]
        init: bool,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Args {
    Run {
        recipe: String,
        root: PathBuf,
        dry_run: bool,
        no_color: bool,
    },
    List,
    Config {
        show: bool,
        init: bool,
    },
}

/// Options shared by every subcommand
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GlobalOptions {
    pub config: Option<PathBuf>,
    pub debug: bool,
}

pub fn parse_args() -> (GlobalOptions, Args) {
    from_cli(Cli::parse())
}

/// Parse from an explicit argument list
pub fn try_parse_from<I, T>(args: I) -> Result<(GlobalOptions, Args), clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    Cli::try_parse_from(args).map(from_cli)
}

fn from_cli(cli: Cli) -> (GlobalOptions, Args) {
    let globals = GlobalOptions {
        config: cli.config,
        debug: cli.debug,
    };

    let args = match cli.command {
        Commands::Run {
            recipe,
            root,
            dry_run,
            no_color,
        } => Args::Run {
            recipe,
            root,
            dry_run,
            no_color,
        },
        Commands::List => Args::List,
        Commands::Config { show, init } => Args::Config { show, init },
    };

    (globals, args)
}
