use anyhow::Result;
use fragpatch::cli::{parse_args, Args, GlobalOptions};
use fragpatch::config::{self, Config};
use fragpatch::diff_formatter::DiffFormatter;
use fragpatch::{logger, recipes};
use std::path::{Path, PathBuf};

fn main() -> Result<()> {
    let (globals, args) = parse_args();

    // A broken config file must not block rewriting it
    if let Args::Config { init: true, .. } = args {
        return init_config(&globals);
    }

    let config = config::load_config(globals.config.as_deref())?;

    if globals.debug || config.logging.debug {
        if let Some(path) = logger::init_default_debug_logging()? {
            eprintln!("Debug log: {}", path.display());
        }
    }

    match args {
        Args::Run {
            recipe,
            root,
            dry_run,
            no_color,
        } => {
            run_recipe(&config, &recipe, &root, dry_run, !no_color)?;
        }
        Args::List => {
            list_recipes(&config)?;
        }
        Args::Config { .. } => {
            show_config(&globals, &config)?;
        }
    }

    Ok(())
}

fn run_recipe(
    config: &Config,
    name: &str,
    root: &Path,
    dry_run: bool,
    color_allowed: bool,
) -> Result<()> {
    let recipe = recipes::find_recipe(name, config)?;

    if dry_run {
        let use_color = DiffFormatter::should_use_color(color_allowed && config.display.color);
        let preview = recipe.preview(root)?;

        print!("{}", DiffFormatter::format_dry_run_header(&recipe, use_color));
        let label = recipe.target.display().to_string();
        print!(
            "{}",
            DiffFormatter::format_preview(&preview, &label, config.display.context_lines, use_color)
        );
        if !preview.outcome.is_replaced() {
            println!("{}", DiffFormatter::format_status(&preview.outcome));
        }
        return Ok(());
    }

    let outcome = recipe.run(root)?;
    println!("{}", DiffFormatter::format_status(&outcome));

    Ok(())
}

fn list_recipes(config: &Config) -> Result<()> {
    let all = recipes::all_recipes(config)?;
    let use_color = DiffFormatter::should_use_color(config.display.color);
    print!("{}", DiffFormatter::format_recipe_list(&all, use_color));
    Ok(())
}

fn config_path(globals: &GlobalOptions) -> Result<PathBuf> {
    match &globals.config {
        Some(path) => Ok(path.clone()),
        None => config::config_file_path(),
    }
}

fn init_config(globals: &GlobalOptions) -> Result<()> {
    let path = config_path(globals)?;
    config::save_default_config(&path)?;
    println!("Wrote default configuration to {}", path.display());
    Ok(())
}

fn show_config(globals: &GlobalOptions, config: &Config) -> Result<()> {
    println!("# {}", config_path(globals)?.display());
    print!("{}", toml::to_string_pretty(config)?);
    Ok(())
}
