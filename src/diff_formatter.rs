use crate::patcher::{PatchOutcome, PatchPreview};
use crate::recipes::{Recipe, RecipeSource};
use colored::*;
use similar::{ChangeTag, TextDiff};
use std::io::IsTerminal;

pub const REPLACED: &str = "Replaced!";
pub const NOT_MATCHED: &str = "Not replaced, pattern not matched.";
pub const UNCHANGED: &str = "Not replaced, text already up to date.";

pub struct DiffFormatter;

impl DiffFormatter {
    /// Auto-detect if we should use colors
    pub fn should_use_color(allowed: bool) -> bool {
        if !allowed {
            return false;
        }

        // Check NO_COLOR env var (https://no-color.org/)
        if std::env::var_os("NO_COLOR").is_some() {
            return false;
        }

        std::io::stdout().is_terminal()
    }

    /// The one-line status for a patch run
    pub fn format_status(outcome: &PatchOutcome) -> &'static str {
        match outcome {
            PatchOutcome::Replaced { .. } => REPLACED,
            PatchOutcome::NotMatched => NOT_MATCHED,
            PatchOutcome::Unchanged => UNCHANGED,
        }
    }

    /// Format dry run header
    pub fn format_dry_run_header(recipe: &Recipe, use_color: bool) -> String {
        let target = recipe.target.display().to_string();
        if use_color {
            format!(
                "{} {} ({})\n\n",
                "Dry run:".bold().cyan(),
                recipe.name.white().bold(),
                target.cyan()
            )
        } else {
            format!("Dry run: {} ({})\n\n", recipe.name, target)
        }
    }

    /// Unified diff of a preview, `context_size` lines around the fragment
    pub fn format_preview(
        preview: &PatchPreview,
        path_label: &str,
        context_size: usize,
        use_color: bool,
    ) -> String {
        if !preview.outcome.is_replaced() {
            return String::new();
        }

        let diff = TextDiff::from_lines(&preview.old_text, &preview.new_text);
        let mut output = String::new();

        let header = format!("--- a/{}\n+++ b/{}\n", path_label, path_label);
        if use_color {
            output.push_str(&header.bold().to_string());
        } else {
            output.push_str(&header);
        }

        let mut removed = 0usize;
        let mut added = 0usize;

        for group in diff.grouped_ops(context_size) {
            let (first, last) = match (group.first(), group.last()) {
                (Some(first), Some(last)) => (first, last),
                _ => continue,
            };
            let old_start = first.old_range().start;
            let old_len = last.old_range().end - old_start;
            let new_start = first.new_range().start;
            let new_len = last.new_range().end - new_start;

            let hunk = format!(
                "@@ -{},{} +{},{} @@\n",
                old_start + 1,
                old_len,
                new_start + 1,
                new_len
            );
            if use_color {
                output.push_str(&hunk.cyan().to_string());
            } else {
                output.push_str(&hunk);
            }

            for op in &group {
                for change in diff.iter_changes(op) {
                    let (sign, counter) = match change.tag() {
                        ChangeTag::Delete => ("-", Some(&mut removed)),
                        ChangeTag::Insert => ("+", Some(&mut added)),
                        ChangeTag::Equal => (" ", None),
                    };
                    if let Some(counter) = counter {
                        *counter += 1;
                    }

                    let mut line = format!("{}{}", sign, change.value());
                    if change.missing_newline() {
                        line.push('\n');
                    }

                    if use_color {
                        let colored_line = match change.tag() {
                            ChangeTag::Delete => line.red().to_string(),
                            ChangeTag::Insert => line.green().to_string(),
                            ChangeTag::Equal => line.dimmed().to_string(),
                        };
                        output.push_str(&colored_line);
                    } else {
                        output.push_str(&line);
                    }
                }
            }
        }

        output.push_str(&format!("\nTotal: {} removed, {} added\n", removed, added));
        output
    }

    /// Format the recipe listing
    pub fn format_recipe_list(recipes: &[Recipe], use_color: bool) -> String {
        let mut output = String::new();

        if recipes.is_empty() {
            output.push_str("No recipes found.\n");
            return output;
        }

        for recipe in recipes {
            let source = match recipe.source {
                RecipeSource::Builtin => "built-in",
                RecipeSource::Config => "config",
            };
            if use_color {
                let target = recipe.target.display().to_string();
                output.push_str(&format!(
                    "{} [{}]\n",
                    recipe.name.yellow().bold(),
                    source.dimmed()
                ));
                output.push_str(&format!("  Target: {}\n", target.cyan()));
            } else {
                output.push_str(&format!("{} [{}]\n", recipe.name, source));
                output.push_str(&format!("  Target: {}\n", recipe.target.display()));
            }
            if !recipe.description.is_empty() {
                output.push_str(&format!("  {}\n", recipe.description));
            }
            output.push('\n');
        }

        output
    }
}
