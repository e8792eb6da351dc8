//! Named one-shot recipes
//!
//! A recipe pairs a target file with the fragment to find there and the text
//! that replaces it. Two recipes are built in; more can be declared in the
//! config file.

use crate::config::{Config, RecipeConfig};
use crate::patcher::{self, PatchOutcome, PatchPreview};
use crate::pattern::Pattern;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::debug;

/// A recipe compiled into the binary
#[derive(Debug, Clone, Copy)]
pub struct BuiltinRecipe {
    pub name: &'static str,
    pub description: &'static str,
    pub target: &'static str,
    pub find: &'static str,
    pub replace: &'static str,
}

const KEYBOARD_NAV_TEST_FIND: &str = r#"    [Fact]
    public void MainWindow_ScriptGeneratorComboBox_ShouldUseCompactWidth()
    {
        var content = File.ReadAllText(GetXamlPath("MainWindow.xaml"));

        Assert.Contains("AutomationProperties.AutomationId=\"ScriptOperationComboBox\"", content);
        Assert.Contains("Width=\"260\"", content);
        Assert.DoesNotContain("Text=\"Operation:\"", content);
        Assert.Contains("AutomationProperties.AutomationId=\"GenerateScriptButton\"", content);
        Assert.Contains("Grid.Column=\"2\" Content=\"Generate Script\"", content);
    }"#;

const KEYBOARD_NAV_TEST_REPLACE: &str = r#"    [Fact]
    public void MainWindow_ScriptGenerator_ShouldRemoveOperationLabel_AndUseSingleRow()
    {
        var content = File.ReadAllText(GetXamlPath("MainWindow.xaml"));

        Assert.DoesNotContain("Text=\"Operation:\"", content);
        Assert.Contains("AutomationProperties.AutomationId=\"ScriptOperationComboBox\"", content);
        Assert.Contains("Width=\"260\"", content);
        Assert.Contains("Grid.Column=\"1\" Content=\"Generate Script\"", content);
    }"#;

const SCRIPT_GENERATOR_GRID_FIND: &str = r#"                                    <Grid Margin="0,0,0,8">
                                        <Grid.ColumnDefinitions>
                                            <ColumnDefinition Width="Auto"/>
                                            <ColumnDefinition Width="8"/>
                                            <ColumnDefinition Width="Auto"/>
                                        </Grid.ColumnDefinitions>
                                        <ComboBox Grid.Column="0"
                                                  Width="260"
                                                  Style="{StaticResource UniformInputComboBox}"
                                                  automation:AutomationProperties.AutomationId="ScriptOperationComboBox"
                                                  ItemsSource="{Binding ScriptOperations}"
                                                  SelectedItem="{Binding SelectedScriptOperation}"/>
                                        <Button Grid.Column="2" Content="Generate Script" Style="{StaticResource BtnSec}"
                                                automation:AutomationProperties.AutomationId="GenerateScriptButton"
                                                Padding="16,8"
                                                Command="{Binding GenerateScriptCommand}"
                                                ToolTip="Generate a PowerShell script file for the selected operation"/>
                                    </Grid>"#;

const SCRIPT_GENERATOR_GRID_REPLACE: &str = r#"                                    <Grid Margin="0,0,0,8">
                                        <Grid.ColumnDefinitions>
                                            <ColumnDefinition Width="Auto"/>
                                            <ColumnDefinition Width="Auto"/>
                                        </Grid.ColumnDefinitions>
                                        <ComboBox Grid.Column="0"
                                                  Margin="0,0,8,0"
                                                  Width="260"
                                                  Style="{StaticResource UniformInputComboBox}"
                                                  automation:AutomationProperties.AutomationId="ScriptOperationComboBox"
                                                  ItemsSource="{Binding ScriptOperations}"
                                                  SelectedItem="{Binding SelectedScriptOperation}"/>
                                        <Button Grid.Column="1" Content="Generate Script" Style="{StaticResource BtnSec}"
                                                automation:AutomationProperties.AutomationId="GenerateScriptButton"
                                                Padding="16,8"
                                                Command="{Binding GenerateScriptCommand}"
                                                ToolTip="Generate a PowerShell script file for the selected operation"/>
                                    </Grid>"#;

static BUILTIN_RECIPES: [BuiltinRecipe; 2] = [
    BuiltinRecipe {
        name: "keyboard-nav-test",
        description: "Expect the script generator without its Operation label, on a single row",
        target: "src/WsusManager.Tests/KeyboardNavigationTests.cs",
        find: KEYBOARD_NAV_TEST_FIND,
        replace: KEYBOARD_NAV_TEST_REPLACE,
    },
    BuiltinRecipe {
        name: "script-generator-grid",
        description: "Collapse the script generator grid from three columns to two",
        target: "src/WsusManager.App/Views/MainWindow.xaml",
        find: SCRIPT_GENERATOR_GRID_FIND,
        replace: SCRIPT_GENERATOR_GRID_REPLACE,
    },
];

/// All recipes compiled into the binary
pub fn builtin_recipes() -> &'static [BuiltinRecipe] {
    &BUILTIN_RECIPES
}

/// Where a recipe was defined
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecipeSource {
    Builtin,
    Config,
}

/// A recipe ready to run
#[derive(Debug, Clone)]
pub struct Recipe {
    pub name: String,
    pub description: String,
    pub target: PathBuf,
    pub source: RecipeSource,
    pattern: Pattern,
    replacement: String,
}

impl Recipe {
    pub fn from_builtin(builtin: &BuiltinRecipe) -> Result<Self> {
        let pattern = Pattern::tolerant(builtin.find)
            .with_context(|| format!("Built-in recipe '{}' has a broken pattern", builtin.name))?;

        Ok(Self {
            name: builtin.name.to_string(),
            description: builtin.description.to_string(),
            target: PathBuf::from(builtin.target),
            source: RecipeSource::Builtin,
            pattern,
            replacement: builtin.replace.to_string(),
        })
    }

    pub fn from_config(recipe: &RecipeConfig) -> Result<Self> {
        let pattern = Pattern::build(recipe.pattern_mode()?, &recipe.find)
            .with_context(|| format!("Invalid find text for recipe '{}'", recipe.name))?;

        Ok(Self {
            name: recipe.name.trim().to_string(),
            description: recipe.description.clone(),
            target: recipe.target.clone(),
            source: RecipeSource::Config,
            pattern,
            replacement: recipe.replace.clone(),
        })
    }

    pub fn pattern(&self) -> &Pattern {
        &self.pattern
    }

    pub fn replacement(&self) -> &str {
        &self.replacement
    }

    /// Resolve the target against a root directory
    pub fn target_path(&self, root: &Path) -> PathBuf {
        root.join(&self.target)
    }

    /// Patch the target in place
    pub fn run(&self, root: &Path) -> Result<PatchOutcome> {
        let path = self.target_path(root);
        debug!(recipe = %self.name, path = %path.display(), "running recipe");
        patcher::patch(&path, &self.pattern, &self.replacement)
            .with_context(|| format!("Recipe '{}' failed", self.name))
    }

    /// Compute the edit without writing it
    pub fn preview(&self, root: &Path) -> Result<PatchPreview> {
        let path = self.target_path(root);
        debug!(recipe = %self.name, path = %path.display(), "previewing recipe");
        patcher::preview(&path, &self.pattern, &self.replacement)
            .with_context(|| format!("Recipe '{}' failed", self.name))
    }
}

/// Every known recipe, built-ins first
pub fn all_recipes(config: &Config) -> Result<Vec<Recipe>> {
    let mut recipes = builtin_recipes()
        .iter()
        .map(Recipe::from_builtin)
        .collect::<Result<Vec<_>>>()?;

    for recipe in &config.recipes {
        recipes.push(Recipe::from_config(recipe)?);
    }

    Ok(recipes)
}

/// Look a recipe up by name, built-ins first
pub fn find_recipe(name: &str, config: &Config) -> Result<Recipe> {
    if let Some(builtin) = builtin_recipes().iter().find(|r| r.name == name) {
        return Recipe::from_builtin(builtin);
    }

    if let Some(recipe) = config.recipes.iter().find(|r| r.name.trim() == name) {
        return Recipe::from_config(recipe);
    }

    let known: Vec<String> = builtin_recipes()
        .iter()
        .map(|r| r.name.to_string())
        .chain(config.recipes.iter().map(|r| r.name.trim().to_string()))
        .collect();

    anyhow::bail!(
        "Unknown recipe: {}\n\nAvailable recipes: {}\nList them with: fragpatch list",
        name,
        known.join(", ")
    )
}
