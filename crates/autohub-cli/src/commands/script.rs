use super::app_dirs;
use super::run::{self, RunArgs};
use crate::OutputFormat;
use anyhow::{Context, Result, anyhow};
use autohub_core::script::{Script, ScriptStep, ScriptStore};
use autohub_core::{Locator, TaskDescriptor};
use console::style;
use url::Url;

fn store() -> Result<ScriptStore> {
    Ok(ScriptStore::new(app_dirs()?.scripts_dir()))
}

/// Run a stored script by name or a script file by path
pub fn run(name_or_path: &str, args: &RunArgs, format: OutputFormat) -> Result<bool> {
    let script = store()?
        .load(name_or_path)
        .with_context(|| format!("Failed to load script '{}'", name_or_path))?;
    run::execute(TaskDescriptor::custom(script), args, format)
}

pub fn list(format: OutputFormat) -> Result<()> {
    let store = store()?;
    let names = store.list()?;

    if format.is_json() {
        println!("{}", serde_json::to_string_pretty(&names)?);
        return Ok(());
    }

    if names.is_empty() {
        println!(
            "No scripts found. Create one with 'autohub script new <NAME>' in: {}",
            store.dir().display()
        );
        return Ok(());
    }

    println!("{}", style("Scripts:").bold());
    for name in names {
        match store.load(&name) {
            Ok(script) => println!(
                "  {:<24} {:>3} step(s)  {}",
                name,
                script.steps.len(),
                style(script.description.unwrap_or_default()).dim()
            ),
            Err(e) => println!("  {:<24} {}", name, style(format!("unreadable: {}", e)).red()),
        }
    }
    Ok(())
}

pub fn show(name: &str) -> Result<()> {
    let script = store()?
        .load(name)
        .with_context(|| format!("Failed to load script '{}'", name))?;
    println!("{}", serde_json::to_string_pretty(&script)?);
    Ok(())
}

/// Write a starter script that opens `url` and collects every link on it
pub fn new(name: &str, url: &str, force: bool) -> Result<()> {
    if name.trim().is_empty() || name.contains(['/', '\\']) {
        return Err(anyhow!("Invalid script name: '{}'", name));
    }
    let url = Url::parse(url).with_context(|| format!("Invalid URL '{}'", url))?;

    let store = store()?;
    let path = store.path_for(name);
    if path.exists() && !force {
        return Err(anyhow!(
            "Script '{}' already exists at {}. Use --force to overwrite it.",
            name,
            path.display()
        ));
    }

    let mut script = Script::new(
        name,
        vec![
            ScriptStep::Goto {
                url: url.to_string(),
            },
            ScriptStep::WaitFor {
                locator: Locator::css("body"),
            },
            ScriptStep::Collect {
                locator: Locator::css("a[href]"),
                label: "link".to_string(),
                attribute: Some("href".to_string()),
            },
        ],
    );
    script.description = Some(format!("Collect links from {}", url));

    let path = store.save(&script)?;
    println!("✅ Created script '{}' at {}", name, path.display());
    Ok(())
}
