//! Commands over the local results store.
//!
//! Rows are appended by every successful task run and can be filtered by a
//! case-insensitive keyword matched against all columns.

use super::{app_dirs, load_store};
use crate::OutputFormat;
use anyhow::{Context, Result};
use autohub_core::DataRow;
use autohub_core::export::{CsvExporter, CsvImporter};
use chrono::Local;
use console::style;
use std::io::{self, Write};
use std::path::Path;

pub fn list(filter: Option<&str>, limit: Option<usize>, format: OutputFormat) -> Result<()> {
    let store = load_store(&app_dirs()?)?;
    let mut rows = select(store.rows(), filter);
    if let Some(limit) = limit {
        let skip = rows.len().saturating_sub(limit);
        rows.drain(..skip);
    }

    if format.is_json() {
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    if rows.is_empty() {
        println!("No results stored.");
        return Ok(());
    }

    println!(
        "{}",
        style(format!(
            "{:<19}  {:<10}  {:<9}  {:<40}  {:<9}  {}",
            "Time", "Source", "Type", "Content", "Status", "Details"
        ))
        .bold()
    );
    for row in &rows {
        println!(
            "{:<19}  {:<10}  {:<9}  {:<40}  {:<9}  {}",
            row.timestamp
                .with_timezone(&Local)
                .format("%Y-%m-%d %H:%M:%S")
                .to_string(),
            row.source,
            row.kind,
            truncate(&row.content, 40),
            row.status,
            style(&row.details).dim()
        );
    }
    println!();
    println!("{} of {} row(s)", rows.len(), store.len());
    Ok(())
}

pub fn export(output: &Path, filter: Option<&str>) -> Result<()> {
    let store = load_store(&app_dirs()?)?;
    let rows = select(store.rows(), filter);

    let count = CsvExporter::to_file(rows, output)
        .with_context(|| format!("Failed to export to {}", output.display()))?;
    println!("✅ Exported {} row(s) to {}", count, output.display());
    Ok(())
}

pub fn import(input: &Path) -> Result<()> {
    let rows = CsvImporter::from_file(input)
        .with_context(|| format!("Failed to import {}", input.display()))?;
    let count = rows.len();

    let mut store = load_store(&app_dirs()?)?;
    store.extend(rows);
    store.save()?;

    println!("✅ Imported {} row(s) from {}", count, input.display());
    Ok(())
}

pub fn clear(force: bool) -> Result<()> {
    let mut store = load_store(&app_dirs()?)?;
    if store.is_empty() {
        println!("No results stored.");
        return Ok(());
    }

    if !force {
        print!(
            "⚠️  This will permanently delete {} stored row(s).\nType 'yes' to confirm: ",
            store.len()
        );
        io::stdout().flush()?;

        let mut input = String::new();
        io::stdin().read_line(&mut input)?;

        if input.trim() != "yes" {
            println!("Clear cancelled.");
            return Ok(());
        }
    }

    let removed = store.len();
    store.clear();
    store.save()?;
    println!("✅ Removed {} row(s)", removed);
    Ok(())
}

fn select<'a>(rows: &'a [DataRow], filter: Option<&str>) -> Vec<&'a DataRow> {
    match filter.map(str::trim).filter(|f| !f.is_empty()) {
        Some(keyword) => rows.iter().filter(|row| row.matches(keyword)).collect(),
        None => rows.iter().collect(),
    }
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let kept: String = text.chars().take(width.saturating_sub(1)).collect();
    format!("{}…", kept)
}
