//! Publish command implementation.

use crate::core::publisher::Publisher;
use crate::models::config::Settings;
use crate::Result;
use colored::Colorize;
use std::path::{Path, PathBuf};

/// Execute the publish command.
pub fn publish(
    settings: &Settings,
    export: Option<&Path>,
    output: Option<&Path>,
) -> Result<()> {
    println!("{}", "🎬 Publishing catalog export...".bold().cyan());
    println!();

    let mut settings = settings.clone();
    if let Some(export) = export {
        settings.catalog.export_path = export.to_path_buf();
    }

    let output_dir = match output {
        Some(o) => o.to_path_buf(),
        None => PathBuf::from("publish_output"),
    };

    println!(
        "  {} {}",
        "Export:".bold(),
        settings.catalog.export_path.display()
    );
    println!("  {} {}", "Output:".bold(), output_dir.display());
    println!(
        "  {} {}",
        "Servers:".bold(),
        settings
            .servers
            .servers
            .iter()
            .map(|s| s.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    );
    println!();

    let publisher = Publisher::new(&settings)?;
    let summary = publisher.run(&output_dir)?;

    println!();
    println!("{}", "📋 Publish Summary".bold().green());
    println!("  {} {}", "Movies:".bold(), summary.movies);
    println!("  {} {}", "Series:".bold(), summary.series);
    println!(
        "  {} {}",
        "Obsolete folders:".bold(),
        summary.obsolete_folders.len()
    );
    println!();

    for script in &summary.scripts {
        println!(
            "{} {}",
            "✅ Script written:".bold().green(),
            script.display()
        );
    }

    if !summary.unclassified.is_empty() {
        println!();
        println!("{}", "⚠️  Unclassified entries (skipped):".bold().yellow());
        for title in &summary.unclassified {
            println!("  {}", title.yellow());
        }
    }
    if !summary.failed.is_empty() {
        println!();
        println!("{}", "⚠️  Failed entries (skipped):".bold().yellow());
        for (title, reason) in &summary.failed {
            println!("  {} - {}", title.red(), reason);
        }
    }

    println!();
    println!("{}", "📝 Next Steps:".bold().yellow());
    println!("  Run each publish script on its server, e.g.:");
    if let Some(script) = summary.scripts.first() {
        println!("  {}", format!("sh {}", script.display()).cyan());
    }

    Ok(())
}
