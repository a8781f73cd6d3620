//! Check command implementation.
//!
//! Validates the configuration and the export file without writing
//! anything.

use crate::core::export::ExportNode;
use crate::core::storage::StorageMap;
use crate::models::config::Settings;
use crate::Result;
use colored::Colorize;

struct CheckResult {
    name: &'static str,
    passed: bool,
    message: String,
}

/// Execute the check command.
pub fn check(settings: &Settings) -> Result<()> {
    println!("{}", "Checking configuration...".bold());
    println!();

    let mut results = Vec::new();

    let server_count = settings.servers.servers.len();
    results.push(CheckResult {
        name: "servers configured",
        passed: server_count > 0,
        message: format!("{} server(s)", server_count),
    });

    match StorageMap::new(&settings.servers) {
        Ok(map) => {
            let letters: Vec<String> = (0..map.server_count())
                .map(|i| format!("{}={}", map.drive_letter(i), map.name(i)))
                .collect();
            results.push(CheckResult {
                name: "drive letter map",
                passed: true,
                message: letters.join(", "),
            });
        }
        Err(e) => {
            results.push(CheckResult {
                name: "drive letter map",
                passed: false,
                message: e.to_string(),
            });
        }
    }

    let export_path = &settings.catalog.export_path;
    if export_path.exists() {
        match std::fs::read_to_string(export_path) {
            Ok(xml) => match ExportNode::parse(&xml) {
                Ok(root) => {
                    let entries = root
                        .child("movies")
                        .map(|m| m.children_named("movie").count())
                        .unwrap_or(0);
                    results.push(CheckResult {
                        name: "export file",
                        passed: entries > 0,
                        message: format!("{} entries", entries),
                    });
                }
                Err(e) => results.push(CheckResult {
                    name: "export file",
                    passed: false,
                    message: e.to_string(),
                }),
            },
            Err(e) => results.push(CheckResult {
                name: "export file",
                passed: false,
                message: e.to_string(),
            }),
        }
    } else {
        results.push(CheckResult {
            name: "export file",
            passed: false,
            message: format!("not found: {}", export_path.display()),
        });
    }

    let mut all_passed = true;
    for result in &results {
        let mark = if result.passed {
            "✓".green()
        } else {
            "✗".red()
        };
        println!("  {} {} - {}", mark, result.name.bold(), result.message);
        all_passed &= result.passed;
    }
    println!();

    if !all_passed {
        return Err(crate::Error::InvalidConfig(
            "configuration check failed".to_string(),
        ));
    }
    println!("{}", "All checks passed.".bold().green());
    Ok(())
}
