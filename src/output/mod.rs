//
//  harbor-client
//  output/mod.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Output Module
//!
//! Renders Harbor entities for the `harbor` CLI in one of two formats:
//!
//! - **Table format**: Human-readable output for interactive terminal use
//! - **JSON format**: Machine-readable output for scripting (`--json`)
//!
//! ## Core Components
//!
//! - [`OutputFormat`]: The available output formats
//! - [`OutputWriter`]: Main entry point for writing formatted output
//! - [`TableOutput`]: Detail view of a single entity
//! - [`TableRow`]: One row of a list table
//!
//! ## Example
//!
//! ```rust,ignore
//! use harbor_client::output::{OutputFormat, OutputWriter};
//!
//! let writer = OutputWriter::new(OutputFormat::Json);
//! writer.write(&project)?;
//! writer.write_list(&users)?;
//! writer.write_success("Project created");
//! ```

mod entities;
mod table;

pub use table::*;

use serde::Serialize;

/// Available output formats.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum OutputFormat {
    /// Tables and field lists (default).
    #[default]
    Table,

    /// Pretty-printed JSON.
    Json,
}

/// Writes values and status messages in the selected format.
///
/// Colour is enabled when the terminal supports it (see
/// [`console::colors_enabled`]).
pub struct OutputWriter {
    format: OutputFormat,
    color: bool,
}

impl OutputWriter {
    pub fn new(format: OutputFormat) -> Self {
        Self {
            format,
            color: console::colors_enabled(),
        }
    }

    /// Picks JSON when `json` is set, tables otherwise.
    pub fn from_flag(json: bool) -> Self {
        Self::new(if json {
            OutputFormat::Json
        } else {
            OutputFormat::Table
        })
    }

    /// Writes a single value.
    pub fn write<T: Serialize + TableOutput + ?Sized>(&self, value: &T) -> anyhow::Result<()> {
        match self.format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(value)?);
            }
            OutputFormat::Table => {
                value.print_table(self.color);
            }
        }
        Ok(())
    }

    /// Writes a list as one table, or a JSON array.
    pub fn write_list<T: Serialize + TableRow>(&self, values: &[T]) -> anyhow::Result<()> {
        match self.format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(values)?);
            }
            OutputFormat::Table if values.is_empty() => {
                self.write_info("No results.");
            }
            OutputFormat::Table => {
                TableBuilder::new()
                    .color(self.color)
                    .headers(T::headers().iter().copied())
                    .rows(values.iter().map(|value| value.row(self.color)))
                    .print();
            }
        }
        Ok(())
    }

    pub fn write_warning(&self, msg: &str) {
        use console::style;
        if self.color {
            eprintln!("{} {}", style("warning:").yellow().bold(), msg);
        } else {
            eprintln!("warning: {}", msg);
        }
    }

    pub fn write_info(&self, msg: &str) {
        println!("{}", msg);
    }

    /// Prints a success message. Suppressed in JSON mode so the output
    /// stays parseable.
    pub fn write_success(&self, msg: &str) {
        use console::style;
        match (self.format, self.color) {
            (OutputFormat::Json, _) => {}
            (_, true) => println!("{} {}", style("✓").green().bold(), msg),
            (_, false) => println!("✓ {}", msg),
        }
    }
}

/// Detail view of a single entity.
pub trait TableOutput {
    fn print_table(&self, color: bool);
}

/// One row in a list table.
pub trait TableRow {
    /// Column headers, in the order [`row`](Self::row) yields cells.
    fn headers() -> &'static [&'static str];

    fn row(&self, color: bool) -> Vec<String>;
}

/// Prints a bold header underlined to its width.
pub fn print_header(text: &str) {
    use console::style;
    println!("{}", style(text).bold());
    println!("{}", "-".repeat(text.chars().count()));
}

/// Prints a `key: value` line with a dimmed key.
pub fn print_field(key: &str, value: &str, color: bool) {
    use console::style;
    if color {
        println!("{}: {}", style(key).dim(), value);
    } else {
        println!("{}: {}", key, value);
    }
}

fn or_dash(value: Option<&str>) -> String {
    match value {
        Some(v) if !v.is_empty() => v.to_string(),
        _ => "-".to_string(),
    }
}
