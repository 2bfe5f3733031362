// src/cli/handlers/commons.rs

// Shared pieces for the CLI handlers: override parsing and the aligned,
// color-aware table printer used by listings and menus.

use crate::models::ShadowOverrides;
use anyhow::{Result, anyhow};
use colored::{Color, Colorize};

pub type Row = Vec<(String, Option<Color>)>;

/// Builds the shadow-override maps from repeated `-D`/`-E` arguments.
pub fn parse_overrides(define: &[String], environ: &[String]) -> Result<ShadowOverrides> {
    let mut shadow = ShadowOverrides::default();
    for (flag, items, target) in [
        ("-D", define, &mut shadow.input),
        ("-E", environ, &mut shadow.environ),
    ] {
        for item in items {
            let (key, value) = item
                .split_once('=')
                .ok_or_else(|| anyhow!("invalid {flag} value '{item}', expected NAME=VALUE"))?;
            target.insert(key.trim().to_string(), value.trim().to_string());
        }
    }
    Ok(shadow)
}

/// Prints rows as aligned columns, one space of left padding and two of
/// separation, coloring each cell independently.
pub fn tabulify(rows: &[Row]) {
    let mut widths: Vec<usize> = Vec::new();
    for row in rows {
        for (index, (text, _)) in row.iter().enumerate() {
            if widths.len() <= index {
                widths.push(0);
            }
            widths[index] = widths[index].max(text.chars().count());
        }
    }
    for row in rows {
        for (index, (text, color)) in row.iter().enumerate() {
            let width = widths.get(index).copied().unwrap_or(0);
            let padded = format!(" {text:<width$} ");
            match color {
                Some(color) => print!("{}", padded.color(*color)),
                None => print!("{padded}"),
            }
        }
        println!();
    }
}
