//! gridcalc CLI - evaluate sheets and rewrite formulas

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use gridcalc::prelude::*;
use gridcalc::{translate_formula, DEFAULT_COLS, DEFAULT_ROWS};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "gridcalc")]
#[command(author, version, about = "Spreadsheet formula evaluation tool")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate a JSON sheet file and print every cell's value
    Eval {
        /// Input sheet file (JSON)
        input: PathBuf,

        /// Pretty-print the output
        #[arg(short, long)]
        pretty: bool,

        /// Read references outside the sheet as empty instead of #REF!
        #[arg(long)]
        no_bounds: bool,
    },

    /// Rewrite a formula as if copied from one cell to another
    Translate {
        /// Formula text, e.g. "=A1+$B$2"
        formula: String,

        /// Cell the formula is copied from
        #[arg(long)]
        from: String,

        /// Cell the formula is pasted into
        #[arg(long)]
        to: String,
    },
}

/// On-disk sheet format
///
/// ```json
/// { "name": "Budget", "cells": { "A1": 10, "A2": "=A1*2", "B1": "label" } }
/// ```
///
/// Strings starting with `=` are formulas.
#[derive(Debug, Deserialize)]
struct SheetFile {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    rows: Option<u32>,
    #[serde(default)]
    cols: Option<u32>,
    #[serde(default)]
    cells: BTreeMap<String, CellValue>,
}

impl SheetFile {
    fn into_sheet(self) -> Result<Sheet> {
        let name = self.name.unwrap_or_else(|| "Sheet1".to_string());
        let mut sheet = Sheet::with_extent(
            self.id.unwrap_or_else(|| name.clone()),
            name,
            self.rows.unwrap_or(DEFAULT_ROWS),
            self.cols.unwrap_or(DEFAULT_COLS),
        );

        let mut edits = Vec::with_capacity(self.cells.len());
        for (a1, value) in self.cells {
            let address =
                CellAddress::parse(&a1).with_context(|| format!("Invalid cell address '{}'", a1))?;
            let action = match value {
                CellValue::Empty => EditAction::Clear,
                CellValue::String(s) if s.starts_with('=') => EditAction::SetFormula(s),
                other => EditAction::SetValue(other),
            };
            edits.push(Edit::new(address, action));
        }

        apply_edits(&mut sheet, edits).context("Sheet file has cells outside its extent")?;
        Ok(sheet)
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Eval {
            input,
            pretty,
            no_bounds,
        } => eval_sheet(&input, pretty, !no_bounds),
        Commands::Translate { formula, from, to } => translate(&formula, &from, &to),
    }
}

fn load_sheet(input: &Path) -> Result<Sheet> {
    let text = std::fs::read_to_string(input)
        .with_context(|| format!("Failed to read '{}'", input.display()))?;
    let file: SheetFile = serde_json::from_str(&text)
        .with_context(|| format!("Failed to parse '{}'", input.display()))?;
    file.into_sheet()
}

/// Every stored cell rendered the way the API layer reports it: the value,
/// or an error token such as `"#DIV0!"`
fn render(
    sheet: &Sheet,
    calculation: &Calculation,
) -> Result<serde_json::Map<String, serde_json::Value>> {
    let evaluator = Evaluator::new();
    let mut addrs: Vec<_> = sheet.iter().map(|(addr, _)| addr).collect();
    addrs.sort_unstable();

    let mut out = serde_json::Map::new();
    for addr in addrs {
        let result = match calculation.get(addr) {
            Some(result) => result.clone(),
            None => evaluator.evaluate_cell(sheet, addr),
        };
        let value = match result {
            EvalResult::Value(value) => serde_json::to_value(value)?,
            EvalResult::Error { code, .. } => serde_json::Value::String(code.token()),
        };
        out.insert(addr.to_a1_string(), value);
    }
    Ok(out)
}

fn eval_sheet(input: &Path, pretty: bool, enforce_bounds: bool) -> Result<()> {
    let sheet = load_sheet(input)?;
    let calculation = sheet.calculate_with_options(&CalculationOptions { enforce_bounds });

    let rendered = serde_json::Value::Object(render(&sheet, &calculation)?);
    let text = if pretty {
        serde_json::to_string_pretty(&rendered)?
    } else {
        serde_json::to_string(&rendered)?
    };

    let mut stdout = io::stdout().lock();
    writeln!(stdout, "{}", text).context("Failed to write to stdout")?;

    let stats = &calculation.stats;
    eprintln!(
        "Calculated {} formulas ({} errors, {} circular, {} unparseable)",
        stats.cells_calculated, stats.errors, stats.circular_references, stats.parse_errors
    );

    Ok(())
}

fn translate(formula: &str, from: &str, to: &str) -> Result<()> {
    let from = CellAddress::parse(from).with_context(|| format!("Invalid --from '{}'", from))?;
    let to = CellAddress::parse(to).with_context(|| format!("Invalid --to '{}'", to))?;

    if formula.trim().is_empty() {
        bail!("Formula is empty");
    }

    println!("{}", translate_formula(formula, from, to));
    Ok(())
}
