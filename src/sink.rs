use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use rust_xlsxwriter::{Workbook, Worksheet};

#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    Integer(i64),
    Number(f64),
    Blank,
}

impl Cell {
    pub fn is_blank(&self) -> bool {
        matches!(self, Cell::Blank)
    }
}

/// Human-facing destination of the projection: a rectangular block anchored at a
/// cell, plus single-cell writes.
pub trait Sink {
    fn write_block(&mut self, anchor: &str, rows: &[Vec<Cell>]) -> Result<()>;
    fn write_cell(&mut self, cell: &str, value: &Cell) -> Result<()>;
}

/// Parses an A1-style reference into zero-based (row, col). A range such as
/// `A4:P` resolves to its top-left cell.
pub fn parse_a1(reference: &str) -> Result<(u32, u16)> {
    let start = reference.split(':').next().unwrap_or_default().trim();
    let letters = start
        .chars()
        .take_while(|c| c.is_ascii_alphabetic())
        .collect::<String>();
    let digits = &start[letters.len()..];
    if letters.is_empty() || letters.len() > 3 || digits.is_empty() {
        return Err(anyhow!("invalid cell reference {reference:?}"));
    }

    let mut col: u32 = 0;
    for ch in letters.chars() {
        col = col * 26 + (ch.to_ascii_uppercase() as u32 - 'A' as u32 + 1);
    }
    let row = digits
        .parse::<u32>()
        .with_context(|| format!("invalid row in {reference:?}"))?;
    if row == 0 {
        return Err(anyhow!("rows start at 1 in {reference:?}"));
    }
    let col = u16::try_from(col - 1).with_context(|| format!("column out of range in {reference:?}"))?;
    Ok((row - 1, col))
}

/// Writes the projection into a single-sheet workbook saved on `finish`.
pub struct XlsxSink {
    path: PathBuf,
    worksheet: Worksheet,
}

impl XlsxSink {
    pub fn new(path: &Path, sheet_name: &str) -> Result<Self> {
        let mut worksheet = Worksheet::new();
        worksheet
            .set_name(sheet_name)
            .with_context(|| format!("invalid sheet name {sheet_name:?}"))?;
        Ok(Self {
            path: path.to_path_buf(),
            worksheet,
        })
    }

    pub fn finish(self) -> Result<PathBuf> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).ok();
        }
        let mut workbook = Workbook::new();
        workbook.push_worksheet(self.worksheet);
        workbook
            .save(&self.path)
            .with_context(|| format!("save workbook {}", self.path.display()))?;
        Ok(self.path)
    }

    fn put(&mut self, row: u32, col: u16, value: &Cell) -> Result<()> {
        match value {
            Cell::Text(s) => {
                self.worksheet.write_string(row, col, s)?;
            }
            Cell::Integer(n) => {
                self.worksheet.write_number(row, col, *n as f64)?;
            }
            Cell::Number(n) => {
                self.worksheet.write_number(row, col, *n)?;
            }
            // The workbook is rebuilt every run, so there is nothing stale to clear.
            Cell::Blank => {}
        }
        Ok(())
    }
}

impl Sink for XlsxSink {
    fn write_block(&mut self, anchor: &str, rows: &[Vec<Cell>]) -> Result<()> {
        let (top, left) = parse_a1(anchor)?;
        for (row_idx, row) in rows.iter().enumerate() {
            for (col_idx, value) in row.iter().enumerate() {
                let r = top + row_idx as u32;
                let c = left + col_idx as u16;
                self.put(r, c, value)
                    .with_context(|| format!("write cell ({r},{c})"))?;
            }
        }
        Ok(())
    }

    fn write_cell(&mut self, cell: &str, value: &Cell) -> Result<()> {
        let (row, col) = parse_a1(cell)?;
        self.put(row, col, value)
            .with_context(|| format!("write cell {cell}"))
    }
}
