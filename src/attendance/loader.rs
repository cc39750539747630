//! Reading badge exports from disk.

use std::path::Path;

use tracing::info;

use super::cell::Cell;
use crate::error::Result;

/// Non-empty lines inspected when guessing the delimiter.
const SAMPLE_LINES: usize = 10;

/// Pick the delimiter present on the most sample lines, then by total count.
///
/// Report exports open with a title row that usually has no delimiter at
/// all, so the first line alone is not enough.
fn detect_delimiter(content: &str) -> u8 {
    let sample: Vec<&str> = content
        .lines()
        .filter(|line| !line.trim().is_empty())
        .take(SAMPLE_LINES)
        .collect();
    let score = |d: u8| {
        let counts = sample.iter().map(|line| line.bytes().filter(|&b| b == d).count());
        let lines = counts.clone().filter(|&n| n > 0).count();
        (lines, counts.sum::<usize>())
    };
    [b';', b'\t', b',']
        .into_iter()
        .map(|d| (d, score(d)))
        .filter(|&(_, (lines, _))| lines > 0)
        .max_by_key(|&(_, score)| score)
        .map_or(b',', |(d, _)| d)
}

/// Parse CSV text into a cell grid. Rows may have different lengths.
pub fn parse_csv(content: &str) -> Result<Vec<Vec<Cell>>> {
    let content = content.trim_start_matches('\u{feff}');
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(detect_delimiter(content))
        .from_reader(content.as_bytes());

    let mut grid = Vec::new();
    for record in reader.records() {
        let record = record?;
        grid.push(record.iter().map(Cell::from).collect());
    }
    Ok(grid)
}

/// Load a CSV badge export into a cell grid.
pub fn load_csv(path: &Path) -> Result<Vec<Vec<Cell>>> {
    let content = std::fs::read_to_string(path)?;
    let grid = parse_csv(&content)?;
    info!("Loaded {} rows from {:?}", grid.len(), path);
    Ok(grid)
}
