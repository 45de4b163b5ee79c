use std::{fmt, fs, path::Path};

use color_eyre::{Result, eyre::WrapErr};
use log::warn;

/// One entry of the input list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    /// Drives the prompt and the output file name.
    pub name: String,
    /// Display only.
    pub label: Option<String>,
}

impl Item {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            label: None,
        }
    }

    /// `<name>.png`, with path separators replaced so the file stays inside
    /// the output directory.
    pub fn file_name(&self) -> String {
        format!("{}.png", self.name.replace(['/', '\\'], "_"))
    }
}

impl fmt::Display for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.label {
            Some(label) => write!(f, "{} ({label})", self.name),
            None => f.write_str(&self.name),
        }
    }
}

pub fn load_items(path: &Path) -> Result<Vec<Item>> {
    let src = fs::read_to_string(path)
        .wrap_err_with(|| format!("Couldn't read input file {}", path.display()))?;
    Ok(parse_items(&src))
}

/// One item per non-blank line, in input order. A line is `name`, or
/// `name,label` with either an ASCII or a full-width comma.
pub fn parse_items(src: &str) -> Vec<Item> {
    src.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter_map(parse_line)
        .collect()
}

fn parse_line(line: &str) -> Option<Item> {
    let mut segments = line.split([',', '，']).map(str::trim);
    let name = segments.next().unwrap_or_default();
    if name.is_empty() {
        warn!("Skipping line without a name: {line:?}");
        return None;
    }

    let label = segments
        .next()
        .filter(|label| !label.is_empty())
        .map(String::from);

    Some(Item {
        name: name.into(),
        label,
    })
}
