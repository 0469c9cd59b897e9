//! Past draws, one per line, numbers separated by `;`.

use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{info, warn};

use crate::frequency::Observed;

const BOM: char = '\u{feff}';

#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("cannot open history file {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("cannot read history: {0}")]
    Csv(#[from] csv::Error),
    #[error("history line {line}: {field:?} is not an integer")]
    NotAnInteger { line: u64, field: String },
}

/// Reads the history file, or `None` when it does not exist.
pub fn load_history(path: &Path) -> Result<Option<Vec<Vec<Observed>>>, HistoryError> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            warn!(path = %path.display(), "history file not found, ranking elements in ascending order");
            return Ok(None);
        }
        Err(source) => {
            return Err(HistoryError::Open { path: path.to_path_buf(), source });
        }
    };
    let draws = read_history(file)?;
    info!(path = %path.display(), draws = draws.len(), "loaded history");
    Ok(Some(draws))
}

pub fn read_history<R: Read>(reader: R) -> Result<Vec<Vec<Observed>>, HistoryError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b';')
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);
    let mut draws = Vec::new();
    for record in reader.records() {
        let record = record?;
        let line = record.position().map_or(0, |position| position.line());
        let mut draw = Vec::with_capacity(record.len());
        for field in record.iter() {
            let field = field.trim_start_matches(BOM).trim();
            if field.is_empty() {
                continue;
            }
            let value = field.parse::<Observed>().map_err(|_| HistoryError::NotAnInteger {
                line,
                field: field.to_string(),
            })?;
            draw.push(value);
        }
        if !draw.is_empty() {
            draws.push(draw);
        }
    }
    Ok(draws)
}
