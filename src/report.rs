use std::fmt;
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::info;

use crate::model::entity::Ticket;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Report {
    pub tickets: usize,
    pub unit_cost: f64,
    pub total_cost: f64,
}

impl Report {
    pub fn new(tickets: usize, unit_cost: f64) -> Report {
        Report { tickets, unit_cost, total_cost: tickets as f64 * unit_cost }
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tickets: {}\ntotal cost: R${:.2}", self.tickets, self.total_cost)
    }
}

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("cannot create {path}: {source}")]
    Create {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("cannot write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

/// One `;`-separated row per ticket, elements ascending.
pub fn write_tickets_to<W: io::Write>(writer: W, tickets: &[Ticket]) -> Result<(), csv::Error> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(b';')
        .has_headers(false)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(writer);
    for ticket in tickets {
        writer.write_record(ticket.elements().iter().map(|element| element.to_string()))?;
    }
    writer.flush()?;
    Ok(())
}

pub fn write_tickets(path: &Path, tickets: &[Ticket]) -> Result<(), ReportError> {
    let file = File::create(path).map_err(|source| ReportError::Create { path: path.to_path_buf(), source })?;
    write_tickets_to(file, tickets).map_err(|source| ReportError::Write { path: path.to_path_buf(), source })?;
    info!(path = %path.display(), tickets = tickets.len(), "saved tickets");
    Ok(())
}
