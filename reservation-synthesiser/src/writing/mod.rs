use std::{
    fmt,
    io::{BufWriter, Write},
};

use anyhow::Result;
use itertools::Itertools;
use tracing::info;

use crate::orchestration::{RoomTypeResult, RunSummary};

/// Statistics over the realized stay lengths of a room type.
#[derive(Debug, PartialEq)]
pub struct StayLengthStats {
    pub min: u32,
    pub max: u32,
    pub average: f64,
    /// Pairs of (nights, number of stays), ordered by nights.
    pub distribution: Vec<(u32, usize)>,
}

impl StayLengthStats {
    pub fn from_stay_lengths(stay_lengths: &[u32]) -> Option<Self> {
        let (min, max) = stay_lengths.iter().copied().minmax().into_option()?;
        let average =
            stay_lengths.iter().map(|&n| n as f64).sum::<f64>() / stay_lengths.len() as f64;
        let distribution = stay_lengths
            .iter()
            .copied()
            .counts()
            .into_iter()
            .sorted()
            .collect();
        Some(Self {
            min,
            max,
            average,
            distribution,
        })
    }
}

impl fmt::Display for StayLengthStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let distribution = self
            .distribution
            .iter()
            .map(|(nights, count)| format!("{}n: {}", nights, count))
            .join(", ");
        write!(
            f,
            "{}-{} nights (avg: {:.1} nights), distribution: {}",
            self.min, self.max, self.average, distribution
        )
    }
}

fn log_room_type_result(result: &RoomTypeResult) {
    info!(
        room_type = %result.room_type_name,
        created = result.created,
        requested = result.requested,
        errors = result.errors.len(),
        "room type finished"
    );
    if let Some(stats) = StayLengthStats::from_stay_lengths(&result.stay_lengths) {
        info!(room_type = %result.room_type_name, stay_lengths = %stats, "stay lengths");
    }
}

/// Logs the totals of a run and a breakdown per room type.
pub fn log_run_summary(summary: &RunSummary) {
    info!(
        total_created = summary.total_created,
        total_errors = summary.total_errors,
        cancelled = summary.cancelled,
        "reservation run complete"
    );
    summary.results.iter().for_each(log_room_type_result);
}

/// Writes the summary as pretty printed JSON.
pub fn write_summary<W: Write>(writer: W, summary: &RunSummary) -> Result<()> {
    let mut buf_writer = BufWriter::new(writer);
    serde_json::to_writer_pretty(&mut buf_writer, summary)?;
    writeln!(buf_writer)?;
    buf_writer.flush()?;
    Ok(())
}
