//! Tabular export of the daily time series.
//!
//! The schema is fixed because the plotting collaborator consumes it:
//! a `Day,Susceptible,Infected,Recovered,Vaccined` header followed by one
//! integer row per recorded day, starting at day 0.

use crate::stats::{StatsSnapshot, TimeSeries};
use anyhow::{Context, Result, bail};
use std::path::Path;

const HEADER: [&str; 5] = ["Day", "Susceptible", "Infected", "Recovered", "Vaccined"];

/// Write the time series to a CSV file, created or truncated at `file`.
pub fn write_series<P: AsRef<Path>>(series: &TimeSeries, file: P) -> Result<()> {
    let file = file.as_ref();
    let mut writer =
        csv::Writer::from_path(file).with_context(|| format!("failed to create {file:?}"))?;

    writer.write_record(HEADER).context("failed to write header")?;
    for snapshot in series.snapshots() {
        writer
            .write_record(&[
                snapshot.day.to_string(),
                snapshot.susceptible.to_string(),
                snapshot.infected.to_string(),
                snapshot.recovered.to_string(),
                snapshot.vaccinated.to_string(),
            ])
            .context("failed to write row")?;
    }

    writer.flush().context("failed to flush writer stream")?;

    Ok(())
}

/// Read a previously exported time series back from a CSV file.
pub fn read_series<P: AsRef<Path>>(file: P) -> Result<TimeSeries> {
    let file = file.as_ref();
    let mut reader =
        csv::Reader::from_path(file).with_context(|| format!("failed to open {file:?}"))?;

    let headers = reader.headers().context("failed to read header")?;
    if *headers != *HEADER.as_slice() {
        bail!("unexpected header: {headers:?}");
    }

    let mut series = TimeSeries::new();
    for (i_row, record) in reader.records().enumerate() {
        // The reader rejects rows whose length differs from the header's,
        // so indexing the five columns cannot go out of bounds.
        let record = record.with_context(|| format!("failed to read row {i_row}"))?;
        let snapshot = StatsSnapshot {
            day: parse(&record[0]).with_context(|| format!("invalid row {i_row}"))?,
            susceptible: parse(&record[1]).with_context(|| format!("invalid row {i_row}"))?,
            infected: parse(&record[2]).with_context(|| format!("invalid row {i_row}"))?,
            recovered: parse(&record[3]).with_context(|| format!("invalid row {i_row}"))?,
            vaccinated: parse(&record[4]).with_context(|| format!("invalid row {i_row}"))?,
        };
        series.push(snapshot);
    }

    Ok(series)
}

fn parse<T: std::str::FromStr>(field: &str) -> Result<T>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    field
        .parse()
        .with_context(|| format!("failed to parse {field:?}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn sample_series() -> TimeSeries {
        let mut series = TimeSeries::new();
        for (day, (s, i, r, v)) in [(200, 0, 0, 0), (180, 15, 5, 5), (160, 30, 10, 4)]
            .into_iter()
            .enumerate()
        {
            series.push(StatsSnapshot {
                day: day as u32,
                susceptible: s,
                infected: i,
                recovered: r,
                vaccinated: v,
            });
        }
        series
    }

    #[test]
    fn round_trip_preserves_counts() {
        let dir = tempfile::tempdir().expect("failed to create temp dir");
        let file = dir.path().join("total-counts.csv");

        let series = sample_series();
        write_series(&series, &file).expect("export should succeed");
        let reread = read_series(&file).expect("import should succeed");

        assert_eq!(series, reread);
    }

    #[test]
    fn header_matches_plotting_schema() {
        let dir = tempfile::tempdir().expect("failed to create temp dir");
        let file = dir.path().join("total-counts.csv");

        write_series(&sample_series(), &file).expect("export should succeed");

        let contents = fs::read_to_string(&file).expect("file should exist");
        let mut lines = contents.lines();
        assert_eq!(lines.next(), Some("Day,Susceptible,Infected,Recovered,Vaccined"));
        assert_eq!(lines.next(), Some("0,200,0,0,0"));
        assert_eq!(lines.count(), 2);
    }

    #[test]
    fn rejects_foreign_header() {
        let dir = tempfile::tempdir().expect("failed to create temp dir");
        let file = dir.path().join("other.csv");
        fs::write(&file, "A,B,C\n1,2,3\n").expect("failed to write file");

        assert!(read_series(&file).is_err());
    }
}
