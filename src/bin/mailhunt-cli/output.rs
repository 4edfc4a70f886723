#[cfg(any(feature = "with-serde", feature = "with-csv"))]
use anyhow::Context;
use anyhow::{Result, bail};

use mailhunt_lib::{
    Candidate, Classification, DomainReport, MailExchanger, ValidationRecord, ValidationRun,
};

use crate::args::Cli;

pub fn write_candidates(candidates: &[Candidate], cli: &Cli) -> Result<()> {
    match cli.format.as_str() {
        "human" => {
            for candidate in candidates {
                println!("{:<40} {}", candidate.address(), candidate.pattern());
            }
            Ok(())
        }
        "json" => write_json(&candidates, cli),
        "ndjson" => write_ndjson(candidates, cli),
        "csv" => write_csv(candidates, cli),
        other => bail!("unknown --format '{other}', use: human|json|ndjson|csv"),
    }
}

pub fn write_exchangers(domain: &str, exchangers: &[MailExchanger], cli: &Cli) -> Result<()> {
    match cli.format.as_str() {
        "human" => {
            println!("{domain}");
            for exchanger in exchangers {
                println!("        mx: {exchanger}");
            }
            Ok(())
        }
        "json" => write_json(&exchangers, cli),
        "ndjson" => write_ndjson(exchangers, cli),
        "csv" => write_csv(exchangers, cli),
        other => bail!("unknown --format '{other}', use: human|json|ndjson|csv"),
    }
}

pub fn write_run(run: &ValidationRun, cli: &Cli) -> Result<()> {
    match cli.format.as_str() {
        "human" => {
            for report in &run.reports {
                write_human_report(report);
            }
            println!("summary: {}", run.summary);
            if run.cancelled {
                println!("(run cancelled before completion)");
            }
            Ok(())
        }
        "json" => write_json(run, cli),
        "ndjson" => write_ndjson(&run.records().cloned().collect::<Vec<_>>(), cli),
        "csv" => write_csv(&run.records().cloned().collect::<Vec<_>>(), cli),
        other => bail!("unknown --format '{other}', use: human|json|ndjson|csv"),
    }
}

fn write_human_report(report: &DomainReport) {
    if report.domain.is_empty() {
        println!("== <malformed input> ==");
    } else {
        println!("== {} ==", report.domain);
    }
    if let Some(failure) = &report.failure {
        println!("        failure: {failure}");
    }
    if !report.exchangers.is_empty() {
        let list = report
            .exchangers
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        println!("        mx: {list}");
    }
    if let Some(catch_all) = &report.catch_all {
        let detail = catch_all
            .result
            .as_ref()
            .map(|result| result.diagnostic())
            .unwrap_or_default();
        println!(
            "        catch-all: {} ({} :: {detail})",
            catch_all.verdict, catch_all.probe_address
        );
    }
    if let Some(check) = &report.default_check {
        println!(
            "        default: {} -> {} ({})",
            check.address,
            check.result.outcome,
            check.result.diagnostic()
        );
    }
    for record in &report.records {
        write_human_record(record);
    }
}

fn write_human_record(record: &ValidationRecord) {
    let tag = match record.classification {
        Classification::Valid => "[VALID]    ",
        Classification::Invalid => "[INVALID]  ",
        Classification::CatchAllSuppressed => "[CATCH-ALL]",
        Classification::Error => "[ERROR]    ",
    };
    match &record.pattern {
        Some(pattern) => println!("{tag} {} ({pattern}) :: {}", record.address, record.diagnostic),
        None => println!("{tag} {} :: {}", record.address, record.diagnostic),
    }
    for event in &record.transcript {
        println!("            {event}");
    }
}

#[cfg(feature = "with-serde")]
fn write_json<T: serde::Serialize + ?Sized>(value: &T, cli: &Cli) -> Result<()> {
    let s = serde_json::to_string_pretty(value)?;
    if let Some(path) = &cli.out {
        write_all_atomically(path, s.as_bytes())?;
    } else {
        println!("{s}");
    }
    Ok(())
}

#[cfg(not(feature = "with-serde"))]
fn write_json<T: ?Sized>(_: &T, _: &Cli) -> Result<()> {
    bail!("format=json nécessite la feature 'with-serde'")
}

#[cfg(feature = "with-serde")]
fn write_ndjson<T: serde::Serialize>(rows: &[T], cli: &Cli) -> Result<()> {
    if let Some(path) = &cli.out {
        let mut buf = Vec::new();
        for row in rows {
            let line = serde_json::to_string(row)?;
            buf.extend_from_slice(line.as_bytes());
            buf.push(b'\n');
        }
        write_all_atomically(path, &buf)?;
    } else {
        for row in rows {
            println!("{}", serde_json::to_string(row)?);
        }
    }
    Ok(())
}

#[cfg(not(feature = "with-serde"))]
fn write_ndjson<T>(_: &[T], _: &Cli) -> Result<()> {
    bail!("format=ndjson nécessite la feature 'with-serde'")
}

/// Stable, flat columns for CSV output.
#[cfg(feature = "with-csv")]
pub trait CsvRow {
    const HEADER: &'static [&'static str];
    fn fields(&self) -> Vec<String>;
}

#[cfg(feature = "with-csv")]
impl CsvRow for Candidate {
    const HEADER: &'static [&'static str] = &["address", "local_part", "domain", "pattern"];

    fn fields(&self) -> Vec<String> {
        vec![
            self.address().to_string(),
            self.local_part().to_string(),
            self.domain().to_string(),
            self.pattern().label(),
        ]
    }
}

#[cfg(feature = "with-csv")]
impl CsvRow for MailExchanger {
    const HEADER: &'static [&'static str] = &["preference", "exchange"];

    fn fields(&self) -> Vec<String> {
        vec![self.preference.to_string(), self.exchange.clone()]
    }
}

#[cfg(feature = "with-csv")]
impl CsvRow for ValidationRecord {
    const HEADER: &'static [&'static str] = &[
        "domain",
        "address",
        "pattern",
        "classification",
        "outcome",
        "exchange",
        "diagnostic",
    ];

    fn fields(&self) -> Vec<String> {
        vec![
            self.domain.clone(),
            self.address.clone(),
            self.pattern.clone().unwrap_or_default(),
            self.classification.as_str().to_string(),
            self.outcome
                .map(|outcome| outcome.to_string())
                .unwrap_or_default(),
            self.exchange.clone().unwrap_or_default(),
            self.diagnostic.clone(),
        ]
    }
}

#[cfg(feature = "with-csv")]
fn write_csv<T: CsvRow>(rows: &[T], cli: &Cli) -> Result<()> {
    if let Some(path) = &cli.out {
        let mut wtr = csv::Writer::from_writer(Vec::new());
        wtr.write_record(T::HEADER)?;
        for row in rows {
            wtr.write_record(row.fields())?;
        }
        let data = wtr.into_inner()?;
        write_all_atomically(path, &data)?;
    } else {
        let mut wtr = csv::Writer::from_writer(std::io::stdout());
        wtr.write_record(T::HEADER)?;
        for row in rows {
            wtr.write_record(row.fields())?;
        }
        wtr.flush()?;
    }
    Ok(())
}

#[cfg(not(feature = "with-csv"))]
fn write_csv<T>(_: &[T], _: &Cli) -> Result<()> {
    bail!("format=csv nécessite la feature 'with-csv'")
}

#[cfg(any(feature = "with-serde", feature = "with-csv"))]
fn write_all_atomically(path: &str, bytes: &[u8]) -> Result<()> {
    use std::io::Write;

    let tmp = format!("{path}.tmp");
    {
        let mut f = std::fs::File::create(&tmp)?;
        f.write_all(bytes)?;
        f.sync_all()?;
    }
    std::fs::rename(&tmp, path).with_context(|| format!("rename {tmp} -> {path}"))?;
    Ok(())
}

#[cfg(all(test, feature = "with-csv"))]
mod tests {
    use super::*;
    use mailhunt_lib::{Density, generate};

    #[test]
    fn candidate_rows_match_header() {
        let candidates = generate("Jane", "Roe", "example.com", Density::Light).unwrap();
        let fields = candidates[0].fields();
        assert_eq!(fields.len(), Candidate::HEADER.len());
        assert_eq!(fields[0], "jane.roe@example.com");
        assert_eq!(fields[3], "first.last");
    }
}
