//! CSV export of episode statistics and step trajectories.
//!
//! Episode files have one row per episode:
//! `episode_id,steps,seed,captured_all,cooperation_rate,intention_accuracy`,
//! with empty cells for absent optional values. Step files have one row
//! per tick; their columns depend on the number of hunters and prey.

use std::io;
use std::path::Path;
use std::str::FromStr;

use crate::episode::{EpisodeRecord, StepLog};
use crate::error::{HunterError, Result};

const EPISODE_HEADER: [&str; 6] = [
    "episode_id",
    "steps",
    "seed",
    "captured_all",
    "cooperation_rate",
    "intention_accuracy",
];

fn opt<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

/// Writes episode records as CSV.
pub fn write_records<W: io::Write>(writer: W, records: &[EpisodeRecord]) -> Result<()> {
    let mut csv = csv::Writer::from_writer(writer);
    csv.write_record(EPISODE_HEADER)?;
    for r in records {
        csv.write_record([
            r.episode_id.to_string(),
            r.steps.to_string(),
            opt(r.seed),
            r.captured_all.to_string(),
            opt(r.cooperation_rate),
            opt(r.intention_accuracy),
        ])?;
    }
    csv.flush()
        .map_err(|e| HunterError::io("flush episode CSV", e))?;
    Ok(())
}

pub fn write_records_to_path(path: impl AsRef<Path>, records: &[EpisodeRecord]) -> Result<()> {
    let path = path.as_ref();
    let file = std::fs::File::create(path)
        .map_err(|e| HunterError::io(format!("create {}", path.display()), e))?;
    write_records(io::BufWriter::new(file), records)
}

fn malformed(line: u64, column: usize, value: &str) -> HunterError {
    HunterError::MalformedRecord {
        line,
        reason: format!("invalid {} {value:?}", EPISODE_HEADER[column]),
    }
}

fn parse_required<T: FromStr>(row: &csv::StringRecord, column: usize, line: u64) -> Result<T> {
    let value = row.get(column).unwrap_or("").trim();
    value.parse().map_err(|_| malformed(line, column, value))
}

fn parse_optional<T: FromStr>(
    row: &csv::StringRecord,
    column: usize,
    line: u64,
) -> Result<Option<T>> {
    match row.get(column).unwrap_or("").trim() {
        "" => Ok(None),
        value => value
            .parse()
            .map(Some)
            .map_err(|_| malformed(line, column, value)),
    }
}

/// Reads episode records written by [`write_records`].
pub fn read_records<R: io::Read>(reader: R) -> Result<Vec<EpisodeRecord>> {
    let mut csv = csv::Reader::from_reader(reader);
    let mut records = Vec::new();
    for row in csv.records() {
        let row = row?;
        let line = row.position().map(|p| p.line()).unwrap_or(0);
        records.push(EpisodeRecord {
            episode_id: parse_required(&row, 0, line)?,
            steps: parse_required(&row, 1, line)?,
            seed: parse_optional(&row, 2, line)?,
            captured_all: parse_required(&row, 3, line)?,
            cooperation_rate: parse_optional(&row, 4, line)?,
            intention_accuracy: parse_optional(&row, 5, line)?,
        });
    }
    Ok(records)
}

pub fn read_records_from_path(path: impl AsRef<Path>) -> Result<Vec<EpisodeRecord>> {
    let path = path.as_ref();
    let file = std::fs::File::open(path)
        .map_err(|e| HunterError::io(format!("open {}", path.display()), e))?;
    read_records(io::BufReader::new(file))
}

/// Header for step logs with `hunters` hunters and `prey` prey.
pub fn step_header(hunters: usize, prey: usize) -> Vec<String> {
    let mut header = vec!["episode_id".to_string(), "step".to_string()];
    for h in 0..hunters {
        header.push(format!("hunter{h}_x"));
        header.push(format!("hunter{h}_y"));
    }
    for p in 0..prey {
        header.push(format!("prey{p}_x"));
        header.push(format!("prey{p}_y"));
        header.push(format!("prey{p}_captured"));
    }
    for h in 0..hunters {
        header.push(format!("hunter{h}_action"));
        header.push(format!("hunter{h}_target"));
        header.push(format!("hunter{h}_estimated_target"));
        for p in 0..prey {
            header.push(format!("hunter{h}_prey{p}_manhattan"));
            header.push(format!("hunter{h}_prey{p}_euclidean"));
        }
    }
    header
}

fn step_row(log: &StepLog) -> Vec<String> {
    let mut row = vec![log.episode_id.to_string(), log.step.to_string()];
    for h in &log.hunters {
        row.push(h.x.to_string());
        row.push(h.y.to_string());
    }
    for (p, captured) in log.prey.iter().zip(&log.captured) {
        row.push(p.x.to_string());
        row.push(p.y.to_string());
        row.push(captured.to_string());
    }
    for h in 0..log.hunters.len() {
        row.push(log.actions.get(h).map(|a| a.name().to_string()).unwrap_or_default());
        row.push(opt(log.targets.get(h).copied().flatten()));
        row.push(opt(log.estimated_targets.get(h).copied().flatten()));
        for p in 0..log.prey.len() {
            row.push(opt(log.manhattan.get(h).and_then(|d| d.get(p))));
            row.push(
                log.euclidean
                    .get(h)
                    .and_then(|d| d.get(p))
                    .map(|d| format!("{d:.4}"))
                    .unwrap_or_default(),
            );
        }
    }
    row
}

/// Writes step logs as CSV. The layout is taken from the first row.
pub fn write_step_logs<W: io::Write>(writer: W, logs: &[StepLog]) -> Result<()> {
    let mut csv = csv::Writer::from_writer(writer);
    let (hunters, prey) = logs
        .first()
        .map(|l| (l.hunters.len(), l.prey.len()))
        .unwrap_or((0, 0));
    csv.write_record(step_header(hunters, prey))?;
    for log in logs {
        csv.write_record(step_row(log))?;
    }
    csv.flush().map_err(|e| HunterError::io("flush step CSV", e))?;
    Ok(())
}

pub fn write_step_logs_to_path(path: impl AsRef<Path>, logs: &[StepLog]) -> Result<()> {
    let path = path.as_ref();
    let file = std::fs::File::create(path)
        .map_err(|e| HunterError::io(format!("create {}", path.display()), e))?;
    write_step_logs(io::BufWriter::new(file), logs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::environment::Snapshot;
    use crate::grid::{Grid, Position};
    use crate::observation::Decision;
    use crate::types::Action;

    fn records() -> Vec<EpisodeRecord> {
        vec![
            EpisodeRecord {
                episode_id: 0,
                steps: 12,
                seed: Some(7),
                captured_all: true,
                cooperation_rate: Some(0.25),
                intention_accuracy: None,
            },
            EpisodeRecord {
                episode_id: 1,
                steps: 1000,
                seed: None,
                captured_all: false,
                cooperation_rate: None,
                intention_accuracy: Some(0.5),
            },
        ]
    }

    #[test]
    fn episode_csv_has_header_and_empty_optionals() {
        let mut buf = Vec::new();
        write_records(&mut buf, &records()).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines[0],
            "episode_id,steps,seed,captured_all,cooperation_rate,intention_accuracy"
        );
        assert_eq!(lines[1], "0,12,7,true,0.25,");
        assert_eq!(lines[2], "1,1000,,false,,0.5");
    }

    #[test]
    fn episode_csv_reads_back() {
        let mut buf = Vec::new();
        write_records(&mut buf, &records()).unwrap();
        assert_eq!(read_records(buf.as_slice()).unwrap(), records());
    }

    #[test]
    fn bad_rows_are_reported() {
        let text = "episode_id,steps,seed,captured_all,cooperation_rate,intention_accuracy\n0,abc,,true,,\n";
        let err = read_records(text.as_bytes()).unwrap_err();
        match err {
            HunterError::MalformedRecord { line, reason } => {
                assert_eq!(line, 2);
                assert!(reason.contains("steps"));
            }
            other => panic!("unexpected error {other}"),
        }
    }

    #[test]
    fn step_csv_layout() {
        let grid = Grid::default();
        let after = Snapshot {
            episode: 3,
            time_step: 1,
            hunters: vec![Position::new(0, 0), Position::new(5, 5)],
            prey: vec![Position::new(3, 4), Position::new(5, 5)],
            captured: vec![false, true],
        };
        let mut d0 = Decision::action(Action::Right).with_target(0);
        d0.estimated_other_target = Some(1);
        let d1 = Decision::action(Action::Stay).with_target(1);
        let log = StepLog::new(&grid, &after, &[d0, d1]);

        let mut buf = Vec::new();
        write_step_logs(&mut buf, &[log]).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let mut lines = text.lines();
        let header: Vec<&str> = lines.next().unwrap().split(',').collect();
        let row: Vec<&str> = lines.next().unwrap().split(',').collect();
        assert_eq!(header.len(), step_header(2, 2).len());
        assert_eq!(header.len(), row.len());

        let col = |name: &str| row[header.iter().position(|h| *h == name).unwrap()];
        assert_eq!(col("episode_id"), "3");
        assert_eq!(col("prey1_captured"), "true");
        assert_eq!(col("hunter0_action"), "RIGHT");
        assert_eq!(col("hunter0_estimated_target"), "1");
        assert_eq!(col("hunter1_estimated_target"), "");
        assert_eq!(col("hunter0_prey0_manhattan"), "7");
        assert_eq!(col("hunter0_prey0_euclidean"), "5.0000");
        assert_eq!(col("hunter1_prey1_manhattan"), "0");
    }
}
