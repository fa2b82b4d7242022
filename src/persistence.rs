//! Versioned JSON persistence for [`QTable`].
//!
//! ```json
//! {
//!   "version": 1,
//!   "encoding": "relative",
//!   "entries": [
//!     { "state": [1, 0], "values": { "DOWN": 0.0, "LEFT": 0.0, "RIGHT": 9.5, "STAY": 0.0, "UP": 0.0 } }
//!   ]
//! }
//! ```
//!
//! Entries are written in key order and values round-trip exactly. A
//! missing or malformed file is an error; it is never replaced by an
//! empty table.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::Path;

use log::info;
use serde::{Deserialize, Serialize};

use crate::error::{HunterError, Result};
use crate::q_table::{ActionValues, QTable};
use crate::types::{Action, StateEncoding, StateKey};

/// On-disk layout of a table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedQTable {
    pub version: u32,
    pub encoding: StateEncoding,
    pub entries: Vec<SavedRow>,
}

/// One state row: the state as an integer tuple, values keyed by action name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedRow {
    pub state: Vec<i32>,
    pub values: BTreeMap<String, f64>,
}

impl SavedQTable {
    pub const VERSION: u32 = 1;

    pub fn from_table(table: &QTable) -> Self {
        let entries = table
            .sorted_rows()
            .into_iter()
            .map(|(key, row)| SavedRow {
                state: key.to_vec(),
                values: row.iter().map(|(a, v)| (a.name().to_string(), v)).collect(),
            })
            .collect();
        Self {
            version: Self::VERSION,
            encoding: table.encoding(),
            entries,
        }
    }

    /// Rebuilds the table, checking every row against the invariants.
    ///
    /// `source` names the origin in error messages.
    pub fn into_table(self, source: &Path) -> Result<QTable> {
        if self.version != Self::VERSION {
            return Err(HunterError::UnsupportedTableVersion {
                found: self.version,
                expected: Self::VERSION,
            });
        }
        let malformed = |reason: String| HunterError::MalformedTable {
            path: source.to_path_buf(),
            reason,
        };

        let mut table = QTable::new(self.encoding);
        for (i, entry) in self.entries.into_iter().enumerate() {
            let key = StateKey::from_slice(&entry.state)
                .filter(|k| k.encoding() == self.encoding)
                .ok_or_else(|| {
                    malformed(format!(
                        "entry {i}: state {:?} does not fit the {} encoding",
                        entry.state, self.encoding
                    ))
                })?;
            if table.contains(&key) {
                return Err(malformed(format!("entry {i}: duplicate state {:?}", entry.state)));
            }
            let mut row = ActionValues::zeros();
            let mut seen = [false; Action::COUNT];
            for (name, value) in &entry.values {
                let action: Action = name
                    .parse()
                    .map_err(|_| malformed(format!("entry {i}: unknown action {name:?}")))?;
                if seen[action.index()] {
                    return Err(malformed(format!("entry {i}: action {action} listed twice")));
                }
                seen[action.index()] = true;
                row[action] = *value;
            }
            if let Some(missing) = Action::all().into_iter().find(|a| !seen[a.index()]) {
                return Err(malformed(format!("entry {i}: no value for {missing}")));
            }
            table.insert_row(key, row);
        }
        Ok(table)
    }
}

/// Writes `table` as pretty JSON.
pub fn write_table<W: Write>(writer: W, table: &QTable) -> Result<()> {
    serde_json::to_writer_pretty(writer, &SavedQTable::from_table(table))?;
    Ok(())
}

/// Reads a table written by [`write_table`]; `source` labels errors.
pub fn read_table<R: Read>(reader: R, source: &Path) -> Result<QTable> {
    let saved: SavedQTable =
        serde_json::from_reader(reader).map_err(|e| HunterError::MalformedTable {
            path: source.to_path_buf(),
            reason: e.to_string(),
        })?;
    saved.into_table(source)
}

/// Saves `table` to `path`, replacing any existing file.
pub fn save(table: &QTable, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let file = File::create(path)
        .map_err(|e| HunterError::io(format!("create {}", path.display()), e))?;
    let mut writer = BufWriter::new(file);
    write_table(&mut writer, table)?;
    writer
        .flush()
        .map_err(|e| HunterError::io(format!("write {}", path.display()), e))?;
    info!("Saved Q-table ({} states) to {:?}", table.len(), path);
    Ok(())
}

/// Loads a table from `path`.
///
/// Fails with [`HunterError::TableNotFound`] if the file does not exist.
pub fn load(path: impl AsRef<Path>) -> Result<QTable> {
    let path = path.as_ref();
    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Err(HunterError::TableNotFound {
                path: path.to_path_buf(),
            })
        }
        Err(e) => return Err(HunterError::io(format!("open {}", path.display()), e)),
    };
    let table = read_table(BufReader::new(file), path)?;
    info!("Loaded Q-table ({} states) from {:?}", table.len(), path);
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Position;

    fn sample_table() -> QTable {
        let mut table = QTable::new(StateEncoding::Relative);
        table.set(StateKey::Relative { dx: 1, dy: 0 }, Action::Right, 9.999_999_999_7);
        table.set(StateKey::Relative { dx: -3, dy: 10 }, Action::Up, -0.1 / 3.0);
        table.get_or_init(StateKey::Relative { dx: 0, dy: 0 });
        table
    }

    #[test]
    fn round_trip_is_exact() {
        let table = sample_table();
        let mut buf = Vec::new();
        write_table(&mut buf, &table).unwrap();
        let loaded = read_table(buf.as_slice(), Path::new("mem")).unwrap();
        assert_eq!(loaded, table);
    }

    #[test]
    fn absolute_tables_round_trip() {
        let mut table = QTable::new(StateEncoding::Absolute);
        table.set(
            StateKey::Absolute {
                hunter: Position::new(2, 3),
                prey: Position::new(19, 0),
            },
            Action::Left,
            1.25,
        );
        let mut buf = Vec::new();
        write_table(&mut buf, &table).unwrap();
        assert_eq!(read_table(buf.as_slice(), Path::new("mem")).unwrap(), table);
    }

    #[test]
    fn values_are_keyed_by_action_name() {
        let mut buf = Vec::new();
        write_table(&mut buf, &sample_table()).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&buf).unwrap();
        assert_eq!(value["version"], 1);
        assert_eq!(value["encoding"], "relative");
        let first = &value["entries"][0];
        assert_eq!(first["state"], serde_json::json!([-3, 10]));
        assert_eq!(first["values"].as_object().unwrap().len(), Action::COUNT);
        assert!(first["values"].get("STAY").is_some());
    }

    #[test]
    fn partial_rows_are_rejected() {
        let json = r#"{"version":1,"encoding":"relative","entries":[{"state":[1,0],"values":{"UP":1.0}}]}"#;
        let err = read_table(json.as_bytes(), Path::new("t.json")).unwrap_err();
        assert!(matches!(err, HunterError::MalformedTable { .. }), "{err}");
    }

    #[test]
    fn wrong_arity_is_rejected() {
        let json = r#"{"version":1,"encoding":"absolute","entries":[{"state":[1,0],"values":{"UP":0,"DOWN":0,"LEFT":0,"RIGHT":0,"STAY":0}}]}"#;
        let err = read_table(json.as_bytes(), Path::new("t.json")).unwrap_err();
        assert!(matches!(err, HunterError::MalformedTable { .. }));
    }

    #[test]
    fn unknown_version_is_rejected() {
        let json = r#"{"version":9,"encoding":"relative","entries":[]}"#;
        let err = read_table(json.as_bytes(), Path::new("t.json")).unwrap_err();
        assert!(matches!(
            err,
            HunterError::UnsupportedTableVersion { found: 9, expected: 1 }
        ));
    }

    #[test]
    fn garbage_is_malformed() {
        let err = read_table("not json".as_bytes(), Path::new("t.json")).unwrap_err();
        assert!(matches!(err, HunterError::MalformedTable { .. }));
    }
}
