#![cfg(feature = "serde")]
//! Saving and loading trained tables, and exporting episode statistics.

use std::fs;

use hunter_task::{
    export, persistence, EpisodeDriver, Grid, HunterConfig, HunterError, Position,
    QLearningAgent,
};

fn trained() -> (EpisodeDriver, QLearningAgent) {
    let config = HunterConfig {
        grid: Grid::new(8, 8).unwrap(),
        max_steps: 150,
        ..HunterConfig::training()
    };
    let mut agent = QLearningAgent::new(config.encoding, &config.agent);
    let mut driver = EpisodeDriver::seeded(config, 99).unwrap();
    driver.train(&mut agent, 60).unwrap();
    (driver, agent)
}

#[test]
fn saved_table_loads_identically() {
    let (driver, agent) = trained();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("q_table.json");

    persistence::save(agent.table(), &path).unwrap();
    let loaded = persistence::load(&path).unwrap();
    assert_eq!(&loaded, agent.table());

    let start = (Position::new(0, 0), Position::new(4, 5));
    let before = driver.greedy_rollout(agent.table(), start.0, start.1, 3).unwrap();
    let after = driver.greedy_rollout(&loaded, start.0, start.1, 3).unwrap();
    assert_eq!(before, after);
}

#[test]
fn missing_file_is_not_an_empty_table() {
    let dir = tempfile::tempdir().unwrap();
    let err = persistence::load(dir.path().join("absent.json")).unwrap_err();
    assert!(matches!(err, HunterError::TableNotFound { .. }), "{err}");
}

#[test]
fn truncated_file_is_malformed() {
    let (_, agent) = trained();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("q_table.json");
    persistence::save(agent.table(), &path).unwrap();

    let text = fs::read_to_string(&path).unwrap();
    fs::write(&path, &text[..text.len() / 2]).unwrap();
    let err = persistence::load(&path).unwrap_err();
    assert!(matches!(err, HunterError::MalformedTable { .. }), "{err}");
}

#[test]
fn episode_csv_survives_a_round_trip() {
    let (driver, _) = trained();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("episodes.csv");

    export::write_records_to_path(&path, driver.records()).unwrap();
    let read = export::read_records_from_path(&path).unwrap();
    assert_eq!(read, driver.records());
}
