//! Two hunters dividing two prey, with and without partner modelling.

use std::sync::Arc;

use hunter_task::policy::ArbitratedPolicy;
use hunter_task::{
    Action, ArbiterConfig, CaptureRule, EpisodeDriver, Grid, HunterConfig, HunterPolicy,
    MovementStrategy, OpponentModel, Placement, PolicyLevel, Position, PreyMotion, QTable,
    StateEncoding, StateKey, TargetArbiter,
};
use rand::rngs::StdRng;
use rand::SeedableRng;

const HUNTER_A: Position = Position { x: 0, y: 0 };
const HUNTER_B: Position = Position { x: 9, y: 0 };
const PREY_NEAR: Position = Position { x: 3, y: 0 };
const PREY_FAR: Position = Position { x: 0, y: 4 };

/// A table whose value falls off with distance, so nearer prey rate higher.
/// From their starting squares both hunters therefore prefer `PREY_NEAR`.
fn distance_table(peak: f64) -> QTable {
    let mut table = QTable::new(StateEncoding::Relative);
    for dx in -10i32..=10 {
        for dy in -10i32..=10 {
            let value = peak - f64::from(dx.abs() + dy.abs());
            table.set(StateKey::Relative { dx, dy }, Action::Stay, value);
        }
    }
    table
}

fn tables() -> (QTable, QTable) {
    (distance_table(30.0), distance_table(40.0))
}

fn level(level: PolicyLevel) -> ArbiterConfig {
    ArbiterConfig {
        level,
        opponent_model: OpponentModel::OpponentTable,
        movement: MovementStrategy::Greedy,
    }
}

#[test]
fn level_one_takes_the_prey_the_partner_leaves() {
    let (a, b) = tables();
    let grid = Grid::default();
    let prey = [PREY_NEAR, PREY_FAR];
    let mut rng = StdRng::seed_from_u64(0);

    let naive = TargetArbiter::new(grid, &a, &b, level(PolicyLevel::Independent));
    assert_eq!(
        naive.choose_target(HUNTER_A, Some(HUNTER_B), &prey, &mut rng),
        Some((0, None))
    );

    let tom = TargetArbiter::new(grid, &a, &b, level(PolicyLevel::TheoryOfMind));
    let decision = tom
        .decide(HUNTER_A, Some(HUNTER_B), &prey, &mut rng)
        .unwrap();
    assert_eq!(decision.estimated_other_target, Some(0));
    assert_eq!(decision.target, 1);
    assert_eq!(decision.action, Action::Down);
}

#[test]
fn self_projection_uses_own_table_from_partner_square() {
    let (a, _) = tables();
    let grid = Grid::default();
    let prey = [PREY_NEAR, PREY_FAR];
    let mut rng = StdRng::seed_from_u64(0);

    // B's table is empty here; only A's own table can explain B.
    let empty = QTable::new(StateEncoding::Relative);
    let config = ArbiterConfig {
        opponent_model: OpponentModel::SelfProjection,
        ..level(PolicyLevel::TheoryOfMind)
    };
    let tom = TargetArbiter::new(grid, &a, &empty, config);
    assert_eq!(
        tom.choose_target(HUNTER_A, Some(HUNTER_B), &prey, &mut rng),
        Some((1, Some(0)))
    );
}

fn pursuit_config() -> HunterConfig {
    HunterConfig {
        n_hunters: 2,
        n_prey: 2,
        placement: Placement::Fixed {
            hunters: vec![HUNTER_A, HUNTER_B],
            prey: vec![PREY_NEAR, PREY_FAR],
        },
        max_steps: 60,
        capture: CaptureRule::Recomputed,
        prey_motion: PreyMotion::Static,
        encoding: StateEncoding::Relative,
        ..HunterConfig::pursuit()
    }
}

fn policies(level_a: PolicyLevel, level_b: PolicyLevel) -> Vec<Box<dyn HunterPolicy>> {
    let (a, b) = tables();
    let (a, b) = (Arc::new(a), Arc::new(b));
    let grid = Grid::default();
    vec![
        Box::new(ArbitratedPolicy::new(grid, a.clone(), b.clone(), level(level_a))),
        Box::new(ArbitratedPolicy::new(grid, b, a, level(level_b))),
    ]
}

#[test]
fn one_reasoning_hunter_splits_the_prey() {
    let mut driver = EpisodeDriver::seeded(pursuit_config(), 5).unwrap();
    let mut hunters = policies(PolicyLevel::TheoryOfMind, PolicyLevel::Independent);
    let trace = driver.run_episode(&mut hunters).unwrap();

    let first = &trace.steps[0];
    assert_eq!(first.targets, vec![Some(1), Some(0)]);
    assert_eq!(first.estimated_targets, vec![Some(0), None]);

    assert!(trace.record.captured_all);
    assert_eq!(trace.record.intention_accuracy, Some(1.0));
    assert!(trace.record.cooperation_rate.unwrap() > 0.5);
}

#[test]
fn two_naive_hunters_collide_on_the_same_prey() {
    let mut driver = EpisodeDriver::seeded(pursuit_config(), 5).unwrap();
    let mut hunters = policies(PolicyLevel::Independent, PolicyLevel::Independent);
    let trace = driver.run_episode(&mut hunters).unwrap();

    assert_eq!(trace.steps[0].targets, vec![Some(0), Some(0)]);
    assert_eq!(trace.record.intention_accuracy, None);
    assert_eq!(trace.record.cooperation_rate, Some(0.0));
}
