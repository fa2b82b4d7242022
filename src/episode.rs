//! Episode driver: runs the environment against learners or policies.
//!
//! # Lifecycle
//!
//! Every episode draws a seed from the driver's [`SeedSequence`], reseeds
//! the single random stream with it, and resets the environment. From then
//! on placement, prey draws and exploration draws all come from that one
//! stream, so an episode is fully determined by `(episode index, seed)` and
//! the state of the learner.

use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::agent::QLearningAgent;
use crate::config::HunterConfig;
use crate::environment::{HuntEnvironment, Snapshot};
use crate::error::{HunterError, Result};
use crate::grid::{Grid, Position};
use crate::observation::{Decision, Observation};
use crate::policy::HunterPolicy;
use crate::q_table::QTable;
use crate::reward::RewardComputer;
use crate::types::{Action, StateEncoding};

/// Source of per-episode seeds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SeedSequence {
    /// `base`, `base + 1`, `base + 2`, ...
    Incrementing { next: u64 },
    /// Fresh seeds from the thread RNG; still recorded for replay.
    Entropy,
}

impl SeedSequence {
    pub fn from_base(base: u64) -> Self {
        SeedSequence::Incrementing { next: base }
    }

    pub fn next_seed(&mut self) -> u64 {
        match self {
            SeedSequence::Incrementing { next } => {
                let seed = *next;
                *next = next.wrapping_add(1);
                seed
            }
            SeedSequence::Entropy => rand::thread_rng().gen(),
        }
    }
}

/// Summary of one finished episode.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct EpisodeRecord {
    pub episode_id: u64,
    /// Steps taken until termination.
    pub steps: u32,
    pub seed: Option<u64>,
    /// `false` when the step ceiling ended the episode.
    pub captured_all: bool,
    /// Share of steps in which the two hunters pursued different prey.
    pub cooperation_rate: Option<f64>,
    /// Share of partner-target estimates that matched the partner's choice.
    pub intention_accuracy: Option<f64>,
}

/// One row of the per-step trajectory log.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct StepLog {
    pub episode_id: u64,
    pub step: u32,
    pub hunters: Vec<Position>,
    pub prey: Vec<Position>,
    pub captured: Vec<bool>,
    pub actions: Vec<Action>,
    pub targets: Vec<Option<usize>>,
    pub estimated_targets: Vec<Option<usize>>,
    /// `manhattan[h][p]`: torus Manhattan distance from hunter `h` to prey `p`.
    pub manhattan: Vec<Vec<i32>>,
    /// `euclidean[h][p]`: torus Euclidean distance from hunter `h` to prey `p`.
    pub euclidean: Vec<Vec<f64>>,
}

impl StepLog {
    /// Logs the post-step state together with the decisions that led to it.
    pub fn new(grid: &Grid, after: &Snapshot, decisions: &[Decision]) -> Self {
        let manhattan = after
            .hunters
            .iter()
            .map(|h| after.prey.iter().map(|p| grid.manhattan(*h, *p)).collect())
            .collect();
        let euclidean = after
            .hunters
            .iter()
            .map(|h| after.prey.iter().map(|p| grid.euclidean(*h, *p)).collect())
            .collect();
        Self {
            episode_id: after.episode,
            step: after.time_step,
            hunters: after.hunters.clone(),
            prey: after.prey.clone(),
            captured: after.captured.clone(),
            actions: decisions.iter().map(|d| d.action).collect(),
            targets: decisions.iter().map(|d| d.target).collect(),
            estimated_targets: decisions.iter().map(|d| d.estimated_other_target).collect(),
            manhattan,
            euclidean,
        }
    }
}

/// A finished policy-driven episode with its trajectory.
#[derive(Debug, Clone, PartialEq)]
pub struct EpisodeTrace {
    pub record: EpisodeRecord,
    pub steps: Vec<StepLog>,
}

/// Running tallies for the two-hunter coordination metrics.
#[derive(Debug, Default)]
struct CoordinationTally {
    both_targeted: u32,
    split: u32,
    estimates: u32,
    correct: u32,
}

impl CoordinationTally {
    fn observe(&mut self, decisions: &[Decision]) {
        if decisions.len() != 2 {
            return;
        }
        if let (Some(a), Some(b)) = (decisions[0].target, decisions[1].target) {
            self.both_targeted += 1;
            if a != b {
                self.split += 1;
            }
        }
        for (i, d) in decisions.iter().enumerate() {
            if let Some(estimate) = d.estimated_other_target {
                self.estimates += 1;
                if decisions[1 - i].target == Some(estimate) {
                    self.correct += 1;
                }
            }
        }
    }

    fn cooperation_rate(&self) -> Option<f64> {
        ratio(self.split, self.both_targeted)
    }

    fn intention_accuracy(&self) -> Option<f64> {
        ratio(self.correct, self.estimates)
    }
}

fn ratio(num: u32, den: u32) -> Option<f64> {
    (den > 0).then(|| f64::from(num) / f64::from(den))
}

/// Orchestrates episodes and keeps their records.
#[derive(Debug)]
pub struct EpisodeDriver {
    env: HuntEnvironment,
    rng: StdRng,
    seeds: SeedSequence,
    next_episode: u64,
    records: Vec<EpisodeRecord>,
}

impl EpisodeDriver {
    pub fn new(config: HunterConfig, seeds: SeedSequence) -> Result<Self> {
        Ok(Self {
            env: HuntEnvironment::new(config)?,
            rng: StdRng::seed_from_u64(0),
            seeds,
            next_episode: 0,
            records: Vec::new(),
        })
    }

    /// Driver whose episode seeds start at `base` and count up.
    pub fn seeded(config: HunterConfig, base: u64) -> Result<Self> {
        Self::new(config, SeedSequence::from_base(base))
    }

    pub fn config(&self) -> &HunterConfig {
        self.env.config()
    }

    pub fn environment(&self) -> &HuntEnvironment {
        &self.env
    }

    /// Records of every episode run so far, in order.
    pub fn records(&self) -> &[EpisodeRecord] {
        &self.records
    }

    pub fn episodes_run(&self) -> u64 {
        self.next_episode
    }

    fn begin(&mut self, episode: u64, seed: u64) -> Result<Snapshot> {
        self.rng = StdRng::seed_from_u64(seed);
        self.env.reset(episode, &mut self.rng)
    }

    fn check_policies(&self, policies: &[Box<dyn HunterPolicy>]) -> Result<()> {
        let n_hunters = self.env.config().n_hunters;
        if policies.len() != n_hunters {
            return Err(HunterError::ActionCountMismatch {
                expected: n_hunters,
                got: policies.len(),
            });
        }
        Ok(())
    }

    fn single_pair(&self) -> Result<()> {
        let config = self.env.config();
        if config.n_hunters != 1 || config.n_prey != 1 {
            return Err(HunterError::UnsupportedLayout {
                hunters: config.n_hunters,
                prey: config.n_prey,
            });
        }
        Ok(())
    }

    fn check_encoding(&self, table: StateEncoding) -> Result<()> {
        let run = self.env.config().encoding;
        if table != run {
            return Err(HunterError::EncodingMismatch {
                table: table.to_string(),
                run: run.to_string(),
            });
        }
        Ok(())
    }

    /// Trains `agent` for `episodes` episodes (one hunter, one prey).
    ///
    /// ε carries over between episodes; only the world is reset.
    pub fn train(&mut self, agent: &mut QLearningAgent, episodes: u64) -> Result<&[EpisodeRecord]> {
        self.single_pair()?;
        self.check_encoding(agent.encoding())?;
        info!(
            "training for {} episodes on a {}x{} grid (epsilon {:.3})",
            episodes,
            self.env.config().grid.width,
            self.env.config().grid.height,
            agent.epsilon()
        );

        let first = self.records.len();
        for _ in 0..episodes {
            let seed = self.seeds.next_seed();
            let record = self.train_episode(agent, seed)?;
            self.records.push(record);
        }

        let run = &self.records[first..];
        if let Some(last) = run.last() {
            let captured = run.iter().filter(|r| r.captured_all).count();
            info!(
                "training done: {} episodes, {} captured, last episode {} steps, epsilon {:.4}, {} states",
                run.len(),
                captured,
                last.steps,
                agent.epsilon(),
                agent.table().len()
            );
        }
        Ok(&self.records[first..])
    }

    fn train_episode(&mut self, agent: &mut QLearningAgent, seed: u64) -> Result<EpisodeRecord> {
        let episode = self.next_episode;
        self.next_episode += 1;
        self.begin(episode, seed)?;

        let grid = self.env.config().grid;
        let encoding = self.env.config().encoding;
        let reward_config = self.env.config().reward.clone();

        let (steps, captured_all) = loop {
            let before = (self.env.hunters()[0], self.env.prey()[0]);
            let state = encoding.encode(&grid, before.0, before.1);
            let action = agent.select_action(state, &mut self.rng);

            let result = self.env.step(&[action], &mut self.rng)?;
            let after = (result.after.hunters[0], result.after.prey[0]);
            let reward =
                RewardComputer::compute(&reward_config, &grid, result.captured(0), before, after);
            let next_state = encoding.encode(&grid, after.0, after.1);
            agent.update(state, action, reward, next_state);

            if result.done {
                break (result.after.time_step, result.all_captured);
            }
        };

        debug!(
            "episode {} done in {} steps (seed {}, captured {}, epsilon {:.4}, {} states)",
            episode,
            steps,
            seed,
            captured_all,
            agent.epsilon(),
            agent.table().len()
        );
        Ok(EpisodeRecord {
            episode_id: episode,
            steps,
            seed: Some(seed),
            captured_all,
            cooperation_rate: None,
            intention_accuracy: None,
        })
    }

    /// Runs one episode with one policy per hunter and records it.
    ///
    /// A policy-count mismatch is rejected before anything is drawn. Once
    /// the episode starts, its index and seed are spent together even if it
    /// fails, so seeds keep lining up with episode indices.
    pub fn run_episode(&mut self, policies: &mut [Box<dyn HunterPolicy>]) -> Result<EpisodeTrace> {
        self.check_policies(policies)?;
        let episode = self.next_episode;
        let seed = self.seeds.next_seed();
        self.next_episode += 1;
        let trace = self.play(episode, seed, policies)?;
        self.records.push(trace.record.clone());
        Ok(trace)
    }

    /// Runs `episodes` episodes and returns their concatenated step logs.
    pub fn run_episodes(
        &mut self,
        policies: &mut [Box<dyn HunterPolicy>],
        episodes: u64,
    ) -> Result<Vec<StepLog>> {
        let mut steps = Vec::new();
        for _ in 0..episodes {
            steps.extend(self.run_episode(policies)?.steps);
        }
        Ok(steps)
    }

    /// Re-runs episode `episode_id` from its recorded `seed`.
    ///
    /// Nothing is recorded and the episode counter does not move. With the
    /// same policies (in the same state) the trajectory is identical.
    pub fn replay(
        &mut self,
        episode_id: u64,
        seed: u64,
        policies: &mut [Box<dyn HunterPolicy>],
    ) -> Result<EpisodeTrace> {
        self.play(episode_id, seed, policies)
    }

    fn play(
        &mut self,
        episode: u64,
        seed: u64,
        policies: &mut [Box<dyn HunterPolicy>],
    ) -> Result<EpisodeTrace> {
        self.check_policies(policies)?;
        let grid = self.env.config().grid;
        let mut snapshot = self.begin(episode, seed)?;
        let mut tally = CoordinationTally::default();
        let mut steps = Vec::new();

        let (last_step, captured_all) = loop {
            let decisions: Vec<Decision> = policies
                .iter_mut()
                .enumerate()
                .map(|(i, policy)| {
                    let obs = Observation::for_hunter(&snapshot, i);
                    policy.decide(&obs, &mut self.rng)
                })
                .collect();
            let actions: Vec<Action> = decisions.iter().map(|d| d.action).collect();
            tally.observe(&decisions);

            let result = self.env.step(&actions, &mut self.rng)?;
            steps.push(StepLog::new(&grid, &result.after, &decisions));
            snapshot = result.after;

            if result.done {
                break (snapshot.time_step, result.all_captured);
            }
        };

        if !captured_all {
            warn!(
                "episode {} hit the step ceiling ({}) without capturing every prey",
                episode, last_step
            );
        }
        debug!("episode {} done in {} steps (seed {})", episode, last_step, seed);

        Ok(EpisodeTrace {
            record: EpisodeRecord {
                episode_id: episode,
                steps: last_step,
                seed: Some(seed),
                captured_all,
                cooperation_rate: tally.cooperation_rate(),
                intention_accuracy: tally.intention_accuracy(),
            },
            steps,
        })
    }

    /// Plays `table` greedily (ε = 0) from a fixed start.
    ///
    /// Returns the steps needed to capture, or `None` if the ceiling was hit.
    /// Neither the table nor the driver's own state is touched.
    pub fn greedy_rollout(
        &self,
        table: &QTable,
        hunter: Position,
        prey: Position,
        seed: u64,
    ) -> Result<Option<u32>> {
        self.single_pair()?;
        self.check_encoding(table.encoding())?;

        let mut env = self.env.clone();
        let mut rng = StdRng::seed_from_u64(seed);
        env.place(vec![hunter], vec![prey])?;
        let grid = env.config().grid;
        let encoding = table.encoding();

        loop {
            let state = encoding.encode(&grid, env.hunters()[0], env.prey()[0]);
            let action = table.best_action(&state, &mut rng);
            let result = env.step(&[action], &mut rng)?;
            if result.done {
                return Ok(result.all_captured.then_some(result.after.time_step));
            }
        }
    }
}
