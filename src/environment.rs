//! Hunter-prey environment on the toroidal grid.
//!
//! Each step applies, in one logical tick:
//! move hunters → move uncaptured prey → evaluate capture → check termination.

use log::trace;
use rand::Rng;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::config::{HunterConfig, Placement};
use crate::error::{HunterError, Result};
use crate::grid::Position;
use crate::types::Action;

/// Whether a capture flag survives the hunter stepping off the prey.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum CaptureRule {
    /// Once captured, stays captured until the episode is reset.
    #[default]
    Sticky,
    /// Re-evaluated from scratch after every step.
    Recomputed,
}

/// Per-tick view of the world, as consumed by renderers and loggers.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Snapshot {
    pub episode: u64,
    pub time_step: u32,
    pub hunters: Vec<Position>,
    pub prey: Vec<Position>,
    pub captured: Vec<bool>,
}

/// Result of a single environment step.
#[derive(Debug, Clone, PartialEq)]
pub struct StepResult {
    /// Hunter and prey positions before the step.
    pub before: Snapshot,
    /// Hunter and prey positions after the step.
    pub after: Snapshot,
    /// Whether every prey is captured after this step.
    pub all_captured: bool,
    /// Whether the episode is over (full capture or step ceiling).
    pub done: bool,
}

impl StepResult {
    /// Whether prey `index` is flagged captured after this step.
    pub fn captured(&self, index: usize) -> bool {
        self.after.captured.get(index).copied().unwrap_or(false)
    }

    /// Whether the episode ended on the step ceiling without full capture.
    pub fn truncated(&self) -> bool {
        self.done && !self.all_captured
    }
}

/// The hunter-prey simulation state.
///
/// # Lifecycle
///
/// 1. Create with [`HuntEnvironment::new`].
/// 2. Call [`HuntEnvironment::reset`] at the start of each episode.
/// 3. Call [`HuntEnvironment::step`] with one action per hunter until `done`.
///
/// The random source is supplied by the caller so that one seeded stream
/// can drive placement, prey moves and exploration together.
#[derive(Debug, Clone)]
pub struct HuntEnvironment {
    config: HunterConfig,
    hunters: Vec<Position>,
    prey: Vec<Position>,
    captured: Vec<bool>,
    t: u32,
    episode: u64,
}

impl HuntEnvironment {
    /// Creates an environment; the configuration is validated first.
    pub fn new(config: HunterConfig) -> Result<Self> {
        config.validate()?;
        let hunters = vec![Position::origin(); config.n_hunters];
        let prey = vec![Position::origin(); config.n_prey];
        let captured = vec![false; config.n_prey];
        Ok(Self {
            config,
            hunters,
            prey,
            captured,
            t: 0,
            episode: 0,
        })
    }

    /// Starts episode `episode`: places every entity and clears capture flags.
    pub fn reset<R: Rng + ?Sized>(&mut self, episode: u64, rng: &mut R) -> Result<Snapshot> {
        match &self.config.placement {
            Placement::Random => {
                let cells = self
                    .config
                    .grid
                    .sample_distinct(self.config.entity_count(), rng)?;
                let (h, p) = cells.split_at(self.config.n_hunters);
                self.hunters = h.to_vec();
                self.prey = p.to_vec();
            }
            Placement::Fixed { hunters, prey } => {
                let grid = self.config.grid;
                self.hunters = hunters.iter().map(|p| grid.wrap_position(*p)).collect();
                self.prey = prey.iter().map(|p| grid.wrap_position(*p)).collect();
            }
        }
        self.captured = vec![false; self.config.n_prey];
        self.t = 0;
        self.episode = episode;
        Ok(self.snapshot())
    }

    /// Places entities explicitly, keeping the episode index.
    ///
    /// Clears capture flags and the step counter.
    pub fn place(&mut self, hunters: Vec<Position>, prey: Vec<Position>) -> Result<Snapshot> {
        if hunters.len() != self.config.n_hunters || prey.len() != self.config.n_prey {
            return Err(HunterError::UnsupportedLayout {
                hunters: hunters.len(),
                prey: prey.len(),
            });
        }
        let grid = self.config.grid;
        self.hunters = hunters.into_iter().map(|p| grid.wrap_position(p)).collect();
        self.prey = prey.into_iter().map(|p| grid.wrap_position(p)).collect();
        self.captured = vec![false; self.config.n_prey];
        self.t = 0;
        Ok(self.snapshot())
    }

    /// Executes one step.
    ///
    /// # Arguments
    ///
    /// * `actions` - One action per hunter, computed from the pre-step state.
    pub fn step<R: Rng + ?Sized>(&mut self, actions: &[Action], rng: &mut R) -> Result<StepResult> {
        if actions.len() != self.hunters.len() {
            return Err(HunterError::ActionCountMismatch {
                expected: self.hunters.len(),
                got: actions.len(),
            });
        }
        let before = self.snapshot();
        let grid = self.config.grid;

        // 1. Hunters move independently; co-location is allowed.
        for (hunter, action) in self.hunters.iter_mut().zip(actions) {
            *hunter = action.apply(&grid, *hunter);
        }

        // 2. Uncaptured prey move.
        for (prey, captured) in self.prey.iter_mut().zip(&self.captured) {
            if !*captured {
                *prey = self
                    .config
                    .prey_motion
                    .step(&grid, *prey, self.episode, rng);
            }
        }

        // 3. Capture against post-move positions.
        for (i, prey) in self.prey.iter().enumerate() {
            let hit = self.hunters.iter().any(|h| h == prey);
            self.captured[i] = match self.config.capture {
                CaptureRule::Sticky => self.captured[i] || hit,
                CaptureRule::Recomputed => hit,
            };
        }

        self.t += 1;
        let all_captured = self.all_captured();
        let done = all_captured || self.t >= self.config.max_steps;
        let after = self.snapshot();
        trace!(
            "episode {} step {}: hunters {:?} prey {:?} captured {:?}",
            self.episode,
            self.t,
            after.hunters,
            after.prey,
            after.captured
        );

        Ok(StepResult {
            before,
            after,
            all_captured,
            done,
        })
    }

    /// Current world state.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            episode: self.episode,
            time_step: self.t,
            hunters: self.hunters.clone(),
            prey: self.prey.clone(),
            captured: self.captured.clone(),
        }
    }

    pub fn config(&self) -> &HunterConfig {
        &self.config
    }

    pub fn hunters(&self) -> &[Position] {
        &self.hunters
    }

    pub fn prey(&self) -> &[Position] {
        &self.prey
    }

    pub fn captured(&self) -> &[bool] {
        &self.captured
    }

    pub fn all_captured(&self) -> bool {
        self.captured.iter().all(|c| *c)
    }

    pub fn time_step(&self) -> u32 {
        self.t
    }

    pub fn episode(&self) -> u64 {
        self.episode
    }
}
