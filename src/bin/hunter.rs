//! hunter CLI - train, evaluate and deploy Q-learning hunters
//!
//! - `train`: learn a single-hunter table and save it as JSON
//! - `evaluate`: replay a saved table greedily and report statistics
//! - `pursue`: run two hunters with saved tables under target arbitration

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use log::info;

use hunter_task::policy::{ArbitratedPolicy, HunterPolicy, TablePolicy};
use hunter_task::{
    export, persistence, ArbiterConfig, CaptureRule, EpisodeDriver, EvaluationMetrics,
    HunterConfig, MovementStrategy, OpponentModel, PolicyLevel, PreyMotion, QLearningAgent,
    RewardPolicy, SeedSequence, StateEncoding,
};

#[derive(Parser)]
#[command(name = "hunter")]
#[command(version, about = "Q-learning hunters on a toroidal grid", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Train a single hunter against a single prey
    Train(TrainArgs),

    /// Evaluate a trained table greedily
    Evaluate(EvaluateArgs),

    /// Run two hunters with target arbitration
    Pursue(PursueArgs),
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum EncodingArg {
    Absolute,
    Relative,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum RewardArg {
    Sparse,
    Shaped,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum PreyArg {
    Static,
    Biased,
    /// Static until `--prey-after` episodes, then biased
    Delayed,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum CaptureArg {
    Sticky,
    Recomputed,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OpponentArg {
    /// Partner's own table from the partner's position
    Opponent,
    /// Own table from the partner's position
    SelfProjection,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum MovementArg {
    Table,
    Greedy,
}

/// Options shared by every command.
#[derive(Debug, Args)]
struct WorldArgs {
    /// JSON configuration file; flags below override it
    #[arg(long)]
    config: Option<PathBuf>,

    /// Base seed; episode `i` uses `seed + i`. Random if omitted.
    #[arg(long)]
    seed: Option<u64>,

    /// Number of episodes
    #[arg(long, short = 'n', default_value_t = 1000)]
    episodes: u64,

    /// Step ceiling per episode
    #[arg(long)]
    max_steps: Option<u32>,

    #[arg(long, value_enum)]
    prey: Option<PreyArg>,

    /// Episode from which delayed prey start moving
    #[arg(long, default_value_t = 500)]
    prey_after: u64,

    #[arg(long, value_enum)]
    capture: Option<CaptureArg>,

    /// Per-episode statistics CSV
    #[arg(long)]
    csv: Option<PathBuf>,
}

#[derive(Debug, Args)]
struct TrainArgs {
    #[command(flatten)]
    world: WorldArgs,

    #[arg(long, value_enum)]
    encoding: Option<EncodingArg>,

    #[arg(long, value_enum)]
    reward: Option<RewardArg>,

    /// Where to save the learned table
    #[arg(long, short = 'o', default_value = "q_table.json")]
    out: PathBuf,
}

#[derive(Debug, Args)]
struct EvaluateArgs {
    #[command(flatten)]
    world: WorldArgs,

    /// Table to evaluate
    #[arg(long, short = 't')]
    table: PathBuf,
}

#[derive(Debug, Args)]
struct PursueArgs {
    #[command(flatten)]
    world: WorldArgs,

    /// Table of hunter 1
    #[arg(long)]
    table1: PathBuf,

    /// Table of hunter 2
    #[arg(long)]
    table2: PathBuf,

    /// Reasoning level of hunter 1 (0 or 1)
    #[arg(long, default_value_t = 1)]
    level1: u8,

    /// Reasoning level of hunter 2 (0 or 1)
    #[arg(long, default_value_t = 0)]
    level2: u8,

    #[arg(long, value_enum, default_value = "opponent")]
    opponent_model: OpponentArg,

    #[arg(long, value_enum, default_value = "table")]
    movement: MovementArg,

    /// Per-step trajectory CSV
    #[arg(long)]
    steps_csv: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Train(args) => train(args),
        Commands::Evaluate(args) => evaluate(args),
        Commands::Pursue(args) => pursue(args),
    }
}

fn load_config(path: Option<&Path>, fallback: HunterConfig) -> Result<HunterConfig> {
    let Some(path) = path else {
        return Ok(fallback);
    };
    let file = File::open(path).with_context(|| format!("opening config {}", path.display()))?;
    serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("parsing config {}", path.display()))
}

impl WorldArgs {
    fn apply(&self, mut config: HunterConfig) -> Result<HunterConfig> {
        config = load_config(self.config.as_deref(), config)?;
        if let Some(max_steps) = self.max_steps {
            config.max_steps = max_steps;
        }
        if let Some(prey) = self.prey {
            config.prey_motion = match prey {
                PreyArg::Static => PreyMotion::Static,
                PreyArg::Biased => PreyMotion::Biased,
                PreyArg::Delayed => PreyMotion::BiasedAfter {
                    episode: self.prey_after,
                },
            };
        }
        if let Some(capture) = self.capture {
            config.capture = match capture {
                CaptureArg::Sticky => CaptureRule::Sticky,
                CaptureArg::Recomputed => CaptureRule::Recomputed,
            };
        }
        config.validate().context("invalid configuration")?;
        Ok(config)
    }

    fn seeds(&self) -> SeedSequence {
        match self.seed {
            Some(seed) => SeedSequence::from_base(seed),
            None => SeedSequence::Entropy,
        }
    }

    fn write_csv(&self, driver: &EpisodeDriver) -> Result<()> {
        if let Some(path) = &self.csv {
            export::write_records_to_path(path, driver.records())
                .with_context(|| format!("writing {}", path.display()))?;
            info!("Wrote {} episode records to {:?}", driver.records().len(), path);
        }
        Ok(())
    }
}

fn train(args: TrainArgs) -> Result<()> {
    let mut config = args.world.apply(HunterConfig::training())?;
    if let Some(encoding) = args.encoding {
        config.encoding = match encoding {
            EncodingArg::Absolute => StateEncoding::Absolute,
            EncodingArg::Relative => StateEncoding::Relative,
        };
    }
    if let Some(reward) = args.reward {
        config.reward.policy = match reward {
            RewardArg::Sparse => RewardPolicy::Sparse,
            RewardArg::Shaped => RewardPolicy::Shaped,
        };
    }

    let mut agent = QLearningAgent::new(config.encoding, &config.agent);
    let mut driver = EpisodeDriver::new(config, args.world.seeds())?;
    driver.train(&mut agent, args.world.episodes)?;

    if let Some(metrics) = EvaluationMetrics::from_records(driver.records()) {
        println!("{metrics}");
    }
    persistence::save(agent.table(), &args.out)
        .with_context(|| format!("saving table to {}", args.out.display()))?;
    args.world.write_csv(&driver)
}

fn evaluate(args: EvaluateArgs) -> Result<()> {
    let table = persistence::load(&args.table)
        .with_context(|| format!("loading table {}", args.table.display()))?;
    let mut config = args.world.apply(HunterConfig::training())?;
    config.encoding = table.encoding();
    let grid = config.grid;

    let mut driver = EpisodeDriver::new(config, args.world.seeds())?;
    let mut policies: Vec<Box<dyn HunterPolicy>> =
        vec![Box::new(TablePolicy::new(grid, Arc::new(table)))];
    match EvaluationMetrics::evaluate(&mut driver, &mut policies, args.world.episodes as usize)? {
        Some(metrics) => println!("{metrics}"),
        None => println!("no episodes run"),
    }
    args.world.write_csv(&driver)
}

fn level(depth: u8) -> Result<PolicyLevel> {
    match PolicyLevel::from_depth(depth) {
        Some(level) => Ok(level),
        None => bail!("unsupported level {depth}; expected 0 or 1"),
    }
}

fn pursue(args: PursueArgs) -> Result<()> {
    let table1 = Arc::new(
        persistence::load(&args.table1)
            .with_context(|| format!("loading table {}", args.table1.display()))?,
    );
    let table2 = Arc::new(
        persistence::load(&args.table2)
            .with_context(|| format!("loading table {}", args.table2.display()))?,
    );
    if table1.encoding() != table2.encoding() {
        bail!(
            "tables use different encodings ({} vs {})",
            table1.encoding(),
            table2.encoding()
        );
    }

    let config = args.world.apply(HunterConfig::pursuit())?;
    if config.n_hunters != 2 {
        bail!("pursuit needs exactly two hunters, config has {}", config.n_hunters);
    }
    let grid = config.grid;
    let shared = ArbiterConfig {
        level: PolicyLevel::Independent,
        opponent_model: match args.opponent_model {
            OpponentArg::Opponent => OpponentModel::OpponentTable,
            OpponentArg::SelfProjection => OpponentModel::SelfProjection,
        },
        movement: match args.movement {
            MovementArg::Table => MovementStrategy::Table,
            MovementArg::Greedy => MovementStrategy::Greedy,
        },
    };
    let hunter1 = ArbiterConfig {
        level: level(args.level1)?,
        ..shared
    };
    let hunter2 = ArbiterConfig {
        level: level(args.level2)?,
        ..shared
    };

    let mut policies: Vec<Box<dyn HunterPolicy>> = vec![
        Box::new(ArbitratedPolicy::new(grid, Arc::clone(&table1), Arc::clone(&table2), hunter1)),
        Box::new(ArbitratedPolicy::new(grid, table2, table1, hunter2)),
    ];
    let mut driver = EpisodeDriver::new(config, args.world.seeds())?;
    let steps = driver.run_episodes(&mut policies, args.world.episodes)?;

    if let Some(metrics) = EvaluationMetrics::from_records(driver.records()) {
        println!("{metrics}");
    }
    if let Some(path) = &args.steps_csv {
        export::write_step_logs_to_path(path, &steps)
            .with_context(|| format!("writing {}", path.display()))?;
        info!("Wrote {} step rows to {:?}", steps.len(), path);
    }
    args.world.write_csv(&driver)
}
