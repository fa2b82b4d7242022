//! Evaluation metrics aggregated over episode records.

use std::fmt;

use crate::episode::{EpisodeDriver, EpisodeRecord};
use crate::error::Result;
use crate::policy::HunterPolicy;

/// Aggregated statistics over a run of episodes.
#[derive(Debug, Clone, PartialEq)]
pub struct EvaluationMetrics {
    /// Mean steps per episode.
    pub mean_steps: f64,
    pub min_steps: u32,
    pub max_steps: u32,
    /// Share of episodes that ended by full capture rather than the ceiling.
    pub capture_rate: f64,
    /// Mean cooperation rate over episodes that report one.
    pub mean_cooperation: Option<f64>,
    /// Mean intention accuracy over episodes that report one.
    pub mean_intention_accuracy: Option<f64>,
    /// Number of episodes evaluated.
    pub n_episodes: usize,
}

impl EvaluationMetrics {
    /// Summarises `records`. Returns `None` for an empty slice.
    pub fn from_records(records: &[EpisodeRecord]) -> Option<Self> {
        if records.is_empty() {
            return None;
        }
        let n = records.len() as f64;
        let mean_steps = records.iter().map(|r| f64::from(r.steps)).sum::<f64>() / n;
        let min_steps = records.iter().map(|r| r.steps).min().unwrap_or(0);
        let max_steps = records.iter().map(|r| r.steps).max().unwrap_or(0);
        let capture_rate = records.iter().filter(|r| r.captured_all).count() as f64 / n;

        Some(Self {
            mean_steps,
            min_steps,
            max_steps,
            capture_rate,
            mean_cooperation: mean_of(records.iter().filter_map(|r| r.cooperation_rate)),
            mean_intention_accuracy: mean_of(records.iter().filter_map(|r| r.intention_accuracy)),
            n_episodes: records.len(),
        })
    }

    /// Runs `n_episodes` episodes with `policies` and summarises them.
    pub fn evaluate(
        driver: &mut EpisodeDriver,
        policies: &mut [Box<dyn HunterPolicy>],
        n_episodes: usize,
    ) -> Result<Option<Self>> {
        let mut records = Vec::with_capacity(n_episodes);
        for _ in 0..n_episodes {
            records.push(driver.run_episode(policies)?.record);
        }
        Ok(Self::from_records(&records))
    }
}

fn mean_of(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, count) = values.fold((0.0, 0usize), |(s, c), v| (s + v, c + 1));
    (count > 0).then(|| sum / count as f64)
}

impl fmt::Display for EvaluationMetrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Evaluation Metrics ({} episodes) ===", self.n_episodes)?;
        writeln!(f, "  Mean steps:              {:.2}", self.mean_steps)?;
        writeln!(
            f,
            "  Min / max steps:         {} / {}",
            self.min_steps, self.max_steps
        )?;
        writeln!(f, "  Capture rate:            {:.1}%", self.capture_rate * 100.0)?;
        if let Some(c) = self.mean_cooperation {
            writeln!(f, "  Mean cooperation:        {:.1}%", c * 100.0)?;
        }
        if let Some(a) = self.mean_intention_accuracy {
            writeln!(f, "  Mean intention accuracy: {:.1}%", a * 100.0)?;
        }
        Ok(())
    }
}
