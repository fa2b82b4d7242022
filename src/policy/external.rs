//! Decisions delegated to an external provider.
//!
//! The provider receives the observation as JSON and answers with free
//! text that should contain a JSON decision. Provider errors and
//! unparseable answers never reach the simulation: they become `STAY`.

use log::warn;
use rand::RngCore;

use super::trait_::HunterPolicy;
use crate::observation::{Decision, Observation};

/// Provider callback: observation JSON in, response text out.
pub type Provider = Box<dyn FnMut(&str) -> Result<String, String> + Send>;

/// Wraps any decision provider behind the [`HunterPolicy`] contract.
pub struct ExternalPolicy {
    name: String,
    provider: Provider,
}

impl ExternalPolicy {
    pub fn new<F>(name: impl Into<String>, provider: F) -> Self
    where
        F: FnMut(&str) -> Result<String, String> + Send + 'static,
    {
        Self {
            name: name.into(),
            provider: Box::new(provider),
        }
    }
}

impl std::fmt::Debug for ExternalPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExternalPolicy")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

impl HunterPolicy for ExternalPolicy {
    fn decide(&mut self, observation: &Observation, _rng: &mut dyn RngCore) -> Decision {
        let request = match observation.to_json() {
            Ok(json) => json,
            Err(e) => {
                warn!("{}: cannot encode observation: {e}; staying", self.name);
                return Decision::stay();
            }
        };
        match (self.provider)(&request) {
            Ok(response) => Decision::parse(&response),
            Err(e) => {
                warn!("{}: provider failed: {e}; staying", self.name);
                Decision::stay().with_rationale(format!("fallback: {e}"))
            }
        }
    }

    fn name(&self) -> &str {
        &self.name
    }
}
