//! Local search configuration.

use crate::error::ConfigError;
use crate::mutation::AddPolicy;

/// Configuration for the hill-climbing search.
///
/// # Examples
///
/// ```
/// use u_cachealloc::search::SearchConfig;
/// use u_cachealloc::mutation::AddPolicy;
///
/// let config = SearchConfig::default()
///     .with_max_iterations(20_000)
///     .with_seed(1)
///     .with_add_policy(AddPolicy::Exclusive)
///     .with_chains(4);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SearchConfig {
    /// Number of mutate/validate/score iterations per chain.
    pub max_iterations: usize,

    /// Random seed for reproducibility. `None` draws one at start; the
    /// drawn seed is reported in the result.
    pub seed: Option<u64>,

    /// Which videos the Add move may insert.
    pub add_policy: AddPolicy,

    /// Score is sampled into the result history every this many
    /// iterations.
    pub history_interval: usize,

    /// Independent chains for [`run_chains`](super::run_chains).
    pub chains: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_iterations: 100_000,
            seed: None,
            add_policy: AddPolicy::default(),
            history_interval: 1_000,
            chains: 1,
        }
    }
}

impl SearchConfig {
    pub fn with_max_iterations(mut self, n: usize) -> Self {
        self.max_iterations = n;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_add_policy(mut self, policy: AddPolicy) -> Self {
        self.add_policy = policy;
        self
    }

    pub fn with_history_interval(mut self, n: usize) -> Self {
        self.history_interval = n;
        self
    }

    pub fn with_chains(mut self, n: usize) -> Self {
        self.chains = n;
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.history_interval == 0 {
            return Err(ConfigError::ZeroHistoryInterval);
        }
        if self.chains == 0 {
            return Err(ConfigError::ZeroChains);
        }
        Ok(())
    }
}
