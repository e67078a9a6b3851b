use anyhow::{Context, Result};
use std::env;

pub const ENV_VAR_SCRATCH_CAPACITY: &str = "TESSERA_SCRATCH_CAPACITY";

/// Upper bound of a single registry-level encode, in bytes.
pub const DEFAULT_SCRATCH_CAPACITY: usize = 8192;

#[derive(PartialEq, Eq, Clone, Debug)]
pub struct RegistryConfig {
    /// Size of the scratch region backing [`crate::Registry::encode`].
    /// Encodings that need more are degraded, not rejected.
    pub scratch_capacity: usize,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            scratch_capacity: DEFAULT_SCRATCH_CAPACITY,
        }
    }
}

impl RegistryConfig {
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        if let Ok(s) = env::var(ENV_VAR_SCRATCH_CAPACITY) {
            config.scratch_capacity = s
                .parse()
                .with_context(|| format!("{ENV_VAR_SCRATCH_CAPACITY}={s:?}"))?;
        }
        Ok(config)
    }
}
