//! Analysis options
//!
//! The recognized option set is closed: drivers construct an
//! `AnalyzeOptions` value, nothing is keyword-shaped or extensible.

use gtg_model::ValidationError;
use std::time::Duration;

/// Which cache implementation backs the run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CacheBackend {
    /// Embedded SQLite file (default)
    #[default]
    Embedded,
    /// Shared Redis instance, addressed by URL
    Remote,
    /// No caching at all
    None,
}

/// The closed option set accepted by the analyzer
#[derive(Debug, Clone)]
pub struct AnalyzeOptions {
    /// Cache backend selection
    pub cache_backend: CacheBackend,

    /// Cache location: a file path for `Embedded`, a `redis://`/`rediss://`
    /// URL for `Remote`; `None` means the backend default
    pub cache_location: Option<String>,

    /// State store location (file path); `None` means the default
    pub state_location: Option<String>,

    /// CI check names to exclude from the roll-up (exact, case-sensitive)
    pub exclude_check_names: Vec<String>,

    /// Skip cache reads (still writes), forcing fresh data
    pub force_refresh: bool,

    /// Optional wall-clock budget for the whole analysis
    pub deadline: Option<Duration>,

    /// Timeout applied to each individual external call
    pub call_timeout: Duration,
}

impl Default for AnalyzeOptions {
    fn default() -> Self {
        AnalyzeOptions {
            cache_backend: CacheBackend::default(),
            cache_location: None,
            state_location: None,
            exclude_check_names: Vec::new(),
            force_refresh: false,
            deadline: None,
            call_timeout: Duration::from_secs(10),
        }
    }
}

impl AnalyzeOptions {
    /// Check cross-field preconditions
    ///
    /// A zero deadline or call timeout is rejected, as is a cache location
    /// that does not fit the selected backend.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.deadline == Some(Duration::ZERO) {
            return Err(ValidationError::Options(
                "deadline must be positive".to_string(),
            ));
        }
        if self.call_timeout == Duration::ZERO {
            return Err(ValidationError::Options(
                "call timeout must be positive".to_string(),
            ));
        }

        let is_url = self
            .cache_location
            .as_deref()
            .map(|loc| loc.starts_with("redis://") || loc.starts_with("rediss://"))
            .unwrap_or(false);

        match self.cache_backend {
            CacheBackend::Remote => {
                if self.cache_location.is_none() {
                    return Err(ValidationError::Options(
                        "remote cache backend requires a redis URL".to_string(),
                    ));
                }
                if !is_url {
                    return Err(ValidationError::Options(
                        "remote cache location must be a redis:// or rediss:// URL".to_string(),
                    ));
                }
            }
            CacheBackend::Embedded | CacheBackend::None => {
                if is_url {
                    return Err(ValidationError::Options(
                        "redis URL given but cache backend is not remote".to_string(),
                    ));
                }
            }
        }

        Ok(())
    }
}
