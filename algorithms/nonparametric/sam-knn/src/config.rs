use std::fmt::{Display, Formatter};
use std::str::FromStr;

use k_nn::Weighting;
use thiserror::Error;

#[cfg(feature = "serde")]
use serde_crate::{Deserialize, Serialize};

/// Errors raised while building a [`SamKnnConfig`].
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Unrecognised hyperparameter '{0}'")]
    UnknownKey(String),

    #[error("Hyperparameter '{0}' given more than once")]
    DuplicateKey(String),

    #[error("Invalid value '{value}' for '{key}': {reason}")]
    InvalidValue { key: String, value: String, reason: String },

    #[error("n_neighbors must be at least 1")]
    InvalidNeighbors,

    #[error("max_size must be at least 1")]
    InvalidMaxSize,

    #[error("ltm_size_proportion must lie in [0, 1), got {0}")]
    InvalidLtmProportion(f64),

    #[error("min_stm_size must be at least 1 when the STM size is adapted")]
    InvalidMinStmSize,
}

/// How the short-term memory picks its own length after every sample.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate", rename_all = "snake_case")
)]
pub enum StmSizeAdaption {
    /// The STM only shrinks when the memory budget is exhausted.
    None,
    /// Evaluate every window size in steps of `min_stm_size`.
    MaxAcc,
    /// Evaluate the window halvings `n, n/2, n/4, ...`.
    #[default]
    MaxAccApprox,
}

impl FromStr for StmSizeAdaption {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .chars()
            .filter(|c| *c != '_' && *c != '-')
            .collect::<String>()
            .to_ascii_lowercase();
        match normalized.as_str() {
            "none" | "" => Ok(StmSizeAdaption::None),
            "maxacc" => Ok(StmSizeAdaption::MaxAcc),
            "maxaccapprox" => Ok(StmSizeAdaption::MaxAccApprox),
            _ => Err("expected one of 'none', 'max_acc', 'max_acc_approx'".to_string()),
        }
    }
}

impl Display for StmSizeAdaption {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            StmSizeAdaption::None => write!(f, "none"),
            StmSizeAdaption::MaxAcc => write!(f, "max_acc"),
            StmSizeAdaption::MaxAccApprox => write!(f, "max_acc_approx"),
        }
    }
}

/// Hyperparameters of the SAM-kNN classifier.
///
/// Every field is fixed once the classifier is built.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate", deny_unknown_fields, default)
)]
pub struct SamKnnConfig {
    /// Number of neighbours consulted by every vote.
    pub n_neighbors: usize,
    /// Upper bound on the samples held by the STM and LTM together.
    pub max_size: usize,
    /// How neighbour labels are combined.
    pub weighting: Weighting,
    /// Strategy used to shrink the STM after a concept change.
    pub stm_size_adaption: StmSizeAdaption,
    /// Keep knowledge evicted from the STM in a compressed long-term memory.
    pub use_ltm: bool,
    /// Share of `max_size` reserved for the LTM.
    pub ltm_size_proportion: f64,
    /// The STM is never adapted below this many samples.
    pub min_stm_size: usize,
}

impl Default for SamKnnConfig {
    fn default() -> Self {
        Self {
            n_neighbors: 5,
            max_size: 5000,
            weighting: Weighting::Distance,
            stm_size_adaption: StmSizeAdaption::MaxAccApprox,
            use_ltm: true,
            ltm_size_proportion: 0.4,
            min_stm_size: 50,
        }
    }
}

impl SamKnnConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_n_neighbors(mut self, n_neighbors: usize) -> Self {
        self.n_neighbors = n_neighbors;
        self
    }

    pub fn with_max_size(mut self, max_size: usize) -> Self {
        self.max_size = max_size;
        self
    }

    pub fn with_weighting(mut self, weighting: Weighting) -> Self {
        self.weighting = weighting;
        self
    }

    pub fn with_stm_size_adaption(mut self, adaption: StmSizeAdaption) -> Self {
        self.stm_size_adaption = adaption;
        self
    }

    pub fn with_ltm(mut self, use_ltm: bool) -> Self {
        self.use_ltm = use_ltm;
        self
    }

    pub fn with_ltm_size_proportion(mut self, proportion: f64) -> Self {
        self.ltm_size_proportion = proportion;
        self
    }

    pub fn with_min_stm_size(mut self, min_stm_size: usize) -> Self {
        self.min_stm_size = min_stm_size;
        self
    }

    /// Builds a configuration from `(key, value)` string pairs.
    ///
    /// Keys missing from `params` keep their default. Both the snake_case
    /// field names and the legacy camelCase names (`nNeighbours`, `maxSize`,
    /// `knnWeights`, `STMSizeAdaption`, `useLTM`, `LTMSizeProportion`,
    /// `minSTMSize`) are accepted; anything else is rejected.
    pub fn from_params<I, K, V>(params: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut config = Self::default();
        let mut seen: Vec<&'static str> = Vec::new();

        for (key, value) in params {
            let (key, value) = (key.as_ref(), value.as_ref().trim());
            let field = canonical_key(key).ok_or_else(|| ConfigError::UnknownKey(key.to_string()))?;
            if seen.contains(&field) {
                return Err(ConfigError::DuplicateKey(field.to_string()));
            }
            seen.push(field);

            let invalid = |reason: String| ConfigError::InvalidValue {
                key: key.to_string(),
                value: value.to_string(),
                reason,
            };
            match field {
                "n_neighbors" => config.n_neighbors = value.parse().map_err(|e| invalid(format!("{e}")))?,
                "max_size" => config.max_size = value.parse().map_err(|e| invalid(format!("{e}")))?,
                "weighting" => config.weighting = value.parse().map_err(|e| invalid(format!("{e}")))?,
                "stm_size_adaption" => config.stm_size_adaption = value.parse().map_err(invalid)?,
                "use_ltm" => config.use_ltm = parse_bool(value).ok_or_else(|| invalid("expected a boolean".into()))?,
                "ltm_size_proportion" => {
                    config.ltm_size_proportion = value.parse().map_err(|e| invalid(format!("{e}")))?
                }
                "min_stm_size" => config.min_stm_size = value.parse().map_err(|e| invalid(format!("{e}")))?,
                _ => return Err(ConfigError::UnknownKey(key.to_string())),
            }
        }

        config.validate()?;
        Ok(config)
    }

    /// Checks that the hyperparameters describe a usable classifier.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.n_neighbors == 0 {
            return Err(ConfigError::InvalidNeighbors);
        }
        if self.max_size == 0 {
            return Err(ConfigError::InvalidMaxSize);
        }
        if !(0.0..1.0).contains(&self.ltm_size_proportion) {
            return Err(ConfigError::InvalidLtmProportion(self.ltm_size_proportion));
        }
        if self.stm_size_adaption != StmSizeAdaption::None && self.min_stm_size == 0 {
            return Err(ConfigError::InvalidMinStmSize);
        }
        Ok(())
    }

    /// Number of samples the LTM may hold before it is compressed.
    pub fn max_ltm_size(&self) -> usize {
        (self.ltm_size_proportion * self.max_size as f64).floor() as usize
    }

    /// Share of `max_size` left for the STM.
    pub fn max_stm_size(&self) -> usize {
        self.max_size - self.max_ltm_size()
    }
}

fn canonical_key(key: &str) -> Option<&'static str> {
    match key {
        "n_neighbors" | "nNeighbours" | "n_neighbours" => Some("n_neighbors"),
        "max_size" | "maxSize" | "max_window_size" => Some("max_size"),
        "weighting" | "knnWeights" | "weights" => Some("weighting"),
        "stm_size_adaption" | "STMSizeAdaption" | "stm_size_option" => Some("stm_size_adaption"),
        "use_ltm" | "useLTM" => Some("use_ltm"),
        "ltm_size_proportion" | "LTMSizeProportion" | "ltm_size" => Some("ltm_size_proportion"),
        "min_stm_size" | "minSTMSize" => Some("min_stm_size"),
        _ => None,
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Some(true),
        "false" | "0" | "no" => Some(false),
        _ => None,
    }
}
