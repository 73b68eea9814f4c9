//! Configuration loading, validation, and management for evflat.
//!
//! Loads the producer configuration from `evflat.toml` (or the path in
//! `EVFLAT_CONFIG`) with environment variable overrides. Validates all
//! settings before any event is processed.

use evflat_core::{InputTag, ObjectKind};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// The root configuration structure.
///
/// Maps directly to `evflat.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProducerConfig {
    /// General producer settings
    #[serde(default)]
    pub producer: ProducerSection,

    /// Input tags of the products read from each event
    #[serde(default)]
    pub inputs: InputTags,

    /// Per-kind storage capacities
    #[serde(default)]
    pub capacities: CapacityConfig,

    /// Trigger paths recorded in every row, in column order
    #[serde(default = "default_triggers")]
    pub triggers: Vec<TriggerConfig>,

    /// Filter flags recorded in every row, in column order
    #[serde(default = "default_filters")]
    pub filters: Vec<FilterConfig>,

    /// Output settings
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProducerSection {
    /// Real data carries no generator-level truth; generator jets are skipped.
    #[serde(default)]
    pub is_data: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputTags {
    #[serde(default = "default_trigger_results")]
    pub trigger_results: InputTag,

    #[serde(default = "default_filter_results")]
    pub filter_results: InputTag,

    #[serde(default = "default_vertices")]
    pub vertices: InputTag,

    #[serde(default = "default_tracks")]
    pub tracks: InputTag,

    #[serde(default = "default_genjets")]
    pub genjets: InputTag,

    #[serde(default = "default_pileup_density")]
    pub pileup_density: InputTag,
}

fn default_trigger_results() -> InputTag {
    "TriggerResults::HLT".into()
}
fn default_filter_results() -> InputTag {
    "TriggerResults::RECO".into()
}
fn default_vertices() -> InputTag {
    "offlinePrimaryVertices".into()
}
fn default_tracks() -> InputTag {
    "generalTracks".into()
}
fn default_genjets() -> InputTag {
    "ak4GenJets".into()
}
fn default_pileup_density() -> InputTag {
    "fixedGridRhoFastjetAll".into()
}

impl Default for InputTags {
    fn default() -> Self {
        Self {
            trigger_results: default_trigger_results(),
            filter_results: default_filter_results(),
            vertices: default_vertices(),
            tracks: default_tracks(),
            genjets: default_genjets(),
            pileup_density: default_pileup_density(),
        }
    }
}

/// Capacities as written in the file. Signed so that a negative value is
/// reported as such instead of failing to parse.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CapacityConfig {
    #[serde(default = "default_vertex_capacity")]
    pub vertices: i64,

    #[serde(default = "default_track_capacity")]
    pub tracks: i64,

    #[serde(default = "default_genjet_capacity")]
    pub genjets: i64,
}

fn default_vertex_capacity() -> i64 {
    3
}
fn default_track_capacity() -> i64 {
    10
}
fn default_genjet_capacity() -> i64 {
    4
}

impl Default for CapacityConfig {
    fn default() -> Self {
        Self {
            vertices: default_vertex_capacity(),
            tracks: default_track_capacity(),
            genjets: default_genjet_capacity(),
        }
    }
}

/// Validated per-kind capacities.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capacities {
    pub vertices: usize,
    pub tracks: usize,
    pub genjets: usize,
}

impl Capacities {
    pub fn for_kind(&self, kind: ObjectKind) -> usize {
        match kind {
            ObjectKind::Vertex => self.vertices,
            ObjectKind::Track => self.tracks,
            ObjectKind::GenJet => self.genjets,
        }
    }
}

impl CapacityConfig {
    /// Convert to unsigned capacities, rejecting negative values.
    pub fn resolve(&self) -> Result<Capacities, ConfigError> {
        let check = |kind: ObjectKind, value: i64| {
            usize::try_from(value).map_err(|_| ConfigError::NegativeCapacity { kind, value })
        };
        Ok(Capacities {
            vertices: check(ObjectKind::Vertex, self.vertices)?,
            tracks: check(ObjectKind::Track, self.tracks)?,
            genjets: check(ObjectKind::GenJet, self.genjets)?,
        })
    }
}

/// A trigger path to record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggerConfig {
    /// Column name in the output row (e.g. `dijet_170`)
    pub name: String,

    /// Exact menu name, or a regex matched from the start of the menu name
    pub pattern: String,

    /// Whether to query the prescale of this path each event
    #[serde(default)]
    pub record_prescale: bool,
}

impl TriggerConfig {
    pub fn new(name: impl Into<String>, pattern: impl Into<String>, record_prescale: bool) -> Self {
        Self {
            name: name.into(),
            pattern: pattern.into(),
            record_prescale,
        }
    }
}

/// A filter flag to record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterConfig {
    /// Column name in the output row (e.g. `hbhe_noise`)
    pub name: String,

    /// Name (or pattern) of the flag in the filter-results menu
    pub flag: String,
}

impl FilterConfig {
    pub fn new(name: impl Into<String>, flag: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            flag: flag.into(),
        }
    }
}

fn default_triggers() -> Vec<TriggerConfig> {
    vec![
        TriggerConfig::new("dijet_170_0p1", r"HLT_DiCentralPFJet170_CFMax0p1_v\d+$", false),
        TriggerConfig::new("dijet_220_0p3", r"HLT_DiCentralPFJet220_CFMax0p3_v\d+$", false),
        TriggerConfig::new("dijet_330_0p5", r"HLT_DiCentralPFJet330_CFMax0p5_v\d+$", false),
        TriggerConfig::new("dijet_430", r"HLT_DiCentralPFJet430_v\d+$", false),
        TriggerConfig::new("dijet_170", r"HLT_DiCentralPFJet170_v\d+$", true),
        TriggerConfig::new("singlejet_170_0p1", r"HLT_SingleCentralPFJet170_CFMax0p1_v\d+$", true),
        TriggerConfig::new("photon_120", r"HLT_Photon120_v\d+$", true),
        TriggerConfig::new("photon_175", r"HLT_Photon175_v\d+$", true),
        TriggerConfig::new("singlejet_450", r"HLT_PFJet450_v\d+$", false),
        TriggerConfig::new("singlejet_500", r"HLT_PFJet500_v\d+$", false),
        TriggerConfig::new("isomu24", r"HLT_IsoMu24_v\d+$", false),
        TriggerConfig::new("isomu27", r"HLT_IsoMu27_v\d+$", false),
    ]
}

fn default_filters() -> Vec<FilterConfig> {
    vec![
        FilterConfig::new("hbhe_noise", "Flag_HBHENoiseFilter"),
        FilterConfig::new("hbhe_noise_iso", "Flag_HBHENoiseIsoFilter"),
        FilterConfig::new("ecal_dead_cell", "Flag_EcalDeadCellTriggerPrimitiveFilter"),
        FilterConfig::new("good_vertices", "Flag_goodVertices"),
        FilterConfig::new("ee_bad_sc", "Flag_eeBadScFilter"),
        FilterConfig::new("beam_halo", "Flag_globalTightHalo2016Filter"),
    ]
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Destination of the JSON-lines row file
    #[serde(default = "default_output_path")]
    pub path: String,

    /// Flush the sink every N rows (0 = only at the end of the job)
    #[serde(default = "default_flush_every")]
    pub flush_every: usize,
}

fn default_output_path() -> String {
    "rows.jsonl".into()
}
fn default_flush_every() -> usize {
    1000
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: default_output_path(),
            flush_every: default_flush_every(),
        }
    }
}

impl ProducerConfig {
    /// Load configuration from the default location.
    ///
    /// The path is `EVFLAT_CONFIG` if set, otherwise `./evflat.toml`.
    /// Environment overrides applied afterwards:
    /// - `EVFLAT_OUTPUT` replaces `output.path`
    /// - `EVFLAT_IS_DATA` (`true`/`false`) replaces `producer.is_data`
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::load_from(&Self::default_path())?;
        config.apply_env_overrides()?;
        Ok(config)
    }

    /// Apply `EVFLAT_OUTPUT` and `EVFLAT_IS_DATA` on top of a loaded file.
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        self.apply_overrides(
            std::env::var("EVFLAT_OUTPUT").ok(),
            std::env::var("EVFLAT_IS_DATA").ok().as_deref(),
        )
    }

    fn apply_overrides(&mut self, output: Option<String>, is_data: Option<&str>) -> Result<(), ConfigError> {
        if let Some(path) = output {
            self.output.path = path;
        }

        if let Some(value) = is_data {
            self.producer.is_data = value.parse().map_err(|_| {
                ConfigError::ValidationError(format!(
                    "EVFLAT_IS_DATA must be 'true' or 'false', got '{value}'"
                ))
            })?;
        }

        self.validate()
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config = Self::from_toml(&content).map_err(|e| match e {
            ConfigError::ParseError { reason, .. } => ConfigError::ParseError {
                path: path.to_path_buf(),
                reason,
            },
            other => other,
        })?;

        tracing::debug!(
            path = %path.display(),
            triggers = config.triggers.len(),
            filters = config.filters.len(),
            "Configuration loaded"
        );
        Ok(config)
    }

    /// Parse and validate configuration from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content).map_err(|e| ConfigError::ParseError {
            path: PathBuf::from("<inline>"),
            reason: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// `EVFLAT_CONFIG`, or `evflat.toml` in the working directory.
    pub fn default_path() -> PathBuf {
        std::env::var("EVFLAT_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("evflat.toml"))
    }

    /// Validated capacities.
    pub fn capacities(&self) -> Result<Capacities, ConfigError> {
        self.capacities.resolve()
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.capacities.resolve()?;

        check_names("trigger", self.triggers.iter().map(|t| t.name.as_str()))?;
        check_names("filter", self.filters.iter().map(|f| f.name.as_str()))?;

        if let Some(t) = self.triggers.iter().find(|t| t.pattern.is_empty()) {
            return Err(ConfigError::ValidationError(format!(
                "trigger '{}' has an empty pattern",
                t.name
            )));
        }
        if let Some(f) = self.filters.iter().find(|f| f.flag.is_empty()) {
            return Err(ConfigError::ValidationError(format!(
                "filter '{}' has an empty flag name",
                f.name
            )));
        }

        if self.output.path.is_empty() {
            return Err(ConfigError::ValidationError("output.path cannot be empty".into()));
        }

        Ok(())
    }

    /// Generate a default config TOML string (for the `init` command).
    pub fn default_toml() -> String {
        let config = Self::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

fn check_names<'a>(what: &str, names: impl Iterator<Item = &'a str>) -> Result<(), ConfigError> {
    let mut seen = HashSet::new();
    for (position, name) in names.enumerate() {
        if name.is_empty() {
            return Err(ConfigError::ValidationError(format!(
                "{what} at position {position} has an empty name"
            )));
        }
        if !seen.insert(name) {
            return Err(ConfigError::ValidationError(format!(
                "duplicate {what} name '{name}'"
            )));
        }
    }
    Ok(())
}

impl Default for ProducerConfig {
    fn default() -> Self {
        Self {
            producer: ProducerSection::default(),
            inputs: InputTags::default(),
            capacities: CapacityConfig::default(),
            triggers: default_triggers(),
            filters: default_filters(),
            output: OutputConfig::default(),
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Capacity for {kind} must be non-negative, got {value}")]
    NegativeCapacity { kind: ObjectKind, value: i64 },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

impl From<ConfigError> for evflat_core::Error {
    fn from(e: ConfigError) -> Self {
        evflat_core::Error::Config {
            message: e.to_string(),
        }
    }
}
