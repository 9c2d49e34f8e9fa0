// scangate-config/src/config.rs
// ============================================================================
// Module: Scangate Configuration
// Description: Configuration loading and validation for the gateway.
// Purpose: Provide strict, fail-closed config parsing with hard limits.
// Dependencies: serde, toml
// ============================================================================

//! ## Overview
//! Configuration is loaded from a TOML file with strict size limits. An
//! explicitly named file must exist and validate; when no file is named and
//! the default is absent, documented defaults apply. Every numeric bound is
//! checked against a named hard limit so a typo cannot widen the gateway's
//! envelope.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::env;
use std::fs;
use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default configuration filename when no path is specified.
const DEFAULT_CONFIG_NAME: &str = "scangate.toml";
/// Environment variable used to override the config path.
pub(crate) const CONFIG_ENV_VAR: &str = "SCANGATE_CONFIG";
/// Maximum configuration file size in bytes.
pub(crate) const MAX_CONFIG_FILE_SIZE: usize = 1024 * 1024;
/// Maximum admissions per (user, operation) per rolling hour.
pub(crate) const MAX_RATE_CEILING: u32 = 10_000;
/// Default admissions per (user, operation) per rolling hour.
pub(crate) const DEFAULT_RATE_CEILING: u32 = 10;
/// Maximum addresses one network target may span.
pub(crate) const MAX_TARGET_HOSTS: u64 = 65_536;
/// Default addresses one network target may span.
pub(crate) const DEFAULT_TARGET_HOSTS: u64 = 256;
/// Maximum ports one port-scan request may cover.
pub(crate) const MAX_PORT_CEILING: u32 = 65_535;
/// Default port ceiling.
pub(crate) const DEFAULT_PORT_CEILING: u32 = 1000;
/// Maximum hosts one vulnerability scan may sweep.
pub(crate) const MAX_VULN_HOSTS: u32 = 4096;
/// Default vulnerability-scan host ceiling.
pub(crate) const DEFAULT_VULN_HOSTS: u32 = 16;
/// Maximum result rows a memory analysis may request.
pub(crate) const MAX_MEM_ROWS: u32 = 1_000_000;
/// Default memory-analysis row ceiling.
pub(crate) const DEFAULT_MEM_ROWS: u32 = 10_000;
/// Maximum directory depth a disk analysis may request.
pub(crate) const MAX_DISK_DEPTH: u32 = 255;
/// Default disk-analysis depth ceiling.
pub(crate) const DEFAULT_DISK_DEPTH: u32 = 16;
/// Minimum engine timeout in seconds.
pub(crate) const MIN_TIMEOUT_SECS: u64 = 1;
/// Maximum engine timeout in seconds.
pub(crate) const MAX_TIMEOUT_SECS: u64 = 86_400;
/// Default port-scan timeout in seconds.
pub(crate) const DEFAULT_PORTSCAN_TIMEOUT_SECS: u64 = 600;
/// Default vulnerability-scan timeout in seconds.
pub(crate) const DEFAULT_VULNSCAN_TIMEOUT_SECS: u64 = 3600;
/// Default forensics timeout in seconds.
pub(crate) const DEFAULT_FORENSICS_TIMEOUT_SECS: u64 = 1800;
/// Maximum engine packet/check rate per second.
pub(crate) const MAX_PACKET_RATE: u32 = 100_000;
/// Default port-scan packet rate per second.
pub(crate) const DEFAULT_PORTSCAN_PACKET_RATE: u32 = 100;
/// Default vulnerability-scan check rate per second.
pub(crate) const DEFAULT_VULNSCAN_CHECK_RATE: u32 = 50;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors raised while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("config io error: {0}")]
    Io(String),
    /// The config file could not be parsed.
    #[error("config parse error: {0}")]
    Parse(String),
    /// A config value violates a limit or cross-field rule.
    #[error("invalid config: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Configuration Types
// ============================================================================

/// Scangate gateway configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScangateConfig {
    /// Authentication settings.
    #[serde(default)]
    pub auth: AuthConfig,
    /// Policy file locations.
    #[serde(default)]
    pub policy: PolicyConfig,
    /// Rate limiter settings.
    #[serde(default)]
    pub rate: RateConfig,
    /// Audit sink settings.
    #[serde(default)]
    pub audit: AuditConfig,
    /// Result sealing settings.
    #[serde(default)]
    pub seal: SealConfig,
    /// Result and evidence directories.
    #[serde(default)]
    pub results: ResultsConfig,
    /// Engine binary locations.
    #[serde(default)]
    pub engines: EnginesConfig,
    /// Network target bounds.
    #[serde(default)]
    pub target: TargetConfig,
    /// Port-scan class bounds.
    #[serde(default)]
    pub portscan: PortScanConfig,
    /// Vulnerability-scan class bounds.
    #[serde(default)]
    pub vulnscan: VulnScanConfig,
    /// Memory-forensics class bounds.
    #[serde(default)]
    pub memscan: MemScanConfig,
    /// Disk-forensics class bounds.
    #[serde(default)]
    pub diskscan: DiskScanConfig,
}

impl ScangateConfig {
    /// Loads configuration using the default resolution rules.
    ///
    /// An explicit path (argument or `SCANGATE_CONFIG`) must exist. When no
    /// path is given and `scangate.toml` is absent, defaults apply.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when loading or validation fails.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let env_override = env::var(CONFIG_ENV_VAR).ok().map(PathBuf::from);
        let (resolved, required) = match (path, env_override) {
            (Some(explicit), _) => (explicit.to_path_buf(), true),
            (None, Some(from_env)) => (from_env, true),
            (None, None) => (PathBuf::from(DEFAULT_CONFIG_NAME), false),
        };
        if !resolved.exists() {
            if required {
                return Err(ConfigError::Io(format!(
                    "config file not found: {}",
                    resolved.display()
                )));
            }
            let mut config = Self::default();
            config.validate()?;
            return Ok(config);
        }
        let bytes = fs::read(&resolved).map_err(|err| ConfigError::Io(err.to_string()))?;
        if bytes.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let content = std::str::from_utf8(&bytes)
            .map_err(|_| ConfigError::Invalid("config file must be utf-8".to_string()))?;
        let mut config: Self =
            toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when configuration is invalid.
    pub fn validate(&mut self) -> Result<(), ConfigError> {
        self.auth.validate()?;
        self.rate.validate()?;
        self.audit.validate()?;
        self.seal.validate()?;
        self.target.validate()?;
        self.portscan.validate()?;
        self.vulnscan.validate()?;
        self.memscan.validate()?;
        self.diskscan.validate()?;
        Ok(())
    }
}

/// Authentication settings.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// Whether credential verification is required.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Credential file location.
    #[serde(default = "default_credentials_file")]
    pub credentials_file: PathBuf,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            credentials_file: default_credentials_file(),
        }
    }
}

impl AuthConfig {
    /// Validates authentication settings.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.enabled && self.credentials_file.as_os_str().is_empty() {
            return Err(ConfigError::Invalid(
                "auth.credentials_file must be set when auth.enabled".to_string(),
            ));
        }
        Ok(())
    }
}

/// Policy file locations. Absent files fall back to built-in lists.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PolicyConfig {
    /// Authorized-user list path.
    #[serde(default)]
    pub users_file: Option<PathBuf>,
    /// Allow-list path.
    #[serde(default)]
    pub allow_file: Option<PathBuf>,
    /// Deny-list path.
    #[serde(default)]
    pub deny_file: Option<PathBuf>,
}

/// Rate limiter settings. The window is fixed at one rolling hour.
#[derive(Debug, Clone, Deserialize)]
pub struct RateConfig {
    /// Admissions per (user, operation) per window.
    #[serde(default = "default_rate_ceiling")]
    pub ceiling: u32,
}

impl Default for RateConfig {
    fn default() -> Self {
        Self {
            ceiling: DEFAULT_RATE_CEILING,
        }
    }
}

impl RateConfig {
    /// Validates rate limiter settings.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.ceiling == 0 {
            return Err(ConfigError::Invalid("rate.ceiling must be at least 1".to_string()));
        }
        if self.ceiling > MAX_RATE_CEILING {
            return Err(ConfigError::Invalid(format!(
                "rate.ceiling exceeds maximum {MAX_RATE_CEILING}"
            )));
        }
        Ok(())
    }
}

/// Audit sink selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditSinkKind {
    /// Hash-chained append-only file.
    File,
    /// JSON lines on standard error (diagnostics only).
    Stderr,
}

/// Audit sink settings.
#[derive(Debug, Clone, Deserialize)]
pub struct AuditConfig {
    /// Sink kind.
    #[serde(default = "default_audit_sink")]
    pub sink: AuditSinkKind,
    /// Audit log path for the file sink.
    #[serde(default = "default_audit_path")]
    pub path: PathBuf,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            sink: AuditSinkKind::File,
            path: default_audit_path(),
        }
    }
}

impl AuditConfig {
    /// Validates audit settings.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.sink == AuditSinkKind::File && self.path.as_os_str().is_empty() {
            return Err(ConfigError::Invalid(
                "audit.path must be set for the file sink".to_string(),
            ));
        }
        Ok(())
    }
}

/// Result sealing settings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SealConfig {
    /// Whether artifacts are sealed after each run.
    #[serde(default)]
    pub enabled: bool,
    /// Base64 key material inline in the config.
    #[serde(default)]
    pub key: Option<String>,
    /// File holding base64 key material.
    #[serde(default)]
    pub key_file: Option<PathBuf>,
}

impl SealConfig {
    /// Validates sealing settings.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.key.is_some() && self.key_file.is_some() {
            return Err(ConfigError::Invalid(
                "seal.key and seal.key_file are mutually exclusive".to_string(),
            ));
        }
        Ok(())
    }

    /// Resolves the configured key material, reading the key file if named.
    ///
    /// Returns `None` when no key is configured.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] when the key file cannot be read.
    pub fn key_material(&self) -> Result<Option<String>, ConfigError> {
        if let Some(inline) = &self.key {
            return Ok(Some(inline.clone()));
        }
        match &self.key_file {
            None => Ok(None),
            Some(path) => {
                let text = fs::read_to_string(path).map_err(|err| {
                    ConfigError::Io(format!("seal.key_file: {}: {err}", path.display()))
                })?;
                Ok(Some(text.trim().to_string()))
            }
        }
    }
}

/// Result and evidence directories.
#[derive(Debug, Clone, Deserialize)]
pub struct ResultsConfig {
    /// Directory receiving engine artifacts.
    #[serde(default = "default_results_dir")]
    pub dir: PathBuf,
    /// Root directory forensic evidence images must live under.
    #[serde(default)]
    pub evidence_dir: Option<PathBuf>,
}

impl Default for ResultsConfig {
    fn default() -> Self {
        Self {
            dir: default_results_dir(),
            evidence_dir: None,
        }
    }
}

/// Engine binary locations.
#[derive(Debug, Clone, Deserialize)]
pub struct EnginesConfig {
    /// Port scanner binary.
    #[serde(default = "default_portscan_engine")]
    pub portscan: PathBuf,
    /// Vulnerability scanner binary.
    #[serde(default = "default_vulnscan_engine")]
    pub vulnscan: PathBuf,
    /// Memory forensics binary.
    #[serde(default = "default_memscan_engine")]
    pub memscan: PathBuf,
    /// Disk forensics binary.
    #[serde(default = "default_diskscan_engine")]
    pub diskscan: PathBuf,
}

impl Default for EnginesConfig {
    fn default() -> Self {
        Self {
            portscan: default_portscan_engine(),
            vulnscan: default_vulnscan_engine(),
            memscan: default_memscan_engine(),
            diskscan: default_diskscan_engine(),
        }
    }
}

/// Network target bounds.
#[derive(Debug, Clone, Deserialize)]
pub struct TargetConfig {
    /// Maximum addresses one network target may span.
    #[serde(default = "default_target_hosts")]
    pub max_hosts: u64,
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            max_hosts: DEFAULT_TARGET_HOSTS,
        }
    }
}

impl TargetConfig {
    /// Validates target bounds.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.max_hosts == 0 {
            return Err(ConfigError::Invalid("target.max_hosts must be at least 1".to_string()));
        }
        if self.max_hosts > MAX_TARGET_HOSTS {
            return Err(ConfigError::Invalid(format!(
                "target.max_hosts exceeds maximum {MAX_TARGET_HOSTS}"
            )));
        }
        Ok(())
    }
}

/// Port-scan class bounds.
#[derive(Debug, Clone, Deserialize)]
pub struct PortScanConfig {
    /// Maximum ports one request may cover.
    #[serde(default = "default_port_ceiling")]
    pub max_ports: u32,
    /// Absolute engine timeout in seconds.
    #[serde(default = "default_portscan_timeout")]
    pub timeout_secs: u64,
    /// Engine packet-rate ceiling in packets per second.
    #[serde(default = "default_portscan_rate")]
    pub packet_rate_ceiling: u32,
}

impl Default for PortScanConfig {
    fn default() -> Self {
        Self {
            max_ports: DEFAULT_PORT_CEILING,
            timeout_secs: DEFAULT_PORTSCAN_TIMEOUT_SECS,
            packet_rate_ceiling: DEFAULT_PORTSCAN_PACKET_RATE,
        }
    }
}

impl PortScanConfig {
    /// Validates port-scan bounds.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.max_ports == 0 || self.max_ports > MAX_PORT_CEILING {
            return Err(ConfigError::Invalid(format!(
                "portscan.max_ports must be in 1..={MAX_PORT_CEILING}"
            )));
        }
        validate_timeout("portscan.timeout_secs", self.timeout_secs)?;
        validate_packet_rate("portscan.packet_rate_ceiling", self.packet_rate_ceiling)
    }
}

/// Vulnerability-scan class bounds.
#[derive(Debug, Clone, Deserialize)]
pub struct VulnScanConfig {
    /// Maximum hosts one scan may sweep.
    #[serde(default = "default_vuln_hosts")]
    pub max_hosts: u32,
    /// Absolute engine timeout in seconds.
    #[serde(default = "default_vulnscan_timeout")]
    pub timeout_secs: u64,
    /// Engine check-rate ceiling in checks per second.
    #[serde(default = "default_vulnscan_rate")]
    pub packet_rate_ceiling: u32,
}

impl Default for VulnScanConfig {
    fn default() -> Self {
        Self {
            max_hosts: DEFAULT_VULN_HOSTS,
            timeout_secs: DEFAULT_VULNSCAN_TIMEOUT_SECS,
            packet_rate_ceiling: DEFAULT_VULNSCAN_CHECK_RATE,
        }
    }
}

impl VulnScanConfig {
    /// Validates vulnerability-scan bounds.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.max_hosts == 0 || self.max_hosts > MAX_VULN_HOSTS {
            return Err(ConfigError::Invalid(format!(
                "vulnscan.max_hosts must be in 1..={MAX_VULN_HOSTS}"
            )));
        }
        validate_timeout("vulnscan.timeout_secs", self.timeout_secs)?;
        validate_packet_rate("vulnscan.packet_rate_ceiling", self.packet_rate_ceiling)
    }
}

/// Memory-forensics class bounds.
#[derive(Debug, Clone, Deserialize)]
pub struct MemScanConfig {
    /// Maximum result rows one analysis may request.
    #[serde(default = "default_mem_rows")]
    pub max_rows: u32,
    /// Absolute engine timeout in seconds.
    #[serde(default = "default_forensics_timeout")]
    pub timeout_secs: u64,
}

impl Default for MemScanConfig {
    fn default() -> Self {
        Self {
            max_rows: DEFAULT_MEM_ROWS,
            timeout_secs: DEFAULT_FORENSICS_TIMEOUT_SECS,
        }
    }
}

impl MemScanConfig {
    /// Validates memory-forensics bounds.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.max_rows == 0 || self.max_rows > MAX_MEM_ROWS {
            return Err(ConfigError::Invalid(format!(
                "memscan.max_rows must be in 1..={MAX_MEM_ROWS}"
            )));
        }
        validate_timeout("memscan.timeout_secs", self.timeout_secs)
    }
}

/// Disk-forensics class bounds.
#[derive(Debug, Clone, Deserialize)]
pub struct DiskScanConfig {
    /// Maximum directory depth one analysis may request.
    #[serde(default = "default_disk_depth")]
    pub max_depth: u32,
    /// Absolute engine timeout in seconds.
    #[serde(default = "default_forensics_timeout")]
    pub timeout_secs: u64,
}

impl Default for DiskScanConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_DISK_DEPTH,
            timeout_secs: DEFAULT_FORENSICS_TIMEOUT_SECS,
        }
    }
}

impl DiskScanConfig {
    /// Validates disk-forensics bounds.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.max_depth == 0 || self.max_depth > MAX_DISK_DEPTH {
            return Err(ConfigError::Invalid(format!(
                "diskscan.max_depth must be in 1..={MAX_DISK_DEPTH}"
            )));
        }
        validate_timeout("diskscan.timeout_secs", self.timeout_secs)
    }
}

// ============================================================================
// SECTION: Shared Validators
// ============================================================================

/// Checks an engine timeout against the shared bounds.
fn validate_timeout(field: &str, value: u64) -> Result<(), ConfigError> {
    if !(MIN_TIMEOUT_SECS ..= MAX_TIMEOUT_SECS).contains(&value) {
        return Err(ConfigError::Invalid(format!(
            "{field} must be in {MIN_TIMEOUT_SECS}..={MAX_TIMEOUT_SECS}"
        )));
    }
    Ok(())
}

/// Checks an engine packet/check rate against the shared bounds.
fn validate_packet_rate(field: &str, value: u32) -> Result<(), ConfigError> {
    if value == 0 || value > MAX_PACKET_RATE {
        return Err(ConfigError::Invalid(format!("{field} must be in 1..={MAX_PACKET_RATE}")));
    }
    Ok(())
}

// ============================================================================
// SECTION: Serde Defaults
// ============================================================================

/// Serde default: true.
const fn default_true() -> bool {
    true
}

/// Serde default: credential file location.
fn default_credentials_file() -> PathBuf {
    PathBuf::from("scangate-credentials.conf")
}

/// Serde default: rate ceiling.
const fn default_rate_ceiling() -> u32 {
    DEFAULT_RATE_CEILING
}

/// Serde default: audit sink kind.
const fn default_audit_sink() -> AuditSinkKind {
    AuditSinkKind::File
}

/// Serde default: audit log location.
fn default_audit_path() -> PathBuf {
    PathBuf::from("scangate-audit.log")
}

/// Serde default: results directory.
fn default_results_dir() -> PathBuf {
    PathBuf::from("scan-results")
}

/// Serde default: port scanner engine.
fn default_portscan_engine() -> PathBuf {
    PathBuf::from("/usr/bin/nmap")
}

/// Serde default: vulnerability scanner engine.
fn default_vulnscan_engine() -> PathBuf {
    PathBuf::from("/usr/bin/gvm-script")
}

/// Serde default: memory forensics engine.
fn default_memscan_engine() -> PathBuf {
    PathBuf::from("/usr/bin/vol")
}

/// Serde default: disk forensics engine.
fn default_diskscan_engine() -> PathBuf {
    PathBuf::from("/usr/bin/fls")
}

/// Serde default: target host ceiling.
const fn default_target_hosts() -> u64 {
    DEFAULT_TARGET_HOSTS
}

/// Serde default: port ceiling.
const fn default_port_ceiling() -> u32 {
    DEFAULT_PORT_CEILING
}

/// Serde default: port-scan timeout.
const fn default_portscan_timeout() -> u64 {
    DEFAULT_PORTSCAN_TIMEOUT_SECS
}

/// Serde default: port-scan packet rate.
const fn default_portscan_rate() -> u32 {
    DEFAULT_PORTSCAN_PACKET_RATE
}

/// Serde default: vulnerability host ceiling.
const fn default_vuln_hosts() -> u32 {
    DEFAULT_VULN_HOSTS
}

/// Serde default: vulnerability-scan timeout.
const fn default_vulnscan_timeout() -> u64 {
    DEFAULT_VULNSCAN_TIMEOUT_SECS
}

/// Serde default: vulnerability-scan check rate.
const fn default_vulnscan_rate() -> u32 {
    DEFAULT_VULNSCAN_CHECK_RATE
}

/// Serde default: memory row ceiling.
const fn default_mem_rows() -> u32 {
    DEFAULT_MEM_ROWS
}

/// Serde default: disk depth ceiling.
const fn default_disk_depth() -> u32 {
    DEFAULT_DISK_DEPTH
}

/// Serde default: forensics timeout.
const fn default_forensics_timeout() -> u64 {
    DEFAULT_FORENSICS_TIMEOUT_SECS
}
