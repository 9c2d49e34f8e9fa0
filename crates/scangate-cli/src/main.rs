// scangate-cli/src/main.rs
// ============================================================================
// Module: Scangate CLI Entry Point
// Description: Wrapper commands for the gated scanning and forensics tools.
// Purpose: Run the guard chain, constrain the engine, and seal results.
// Dependencies: clap, scangate-core, scangate-config, scangate-tools, scangate-seal
// ============================================================================

//! ## Overview
//! One wrapper subcommand per tool class, all funneled through the same
//! gateway: authenticate, authorize, rate-limit, validate target, build the
//! bounded descriptor, execute the engine under its timeout, and seal the
//! artifacts. Every stage decision lands in the audit log; a request that
//! cannot be audited does not run. Secrets arrive via `SCANGATE_SECRET`,
//! never argv.

// ============================================================================
// SECTION: Modules
// ============================================================================

#[cfg(test)]
mod main_tests;

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::env;
use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::Args;
use clap::Parser;
use clap::Subcommand;
use scangate_config::AuditSinkKind;
use scangate_config::ScangateConfig;
use scangate_core::AuditError;
use scangate_core::AuditEvent;
use scangate_core::AuditSink;
use scangate_core::AuthMode;
use scangate_core::Authenticator;
use scangate_core::Clearance;
use scangate_core::CorrelationId;
use scangate_core::CredentialRecord;
use scangate_core::CredentialStore;
use scangate_core::Decision;
use scangate_core::FileAuditSink;
use scangate_core::GateRequest;
use scangate_core::GateStage;
use scangate_core::Gateway;
use scangate_core::GatewayParams;
use scangate_core::PolicySources;
use scangate_core::PolicyStore;
use scangate_core::PresentedSecret;
use scangate_core::Severity;
use scangate_core::StderrAuditSink;
use scangate_core::SystemClock;
use scangate_core::TargetRequest;
use scangate_core::Username;
use scangate_core::verify_chain;
use scangate_seal::ResultSealer;
use scangate_seal::SealerMode;
use scangate_seal::decode_key;
use scangate_seal::generate_key;
use scangate_tools::DiskScanLimits;
use scangate_tools::DiskScanPolicy;
use scangate_tools::DiskScanRequest;
use scangate_tools::EnginePaths;
use scangate_tools::InvocationDescriptor;
use scangate_tools::MemScanLimits;
use scangate_tools::MemScanPolicy;
use scangate_tools::MemScanRequest;
use scangate_tools::PortScanLimits;
use scangate_tools::PortScanPolicy;
use scangate_tools::PortScanRequest;
use scangate_tools::ToolExecutor;
use scangate_tools::VulnScanLimits;
use scangate_tools::VulnScanPolicy;
use scangate_tools::VulnScanRequest;
use scangate_tools::build_command;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Environment variable carrying the presented secret.
const SECRET_ENV_VAR: &str = "SCANGATE_SECRET";

// ============================================================================
// SECTION: CLI Types
// ============================================================================

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(name = "scangate", version, about = "Policy-gated wrappers for scanning tools")]
struct Cli {
    /// Configuration file path (defaults to scangate.toml or SCANGATE_CONFIG).
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,
    /// Selected subcommand to execute.
    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Run a gated port scan.
    Portscan(PortscanArgs),
    /// Run a gated vulnerability scan.
    Vulnscan(VulnscanArgs),
    /// Run a gated memory-image analysis.
    Memscan(MemscanArgs),
    /// Run a gated disk-image analysis.
    Diskscan(DiskscanArgs),
    /// Seal existing artifacts with the configured key.
    Seal(SealArgs),
    /// Recover the plaintext of a sealed artifact.
    Unseal(UnsealArgs),
    /// Provision a credential line for the credential file.
    Credential(CredentialArgs),
    /// Verify the audit log hash chain.
    AuditVerify,
    /// Load and report the effective configuration.
    CheckConfig,
    /// Generate a fresh base64 sealing key.
    KeygenSeal,
}

/// Identity arguments shared by every gated subcommand.
#[derive(Args, Debug)]
struct IdentityArgs {
    /// Requesting username; the secret is read from SCANGATE_SECRET.
    #[arg(long)]
    user: String,
}

/// Port-scan arguments.
#[derive(Args, Debug)]
struct PortscanArgs {
    /// Identity arguments.
    #[command(flatten)]
    identity: IdentityArgs,
    /// Target address or CIDR block.
    #[arg(long)]
    target: String,
    /// Scan mode: quick, standard, full, service, or os-detect.
    #[arg(long, default_value = "quick")]
    mode: String,
    /// Ports to scan, e.g. "80,443" or "1-1024".
    #[arg(long)]
    ports: Option<String>,
    /// Print the engine command instead of executing it.
    #[arg(long)]
    plan: bool,
}

/// Vulnerability-scan arguments.
#[derive(Args, Debug)]
struct VulnscanArgs {
    /// Identity arguments.
    #[command(flatten)]
    identity: IdentityArgs,
    /// Target address or CIDR block.
    #[arg(long)]
    target: String,
    /// Scan mode: discovery, fast, or full.
    #[arg(long, default_value = "fast")]
    mode: String,
    /// Print the engine command instead of executing it.
    #[arg(long)]
    plan: bool,
}

/// Memory-analysis arguments.
#[derive(Args, Debug)]
struct MemscanArgs {
    /// Identity arguments.
    #[command(flatten)]
    identity: IdentityArgs,
    /// Memory image path under the evidence root.
    #[arg(long)]
    image: PathBuf,
    /// Analysis mode: processes, network, modules, or timeline.
    #[arg(long, default_value = "processes")]
    mode: String,
    /// Result-row bound (defaults to the configured ceiling).
    #[arg(long)]
    max_rows: Option<u32>,
    /// Print the engine command instead of executing it.
    #[arg(long)]
    plan: bool,
}

/// Disk-analysis arguments.
#[derive(Args, Debug)]
struct DiskscanArgs {
    /// Identity arguments.
    #[command(flatten)]
    identity: IdentityArgs,
    /// Disk image path under the evidence root.
    #[arg(long)]
    image: PathBuf,
    /// Analysis mode: file-list, timeline, or deleted-files.
    #[arg(long, default_value = "file-list")]
    mode: String,
    /// Directory-depth bound (defaults to the configured ceiling).
    #[arg(long)]
    max_depth: Option<u32>,
    /// Print the engine command instead of executing it.
    #[arg(long)]
    plan: bool,
}

/// Seal arguments.
#[derive(Args, Debug)]
struct SealArgs {
    /// Artifact files to seal.
    #[arg(required = true)]
    artifacts: Vec<PathBuf>,
}

/// Unseal arguments.
#[derive(Args, Debug)]
struct UnsealArgs {
    /// Sealed container to open.
    sealed: PathBuf,
    /// Output path for the recovered plaintext.
    #[arg(long)]
    output: PathBuf,
}

/// Credential provisioning arguments.
#[derive(Args, Debug)]
struct CredentialArgs {
    /// Username to provision; the secret is read from SCANGATE_SECRET.
    #[arg(long)]
    user: String,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// CLI failure carrying a user-facing message.
#[derive(Debug)]
struct CliError {
    /// Message written to stderr.
    message: String,
}

impl CliError {
    /// Creates an error from any displayable value.
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl<E: std::error::Error> From<E> for CliError {
    fn from(error: E) -> Self {
        Self::new(error.to_string())
    }
}

/// CLI result alias.
type CliResult<T> = Result<T, CliError>;

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// Process entry point.
fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => emit_error(&error.message),
    }
}

/// Dispatches the parsed command.
fn run(cli: Cli) -> CliResult<()> {
    let config = ScangateConfig::load(cli.config.as_deref())?;
    match cli.command {
        Commands::Portscan(args) => run_portscan(&config, &args),
        Commands::Vulnscan(args) => run_vulnscan(&config, &args),
        Commands::Memscan(args) => run_memscan(&config, &args),
        Commands::Diskscan(args) => run_diskscan(&config, &args),
        Commands::Seal(args) => run_seal(&config, &args),
        Commands::Unseal(args) => run_unseal(&config, &args),
        Commands::Credential(args) => run_credential(&args),
        Commands::AuditVerify => run_audit_verify(&config),
        Commands::CheckConfig => run_check_config(&config),
        Commands::KeygenSeal => write_stdout_line(&generate_key())
            .map_err(|err| CliError::new(format!("stdout write failed: {err}"))),
    }
}

// ============================================================================
// SECTION: Gateway Assembly
// ============================================================================

/// Builds the gateway and its collaborators from configuration.
///
/// This is the explicit initialization point: directories are created and
/// stores are loaded here, before any request is served.
fn build_gateway(config: &ScangateConfig) -> CliResult<Gateway> {
    fs::create_dir_all(&config.results.dir)
        .map_err(|err| CliError::new(format!("results dir: {err}")))?;

    let authenticator = if config.auth.enabled {
        let store = CredentialStore::load(&config.auth.credentials_file)?;
        Authenticator::new(AuthMode::Enabled(store))
    } else {
        Authenticator::new(AuthMode::Disabled)
    };

    let policy = Arc::new(PolicyStore::open(PolicySources {
        users_file: config.policy.users_file.clone(),
        allow_file: config.policy.allow_file.clone(),
        deny_file: config.policy.deny_file.clone(),
    })?);

    let audit: Arc<dyn AuditSink> = match config.audit.sink {
        AuditSinkKind::File => Arc::new(FileAuditSink::open(&config.audit.path)?),
        AuditSinkKind::Stderr => Arc::new(StderrAuditSink),
    };

    Ok(Gateway::new(GatewayParams {
        authenticator,
        policy,
        rate_ceiling: config.rate.ceiling,
        max_target_hosts: u128::from(config.target.max_hosts),
        evidence_root: config.results.evidence_dir.clone(),
        audit,
        clock: Arc::new(SystemClock),
    }))
}

/// Builds a gate request for a network target.
fn network_request(identity: &IdentityArgs, operation: &str, target: &str) -> GateRequest {
    GateRequest {
        username: Username::new(identity.user.clone()),
        secret: presented_secret(),
        operation: operation.into(),
        target: TargetRequest::Network(target.to_string()),
        origin: Some("local".to_string()),
        correlation_id: CorrelationId::generate(),
    }
}

/// Builds a gate request for a forensic evidence image.
fn evidence_request(identity: &IdentityArgs, operation: &str, image: &std::path::Path) -> GateRequest {
    GateRequest {
        username: Username::new(identity.user.clone()),
        secret: presented_secret(),
        operation: operation.into(),
        target: TargetRequest::Evidence(image.to_path_buf()),
        origin: Some("local".to_string()),
        correlation_id: CorrelationId::generate(),
    }
}

/// Reads the presented secret from the environment.
fn presented_secret() -> Option<PresentedSecret> {
    env::var(SECRET_ENV_VAR).ok().map(PresentedSecret::new)
}

// ============================================================================
// SECTION: Gated Runs
// ============================================================================

/// Runs the port-scan wrapper.
fn run_portscan(config: &ScangateConfig, args: &PortscanArgs) -> CliResult<()> {
    let gateway = build_gateway(config)?;
    let request = network_request(&args.identity, "portscan", &args.target);
    let clearance = gateway.clear(&request)?;

    let policy = PortScanPolicy::new(PortScanLimits {
        max_ports: config.portscan.max_ports,
        timeout: Duration::from_secs(config.portscan.timeout_secs),
        packet_rate_ceiling: config.portscan.packet_rate_ceiling,
    });
    let built = policy.build(
        &clearance,
        &PortScanRequest {
            mode: args.mode.clone(),
            ports: args.ports.clone(),
        },
    );
    let descriptor = audit_build(&gateway, &clearance, built)?;
    finish_run(config, &gateway, &clearance, &descriptor, args.plan)
}

/// Runs the vulnerability-scan wrapper.
fn run_vulnscan(config: &ScangateConfig, args: &VulnscanArgs) -> CliResult<()> {
    let gateway = build_gateway(config)?;
    let request = network_request(&args.identity, "vulnscan", &args.target);
    let clearance = gateway.clear(&request)?;

    let policy = VulnScanPolicy::new(VulnScanLimits {
        max_hosts: config.vulnscan.max_hosts,
        timeout: Duration::from_secs(config.vulnscan.timeout_secs),
        packet_rate_ceiling: config.vulnscan.packet_rate_ceiling,
    });
    let built = policy.build(
        &clearance,
        &VulnScanRequest {
            mode: args.mode.clone(),
        },
    );
    let descriptor = audit_build(&gateway, &clearance, built)?;
    finish_run(config, &gateway, &clearance, &descriptor, args.plan)
}

/// Runs the memory-forensics wrapper.
fn run_memscan(config: &ScangateConfig, args: &MemscanArgs) -> CliResult<()> {
    let gateway = build_gateway(config)?;
    let request = evidence_request(&args.identity, "memscan", &args.image);
    let clearance = gateway.clear(&request)?;

    let policy = MemScanPolicy::new(MemScanLimits {
        max_rows: config.memscan.max_rows,
        timeout: Duration::from_secs(config.memscan.timeout_secs),
    });
    let built = policy.build(
        &clearance,
        &MemScanRequest {
            mode: args.mode.clone(),
            max_rows: args.max_rows,
        },
    );
    let descriptor = audit_build(&gateway, &clearance, built)?;
    finish_run(config, &gateway, &clearance, &descriptor, args.plan)
}

/// Runs the disk-forensics wrapper.
fn run_diskscan(config: &ScangateConfig, args: &DiskscanArgs) -> CliResult<()> {
    let gateway = build_gateway(config)?;
    let request = evidence_request(&args.identity, "diskscan", &args.image);
    let clearance = gateway.clear(&request)?;

    let policy = DiskScanPolicy::new(DiskScanLimits {
        max_depth: config.diskscan.max_depth,
        timeout: Duration::from_secs(config.diskscan.timeout_secs),
    });
    let built = policy.build(
        &clearance,
        &DiskScanRequest {
            mode: args.mode.clone(),
            max_depth: args.max_depth,
        },
    );
    let descriptor = audit_build(&gateway, &clearance, built)?;
    finish_run(config, &gateway, &clearance, &descriptor, args.plan)
}

/// Audits the policy-builder stage and unwraps its outcome.
fn audit_build(
    gateway: &Gateway,
    clearance: &Clearance,
    built: Result<InvocationDescriptor, scangate_tools::InvocationError>,
) -> CliResult<InvocationDescriptor> {
    match built {
        Ok(descriptor) => {
            record_stage(
                gateway,
                clearance,
                GateStage::BuildPolicy,
                Decision::Allow,
                Severity::Info,
                "invocation descriptor built".to_string(),
            )?;
            Ok(descriptor)
        }
        Err(error) => {
            record_stage(
                gateway,
                clearance,
                GateStage::BuildPolicy,
                Decision::Deny,
                Severity::Warn,
                format!("invocation rejected: {error}"),
            )?;
            Err(CliError::new(error.to_string()))
        }
    }
}

/// Executes (or plans) the engine run, then seals artifacts.
fn finish_run(
    config: &ScangateConfig,
    gateway: &Gateway,
    clearance: &Clearance,
    descriptor: &InvocationDescriptor,
    plan_only: bool,
) -> CliResult<()> {
    let engines = EnginePaths {
        portscan: config.engines.portscan.clone(),
        vulnscan: config.engines.vulnscan.clone(),
        memscan: config.engines.memscan.clone(),
        diskscan: config.engines.diskscan.clone(),
    };
    let command = build_command(descriptor, &engines, &config.results.dir);

    if plan_only {
        return write_stdout_line(&command.render())
            .map_err(|err| CliError::new(format!("stdout write failed: {err}")));
    }

    let outcome = match ToolExecutor::new().execute(&command, descriptor.timeout) {
        Ok(outcome) => {
            let (decision, severity, message) = if outcome.succeeded() {
                (
                    Decision::Allow,
                    Severity::Info,
                    format!("engine completed in {}s", outcome.duration.as_secs()),
                )
            } else {
                let status = outcome
                    .exit_code
                    .map_or_else(|| "killed by signal".to_string(), |code| code.to_string());
                (Decision::Deny, Severity::Warn, format!("engine exited with status {status}"))
            };
            record_stage(gateway, clearance, GateStage::Execute, decision, severity, message)?;
            outcome
        }
        Err(error) => {
            record_stage(
                gateway,
                clearance,
                GateStage::Execute,
                Decision::Deny,
                Severity::Error,
                format!("engine execution failed: {error}"),
            )?;
            return Err(CliError::new(error.to_string()));
        }
    };

    let sealer = build_sealer(config)?;
    let artifacts = vec![outcome.artifact.clone()];
    let final_paths = if sealer.is_enabled() {
        match sealer.seal(&artifacts) {
            Ok(sealed) => {
                record_stage(
                    gateway,
                    clearance,
                    GateStage::Seal,
                    Decision::Allow,
                    Severity::Info,
                    "artifacts sealed".to_string(),
                )?;
                sealed
            }
            Err(error) => {
                record_stage(
                    gateway,
                    clearance,
                    GateStage::Seal,
                    Decision::Deny,
                    Severity::Error,
                    format!("sealing failed: {error}"),
                )?;
                return Err(CliError::new(error.to_string()));
            }
        }
    } else {
        artifacts
    };

    for path in final_paths {
        write_stdout_line(&path.display().to_string())
            .map_err(|err| CliError::new(format!("stdout write failed: {err}")))?;
    }
    Ok(())
}

/// Emits one audit record for a post-clearance stage.
fn record_stage(
    gateway: &Gateway,
    clearance: &Clearance,
    stage: GateStage,
    decision: Decision,
    severity: Severity,
    message: String,
) -> Result<(), AuditError> {
    gateway.audit().record(AuditEvent {
        unix_seconds: gateway.clock().now_unix(),
        severity,
        correlation_id: clearance.correlation_id.as_str().to_string(),
        actor: Some(clearance.identity.username().as_str().to_string()),
        origin: Some("local".to_string()),
        stage,
        decision,
        message,
    })
}

// ============================================================================
// SECTION: Utility Commands
// ============================================================================

/// Builds the sealer from configuration.
fn build_sealer(config: &ScangateConfig) -> CliResult<ResultSealer> {
    if !config.seal.enabled {
        return Ok(ResultSealer::new(SealerMode::Disabled));
    }
    match config.seal.key_material()? {
        None => Ok(ResultSealer::new(SealerMode::EnabledWithoutKey)),
        Some(material) => {
            let key = decode_key(&material)?;
            Ok(ResultSealer::new(SealerMode::Keyed(key)))
        }
    }
}

/// Seals existing artifacts on demand.
fn run_seal(config: &ScangateConfig, args: &SealArgs) -> CliResult<()> {
    let sealer = build_sealer(config)?;
    if !sealer.is_enabled() {
        return Err(CliError::new("sealing is disabled in configuration"));
    }
    let sealed = sealer.seal(&args.artifacts)?;
    for path in sealed {
        write_stdout_line(&path.display().to_string())
            .map_err(|err| CliError::new(format!("stdout write failed: {err}")))?;
    }
    Ok(())
}

/// Recovers a sealed artifact.
fn run_unseal(config: &ScangateConfig, args: &UnsealArgs) -> CliResult<()> {
    let sealer = build_sealer(config)?;
    sealer.unseal(&args.sealed, &args.output)?;
    write_stdout_line(&args.output.display().to_string())
        .map_err(|err| CliError::new(format!("stdout write failed: {err}")))
}

/// Provisions a credential line from SCANGATE_SECRET.
fn run_credential(args: &CredentialArgs) -> CliResult<()> {
    let secret = presented_secret()
        .ok_or_else(|| CliError::new(format!("{SECRET_ENV_VAR} is not set")))?;
    let record = CredentialRecord::provision(Username::new(args.user.clone()), &secret);
    write_stdout_line(&record.to_line())
        .map_err(|err| CliError::new(format!("stdout write failed: {err}")))
}

/// Verifies the audit log hash chain.
fn run_audit_verify(config: &ScangateConfig) -> CliResult<()> {
    let count = verify_chain(&config.audit.path)?;
    write_stdout_line(&format!("audit chain verified: {count} records"))
        .map_err(|err| CliError::new(format!("stdout write failed: {err}")))
}

/// Loads the gateway once and reports the effective posture.
fn run_check_config(config: &ScangateConfig) -> CliResult<()> {
    build_gateway(config)?;
    let lines = [
        format!("auth: {}", if config.auth.enabled { "enabled" } else { "DISABLED" }),
        format!("rate ceiling: {}/hour", config.rate.ceiling),
        format!("target host ceiling: {}", config.target.max_hosts),
        format!("sealing: {}", if config.seal.enabled { "enabled" } else { "disabled" }),
        format!("audit log: {}", config.audit.path.display()),
    ];
    for line in lines {
        write_stdout_line(&line)
            .map_err(|err| CliError::new(format!("stdout write failed: {err}")))?;
    }
    Ok(())
}

// ============================================================================
// SECTION: Output Helpers
// ============================================================================

/// Writes a single line to stdout.
fn write_stdout_line(message: &str) -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    writeln!(&mut stdout, "{message}")
}

/// Writes a single line to stderr.
fn write_stderr_line(message: &str) -> std::io::Result<()> {
    let mut stderr = std::io::stderr();
    writeln!(&mut stderr, "{message}")
}

/// Emits an error message to stderr and returns a failure exit code.
fn emit_error(message: &str) -> ExitCode {
    let _ = write_stderr_line(&format!("scangate: {message}"));
    ExitCode::FAILURE
}
