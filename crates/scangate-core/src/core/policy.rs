// scangate-core/src/core/policy.rs
// ============================================================================
// Module: Scangate Policy Store
// Description: Authorized-user and CIDR allow/deny lists as immutable snapshots.
// Purpose: Give every guard call a consistent, reloadable view of policy.
// Dependencies: ipnetwork, thiserror
// ============================================================================

//! ## Overview
//! Policy is read from three line-oriented files (authorized users, allow
//! list, deny list) with `#` comment support, parsed into an immutable
//! [`PolicySnapshot`] that is passed by reference into guard calls. Reload is
//! mtime-triggered: a changed file produces a new snapshot atomically; a
//! request in flight keeps the snapshot it started with. A store that cannot
//! be read fails closed.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;
use std::fs;
use std::net::IpAddr;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::RwLock;
use std::time::SystemTime;

use ipnetwork::IpNetwork;
use thiserror::Error;

use crate::core::identity::Username;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Maximum policy file size in bytes.
const MAX_POLICY_FILE_SIZE: usize = 1024 * 1024;

/// Built-in allow list used when no allow file is configured: private ranges.
const BUILTIN_ALLOW: &[&str] = &["10.0.0.0/8", "172.16.0.0/12", "192.168.0.0/16"];

/// Built-in deny list used when no deny file is configured: loopback,
/// link-local, multicast, reserved, and public resolver addresses.
const BUILTIN_DENY: &[&str] = &[
    "127.0.0.0/8",
    "169.254.0.0/16",
    "224.0.0.0/4",
    "240.0.0.0/4",
    "8.8.8.8",
    "8.8.4.4",
    "1.1.1.1",
];

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors raised while loading or refreshing policy.
#[derive(Debug, Error)]
pub enum PolicyError {
    /// A policy file could not be read.
    #[error("policy store unreadable: {}: {detail}", .path.display())]
    Unreadable {
        /// File that failed to load.
        path: PathBuf,
        /// Underlying error detail.
        detail: String,
    },
    /// A policy file exceeds the size limit.
    #[error("policy file exceeds size limit: {}", .0.display())]
    TooLarge(PathBuf),
    /// A policy file line could not be parsed.
    #[error("policy file {} line {line} is malformed", .path.display())]
    Malformed {
        /// File containing the bad line.
        path: PathBuf,
        /// One-based line number.
        line: usize,
    },
    /// Internal state was poisoned by a panicking writer.
    #[error("policy store lock poisoned")]
    Poisoned,
    /// A built-in entry failed to parse; indicates a packaging defect.
    #[error("built-in policy entry invalid: {0}")]
    Builtin(String),
}

// ============================================================================
// SECTION: Snapshot
// ============================================================================

/// Immutable view of the three policy lists.
///
/// # Invariants
/// - Snapshots are never mutated after construction; reload swaps the whole
///   value.
/// - Deny entries take absolute precedence over allow entries.
#[derive(Debug, Clone)]
pub struct PolicySnapshot {
    /// Principals allowed to run gated operations.
    authorized_users: BTreeSet<String>,
    /// Networks targets may fall inside.
    allow: Vec<IpNetwork>,
    /// Networks that are always forbidden.
    deny: Vec<IpNetwork>,
}

impl PolicySnapshot {
    /// Builds a snapshot from already-parsed parts.
    #[must_use]
    pub fn from_parts(
        authorized_users: BTreeSet<String>,
        allow: Vec<IpNetwork>,
        deny: Vec<IpNetwork>,
    ) -> Self {
        Self {
            authorized_users,
            allow,
            deny,
        }
    }

    /// Returns true when the principal is in the authorized-user set.
    #[must_use]
    pub fn is_authorized(&self, username: &Username) -> bool {
        self.authorized_users.contains(username.as_str())
    }

    /// Returns true when the authorized-user set is empty.
    #[must_use]
    pub fn has_no_authorized_users(&self) -> bool {
        self.authorized_users.is_empty()
    }

    /// Returns the first deny entry the requested network touches, if any.
    #[must_use]
    pub fn deny_match(&self, target: &IpNetwork) -> Option<IpNetwork> {
        self.deny.iter().find(|entry| networks_touch(entry, target)).copied()
    }

    /// Returns true when some allow entry fully covers the requested network.
    #[must_use]
    pub fn allow_covers(&self, target: &IpNetwork) -> bool {
        self.allow.iter().any(|entry| network_covers(entry, target))
    }

    /// Returns the sizes of the user, allow, and deny lists.
    #[must_use]
    pub fn counts(&self) -> (usize, usize, usize) {
        (self.authorized_users.len(), self.allow.len(), self.deny.len())
    }
}

/// Returns true when two networks share any address.
///
/// CIDR blocks can only overlap by one containing the other's base address.
fn networks_touch(entry: &IpNetwork, target: &IpNetwork) -> bool {
    match (entry, target) {
        (IpNetwork::V4(_), IpNetwork::V4(_)) | (IpNetwork::V6(_), IpNetwork::V6(_)) => {
            entry.contains(target.network()) || target.contains(entry.network())
        }
        _ => false,
    }
}

/// Returns true when `entry` contains every address of `target`.
fn network_covers(entry: &IpNetwork, target: &IpNetwork) -> bool {
    match (entry, target) {
        (IpNetwork::V4(_), IpNetwork::V4(_)) | (IpNetwork::V6(_), IpNetwork::V6(_)) => {
            entry.prefix() <= target.prefix() && entry.contains(target.network())
        }
        _ => false,
    }
}

// ============================================================================
// SECTION: Sources
// ============================================================================

/// File locations backing the policy store.
#[derive(Debug, Clone, Default)]
pub struct PolicySources {
    /// Authorized-user list path.
    pub users_file: Option<PathBuf>,
    /// Allow-list path; built-ins apply when absent.
    pub allow_file: Option<PathBuf>,
    /// Deny-list path; built-ins apply when absent.
    pub deny_file: Option<PathBuf>,
}

/// Recorded modification time of one backing file.
#[derive(Debug, Clone)]
struct FileStamp {
    /// Path that was read.
    path: PathBuf,
    /// Modification time observed at load.
    modified: Option<SystemTime>,
}

/// Cached snapshot plus the file stamps it was built from.
#[derive(Debug)]
struct CachedState {
    /// Current immutable snapshot.
    snapshot: Arc<PolicySnapshot>,
    /// Stamps used to detect file changes.
    stamps: Vec<FileStamp>,
}

// ============================================================================
// SECTION: Store
// ============================================================================

/// Reloadable policy store handing out immutable snapshots.
#[derive(Debug)]
pub struct PolicyStore {
    /// Backing file locations.
    sources: PolicySources,
    /// Cached snapshot and change stamps.
    state: RwLock<CachedState>,
}

impl PolicyStore {
    /// Opens the store, performing the initial load.
    ///
    /// # Errors
    ///
    /// Returns [`PolicyError`] when any configured file cannot be loaded.
    pub fn open(sources: PolicySources) -> Result<Self, PolicyError> {
        let (snapshot, stamps) = load_snapshot(&sources)?;
        Ok(Self {
            sources,
            state: RwLock::new(CachedState {
                snapshot: Arc::new(snapshot),
                stamps,
            }),
        })
    }

    /// Builds a store around a fixed snapshot with no backing files.
    #[must_use]
    pub fn fixed(snapshot: PolicySnapshot) -> Self {
        Self {
            sources: PolicySources::default(),
            state: RwLock::new(CachedState {
                snapshot: Arc::new(snapshot),
                stamps: Vec::new(),
            }),
        }
    }

    /// Returns the current snapshot, reloading if a backing file changed.
    ///
    /// # Errors
    ///
    /// Returns [`PolicyError`] when a changed file cannot be reloaded; the
    /// caller must fail closed rather than reuse the stale snapshot.
    pub fn snapshot(&self) -> Result<Arc<PolicySnapshot>, PolicyError> {
        let changed = {
            let state = self.state.read().map_err(|_| PolicyError::Poisoned)?;
            state.stamps.iter().any(stamp_changed)
        };
        if changed {
            let (snapshot, stamps) = load_snapshot(&self.sources)?;
            let mut state = self.state.write().map_err(|_| PolicyError::Poisoned)?;
            state.snapshot = Arc::new(snapshot);
            state.stamps = stamps;
        }
        let state = self.state.read().map_err(|_| PolicyError::Poisoned)?;
        Ok(Arc::clone(&state.snapshot))
    }
}

/// Returns true when a stamped file's mtime no longer matches.
fn stamp_changed(stamp: &FileStamp) -> bool {
    let current = fs::metadata(&stamp.path).and_then(|meta| meta.modified()).ok();
    current != stamp.modified
}

/// Loads all configured files into a fresh snapshot.
fn load_snapshot(sources: &PolicySources) -> Result<(PolicySnapshot, Vec<FileStamp>), PolicyError> {
    let mut stamps = Vec::new();
    let users = match &sources.users_file {
        Some(path) => {
            stamps.push(stamp_of(path));
            parse_users(path)?
        }
        None => BTreeSet::new(),
    };
    let allow = match &sources.allow_file {
        Some(path) => {
            stamps.push(stamp_of(path));
            parse_networks(path)?
        }
        None => builtin_networks(BUILTIN_ALLOW)?,
    };
    let deny = match &sources.deny_file {
        Some(path) => {
            stamps.push(stamp_of(path));
            parse_networks(path)?
        }
        None => builtin_networks(BUILTIN_DENY)?,
    };
    Ok((PolicySnapshot::from_parts(users, allow, deny), stamps))
}

/// Records the current modification time of a path.
fn stamp_of(path: &Path) -> FileStamp {
    FileStamp {
        path: path.to_path_buf(),
        modified: fs::metadata(path).and_then(|meta| meta.modified()).ok(),
    }
}

/// Reads a policy file applying the shared size and encoding limits.
fn read_policy_file(path: &Path) -> Result<String, PolicyError> {
    let bytes = fs::read(path).map_err(|err| PolicyError::Unreadable {
        path: path.to_path_buf(),
        detail: err.to_string(),
    })?;
    if bytes.len() > MAX_POLICY_FILE_SIZE {
        return Err(PolicyError::TooLarge(path.to_path_buf()));
    }
    String::from_utf8(bytes).map_err(|err| PolicyError::Unreadable {
        path: path.to_path_buf(),
        detail: err.to_string(),
    })
}

/// Parses an authorized-user file into a set of principal names.
fn parse_users(path: &Path) -> Result<BTreeSet<String>, PolicyError> {
    let content = read_policy_file(path)?;
    let mut users = BTreeSet::new();
    for raw in content.lines() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        users.insert(line.to_string());
    }
    Ok(users)
}

/// Parses a CIDR list file; bare addresses become host-length networks.
fn parse_networks(path: &Path) -> Result<Vec<IpNetwork>, PolicyError> {
    let content = read_policy_file(path)?;
    let mut networks = Vec::new();
    for (index, raw) in content.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let network = parse_network(line).ok_or(PolicyError::Malformed {
            path: path.to_path_buf(),
            line: index + 1,
        })?;
        networks.push(network);
    }
    Ok(networks)
}

/// Parses one address or CIDR expression.
#[must_use]
pub fn parse_network(text: &str) -> Option<IpNetwork> {
    if let Ok(address) = text.parse::<IpAddr>() {
        let prefix = match address {
            IpAddr::V4(_) => 32,
            IpAddr::V6(_) => 128,
        };
        return IpNetwork::new(address, prefix).ok();
    }
    text.parse::<IpNetwork>().ok()
}

/// Parses the built-in list constants.
fn builtin_networks(entries: &[&str]) -> Result<Vec<IpNetwork>, PolicyError> {
    entries
        .iter()
        .map(|entry| parse_network(entry).ok_or_else(|| PolicyError::Builtin((*entry).to_string())))
        .collect()
}
