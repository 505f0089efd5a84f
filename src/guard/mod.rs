//! Invocation gating for the external tool
//!
//! Architecture: Domain Services - The guard decides whether spawning ruff is appropriate
//! - Policies are evaluated fresh each lint cycle against the current working directory
//! - A skip is a deliberate, terminal-for-cycle outcome, never a tool failure
//! - Policies are pluggable so host-specific heuristics stay out of the core

use crate::config::BridgeSettings;
use std::fmt;
use std::path::{Path, PathBuf};

/// Why the guard chose to skip this lint cycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// Local-configuration enforcement is on and no recognized file exists
    NoLocalConfiguration {
        /// Working directory that was probed
        cwd: PathBuf,
    },
    /// The file sits in the package area of a mypy-configured project with
    /// no Python version pin; ruff does not read type comments and would
    /// likely report false positives
    TypeCommentRisk {
        /// Working directory that was probed
        cwd: PathBuf,
    },
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoLocalConfiguration { .. } => write!(f, "no local configuration found"),
            Self::TypeCommentRisk { .. } => {
                write!(f, "assume file contains type comments that ruff does not read")
            }
        }
    }
}

/// Outcome of the per-cycle invocation check
///
/// Transient by design: computed fresh from the filesystem each cycle and
/// discarded afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    /// Spawn the tool with the configured command line
    Proceed,
    /// Do not spawn the tool this cycle
    Skip(SkipReason),
}

impl GuardDecision {
    /// Whether the decision permits running the tool
    pub fn permits_run(&self) -> bool {
        matches!(self, Self::Proceed)
    }

    /// A skip is terminal for the cycle: the host must clear any prior
    /// association between this file and the linter and must not retry
    /// until the next cycle
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Skip(_))
    }

    /// The skip reason, if the decision was a skip
    pub fn to_skip_reason(&self) -> Option<&SkipReason> {
        match self {
            Self::Proceed => None,
            Self::Skip(reason) => Some(reason),
        }
    }
}

/// Contextual metadata about the buffer being linted
#[derive(Debug, Clone, Default)]
pub struct FileContext {
    /// Path of the file backing the buffer, if it has one
    pub file: Option<PathBuf>,
}

impl FileContext {
    /// Context for a saved file
    pub fn for_file(path: impl Into<PathBuf>) -> Self {
        Self { file: Some(path.into()) }
    }

    /// Context for an unsaved buffer
    pub fn unsaved() -> Self {
        Self::default()
    }
}

/// A single gating heuristic
///
/// Returns a reason to skip, or `None` to let the next policy decide.
pub trait GuardPolicy: Send + Sync {
    /// Short name used in logging
    fn name(&self) -> &'static str;

    /// Evaluate the policy against the current cycle
    fn evaluate(
        &self,
        cwd: &Path,
        context: &FileContext,
        settings: &BridgeSettings,
    ) -> Option<SkipReason>;
}

/// Type-checker interop guard
///
/// Fires for files under the editor's package-management area when the
/// working directory is mypy-configured (`mypy.ini` present) but carries no
/// `.python-version` pin. Without the pin ruff cannot infer that it must
/// tolerate legacy inline type comments, which it does not read.
pub struct TypeCommentPolicy;

impl GuardPolicy for TypeCommentPolicy {
    fn name(&self) -> &'static str {
        "type_comment_guard"
    }

    fn evaluate(
        &self,
        cwd: &Path,
        context: &FileContext,
        settings: &BridgeSettings,
    ) -> Option<SkipReason> {
        let packages_root = settings.packages_root.as_deref()?;
        let file = context.file.as_deref()?;

        if file.starts_with(packages_root)
            && cwd.join("mypy.ini").exists()
            && !cwd.join(".python-version").exists()
        {
            tracing::info!(
                "Skip ruff: no '.python-version' file found at '{}' but mypy is \
                 configured. This can lead to false positives as ruff does not \
                 read type comments.",
                cwd.display()
            );
            return Some(SkipReason::TypeCommentRisk { cwd: cwd.to_path_buf() });
        }

        None
    }
}

/// Local-configuration guard
///
/// Running with purely global defaults across an entire filesystem tree is
/// noisy; when enforcement is on, the tool only runs where a project has
/// opted in with a recognized configuration file.
pub struct LocalConfigPolicy;

impl GuardPolicy for LocalConfigPolicy {
    fn name(&self) -> &'static str {
        "local_config_guard"
    }

    fn evaluate(
        &self,
        cwd: &Path,
        _context: &FileContext,
        settings: &BridgeSettings,
    ) -> Option<SkipReason> {
        if !settings.check_for_local_configuration {
            return None;
        }

        let found = settings.config_file_names.iter().any(|name| cwd.join(name).exists());
        if found {
            return None;
        }

        tracing::info!("Skip ruff: no local configuration found at '{}'", cwd.display());
        Some(SkipReason::NoLocalConfiguration { cwd: cwd.to_path_buf() })
    }
}

/// Evaluates gating policies in order before any subprocess is spawned
pub struct InvocationGuard {
    policies: Vec<Box<dyn GuardPolicy>>,
}

impl InvocationGuard {
    /// Create a guard with the default policy chain for the given settings
    ///
    /// The type-comment guard runs first when enabled; the local
    /// configuration guard always participates (it gates itself on the
    /// settings flag).
    pub fn new(settings: &BridgeSettings) -> Self {
        let mut policies: Vec<Box<dyn GuardPolicy>> = Vec::new();
        if settings.type_comment_guard {
            policies.push(Box::new(TypeCommentPolicy));
        }
        policies.push(Box::new(LocalConfigPolicy));
        Self { policies }
    }

    /// Create a guard with a custom policy chain
    pub fn with_policies(policies: Vec<Box<dyn GuardPolicy>>) -> Self {
        Self { policies }
    }

    /// Decide whether the tool should run this cycle
    ///
    /// Without a known working directory no filesystem probe is possible
    /// and every policy is bypassed.
    pub fn decide(
        &self,
        cwd: Option<&Path>,
        context: &FileContext,
        settings: &BridgeSettings,
    ) -> GuardDecision {
        let Some(cwd) = cwd else {
            return GuardDecision::Proceed;
        };

        for policy in &self.policies {
            if let Some(reason) = policy.evaluate(cwd, context, settings) {
                tracing::debug!(policy = policy.name(), %reason, "invocation skipped");
                return GuardDecision::Skip(reason);
            }
        }

        GuardDecision::Proceed
    }
}
