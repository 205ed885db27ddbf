//! Guard evaluation.
//!
//! [`evaluate`] is the whole contract of this crate: given the ordered chain
//! of guards enclosing one example (outermost group first, example last) and
//! the active environment descriptor, decide whether the example runs.
//!
//! The function is pure and total. It never fails: malformed guards cannot
//! reach it (they are rejected at construction), and every valid input yields
//! [`Disposition::Run`] or [`Disposition::Skip`]. It holds no state and may
//! be called concurrently from parallel workers sharing one descriptor.

use crate::environment::EnvironmentDescriptor;
use crate::guard::Guard;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The engine's verdict for one example under one descriptor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Disposition {
    /// The example body executes normally
    Run,
    /// The runner records the example as pending without invoking its body
    Skip,
}

impl Disposition {
    /// Check for [`Disposition::Run`]
    #[must_use]
    pub fn is_run(&self) -> bool {
        matches!(self, Disposition::Run)
    }

    /// Check for [`Disposition::Skip`]
    #[must_use]
    pub fn is_skip(&self) -> bool {
        matches!(self, Disposition::Skip)
    }
}

impl fmt::Display for Disposition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Disposition::Run => f.write_str("run"),
            Disposition::Skip => f.write_str("skip"),
        }
    }
}

/// Which rule of a guard produced a skip
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipRule {
    /// The guard's `only` expression did not match the descriptor
    OnlyMissed,
    /// The guard's `except` expression matched the descriptor
    ExceptMatched,
}

impl fmt::Display for SkipRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipRule::OnlyMissed => f.write_str("only restriction not satisfied"),
            SkipRule::ExceptMatched => f.write_str("except restriction matched"),
        }
    }
}

/// Where in the ancestor chain a skip decision fired
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkipCause {
    /// 0-based index into the ancestor chain, outermost first
    pub level: usize,
    /// The rule that fired at that level
    pub rule: SkipRule,
}

impl fmt::Display for SkipCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at ancestor level {}", self.rule, self.level)
    }
}

/// A disposition plus, for skips, the guard level and rule that produced it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verdict {
    /// Run or skip
    pub disposition: Disposition,
    /// Present iff the disposition is [`Disposition::Skip`]
    pub cause: Option<SkipCause>,
}

impl Verdict {
    /// A run verdict
    #[must_use]
    pub fn run() -> Self {
        Self {
            disposition: Disposition::Run,
            cause: None,
        }
    }

    /// A skip verdict caused by `rule` firing at `level`
    #[must_use]
    pub fn skip(level: usize, rule: SkipRule) -> Self {
        Self {
            disposition: Disposition::Skip,
            cause: Some(SkipCause { level, rule }),
        }
    }
}

/// Decide whether an example runs under `descriptor`.
///
/// `ancestors` is the guard chain from the outermost enclosing group down to
/// the example itself; a level with no restriction contributes an
/// unrestricted guard (or is simply left out, which is equivalent).
///
/// Levels are evaluated root to leaf. At each level an `only` expression
/// that does not match skips, then an `except` expression that does match
/// skips; the first skip short-circuits. Guards are restrictive only, so a
/// descendant can never un-skip what an ancestor excluded. An empty chain
/// runs.
#[must_use]
pub fn evaluate(ancestors: &[Guard], descriptor: &EnvironmentDescriptor) -> Disposition {
    evaluate_explained(ancestors, descriptor).disposition
}

/// [`evaluate`], additionally reporting which guard level and rule caused a
/// skip. Used by plan reporting; the disposition is identical.
#[must_use]
pub fn evaluate_explained(ancestors: &[Guard], descriptor: &EnvironmentDescriptor) -> Verdict {
    for (level, guard) in ancestors.iter().enumerate() {
        if let Some(only) = &guard.only {
            if !only.matches(descriptor) {
                tracing::debug!(level, environment = %descriptor, "only restriction missed, skipping");
                return Verdict::skip(level, SkipRule::OnlyMissed);
            }
        }

        if let Some(except) = &guard.except {
            if except.matches(descriptor) {
                tracing::debug!(level, environment = %descriptor, "except restriction matched, skipping");
                return Verdict::skip(level, SkipRule::ExceptMatched);
            }
        }
    }

    Verdict::run()
}
