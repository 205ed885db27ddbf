//! Suite declaration and run planning.
//!
//! Hosts declare their examples as a tree of nested groups, each level
//! optionally carrying a [`Guard`]. Planning walks the tree once, builds the
//! explicit ancestor guard chain for every example (outermost first), asks
//! the engine for a verdict, and hands the host a flat [`SuitePlan`]: which
//! example bodies to invoke and which to record as skipped.

use crate::engine::{evaluate_explained, Verdict};
use crate::environment::EnvironmentDescriptor;
use crate::guard::Guard;
use serde::{Deserialize, Serialize};

/// A single test example and its own guard, if any
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Example {
    /// Example name
    pub name: String,
    /// Guard attached directly to the example
    pub guard: Option<Guard>,
}

impl Example {
    /// Create an unguarded example
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            guard: None,
        }
    }

    /// Create a guarded example
    #[must_use]
    pub fn guarded(name: impl Into<String>, guard: Guard) -> Self {
        Self {
            name: name.into(),
            guard: Some(guard),
        }
    }
}

/// A grouping of examples and nested groups, with an optional group guard
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Group {
    /// Group name
    pub name: String,
    /// Guard applying to everything inside this group
    pub guard: Option<Guard>,
    /// Nested groups
    pub groups: Vec<Group>,
    /// Examples declared directly in this group
    pub examples: Vec<Example>,
}

impl Group {
    /// Create an unguarded group
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Create a guarded group
    #[must_use]
    pub fn guarded(name: impl Into<String>, guard: Guard) -> Self {
        Self {
            name: name.into(),
            guard: Some(guard),
            ..Self::default()
        }
    }

    /// Add a nested group
    #[must_use]
    pub fn with_group(mut self, group: Group) -> Self {
        self.groups.push(group);
        self
    }

    /// Add an example
    #[must_use]
    pub fn with_example(mut self, example: Example) -> Self {
        self.examples.push(example);
        self
    }

    /// Total number of examples in this group and all nested groups
    #[must_use]
    pub fn example_count(&self) -> usize {
        self.examples.len()
            + self
                .groups
                .iter()
                .map(Group::example_count)
                .sum::<usize>()
    }
}

/// A whole declared suite: one root group
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Suite {
    root: Group,
}

impl Suite {
    /// Create a suite whose root group is unguarded
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            root: Group::new(name),
        }
    }

    /// Create a suite whose root group carries a guard
    ///
    /// Matches top-level `describe Options, except: {...}` declarations.
    #[must_use]
    pub fn guarded(name: impl Into<String>, guard: Guard) -> Self {
        Self {
            root: Group::guarded(name, guard),
        }
    }

    /// Add a group under the root
    #[must_use]
    pub fn with_group(mut self, group: Group) -> Self {
        self.root.groups.push(group);
        self
    }

    /// Add an example directly under the root
    #[must_use]
    pub fn with_example(mut self, example: Example) -> Self {
        self.root.examples.push(example);
        self
    }

    /// Suite name (the root group's name)
    #[must_use]
    pub fn name(&self) -> &str {
        &self.root.name
    }

    /// Total number of declared examples
    #[must_use]
    pub fn example_count(&self) -> usize {
        self.root.example_count()
    }

    /// Evaluate every example against `descriptor` and produce the plan.
    ///
    /// The tree is walked once; each example's ancestor guard chain is the
    /// guards of its enclosing groups (outermost first) followed by its own,
    /// with unguarded levels contributing nothing.
    #[must_use]
    pub fn plan(&self, descriptor: &EnvironmentDescriptor) -> SuitePlan {
        let mut planned = Vec::with_capacity(self.example_count());
        let mut chain = Vec::new();
        let mut path = Vec::new();
        plan_group(&self.root, descriptor, &mut chain, &mut path, &mut planned);

        let plan = SuitePlan {
            environment: *descriptor,
            examples: planned,
        };
        tracing::debug!(
            suite = %self.root.name,
            environment = %descriptor,
            runnable = plan.runnable_count(),
            skipped = plan.skipped_count(),
            "suite planned"
        );
        plan
    }
}

fn plan_group(
    group: &Group,
    descriptor: &EnvironmentDescriptor,
    chain: &mut Vec<Guard>,
    path: &mut Vec<String>,
    planned: &mut Vec<PlannedExample>,
) {
    let pushed_guard = match &group.guard {
        Some(guard) => {
            chain.push(guard.clone());
            true
        }
        None => false,
    };
    path.push(group.name.clone());

    for example in &group.examples {
        let pushed_example_guard = match &example.guard {
            Some(guard) => {
                chain.push(guard.clone());
                true
            }
            None => false,
        };

        let verdict = evaluate_explained(chain, descriptor);
        let mut full_name = path.join(" > ");
        full_name.push_str(" > ");
        full_name.push_str(&example.name);
        planned.push(PlannedExample { full_name, verdict });

        if pushed_example_guard {
            chain.pop();
        }
    }

    for nested in &group.groups {
        plan_group(nested, descriptor, chain, path, planned);
    }

    path.pop();
    if pushed_guard {
        chain.pop();
    }
}

/// One example's planning outcome
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlannedExample {
    /// Group path and example name joined with " > "
    pub full_name: String,
    /// The engine's verdict
    pub verdict: Verdict,
}

/// The flat evaluation of a suite under one descriptor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuitePlan {
    /// Descriptor the plan was computed for
    pub environment: EnvironmentDescriptor,
    /// Every declared example, in declaration order
    pub examples: Vec<PlannedExample>,
}

impl SuitePlan {
    /// Examples whose bodies should execute
    pub fn runnable(&self) -> impl Iterator<Item = &PlannedExample> {
        self.examples
            .iter()
            .filter(|e| e.verdict.disposition.is_run())
    }

    /// Examples the runner should record as pending/skipped
    pub fn skipped(&self) -> impl Iterator<Item = &PlannedExample> {
        self.examples
            .iter()
            .filter(|e| e.verdict.disposition.is_skip())
    }

    /// Number of runnable examples
    #[must_use]
    pub fn runnable_count(&self) -> usize {
        self.runnable().count()
    }

    /// Number of skipped examples
    #[must_use]
    pub fn skipped_count(&self) -> usize {
        self.skipped().count()
    }

    /// Total number of examples
    #[must_use]
    pub fn total(&self) -> usize {
        self.examples.len()
    }

    /// Summarize the plan for reporting
    #[must_use]
    pub fn report(&self) -> PlanReport {
        PlanReport {
            environment: self.environment,
            total: self.total(),
            runnable: self.runnable_count(),
            skipped: self.skipped_count(),
            skipped_examples: self
                .skipped()
                .map(|e| e.full_name.clone())
                .collect(),
        }
    }
}

/// Serializable summary of one suite plan
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanReport {
    /// Descriptor the plan was computed for
    pub environment: EnvironmentDescriptor,
    /// Total declared examples
    pub total: usize,
    /// Examples that will run
    pub runnable: usize,
    /// Examples recorded as skipped
    pub skipped: usize,
    /// Full names of the skipped examples
    pub skipped_examples: Vec<String>,
}

impl PlanReport {
    /// Export to pretty JSON
    #[must_use]
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| "{}".to_string())
    }
}
