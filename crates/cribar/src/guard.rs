//! Guard metadata attached to examples and groups.
//!
//! A guard is the declarative run/skip condition a suite author attaches to a
//! test example or an enclosing group: `only` names the environments an
//! example is restricted to, `except` names the environments it is excluded
//! from. The dynamic keyword hashes of RSpec-style suites
//! (`except: {browser: [:firefox, :ie]}`) become a statically validated data
//! model here: dimension keys and values are closed enums, and anything
//! unrecognized fails at construction time rather than silently matching
//! everything or nothing.
//!
//! Matching semantics:
//! - within one [`GuardClause`], all present dimensions must match (AND);
//! - across the clauses of a [`GuardExpression`], any match suffices (OR);
//! - a dimension absent from a clause is unconditionally satisfied;
//! - an empty match set never matches.

use crate::environment::{Browser, Driver, EnvironmentDescriptor, Platform};
use crate::result::{CribarError, CribarResult};
use serde::de::{MapAccess, SeqAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// The three dimensions a guard may constrain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    /// The driver kind
    Driver,
    /// The browser
    Browser,
    /// The operating system
    Platform,
}

impl Dimension {
    /// Canonical metadata key
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Dimension::Driver => "driver",
            Dimension::Browser => "browser",
            Dimension::Platform => "platform",
        }
    }
}

impl FromStr for Dimension {
    type Err = CribarError;

    fn from_str(s: &str) -> CribarResult<Self> {
        match s {
            "driver" => Ok(Dimension::Driver),
            "browser" => Ok(Dimension::Browser),
            "platform" => Ok(Dimension::Platform),
            other => Err(CribarError::UnknownDimension {
                name: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One conjunction of per-dimension match sets
///
/// Scalar metadata values are normalized to single-element sets at
/// construction, so scalar and set forms share the same matching logic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GuardClause {
    /// Drivers this clause matches, if constrained
    #[serde(skip_serializing_if = "Option::is_none")]
    pub driver: Option<Vec<Driver>>,
    /// Browsers this clause matches, if constrained
    #[serde(skip_serializing_if = "Option::is_none")]
    pub browser: Option<Vec<Browser>>,
    /// Platforms this clause matches, if constrained
    #[serde(skip_serializing_if = "Option::is_none")]
    pub platform: Option<Vec<Platform>>,
}

impl GuardClause {
    /// Create a clause with no constrained dimensions
    ///
    /// An unconstrained clause matches every descriptor; constrain it with
    /// the builder methods below.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Constrain the driver dimension to a single value
    #[must_use]
    pub fn driver(self, driver: Driver) -> Self {
        self.drivers([driver])
    }

    /// Constrain the driver dimension to a set of values
    #[must_use]
    pub fn drivers(mut self, drivers: impl IntoIterator<Item = Driver>) -> Self {
        self.driver
            .get_or_insert_with(Vec::new)
            .extend(drivers);
        self
    }

    /// Constrain the browser dimension to a single value
    #[must_use]
    pub fn browser(self, browser: Browser) -> Self {
        self.browsers([browser])
    }

    /// Constrain the browser dimension to a set of values
    #[must_use]
    pub fn browsers(mut self, browsers: impl IntoIterator<Item = Browser>) -> Self {
        self.browser
            .get_or_insert_with(Vec::new)
            .extend(browsers);
        self
    }

    /// Constrain the platform dimension to a single value
    #[must_use]
    pub fn platform(self, platform: Platform) -> Self {
        self.platforms([platform])
    }

    /// Constrain the platform dimension to a set of values
    #[must_use]
    pub fn platforms(mut self, platforms: impl IntoIterator<Item = Platform>) -> Self {
        self.platform
            .get_or_insert_with(Vec::new)
            .extend(platforms);
        self
    }

    /// Check whether this clause has no constrained dimensions
    #[must_use]
    pub fn is_unconstrained(&self) -> bool {
        self.driver.is_none() && self.browser.is_none() && self.platform.is_none()
    }

    /// Match this clause against a descriptor
    ///
    /// Every constrained dimension must contain the descriptor's value.
    /// A constrained dimension with an empty set never matches.
    #[must_use]
    pub fn matches(&self, descriptor: &EnvironmentDescriptor) -> bool {
        dimension_matches(self.driver.as_deref(), descriptor.driver)
            && dimension_matches(self.browser.as_deref(), descriptor.browser)
            && dimension_matches(self.platform.as_deref(), descriptor.platform)
    }
}

fn dimension_matches<T: PartialEq>(set: Option<&[T]>, value: T) -> bool {
    match set {
        Some(values) => values.contains(&value),
        None => true,
    }
}

impl<'de> Deserialize<'de> for GuardClause {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct ClauseVisitor;

        impl<'de> Visitor<'de> for ClauseVisitor {
            type Value = GuardClause;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a guard clause object keyed by driver/browser/platform")
            }

            fn visit_map<A>(self, mut map: A) -> Result<GuardClause, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut clause = GuardClause::default();

                while let Some(key) = map.next_key::<String>()? {
                    let dimension = key
                        .parse::<Dimension>()
                        .map_err(serde::de::Error::custom)?;
                    match dimension {
                        Dimension::Driver => {
                            if clause.driver.is_some() {
                                return Err(serde::de::Error::duplicate_field("driver"));
                            }
                            clause.driver = Some(map.next_value::<OneOrMany<Driver>>()?.into_vec());
                        }
                        Dimension::Browser => {
                            if clause.browser.is_some() {
                                return Err(serde::de::Error::duplicate_field("browser"));
                            }
                            clause.browser =
                                Some(map.next_value::<OneOrMany<Browser>>()?.into_vec());
                        }
                        Dimension::Platform => {
                            if clause.platform.is_some() {
                                return Err(serde::de::Error::duplicate_field("platform"));
                            }
                            clause.platform =
                                Some(map.next_value::<OneOrMany<Platform>>()?.into_vec());
                        }
                    }
                }

                Ok(clause)
            }
        }

        deserializer.deserialize_map(ClauseVisitor)
    }
}

/// Scalar-or-array metadata value, normalized to a set
#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany<T> {
    One(T),
    Many(Vec<T>),
}

impl<T> OneOrMany<T> {
    fn into_vec(self) -> Vec<T> {
        match self {
            OneOrMany::One(value) => vec![value],
            OneOrMany::Many(values) => values,
        }
    }
}

/// An ordered disjunction of guard clauses
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct GuardExpression {
    clauses: Vec<GuardClause>,
}

impl GuardExpression {
    /// Create an expression from clauses, OR-combined
    #[must_use]
    pub fn new(clauses: impl IntoIterator<Item = GuardClause>) -> Self {
        Self {
            clauses: clauses.into_iter().collect(),
        }
    }

    /// The clauses of this expression, in declaration order
    #[must_use]
    pub fn clauses(&self) -> &[GuardClause] {
        &self.clauses
    }

    /// Match this expression against a descriptor (any clause suffices)
    ///
    /// An expression with no clauses matches nothing.
    #[must_use]
    pub fn matches(&self, descriptor: &EnvironmentDescriptor) -> bool {
        self.clauses.iter().any(|clause| clause.matches(descriptor))
    }
}

impl From<GuardClause> for GuardExpression {
    fn from(clause: GuardClause) -> Self {
        Self {
            clauses: vec![clause],
        }
    }
}

impl From<Vec<GuardClause>> for GuardExpression {
    fn from(clauses: Vec<GuardClause>) -> Self {
        Self { clauses }
    }
}

impl<const N: usize> From<[GuardClause; N]> for GuardExpression {
    fn from(clauses: [GuardClause; N]) -> Self {
        Self {
            clauses: clauses.into(),
        }
    }
}

impl<'de> Deserialize<'de> for GuardExpression {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct ExpressionVisitor;

        impl<'de> Visitor<'de> for ExpressionVisitor {
            type Value = GuardExpression;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a guard clause object or an array of guard clause objects")
            }

            fn visit_map<A>(self, map: A) -> Result<GuardExpression, A::Error>
            where
                A: MapAccess<'de>,
            {
                let clause =
                    GuardClause::deserialize(serde::de::value::MapAccessDeserializer::new(map))?;
                Ok(GuardExpression::from(clause))
            }

            fn visit_seq<A>(self, mut seq: A) -> Result<GuardExpression, A::Error>
            where
                A: SeqAccess<'de>,
            {
                let mut clauses = Vec::new();
                while let Some(clause) = seq.next_element::<GuardClause>()? {
                    clauses.push(clause);
                }
                Ok(GuardExpression::from(clauses))
            }
        }

        deserializer.deserialize_any(ExpressionVisitor)
    }
}

/// The run/skip condition attached to one example or group
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Guard {
    /// Environments the annotated example is restricted to
    #[serde(skip_serializing_if = "Option::is_none")]
    pub only: Option<GuardExpression>,
    /// Environments the annotated example is excluded from
    #[serde(skip_serializing_if = "Option::is_none")]
    pub except: Option<GuardExpression>,
}

impl Guard {
    /// A guard with no restriction at this level
    #[must_use]
    pub fn unrestricted() -> Self {
        Self::default()
    }

    /// Restrict to the environments matched by `expr`
    #[must_use]
    pub fn only(expr: impl Into<GuardExpression>) -> Self {
        Self {
            only: Some(expr.into()),
            except: None,
        }
    }

    /// Exclude the environments matched by `expr`
    #[must_use]
    pub fn except(expr: impl Into<GuardExpression>) -> Self {
        Self {
            only: None,
            except: Some(expr.into()),
        }
    }

    /// Add an `only` restriction to this guard
    #[must_use]
    pub fn with_only(mut self, expr: impl Into<GuardExpression>) -> Self {
        self.only = Some(expr.into());
        self
    }

    /// Add an `except` restriction to this guard
    #[must_use]
    pub fn with_except(mut self, expr: impl Into<GuardExpression>) -> Self {
        self.except = Some(expr.into());
        self
    }

    /// Check whether this guard imposes no restriction
    #[must_use]
    pub fn is_unrestricted(&self) -> bool {
        self.only.is_none() && self.except.is_none()
    }

    /// Parse a guard from its JSON metadata form
    ///
    /// Mirrors the metadata hashes of RSpec-style suites, e.g.
    /// `{"except": {"browser": ["firefox", "ie"]}}` or
    /// `{"only": {"driver": "remote"}}`.
    ///
    /// # Errors
    ///
    /// Returns [`CribarError::Metadata`] for malformed input, including
    /// unknown dimension keys and values outside the enumerated sets.
    pub fn parse_json(json: &str) -> CribarResult<Self> {
        serde_json::from_str(json).map_err(|e| CribarError::Metadata {
            message: e.to_string(),
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn descriptor() -> EnvironmentDescriptor {
        EnvironmentDescriptor::new(Driver::Remote, Browser::Firefox, Platform::Linux)
    }

    // =========================================================================
    // Dimension
    // =========================================================================

    #[test]
    fn dimension_parse_known_keys() {
        assert_eq!("driver".parse::<Dimension>().unwrap(), Dimension::Driver);
        assert_eq!("browser".parse::<Dimension>().unwrap(), Dimension::Browser);
        assert_eq!(
            "platform".parse::<Dimension>().unwrap(),
            Dimension::Platform
        );
    }

    #[test]
    fn dimension_parse_unknown_key() {
        let err = "os_version".parse::<Dimension>().unwrap_err();
        assert_eq!(
            err,
            CribarError::UnknownDimension {
                name: "os_version".to_string(),
            }
        );
        assert!(format!("{err}").contains("driver, browser, platform"));
    }

    // =========================================================================
    // Clause matching
    // =========================================================================

    #[test]
    fn unconstrained_clause_matches_everything() {
        let clause = GuardClause::new();
        assert!(clause.is_unconstrained());
        assert!(clause.matches(&descriptor()));
    }

    #[test]
    fn absent_dimensions_are_not_checked() {
        let clause = GuardClause::new().browser(Browser::Firefox);
        // driver and platform unconstrained
        assert!(clause.matches(&descriptor()));
    }

    #[test]
    fn single_value_mismatch() {
        let clause = GuardClause::new().browser(Browser::Safari);
        assert!(!clause.matches(&descriptor()));
    }

    #[test]
    fn set_membership_matches() {
        let clause =
            GuardClause::new().browsers([Browser::Firefox, Browser::Ie, Browser::Edge]);
        assert!(clause.matches(&descriptor()));

        let clause = GuardClause::new().browsers([Browser::Ie, Browser::Edge]);
        assert!(!clause.matches(&descriptor()));
    }

    #[test]
    fn empty_match_set_never_matches() {
        let clause = GuardClause::new().browsers(std::iter::empty());
        assert!(!clause.is_unconstrained());
        assert!(!clause.matches(&descriptor()));
    }

    #[test]
    fn multi_dimension_clause_is_conjunction() {
        let clause = GuardClause::new()
            .browser(Browser::Chrome)
            .platform(Platform::Macosx);

        let both = EnvironmentDescriptor::new(Driver::Local, Browser::Chrome, Platform::Macosx);
        assert!(clause.matches(&both));

        let wrong_browser =
            EnvironmentDescriptor::new(Driver::Local, Browser::Firefox, Platform::Macosx);
        assert!(!clause.matches(&wrong_browser));

        let wrong_platform =
            EnvironmentDescriptor::new(Driver::Local, Browser::Chrome, Platform::Linux);
        assert!(!clause.matches(&wrong_platform));
    }

    #[test]
    fn scalar_builder_normalizes_to_set() {
        let scalar = GuardClause::new().browser(Browser::Safari);
        let set = GuardClause::new().browsers([Browser::Safari]);
        assert_eq!(scalar, set);
    }

    // =========================================================================
    // Expression matching (OR across clauses)
    // =========================================================================

    #[test]
    fn expression_matches_when_any_clause_matches() {
        let expr = GuardExpression::new([
            GuardClause::new().browser(Browser::Safari),
            GuardClause::new().driver(Driver::Remote).browser(Browser::Edge),
        ]);

        let safari = EnvironmentDescriptor::new(Driver::Local, Browser::Safari, Platform::Macosx);
        assert!(expr.matches(&safari));

        let remote_edge =
            EnvironmentDescriptor::new(Driver::Remote, Browser::Edge, Platform::Windows);
        assert!(expr.matches(&remote_edge));

        let neither =
            EnvironmentDescriptor::new(Driver::Local, Browser::Edge, Platform::Windows);
        assert!(!expr.matches(&neither));
    }

    #[test]
    fn empty_expression_matches_nothing() {
        let expr = GuardExpression::default();
        assert!(!expr.matches(&descriptor()));
    }

    // =========================================================================
    // Metadata parsing
    // =========================================================================

    #[test]
    fn parse_scalar_clause() {
        let guard = Guard::parse_json(r#"{"except": {"browser": "safari"}}"#).unwrap();
        let expr = guard.except.unwrap();
        assert_eq!(expr.clauses().len(), 1);
        assert_eq!(expr.clauses()[0].browser, Some(vec![Browser::Safari]));
    }

    #[test]
    fn parse_set_clause() {
        let guard =
            Guard::parse_json(r#"{"except": {"browser": ["firefox", "ie", "edge"]}}"#).unwrap();
        let expr = guard.except.unwrap();
        assert_eq!(
            expr.clauses()[0].browser,
            Some(vec![Browser::Firefox, Browser::Ie, Browser::Edge])
        );
    }

    #[test]
    fn parse_clause_array_as_disjunction() {
        let guard = Guard::parse_json(
            r#"{"except": [{"browser": "safari"}, {"driver": "remote", "browser": "edge"}]}"#,
        )
        .unwrap();
        let expr = guard.except.unwrap();
        assert_eq!(expr.clauses().len(), 2);
        assert_eq!(expr.clauses()[0].browser, Some(vec![Browser::Safari]));
        assert_eq!(expr.clauses()[1].driver, Some(vec![Driver::Remote]));
    }

    #[test]
    fn parse_only_and_except_together() {
        let guard = Guard::parse_json(
            r#"{"only": {"browser": "ie"}, "except": {"browser": "ie"}}"#,
        )
        .unwrap();
        assert!(guard.only.is_some());
        assert!(guard.except.is_some());
    }

    #[test]
    fn parse_rejects_unknown_dimension() {
        let err = Guard::parse_json(r#"{"except": {"os_version": "10"}}"#).unwrap_err();
        assert!(matches!(err, CribarError::Metadata { ref message } if message.contains("os_version")));
    }

    #[test]
    fn parse_rejects_unknown_value() {
        let err = Guard::parse_json(r#"{"except": {"browser": "mosaic"}}"#).unwrap_err();
        assert!(matches!(err, CribarError::Metadata { .. }));
    }

    #[test]
    fn parse_rejects_unknown_guard_key() {
        // `skip:` was never part of the metadata contract
        let err = Guard::parse_json(r#"{"skip": {"browser": "safari"}}"#).unwrap_err();
        assert!(matches!(err, CribarError::Metadata { .. }));
    }

    #[test]
    fn parse_rejects_duplicate_dimension() {
        let err =
            Guard::parse_json(r#"{"only": {"browser": "ie", "browser": "edge"}}"#).unwrap_err();
        assert!(matches!(err, CribarError::Metadata { .. }));
    }

    #[test]
    fn guard_serializes_back_to_metadata_shape() {
        let guard = Guard::only(GuardClause::new().driver(Driver::Remote));
        let json = serde_json::to_string(&guard).unwrap();
        assert_eq!(json, r#"{"only":[{"driver":["remote"]}]}"#);

        let back = Guard::parse_json(&json).unwrap();
        assert_eq!(back, guard);
    }

    #[test]
    fn unrestricted_guard() {
        assert!(Guard::unrestricted().is_unrestricted());
        assert!(!Guard::except(GuardClause::new().browser(Browser::Safari)).is_unrestricted());
    }
}
