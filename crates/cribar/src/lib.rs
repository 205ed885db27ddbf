//! Cribar: capability-based run/skip filtering for cross-browser suites
//!
//! Cribar (Spanish: "to sift") decides, for each example in a WebDriver
//! integration suite, whether it should run or be skipped under the
//! configured `(driver, browser, platform)` environment. It replaces the
//! dynamic `only:`/`except:` metadata hashes of RSpec-style suites with a
//! statically validated guard model and a pure evaluation function.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                     CRIBAR Architecture                          │
//! ├──────────────────────────────────────────────────────────────────┤
//! │   ┌────────────┐    ┌─────────────┐    ┌──────────────┐          │
//! │   │ Suite Tree │    │ Ancestor    │    │ Evaluation   │          │
//! │   │ (guarded   │───►│ Guard Chain │───►│ Engine       │──► Plan  │
//! │   │  groups)   │    │ (root→leaf) │    │ (run / skip) │          │
//! │   └────────────┘    └─────────────┘    └──────────────┘          │
//! │                            ▲                                     │
//! │                  EnvironmentDescriptor                           │
//! │                  (driver/browser/platform)                       │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```
//! use cribar::{
//!     evaluate, Browser, Disposition, Driver, EnvironmentDescriptor, Guard,
//!     GuardClause, Platform,
//! };
//!
//! // describe 'logs', except: {browser: %i[firefox ie edge]} do
//! //   it 'can fetch remote log types', only: {driver: :remote}
//! let chain = [
//!     Guard::except(GuardClause::new().browsers([
//!         Browser::Firefox,
//!         Browser::Ie,
//!         Browser::Edge,
//!     ])),
//!     Guard::only(GuardClause::new().driver(Driver::Remote)),
//! ];
//!
//! let env = EnvironmentDescriptor::new(Driver::Remote, Browser::Chrome, Platform::Linux);
//! assert_eq!(evaluate(&chain, &env), Disposition::Run);
//!
//! let env = EnvironmentDescriptor::new(Driver::Local, Browser::Chrome, Platform::Linux);
//! assert_eq!(evaluate(&chain, &env), Disposition::Skip);
//! ```
//!
//! Guards compose down the ancestor chain restrictively: once any level
//! skips, no descendant can bring the example back. Malformed guard metadata
//! (unknown dimensions, values outside the enumerated sets) fails at
//! construction time; evaluation itself is total and never errors.

#![warn(missing_docs)]
// Lints are configured in workspace Cargo.toml [workspace.lints.clippy]

mod engine;
mod environment;
mod guard;
mod result;
mod suite;

pub use engine::{evaluate, evaluate_explained, Disposition, SkipCause, SkipRule, Verdict};
pub use environment::{
    Browser, Driver, EnvironmentDescriptor, Platform, ENV_BROWSER, ENV_DRIVER, ENV_PLATFORM,
};
pub use guard::{Dimension, Guard, GuardClause, GuardExpression};
pub use result::{CribarError, CribarResult};
pub use suite::{Example, Group, PlanReport, PlannedExample, Suite, SuitePlan};
