//! Execution environment description.
//!
//! A suite run executes under exactly one `(driver, browser, platform)`
//! triple. The triple is fixed once at process start and immutable for the
//! lifetime of the run; every guard in the suite is evaluated against the
//! same descriptor.
//!
//! Dimension values are closed enums rather than free strings so that an
//! unknown driver or browser name fails at configuration time instead of
//! silently never matching any guard.

use crate::result::{CribarError, CribarResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Environment variable naming the active driver
pub const ENV_DRIVER: &str = "CRIBAR_DRIVER";
/// Environment variable naming the active browser
pub const ENV_BROWSER: &str = "CRIBAR_BROWSER";
/// Environment variable naming the active platform (optional, defaults to host)
pub const ENV_PLATFORM: &str = "CRIBAR_PLATFORM";

/// The driver kind a suite run executes through
///
/// Guards in real suites name both the remote/local split and concrete
/// browser-specific local drivers, so both forms are representable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Driver {
    /// Selenium server / remote WebDriver endpoint
    Remote,
    /// Unspecified local driver
    Local,
    /// chromedriver
    Chrome,
    /// geckodriver against stable Firefox
    Firefox,
    /// geckodriver against Firefox ESR
    FfEsr,
    /// geckodriver against Firefox Nightly
    FfNightly,
    /// IEDriverServer
    Ie,
    /// Microsoft WebDriver for Edge
    Edge,
    /// safaridriver
    Safari,
    /// GhostDriver
    Phantomjs,
}

impl Driver {
    /// All driver kinds, in declaration order
    pub const ALL: [Driver; 10] = [
        Driver::Remote,
        Driver::Local,
        Driver::Chrome,
        Driver::Firefox,
        Driver::FfEsr,
        Driver::FfNightly,
        Driver::Ie,
        Driver::Edge,
        Driver::Safari,
        Driver::Phantomjs,
    ];

    /// Canonical configuration name
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Driver::Remote => "remote",
            Driver::Local => "local",
            Driver::Chrome => "chrome",
            Driver::Firefox => "firefox",
            Driver::FfEsr => "ff_esr",
            Driver::FfNightly => "ff_nightly",
            Driver::Ie => "ie",
            Driver::Edge => "edge",
            Driver::Safari => "safari",
            Driver::Phantomjs => "phantomjs",
        }
    }
}

impl FromStr for Driver {
    type Err = CribarError;

    fn from_str(s: &str) -> CribarResult<Self> {
        Self::ALL
            .iter()
            .find(|d| d.as_str() == s)
            .copied()
            .ok_or_else(|| CribarError::UnknownValue {
                dimension: "driver",
                value: s.to_string(),
            })
    }
}

impl fmt::Display for Driver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The browser a suite run drives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Browser {
    /// Google Chrome / Chromium
    Chrome,
    /// Firefox stable
    Firefox,
    /// Firefox ESR
    FfEsr,
    /// Firefox Nightly
    FfNightly,
    /// Internet Explorer
    Ie,
    /// Microsoft Edge
    Edge,
    /// Apple Safari
    Safari,
    /// PhantomJS
    Phantomjs,
}

impl Browser {
    /// All browsers, in declaration order
    pub const ALL: [Browser; 8] = [
        Browser::Chrome,
        Browser::Firefox,
        Browser::FfEsr,
        Browser::FfNightly,
        Browser::Ie,
        Browser::Edge,
        Browser::Safari,
        Browser::Phantomjs,
    ];

    /// Canonical configuration name
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Browser::Chrome => "chrome",
            Browser::Firefox => "firefox",
            Browser::FfEsr => "ff_esr",
            Browser::FfNightly => "ff_nightly",
            Browser::Ie => "ie",
            Browser::Edge => "edge",
            Browser::Safari => "safari",
            Browser::Phantomjs => "phantomjs",
        }
    }
}

impl FromStr for Browser {
    type Err = CribarError;

    fn from_str(s: &str) -> CribarResult<Self> {
        Self::ALL
            .iter()
            .find(|b| b.as_str() == s)
            .copied()
            .ok_or_else(|| CribarError::UnknownValue {
                dimension: "browser",
                value: s.to_string(),
            })
    }
}

impl fmt::Display for Browser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The operating system a suite run executes on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Platform {
    /// Microsoft Windows
    Windows,
    /// macOS
    Macosx,
    /// Linux
    Linux,
}

impl Platform {
    /// All platforms, in declaration order
    pub const ALL: [Platform; 3] = [Platform::Windows, Platform::Macosx, Platform::Linux];

    /// Canonical configuration name
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Windows => "windows",
            Platform::Macosx => "macosx",
            Platform::Linux => "linux",
        }
    }

    /// Platform of the host this process runs on
    #[must_use]
    pub fn current() -> Self {
        if cfg!(target_os = "windows") {
            Platform::Windows
        } else if cfg!(target_os = "macos") {
            Platform::Macosx
        } else {
            Platform::Linux
        }
    }
}

impl FromStr for Platform {
    type Err = CribarError;

    fn from_str(s: &str) -> CribarResult<Self> {
        Self::ALL
            .iter()
            .find(|p| p.as_str() == s)
            .copied()
            .ok_or_else(|| CribarError::UnknownValue {
                dimension: "platform",
                value: s.to_string(),
            })
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The concrete driver/browser/platform triple one suite run executes under
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EnvironmentDescriptor {
    /// Active driver kind
    pub driver: Driver,
    /// Active browser
    pub browser: Browser,
    /// Active platform
    pub platform: Platform,
}

impl EnvironmentDescriptor {
    /// Create a fully populated descriptor
    #[must_use]
    pub fn new(driver: Driver, browser: Browser, platform: Platform) -> Self {
        Self {
            driver,
            browser,
            platform,
        }
    }

    /// Build the descriptor from `CRIBAR_DRIVER`, `CRIBAR_BROWSER` and
    /// `CRIBAR_PLATFORM`.
    ///
    /// Driver and browser are mandatory; a partially populated descriptor
    /// must never fall through to "matches everything". Platform may be
    /// omitted and defaults to the host platform, mirroring suites that
    /// derive it from the build host.
    ///
    /// # Errors
    ///
    /// Returns [`CribarError::MissingEnvironment`] when a mandatory variable
    /// is unset and [`CribarError::UnknownValue`] when a value is not in the
    /// enumerated set.
    pub fn from_env() -> CribarResult<Self> {
        let driver = require_var(ENV_DRIVER)?.parse()?;
        let browser = require_var(ENV_BROWSER)?.parse()?;
        let platform = match std::env::var(ENV_PLATFORM) {
            Ok(value) => value.parse()?,
            Err(_) => Platform::current(),
        };

        Ok(Self {
            driver,
            browser,
            platform,
        })
    }
}

impl fmt::Display for EnvironmentDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.driver, self.browser, self.platform)
    }
}

fn require_var(variable: &'static str) -> CribarResult<String> {
    std::env::var(variable).map_err(|_| CribarError::MissingEnvironment { variable })
}
