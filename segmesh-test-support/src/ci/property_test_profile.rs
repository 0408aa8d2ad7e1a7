//! Property-test run profile read from the environment.
//!
//! Suites pass their own defaults; CI overrides them through
//! `SEGMESH_PBT_CASES`, `SEGMESH_PBT_FORK`, and `SEGMESH_PBT_MAX_SHRINK`.
//! Malformed overrides are logged and ignored.

use std::env;

/// Overrides the number of cases per property.
pub const CASES_ENV_KEY: &str = "SEGMESH_PBT_CASES";
/// Runs each case in a forked subprocess when truthy.
pub const FORK_ENV_KEY: &str = "SEGMESH_PBT_FORK";
/// Caps shrinking iterations after a failure.
pub const MAX_SHRINK_ENV_KEY: &str = "SEGMESH_PBT_MAX_SHRINK";

const DEFAULT_MAX_SHRINK: u32 = 1024;

/// Resolved property-test settings.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ProptestRunProfile {
    cases: u32,
    fork: bool,
    max_shrink_iters: u32,
}

impl ProptestRunProfile {
    /// Resolves a profile, falling back to the supplied defaults.
    ///
    /// # Examples
    ///
    /// ```
    /// use segmesh_test_support::ci::property_test_profile::ProptestRunProfile;
    ///
    /// let profile = ProptestRunProfile::load(32, false);
    /// assert!(profile.cases() > 0);
    /// assert!(profile.max_shrink_iters() > 0);
    /// ```
    #[must_use]
    pub fn load(default_cases: u32, default_fork: bool) -> Self {
        Self {
            cases: override_or(CASES_ENV_KEY, default_cases, positive),
            fork: override_or(FORK_ENV_KEY, default_fork, switch),
            max_shrink_iters: override_or(MAX_SHRINK_ENV_KEY, DEFAULT_MAX_SHRINK, positive),
        }
    }

    /// Number of generated cases per property.
    #[rustfmt::skip]
    #[must_use]
    pub fn cases(&self) -> u32 { self.cases }

    /// Whether each case runs in a forked subprocess.
    #[rustfmt::skip]
    #[must_use]
    pub fn fork(&self) -> bool { self.fork }

    /// Upper bound on shrink steps after a failing case.
    #[rustfmt::skip]
    #[must_use]
    pub fn max_shrink_iters(&self) -> u32 { self.max_shrink_iters }
}

fn override_or<T: Copy>(key: &'static str, default: T, parse: fn(&str) -> Option<T>) -> T {
    let Ok(raw) = env::var(key) else {
        return default;
    };
    parse(raw.trim()).unwrap_or_else(|| {
        tracing::warn!(env = key, raw = %raw, "ignoring malformed property-test override");
        default
    })
}

fn positive(raw: &str) -> Option<u32> {
    raw.parse::<u32>().ok().filter(|value| *value > 0)
}

fn switch(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use rstest::rstest;

    use super::*;

    static ENV_LOCK: Mutex<()> = Mutex::new(());

    /// Restores an environment variable on drop.
    struct ScopedVar {
        key: &'static str,
        saved: Option<String>,
    }

    impl ScopedVar {
        fn new(key: &'static str, value: Option<&str>) -> Self {
            let saved = env::var(key).ok();
            // SAFETY: tests serialise environment access with ENV_LOCK.
            unsafe {
                match value {
                    Some(value) => env::set_var(key, value),
                    None => env::remove_var(key),
                }
            }
            Self { key, saved }
        }
    }

    impl Drop for ScopedVar {
        fn drop(&mut self) {
            // SAFETY: tests serialise environment access with ENV_LOCK.
            unsafe {
                match &self.saved {
                    Some(value) => env::set_var(self.key, value),
                    None => env::remove_var(self.key),
                }
            }
        }
    }

    fn load_with(cases: Option<&str>, fork: Option<&str>, shrink: Option<&str>) -> ProptestRunProfile {
        let _lock = ENV_LOCK.lock().expect("env lock");
        let _cases = ScopedVar::new(CASES_ENV_KEY, cases);
        let _fork = ScopedVar::new(FORK_ENV_KEY, fork);
        let _shrink = ScopedVar::new(MAX_SHRINK_ENV_KEY, shrink);
        ProptestRunProfile::load(48, false)
    }

    #[test]
    fn defaults_apply_without_overrides() {
        let profile = load_with(None, None, None);
        assert_eq!(profile.cases(), 48);
        assert!(!profile.fork());
        assert_eq!(profile.max_shrink_iters(), DEFAULT_MAX_SHRINK);
    }

    #[rstest]
    #[case("1", 1)]
    #[case(" 300 ", 300)]
    fn accepts_case_overrides(#[case] raw: &str, #[case] expected: u32) {
        assert_eq!(load_with(Some(raw), None, None).cases(), expected);
    }

    #[rstest]
    #[case("0")]
    #[case("-4")]
    #[case("many")]
    fn ignores_malformed_case_overrides(#[case] raw: &str) {
        assert_eq!(load_with(Some(raw), None, None).cases(), 48);
    }

    #[rstest]
    #[case("TRUE", true)]
    #[case("on", true)]
    #[case("0", false)]
    #[case("maybe", false)]
    fn resolves_fork_switch(#[case] raw: &str, #[case] expected: bool) {
        assert_eq!(load_with(None, Some(raw), None).fork(), expected);
    }

    #[test]
    fn accepts_shrink_override() {
        assert_eq!(load_with(None, None, Some("16")).max_shrink_iters(), 16);
    }
}
