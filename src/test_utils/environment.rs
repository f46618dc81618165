use crate::platform::HostEnvironment;
use std::collections::HashMap;

/// [`HostEnvironment`] with fixed host identifiers and variables.
///
/// Nothing is inherited from the real process, so `GITHUB_TOKEN` or
/// `GITHUB_ACTIONS` on the machine running the tests never leak in.
#[derive(Debug, Clone, Default)]
pub struct MockEnvironment {
    os: String,
    arch: String,
    vars: HashMap<String, String>,
}

impl MockEnvironment {
    /// Host with the given runner identifiers, e.g. `("linux", "x64")`.
    pub fn new(os: &str, arch: &str) -> Self {
        Self {
            os: os.to_string(),
            arch: arch.to_string(),
            vars: HashMap::new(),
        }
    }

    #[must_use]
    pub fn with_var(mut self, key: &str, value: impl Into<String>) -> Self {
        self.vars.insert(key.to_string(), value.into());
        self
    }
}

impl HostEnvironment for MockEnvironment {
    fn host_os(&self) -> String {
        self.os.clone()
    }

    fn host_arch(&self) -> String {
        self.arch.clone()
    }

    fn var(&self, key: &str) -> Option<String> {
        self.vars.get(key).cloned()
    }
}
