//! Process-wide naming policy, resolved once at startup.

/// Environment variable that enables the prefix-preserving fallback.
pub const ENV_DEPLOYMENT_NAME_AS_PREFIX: &str = "DEPLOYMENT_NAME_AS_PREFIX";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NamingConfig {
    /// When a pod-spec deployment name is too long, try `<sdep>-<hash>`
    /// before the generic `seldon-<hash>`.
    pub deployment_name_as_prefix: bool,
}

impl NamingConfig {
    pub fn from_env() -> Self {
        Self::from_env_value(std::env::var(ENV_DEPLOYMENT_NAME_AS_PREFIX).ok().as_deref())
    }

    /// A command-line switch can turn the policy on; it never turns an
    /// environment-enabled policy off.
    pub fn with_prefix_flag(self, flag: bool) -> Self {
        Self {
            deployment_name_as_prefix: self.deployment_name_as_prefix || flag,
        }
    }

    /// Only the literal `true` enables the policy.
    pub fn from_env_value(value: Option<&str>) -> Self {
        Self {
            deployment_name_as_prefix: value == Some("true"),
        }
    }
}
