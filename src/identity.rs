//! Current-user lookup for stamping journal rows.

use tracing::debug;

/// Environment variable holding the signed-in user's email.
pub const USER_EMAIL_ENV: &str = "STOCKPRO_USER_EMAIL";

/// Who is recording trades in this session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    email: String,
}

impl Identity {
    /// Resolve the current user: explicit email first, then the environment,
    /// then `fallback`.
    pub fn resolve(explicit: Option<&str>, fallback: &str) -> Self {
        let env_email = std::env::var(USER_EMAIL_ENV).ok();
        Self::from_sources(explicit, env_email.as_deref(), fallback)
    }

    fn from_sources(explicit: Option<&str>, env_email: Option<&str>, fallback: &str) -> Self {
        let email = [explicit, env_email]
            .into_iter()
            .flatten()
            .map(str::trim)
            .find(|e| !e.is_empty())
            .unwrap_or(fallback)
            .to_string();

        debug!(email = %email, "Resolved identity");
        Self { email }
    }

    pub fn email(&self) -> &str {
        &self.email
    }
}
