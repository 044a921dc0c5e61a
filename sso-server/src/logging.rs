//! Logging — tracing-subscriber configured by environment tag
//!
//! `RUST_LOG` overrides the level picked for the environment.

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Deployment environment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Local,
    Dev,
    Staging,
    Prod,
    Other,
}

impl Environment {
    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "local" => Self::Local,
            "dev" => Self::Dev,
            "staging" => Self::Staging,
            "prod" => Self::Prod,
            _ => Self::Other,
        }
    }

    /// Default level directive
    pub fn level(&self) -> &'static str {
        match self {
            Self::Local | Self::Dev => "debug",
            Self::Staging | Self::Other => "info",
            Self::Prod => "warn",
        }
    }

    /// Production emits JSON lines, everything else text
    pub fn json(&self) -> bool {
        matches!(self, Self::Prod)
    }
}

fn build_env_filter(env: Environment) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(env.level()))
}

/// Install the global subscriber for the given environment tag
pub fn init_logging(env: &str) -> anyhow::Result<()> {
    let env = Environment::from_str(env);
    let registry = tracing_subscriber::registry().with(build_env_filter(env));

    if env.json() {
        registry.with(fmt::layer().json()).try_init()?;
    } else {
        registry.with(fmt::layer()).try_init()?;
    }
    Ok(())
}
