//! Per-component context handed out at construction.
//!
//! A `Context` is a log target plus a shared, read-only configuration
//! snapshot. Components log through their own target so `RUST_LOG` can
//! filter them individually (`RUST_LOG=kleine::gps=trace`).

use std::sync::Arc;

use crate::config::AppConfig;

#[derive(Debug, Clone)]
pub struct Context {
    config: Arc<AppConfig>,
    target: &'static str,
}

impl Context {
    pub fn new(config: AppConfig) -> Self {
        Self {
            config: Arc::new(config),
            target: "kleine",
        }
    }

    /// Same configuration, logging under `target`.
    pub fn scoped(&self, target: &'static str) -> Self {
        Self {
            config: Arc::clone(&self.config),
            target,
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn target(&self) -> &'static str {
        self.target
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scoped_shares_config() {
        let ctx = Context::new(AppConfig::default());
        let scoped = ctx.scoped("kleine::scheduler");
        assert_eq!(scoped.target(), "kleine::scheduler");
        assert!(Arc::ptr_eq(&ctx.config, &scoped.config));
    }
}
