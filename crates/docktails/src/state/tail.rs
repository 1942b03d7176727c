//! Tail state — TailState struct, shared state type alias.

use std::sync::Arc;

use crate::conf::TailConfig;
use crate::filter::NamePrefixFilter;
use crate::logs::registry::SessionRegistry;
use crate::output::{ColorAllocator, SinkHandle};

pub struct TailState {
    pub config: TailConfig,
    pub filter: NamePrefixFilter,
    pub colors: ColorAllocator,
    pub sessions: Arc<SessionRegistry>,
    /// Serialized writers for the process's stdout and stderr.
    pub stdout: SinkHandle,
    pub stderr: SinkHandle,
}

impl TailState {
    pub fn new(config: TailConfig, stdout: SinkHandle, stderr: SinkHandle) -> Self {
        Self {
            filter: NamePrefixFilter::new(&config.name_prefix),
            config,
            colors: ColorAllocator::new(),
            sessions: Arc::new(SessionRegistry::new()),
            stdout,
            stderr,
        }
    }
}

pub type SharedState = Arc<TailState>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_follows_config() {
        let config = TailConfig {
            name_prefix: "web".to_string(),
            ..TailConfig::default()
        };
        let (stdout, _out) = SinkHandle::channel();
        let (stderr, _err) = SinkHandle::channel();
        let state = TailState::new(config, stdout, stderr);

        assert_eq!(state.filter.prefix(), "web");
        assert!(state.filter.matches("/web-1"));
        assert!(state.sessions.is_empty());
    }
}
