use std::sync::Arc;

use crate::config::Config;
use crate::letters::provider::TextProvider;

/// Shared application state injected into all route handlers via Axum extractors.
/// Holds no per-request data: every request is handled independently.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Pluggable text provider. Default: AnthropicProvider. Swap via TEXT_PROVIDER env.
    pub provider: Arc<dyn TextProvider>,
}

#[cfg(test)]
impl AppState {
    /// Template-backed state that never touches the network.
    pub fn for_tests() -> Self {
        use crate::config::ProviderKind;
        use crate::letters::provider::TemplateProvider;

        AppState {
            config: Config {
                provider: ProviderKind::Template,
                anthropic_api_key: None,
                max_concurrent_generations: 2,
                llm_timeout_secs: 5,
                port: 0,
                rust_log: "debug".to_string(),
            },
            provider: Arc::new(TemplateProvider),
        }
    }
}
