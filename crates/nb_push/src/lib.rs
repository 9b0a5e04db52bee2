use std::sync::Arc;

use nb_core::config::PushConfig;
use nb_core::{Error, PushSink, Result};

pub mod card;
pub mod console;
pub mod feishu;

pub use card::render_card;
pub use console::ConsoleSink;
pub use feishu::{gen_sign, FeishuSink};

/// Builds the sink for a real run. Dry runs use [`ConsoleSink`] directly.
pub fn create_sink(config: &PushConfig) -> Result<Arc<dyn PushSink>> {
    if config.webhooks.is_empty() {
        return Err(Error::Config("no push webhooks configured".to_string()));
    }
    Ok(Arc::new(FeishuSink::new(config)?))
}
