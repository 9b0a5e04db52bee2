use async_trait::async_trait;
use nb_core::{Digest, PushSink, Result};

use crate::card::render_card;

/// Prints the rendered card to stdout instead of posting it.
#[derive(Debug, Default)]
pub struct ConsoleSink;

#[async_trait]
impl PushSink for ConsoleSink {
    fn name(&self) -> &str {
        "console"
    }

    async fn push(&self, digest: &Digest) -> Result<()> {
        let rendered = serde_json::to_string_pretty(&render_card(digest))?;
        println!("{}", rendered);
        Ok(())
    }
}
