use async_trait::async_trait;
use crate::digest::Digest;
use crate::Result;

#[async_trait]
pub trait PushSink: Send + Sync {
    fn name(&self) -> &str;

    /// Deliver one digest. Called exactly once per run, empty digests included.
    async fn push(&self, digest: &Digest) -> Result<()>;
}
