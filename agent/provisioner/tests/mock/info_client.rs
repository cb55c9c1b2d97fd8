use provisioner::clients::{ClientResult, InfoClient};
use provisioner::Configuration;

/// Create an [`InfoClient`] that does nothing so that we can test without keeping a memo.
pub(crate) struct MockInfoClient {}

#[async_trait::async_trait]
impl InfoClient for MockInfoClient {
    async fn get_info<Info>(&self) -> ClientResult<Info>
    where
        Info: Configuration,
    {
        Ok(Info::default())
    }

    async fn send_info<Info>(&self, _info: Info) -> ClientResult<()>
    where
        Info: Configuration,
    {
        Ok(())
    }
}
