use super::error::{self, ClientResult};
use log::info;
use serde_json::Value;
use snafu::ResultExt;
use stack_model::Configuration;
use tokio::sync::Mutex;

/// `InfoClient` allows [`Create`] and [`Destroy`] objects to keep a memo about their progress,
/// e.g. the step they are on and whether provisioning has started. If a step fails, the memo is what
/// tells the caller how far the run got.
///
/// You define a "plain old data" struct to represent the information that you want to store and
/// provide this type for the `Info` type parameter.
///
/// This is provided as a trait so that mock implementations can be injected for testing purposes.
/// In practice you will use the [`MemoryInfoClient`].
#[async_trait::async_trait]
pub trait InfoClient: Sized + Send + Sync {
    /// Get the stored memo, or `Info::default()` if nothing was stored yet.
    async fn get_info<Info>(&self) -> ClientResult<Info>
    where
        Info: Configuration;

    /// Send (overwrite) the memo.
    async fn send_info<Info>(&self, info: Info) -> ClientResult<()>
    where
        Info: Configuration;
}

/// Keeps the memo in memory for the duration of the process and logs every update.
#[derive(Debug, Default)]
pub struct MemoryInfoClient {
    memo: Mutex<Option<Value>>,
}

impl MemoryInfoClient {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl InfoClient for MemoryInfoClient {
    async fn get_info<Info>(&self) -> ClientResult<Info>
    where
        Info: Configuration,
    {
        match self.memo.lock().await.clone() {
            Some(value) => Info::from_value(value).context(error::DeserializationSnafu),
            None => Ok(Info::default()),
        }
    }

    async fn send_info<Info>(&self, info: Info) -> ClientResult<()>
    where
        Info: Configuration,
    {
        let value = info.into_value().context(error::SerializationSnafu)?;
        if let Some(status) = value.get("currentStatus").and_then(Value::as_str) {
            info!("{}", status);
        }
        *self.memo.lock().await = Some(value);
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::{InfoClient, MemoryInfoClient};
    use serde::{Deserialize, Serialize};
    use stack_model::Configuration;

    #[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct Memo {
        current_status: String,
    }

    impl Configuration for Memo {}

    #[tokio::test]
    async fn round_trip() {
        let client = MemoryInfoClient::new();
        assert_eq!(client.get_info::<Memo>().await.unwrap(), Memo::default());
        let memo = Memo {
            current_status: "Applying configuration".into(),
        };
        client.send_info(memo.clone()).await.unwrap();
        assert_eq!(client.get_info::<Memo>().await.unwrap(), memo);
    }
}
