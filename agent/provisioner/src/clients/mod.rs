/*!

Clients that a provider uses to record its progress.

!*/

mod error;
mod info_client;

pub use error::{ClientError, ClientResult};
pub use info_client::{InfoClient, MemoryInfoClient};
