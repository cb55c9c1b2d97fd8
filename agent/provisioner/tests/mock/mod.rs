pub(crate) mod info_client;
pub(crate) mod runner;
