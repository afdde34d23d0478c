// Infra censor module - reqwest implementations of the moderation ports.

pub mod http_fetcher;
pub mod safety_client;

pub use http_fetcher::HttpImageFetcher;
pub use safety_client::SafetyCheckerClient;
