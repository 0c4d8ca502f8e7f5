//! Modcheck Refresh - remote rule refresh and the checker surface
//!
//! Built on tokio; the validation path never awaits.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod checker;
pub mod fetch;
pub mod remote;
pub mod scheduler;

pub use checker::Checker;
pub use fetch::{FetchError, Fetcher, HttpFetcher};
pub use remote::{fetch_remote, RemoteSource};
pub use scheduler::{RefreshScheduler, RefreshState, RefreshStatus};
