pub mod fetch;
pub mod politeness;
pub mod retry;
pub mod robots;
pub mod session;

pub use fetch::{FetchFailure, FetchOutcome, Fetcher};
pub use politeness::DomainGate;
pub use robots::RobotsPolicy;
pub use session::build_client;
