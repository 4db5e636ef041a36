mod client;
mod endpoints;
mod region;
mod types;

pub use client::RiotClient;
pub use region::Region;
pub use types::{RiotApiError, RiotApiResponse};
