//! Data sources: the series registry and the FRED gateway.

pub mod fred;
pub mod gateway;
pub mod registry;

pub use fred::FredClient;
pub use gateway::FetchGateway;
pub use registry::SeriesRegistry;
