//! Identity provider adapters.

mod reqwest_gateway;

pub use reqwest_gateway::ReqwestProviderGateway;
