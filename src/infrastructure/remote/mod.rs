mod mapper;
mod realtime;
mod rest_gateway;
mod rows;

pub use rest_gateway::RestGateway;
