pub mod api_clients;
pub mod route_finder;
pub mod types;
