//! Application wiring: services, routes, server lifecycle.

pub mod routes;
pub mod server;
pub mod services;
