//! HTTP control surface for the ROSphere Monitor.
//!
//! The dashboard front end is an external consumer: it polls the state and
//! trend endpoints and drives the session through the control endpoints.
//! Rendering stays entirely on the client side.

pub mod handlers;
pub mod routes;

pub use handlers::AppState;
pub use routes::configure;
