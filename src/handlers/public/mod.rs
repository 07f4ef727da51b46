// handlers/public/mod.rs - Endpoints reachable without a bearer token

pub mod health;
pub mod radius;

pub use health::health;
pub use radius::radius_authorize;
