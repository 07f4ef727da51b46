pub mod decision;
pub mod gate;

pub use decision::{decide, TenantDecision};
pub use gate::{RadiusDecision, TenantLifecycleGate};
