pub mod nas;
pub mod tenant;

pub use nas::{Nas, NasStatus};
pub use tenant::{Tenant, TenantStatus};
