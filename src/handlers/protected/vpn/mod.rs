pub mod reconcile;
pub mod status;

pub use reconcile::reconcile_post;
pub use status::{nas_status_get, status_get};
