pub mod permissions;

pub use permissions::permissions_get;
