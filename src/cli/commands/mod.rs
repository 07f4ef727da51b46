pub mod can;
pub mod dump;
pub mod reconcile;
