// handlers/mod.rs - Two-tier handler layout
//
// Public (no JWT; health probes and the RADIUS shared-secret path)
// Protected (JWT + tenant lifecycle gate; /api/*)
pub mod public;
pub mod protected;
