// handlers/protected/mod.rs - Handlers behind JWT auth and the tenant gate
//
// Route Prefix: /api/*
// Middleware: jwt_auth_middleware -> tenant_gate_middleware
// Each handler still checks its own permission token through the facade.

pub mod auth;
pub mod vpn;
