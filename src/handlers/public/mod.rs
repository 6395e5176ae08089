// handlers/public/mod.rs - Public handlers (no authentication required)
//
// Route Prefix: /, /health, /api/schools/*, /api/users/*

pub mod schools;
pub mod service;
pub mod users;
