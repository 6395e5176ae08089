// handlers/mod.rs - Handler tiers
//
// Public (no auth) → Elevated (admin bearer token)

pub mod elevated;
pub mod public;
