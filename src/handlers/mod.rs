// handlers/mod.rs - two-tier handler layout
//
// Public (no auth) → Protected (bearer token verified by `require_identity`)
pub mod public;
pub mod protected;

pub use public::*;
