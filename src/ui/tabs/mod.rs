//! Tab-specific content rendering.

pub mod betting;
pub mod drivers;
pub mod standings;
pub mod teams;
