//! Services backing the route handlers.

pub mod selfie;
