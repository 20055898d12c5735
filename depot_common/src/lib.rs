mod gold;

pub mod helpers;
pub mod op;
mod secret;

pub use gold::{Gold, GoldConversionError, CENTS_PER_GOLD};
pub use secret::Secret;
