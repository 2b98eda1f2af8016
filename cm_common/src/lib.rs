mod naira;

pub mod op;
mod secret;

pub use naira::{Naira, NairaConversionError, NAIRA_CURRENCY_CODE, NAIRA_CURRENCY_CODE_LOWER};
pub use secret::Secret;
