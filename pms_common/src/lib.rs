mod money;

pub mod op;
mod secret;

pub use money::{MoneyConversionError, UsdCents, USD_CURRENCY_CODE};
pub use secret::Secret;
