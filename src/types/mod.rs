mod amount;
mod errors;

pub use amount::Amount;
#[cfg(test)]
pub use errors::AmountError;

pub type TransactionId = String;
