use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum AmountError {
    #[error("Amount error: no leading number in {0:?}")]
    NotANumber(String),
    #[error("Amount error: {0} is negative")]
    Negative(String),
    #[error("Amount error: value is not finite")]
    NonFinite,
    #[error("Amount error: value is out of range")]
    OutOfRange
}
