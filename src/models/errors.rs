use crate::models::BuildContext;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum BuildError {
    #[error("No amount in parse result or manual text [{manual_text:?}] and no image attached")]
    NoAmount {
        manual_text: String
    }
}

impl BuildError {
    pub fn no_amount(context: &BuildContext) -> Self {
        Self::NoAmount { manual_text: context.manual_text.clone() }
    }
}
