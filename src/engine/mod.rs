mod errors;
mod tracker;

pub use errors::TrackerError;
pub use tracker::{data_url, ImageOutcome, Tracker};
