//! Public types for the Huginn API.

mod classification;
mod label;

pub use classification::{
    Candidate, ClassificationLogEntry, ClassificationRequest, ClassificationResponse,
};
pub use label::Label;
