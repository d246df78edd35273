//! Skills questionnaire: fields, validation and submission

pub mod collector;
pub mod fields;
pub mod prompt;

pub use collector::{FormInput, FormState, SubmitOutcome};
pub use fields::{Rating, RatingField, TextField};
