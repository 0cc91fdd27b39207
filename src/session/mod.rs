pub mod practice;
pub mod review;

pub use practice::{Grade, PracticeQueue, SessionError};
