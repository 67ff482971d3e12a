//! Operator inputs

mod button;

pub use button::Button;
