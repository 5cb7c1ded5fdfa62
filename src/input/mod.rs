//! Inputs are the data the pipeline is evaluated against: the weight table that defines the index
//! and [Penelope](crate::input::penelope::Penelope), an in-memory table of daily closes.
pub mod penelope;
pub mod weights;
