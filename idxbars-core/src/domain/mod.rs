//! Domain types for idxbars

pub mod instrument;

pub use instrument::Instrument;
