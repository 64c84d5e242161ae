//! Domain types and pure logic for the posting-map backend.
//!
//! Nothing in this crate performs I/O. The area wire codec, the spot
//! legacy/split record model, the CSV engine, and the photo pipeline are
//! all testable without a store or a runtime.

pub mod area;
pub mod csv;
pub mod error;
pub mod photo;
pub mod spot;
pub mod types;
