//! # Data File IO
//!
//! Datasets and vocabularies are stored as whole-file ``json`` or ``pickle``
//! documents; the format is chosen by file suffix.
//!
//! See:
//! * [`DataFormat`] for suffix dispatch.
//! * [`load_data`] / [`save_data`] to move typed values through those formats.

pub mod data_format;

#[doc(inline)]
pub use data_format::{DataFormat, load_data, save_data};
