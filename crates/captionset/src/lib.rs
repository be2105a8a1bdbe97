//! # `captionset` Image-Captioning Datasets
//!
//! This crate loads preprocessed image-captioning corpora for training:
//! captions, the images they describe, and the token vocabulary.
//!
//! See:
//! * [`dataset`] for the [`CaptionDataset`] served through burn's `Dataset` trait.
//! * [`vocab`] for [`WordVocab`] token/index conversion.
//! * [`features`] for precomputed ``.npz`` image features, lazy or preloaded.
//! * [`pixels`] for raw image loading and mean subtraction.
//! * [`io`] for ``json`` / ``pickle`` data files.
//!
//! ## Crate Features
//!
//! #### feature: ``pickle``
//!
//! Enabled by default. Reads and writes ``.pickle`` / ``.pkl`` dataset and
//! vocab files via ``serde-pickle``; without it only ``json`` is accepted.
//!
//! ## Loading a Dataset
//!
//! ```rust,ignore
//! use burn::data::dataset::Dataset;
//! use captionset::CaptionDatasetConfig;
//!
//! let dataset = CaptionDatasetConfig::new(
//!     "~/coco/captions_train.json".to_string(),
//!     "~/coco/vocab.json".to_string(),
//!     "~/coco/features".to_string(),
//!     "~/coco/images".to_string(),
//! )
//! .with_preload_features(true)
//! .init()?;
//!
//! let item = dataset.get(0).unwrap();
//! let tokens = dataset.index_to_token(&item.token_ids)?;
//! ```
#![warn(missing_docs, unused)]

pub mod dataset;
pub mod errors;
pub mod features;
pub mod io;
pub mod pixels;
pub mod records;
pub mod stats;
pub mod types;
pub mod vocab;

#[doc(inline)]
pub use dataset::{CaptionDataset, CaptionDatasetConfig, CaptionItem, ImageInput, ImageSource};
#[doc(inline)]
pub use errors::{CSResult, CaptionsetError};
#[doc(inline)]
pub use records::{CaptionCorpus, CaptionRecord, ImageRecord};
#[doc(inline)]
pub use stats::CorpusStats;
#[doc(inline)]
pub use vocab::WordVocab;
