//! # Caption Corpus Records
//!
//! The preprocessed dataset is a single document with two lists:
//! * `captions` - [`CaptionRecord`], each naming the image it describes by `img_idx`,
//! * `images` - [`ImageRecord`], each naming an image file relative to an image root.

use serde::{Deserialize, Serialize};

/// One caption of one image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaptionRecord {
    /// The unique caption index.
    pub caption_idx: usize,

    /// The index of the described image.
    pub img_idx: usize,

    /// The raw caption text, if retained by preprocessing.
    #[serde(default)]
    pub caption: Option<String>,

    /// The tokenized caption.
    #[serde(default)]
    pub tokens: Vec<String>,
}

impl CaptionRecord {
    /// The caption tokens.
    ///
    /// Falls back to whitespace-splitting the raw caption when no tokens were stored.
    pub fn caption_tokens(&self) -> Vec<&str> {
        if !self.tokens.is_empty() {
            return self.tokens.iter().map(String::as_str).collect();
        }
        match &self.caption {
            Some(caption) => caption.split_whitespace().collect(),
            None => Vec::new(),
        }
    }
}

/// One image of the corpus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageRecord {
    /// The image index; when absent, the record's position in the image list.
    #[serde(default)]
    pub img_idx: Option<usize>,

    /// The image path, relative to the image (or feature) root.
    pub file_path: String,

    /// The upstream image id, if retained by preprocessing.
    #[serde(default)]
    pub id: Option<u64>,
}

/// The full captions/images document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CaptionCorpus {
    /// Every caption.
    pub captions: Vec<CaptionRecord>,

    /// Every image.
    pub images: Vec<ImageRecord>,
}
