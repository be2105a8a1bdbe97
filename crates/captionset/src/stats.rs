//! # Corpus Statistics

use core::fmt;

use crate::{dataset::CaptionDataset, types::CSHashMap};

/// Summary counts over a [`CaptionDataset`].
#[derive(Debug, Clone, PartialEq)]
pub struct CorpusStats {
    /// The number of captions.
    pub num_captions: usize,

    /// The number of images.
    pub num_images: usize,

    /// The number of vocabulary entries.
    pub vocab_size: usize,

    /// The number of images with no caption.
    pub uncaptioned_images: usize,

    /// The longest caption, in tokens.
    pub max_caption_len: usize,

    /// The mean caption length, in tokens.
    pub mean_caption_len: f64,

    /// Caption tokens missing from the vocabulary, with counts; most frequent first.
    pub unknown_tokens: Vec<(String, usize)>,
}

impl CorpusStats {
    /// Compute the statistics of a dataset.
    pub fn compute(dataset: &CaptionDataset) -> Self {
        let vocab = dataset.vocab();

        let mut total_len = 0usize;
        let mut max_caption_len = 0usize;
        let mut unknown: CSHashMap<String, usize> = Default::default();
        for caption in dataset.captions() {
            let tokens = caption.caption_tokens();
            total_len += tokens.len();
            max_caption_len = max_caption_len.max(tokens.len());

            for token in tokens {
                if vocab.get_index(token).is_none() {
                    *unknown.entry(token.to_string()).or_default() += 1;
                }
            }
        }

        let captioned = dataset
            .captions()
            .iter()
            .filter_map(|c| dataset.image_position(c.caption_idx, c.img_idx).ok())
            .collect::<std::collections::BTreeSet<_>>();

        let mut unknown_tokens: Vec<(String, usize)> = unknown.into_iter().collect();
        unknown_tokens.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

        let num_captions = dataset.num_captions();
        Self {
            num_captions,
            num_images: dataset.num_images(),
            vocab_size: vocab.len(),
            uncaptioned_images: dataset.num_images().saturating_sub(captioned.len()),
            max_caption_len,
            mean_caption_len: if num_captions == 0 {
                0.0
            } else {
                total_len as f64 / num_captions as f64
            },
            unknown_tokens,
        }
    }
}

impl fmt::Display for CorpusStats {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        writeln!(f, "captions:           {}", self.num_captions)?;
        writeln!(f, "images:             {}", self.num_images)?;
        writeln!(f, "uncaptioned images: {}", self.uncaptioned_images)?;
        writeln!(f, "vocab size:         {}", self.vocab_size)?;
        writeln!(f, "max caption len:    {}", self.max_caption_len)?;
        writeln!(f, "mean caption len:   {:.2}", self.mean_caption_len)?;
        write!(f, "unknown tokens:     {}", self.unknown_tokens.len())?;
        for (token, count) in self.unknown_tokens.iter().take(10) {
            write!(f, "\n  {token:?}: {count}")?;
        }
        Ok(())
    }
}
