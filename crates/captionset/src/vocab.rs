//! # Word Vocabulary
//!
//! A [`WordVocab`] is the bidirectional mapping between caption tokens and
//! their integer indices.
//!
//! On disk the vocabulary is the ``{ index -> token }`` map; in ``json`` the
//! indices are (necessarily) decimal string keys, in ``pickle`` they are ints.
//! The ``{ token -> index }`` direction is built by inverting it on load.

use std::{collections::BTreeMap, path::Path};

use crate::{
    CSResult,
    CaptionsetError,
    io::load_data,
    types::{CSHashMap, TokenIndex, hash_map_with_capacity},
};

/// Bidirectional token/index vocabulary.
#[derive(Debug, Clone, PartialEq)]
pub struct WordVocab {
    word_ids: BTreeMap<TokenIndex, String>,
    inv_word_ids: CSHashMap<String, TokenIndex>,
}

impl WordVocab {
    /// Load a vocabulary from a ``json`` or ``pickle`` file.
    pub fn load<P: AsRef<Path>>(path: P) -> CSResult<Self> {
        let word_ids: BTreeMap<TokenIndex, String> = load_data(path)?;
        Ok(Self::from_index_map(word_ids))
    }

    /// Build a vocabulary from an ``{ index -> token }`` map.
    ///
    /// When several indices share a token, the inverse keeps the largest index.
    pub fn from_index_map(word_ids: BTreeMap<TokenIndex, String>) -> Self {
        let mut inv_word_ids = hash_map_with_capacity(word_ids.len());
        for (&idx, token) in &word_ids {
            if let Some(prev) = inv_word_ids.insert(token.clone(), idx) {
                log::debug!("vocab token {token:?} at {prev} shadowed by {idx}");
            }
        }

        Self {
            word_ids,
            inv_word_ids,
        }
    }

    /// The ``{ index -> token }`` map.
    pub fn word_ids(&self) -> &BTreeMap<TokenIndex, String> {
        &self.word_ids
    }

    /// The number of indices in the vocabulary.
    pub fn len(&self) -> usize {
        self.word_ids.len()
    }

    /// Is the vocabulary empty?
    pub fn is_empty(&self) -> bool {
        self.word_ids.is_empty()
    }

    /// Look up the index of a token.
    pub fn get_index(
        &self,
        token: &str,
    ) -> Option<TokenIndex> {
        self.inv_word_ids.get(token).copied()
    }

    /// Look up the token at an index.
    pub fn get_token(
        &self,
        index: TokenIndex,
    ) -> Option<&str> {
        self.word_ids.get(&index).map(String::as_str)
    }

    /// Convert a token sequence to indices.
    ///
    /// # Errors
    /// [`CaptionsetError::UnknownToken`] on the first token not in the vocab.
    pub fn token_to_index<S: AsRef<str>>(
        &self,
        tokens: &[S],
    ) -> CSResult<Vec<TokenIndex>> {
        tokens
            .iter()
            .map(|t| {
                let t = t.as_ref();
                self.get_index(t)
                    .ok_or_else(|| CaptionsetError::UnknownToken(t.to_string()))
            })
            .collect()
    }

    /// Convert an index sequence to tokens.
    ///
    /// # Errors
    /// [`CaptionsetError::UnknownIndex`] on the first index not in the vocab.
    pub fn index_to_token(
        &self,
        indices: &[TokenIndex],
    ) -> CSResult<Vec<&str>> {
        indices
            .iter()
            .map(|&idx| {
                self.get_token(idx)
                    .ok_or(CaptionsetError::UnknownIndex(idx))
            })
            .collect()
    }
}
