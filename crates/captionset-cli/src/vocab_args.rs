use captionset::WordVocab;

/// Vocabulary selector arg group.
#[derive(clap::Args, Debug)]
pub struct VocabArgs {
    /// The ``{ index -> token }`` vocab file (json or pickle).
    #[arg(long)]
    vocab: String,
}

impl VocabArgs {
    /// Load the vocabulary.
    pub fn load_vocab(&self) -> Result<WordVocab, Box<dyn std::error::Error>> {
        let vocab = WordVocab::load(&self.vocab)?;
        log::info!("loaded {} vocab entries from {}", vocab.len(), self.vocab);
        Ok(vocab)
    }
}
