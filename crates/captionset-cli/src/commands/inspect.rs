use std::io::Write;

use burn::config::Config;
use captionset::{CaptionDatasetConfig, CorpusStats};

use crate::input_output::OutputArgs;

/// Args for the inspect command.
#[derive(clap::Args, Debug)]
pub struct InspectArgs {
    /// A saved ``CaptionDatasetConfig`` json file.
    ///
    /// When given, ``--dataset`` and ``--vocab`` override its paths.
    #[arg(long, default_value = None)]
    config: Option<String>,

    /// The captions/images dataset file (json or pickle).
    #[arg(long, default_value = None)]
    dataset: Option<String>,

    /// The ``{ index -> token }`` vocab file (json or pickle).
    #[arg(long, default_value = None)]
    vocab: Option<String>,

    /// The image feature directory.
    #[arg(long, default_value = None)]
    features: Option<String>,

    /// Preload every image feature (validates their shapes).
    #[arg(long, action=clap::ArgAction::SetTrue)]
    preload: bool,

    #[command(flatten)]
    output: OutputArgs,
}

impl InspectArgs {
    fn dataset_config(&self) -> Result<CaptionDatasetConfig, Box<dyn std::error::Error>> {
        let mut config = match &self.config {
            Some(path) => {
                CaptionDatasetConfig::load(path).map_err(|e| format!("{path}: {e}"))?
            }
            None => {
                let dataset = self
                    .dataset
                    .clone()
                    .ok_or("either --config or --dataset is required")?;
                let vocab = self
                    .vocab
                    .clone()
                    .ok_or("either --config or --vocab is required")?;
                // Statistics read no pixels; roots default to the working directory.
                CaptionDatasetConfig::new(dataset, vocab, ".".to_string(), ".".to_string())
            }
        };

        if let Some(dataset) = &self.dataset {
            config.dataset_path = dataset.clone();
        }
        if let Some(vocab) = &self.vocab {
            config.vocab_path = vocab.clone();
        }
        if let Some(features) = &self.features {
            config.img_feature_root = features.clone();
        }
        if self.preload {
            config.preload_features = true;
        }
        // Out-of-vocab tokens are reported, not fatal.
        config.check_captions = false;
        Ok(config)
    }

    /// Run the inspect command.
    pub fn run(&self) -> Result<(), Box<dyn std::error::Error>> {
        let config = self.dataset_config()?;
        log::info!("inspecting {}", config.dataset_path);

        let dataset = config.init()?;
        let stats = CorpusStats::compute(&dataset);

        let mut writer = self.output.open_writer()?;
        writeln!(writer, "{stats}")?;
        writer.flush()?;
        Ok(())
    }
}
