//! # Caption Dataset
//!
//! [`CaptionDataset`] pairs every caption with the image it describes, and
//! serves each pair as a [`CaptionItem`] through burn's [`Dataset`] trait.
//!
//! The image side of an item is either a precomputed feature (see
//! [`crate::features`]) or the mean-subtracted pixels (see [`crate::pixels`]),
//! selected by [`CaptionDatasetConfig::use_img_features`].

use std::path::{Path, PathBuf};

use burn::{config::Config, data::dataset::Dataset};
use ndarray::{Array3, Array4, ArrayD, Axis};

use crate::{
    CSResult,
    CaptionsetError,
    features::FeatureStore,
    io::load_data,
    pixels::{DEFAULT_IMAGE_HEIGHT, DEFAULT_IMAGE_WIDTH, ImageMean, ImageProcessor},
    records::{CaptionCorpus, CaptionRecord, ImageRecord},
    types::{CSHashMap, TokenIndex, hash_map_with_capacity},
    vocab::WordVocab,
};

/// Config for [`CaptionDataset`].
#[derive(Config, Debug)]
pub struct CaptionDatasetConfig {
    /// The captions/images dataset file (``json`` or ``pickle``).
    pub dataset_path: String,

    /// The ``{ index -> token }`` vocabulary file (``json`` or ``pickle``).
    pub vocab_path: String,

    /// The image feature directory.
    pub img_feature_root: String,

    /// The raw image directory.
    pub img_root: String,

    /// Serve precomputed features instead of pixels.
    #[config(default = "true")]
    pub use_img_features: bool,

    /// The mean subtracted from pixels: ``"imagenet"``, ``"none"``, or ``"b,g,r"``.
    #[config(default = "\"imagenet\".to_string()")]
    pub img_mean: String,

    /// Load every image feature into memory on init.
    #[config(default = "false")]
    pub preload_features: bool,

    /// Fail on init if any caption has out-of-vocab tokens or no image.
    #[config(default = "true")]
    pub check_captions: bool,

    /// The pixel height images are resized to.
    #[config(default = "DEFAULT_IMAGE_HEIGHT")]
    pub image_height: usize,

    /// The pixel width images are resized to.
    #[config(default = "DEFAULT_IMAGE_WIDTH")]
    pub image_width: usize,
}

fn expand_path(path: &str) -> CSResult<PathBuf> {
    let expanded =
        shellexpand::full(path).map_err(|e| CaptionsetError::External(e.to_string()))?;
    Ok(PathBuf::from(expanded.as_ref()))
}

fn require_dir(path: &Path) -> CSResult<()> {
    if !path.exists() {
        Err(CaptionsetError::NotFound {
            path: path.to_path_buf(),
        })
    } else if !path.is_dir() {
        Err(CaptionsetError::NotADirectory {
            path: path.to_path_buf(),
        })
    } else {
        Ok(())
    }
}

impl CaptionDatasetConfig {
    /// Load the dataset and vocabulary, and set up image access.
    ///
    /// # Errors
    /// * [`CaptionsetError::NotFound`] if the dataset or vocab file is missing,
    ///   or the selected image root is missing.
    /// * [`CaptionsetError::NotADirectory`] if the selected image root is a file.
    /// * [`CaptionsetError::Config`] if features are preloaded in pixel mode,
    ///   or ``img_mean`` does not parse.
    /// * With ``check_captions``, any error of [`CaptionDataset::check_captions`].
    pub fn init(&self) -> CSResult<CaptionDataset> {
        let dataset_path = expand_path(&self.dataset_path)?;
        let vocab_path = expand_path(&self.vocab_path)?;
        for path in [&dataset_path, &vocab_path] {
            if !path.exists() {
                return Err(CaptionsetError::NotFound { path: path.clone() });
            }
        }

        let corpus: CaptionCorpus = load_data(&dataset_path)?;
        let vocab = WordVocab::load(&vocab_path)?;
        let mean: ImageMean = self.img_mean.parse()?;

        let source = if self.use_img_features {
            let root = expand_path(&self.img_feature_root)?;
            require_dir(&root)?;

            if self.preload_features {
                ImageSource::Features(FeatureStore::preload(root, &corpus.images)?)
            } else {
                ImageSource::Features(FeatureStore::lazy(root))
            }
        } else {
            if self.preload_features {
                return Err(CaptionsetError::Config(
                    "preload_features requires use_img_features".to_string(),
                ));
            }

            let root = expand_path(&self.img_root)?;
            require_dir(&root)?;

            ImageSource::Pixels {
                root,
                height: self.image_height,
                width: self.image_width,
            }
        };

        let dataset =
            CaptionDataset::from_parts(corpus, vocab, source, ImageProcessor::new(mean));
        if self.check_captions {
            dataset.check_captions()?;
        }
        log::debug!(
            "loaded {} captions of {} images from {}; vocab size {}",
            dataset.num_captions(),
            dataset.num_images(),
            dataset_path.display(),
            dataset.vocab().len(),
        );
        Ok(dataset)
    }
}

/// Where image inputs come from.
#[derive(Debug, Clone)]
pub enum ImageSource {
    /// Precomputed image features.
    Features(FeatureStore),

    /// Raw image files.
    Pixels {
        /// The image directory.
        root: PathBuf,

        /// The target height.
        height: usize,

        /// The target width.
        width: usize,
    },
}

/// The image half of a [`CaptionItem`].
#[derive(Debug, Clone, PartialEq)]
pub enum ImageInput {
    /// A precomputed feature array.
    Feature(ArrayD<f32>),

    /// Mean-subtracted BGR pixels, ``[3, height, width]``.
    Pixels(Array3<f32>),
}

/// One caption paired with its image.
#[derive(Debug, Clone, PartialEq)]
pub struct CaptionItem {
    /// The caption index.
    pub caption_idx: usize,

    /// The image index.
    pub img_idx: usize,

    /// The image path, relative to the image root.
    pub file_path: String,

    /// The caption as vocabulary indices.
    pub token_ids: Vec<TokenIndex>,

    /// The image input.
    pub image: ImageInput,
}

/// An image-captioning dataset.
#[derive(Debug, Clone)]
pub struct CaptionDataset {
    captions: Vec<CaptionRecord>,
    images: Vec<ImageRecord>,
    vocab: WordVocab,

    /// ``caption_idx -> img_idx``.
    cap2img: CSHashMap<usize, usize>,

    /// ``img_idx -> position in images``.
    img_positions: CSHashMap<usize, usize>,

    source: ImageSource,
    processor: ImageProcessor,
}

impl CaptionDataset {
    /// Assemble a dataset from loaded parts.
    pub fn from_parts(
        corpus: CaptionCorpus,
        vocab: WordVocab,
        source: ImageSource,
        processor: ImageProcessor,
    ) -> Self {
        let CaptionCorpus { captions, images } = corpus;

        let mut cap2img = hash_map_with_capacity(captions.len());
        for caption in &captions {
            cap2img.insert(caption.caption_idx, caption.img_idx);
        }

        let mut img_positions = hash_map_with_capacity(images.len());
        for (pos, image) in images.iter().enumerate() {
            img_positions.insert(image.img_idx.unwrap_or(pos), pos);
        }

        Self {
            captions,
            images,
            vocab,
            cap2img,
            img_positions,
            source,
            processor,
        }
    }

    /// The number of captions.
    pub fn num_captions(&self) -> usize {
        self.captions.len()
    }

    /// The number of images.
    pub fn num_images(&self) -> usize {
        self.images.len()
    }

    /// The caption records.
    pub fn captions(&self) -> &[CaptionRecord] {
        &self.captions
    }

    /// The image records.
    pub fn images(&self) -> &[ImageRecord] {
        &self.images
    }

    /// The vocabulary.
    pub fn vocab(&self) -> &WordVocab {
        &self.vocab
    }

    /// The image source.
    pub fn source(&self) -> &ImageSource {
        &self.source
    }

    /// The raw image loader, with the configured mean.
    pub fn processor(&self) -> &ImageProcessor {
        &self.processor
    }

    /// Convert tokens to vocabulary indices.
    pub fn token_to_index<S: AsRef<str>>(
        &self,
        tokens: &[S],
    ) -> CSResult<Vec<TokenIndex>> {
        self.vocab.token_to_index(tokens)
    }

    /// Convert vocabulary indices to tokens.
    pub fn index_to_token(
        &self,
        indices: &[TokenIndex],
    ) -> CSResult<Vec<&str>> {
        self.vocab.index_to_token(indices)
    }

    pub(crate) fn image_position(
        &self,
        caption_idx: usize,
        img_idx: usize,
    ) -> CSResult<usize> {
        self.img_positions
            .get(&img_idx)
            .copied()
            .ok_or(CaptionsetError::DanglingImage {
                caption_idx,
                img_idx,
            })
    }

    /// The image described by a caption, by caption index.
    pub fn image_for_caption(
        &self,
        caption_idx: usize,
    ) -> CSResult<&ImageRecord> {
        let img_idx = *self
            .cap2img
            .get(&caption_idx)
            .ok_or(CaptionsetError::UnknownCaption(caption_idx))?;
        let pos = self.image_position(caption_idx, img_idx)?;
        Ok(&self.images[pos])
    }

    /// Check that every caption can be served.
    ///
    /// # Errors
    /// * [`CaptionsetError::UnknownToken`] for the first out-of-vocab token.
    /// * [`CaptionsetError::DanglingImage`] for the first caption without an image.
    pub fn check_captions(&self) -> CSResult<()> {
        for caption in &self.captions {
            self.vocab.token_to_index(&caption.caption_tokens())?;
            self.image_position(caption.caption_idx, caption.img_idx)?;
        }
        Ok(())
    }

    /// Load a raw image as mean-subtracted ``[3, height, width]`` BGR pixels.
    ///
    /// Uses the configured ``img_mean`` in both feature and pixel mode.
    pub fn load_img<P: AsRef<Path>>(
        &self,
        img_path: P,
        height: usize,
        width: usize,
    ) -> CSResult<Array3<f32>> {
        self.processor.load_preprocessed(img_path, height, width)
    }

    /// Like [`Self::load_img`], with a leading batch axis: ``[1, 3, height, width]``.
    pub fn load_img_batch<P: AsRef<Path>>(
        &self,
        img_path: P,
        height: usize,
        width: usize,
    ) -> CSResult<Array4<f32>> {
        Ok(self.load_img(img_path, height, width)?.insert_axis(Axis(0)))
    }

    /// Build the item for the `index`-th caption.
    ///
    /// # Errors
    /// * [`CaptionsetError::IndexOutOfRange`] past the end of the captions.
    /// * [`CaptionsetError::UnknownToken`] if the caption has out-of-vocab tokens.
    /// * [`CaptionsetError::DanglingImage`] if the caption's image is missing.
    /// * Any feature or image loading error.
    pub fn get_example(
        &self,
        index: usize,
    ) -> CSResult<CaptionItem> {
        let caption = self
            .captions
            .get(index)
            .ok_or(CaptionsetError::IndexOutOfRange {
                index,
                len: self.captions.len(),
            })?;

        let token_ids = self.vocab.token_to_index(&caption.caption_tokens())?;

        let pos = self.image_position(caption.caption_idx, caption.img_idx)?;
        let image = &self.images[pos];

        let input = match &self.source {
            ImageSource::Features(store) => ImageInput::Feature(store.feature(pos, image)?),
            ImageSource::Pixels {
                root,
                height,
                width,
            } => ImageInput::Pixels(self.processor.load_preprocessed(
                root.join(&image.file_path),
                *height,
                *width,
            )?),
        };

        Ok(CaptionItem {
            caption_idx: caption.caption_idx,
            img_idx: caption.img_idx,
            file_path: image.file_path.clone(),
            token_ids,
            image: input,
        })
    }
}

impl Dataset<CaptionItem> for CaptionDataset {
    /// The item at `index`, or `None` if it is out of range or fails to load.
    ///
    /// burn's dataset iterator stops at the first `None`; captions are
    /// checked on init (see [`CaptionDatasetConfig::check_captions`]) so that
    /// only image load failures can end an epoch early.
    fn get(
        &self,
        index: usize,
    ) -> Option<CaptionItem> {
        if index >= self.captions.len() {
            return None;
        }

        match self.get_example(index) {
            Ok(item) => Some(item),
            Err(err) => {
                log::warn!("skipping caption example {index}: {err}");
                None
            }
        }
    }

    fn len(&self) -> usize {
        self.num_captions()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use ndarray::Array1;
    use tempdir::TempDir;

    use super::*;
    use crate::{
        features::{feature_path, tests::write_feature},
        io::save_data,
        pixels::tests::write_image,
    };

    struct Fixture {
        _tmpdir: TempDir,
        dataset_path: PathBuf,
        vocab_path: PathBuf,
        feature_root: PathBuf,
        img_root: PathBuf,
    }

    impl Fixture {
        fn config(&self) -> CaptionDatasetConfig {
            CaptionDatasetConfig::new(
                self.dataset_path.to_string_lossy().to_string(),
                self.vocab_path.to_string_lossy().to_string(),
                self.feature_root.to_string_lossy().to_string(),
                self.img_root.to_string_lossy().to_string(),
            )
        }
    }

    fn caption(
        caption_idx: usize,
        img_idx: usize,
        tokens: &[&str],
    ) -> CaptionRecord {
        CaptionRecord {
            caption_idx,
            img_idx,
            caption: None,
            tokens: tokens.iter().map(|t| t.to_string()).collect(),
        }
    }

    /// Two images, three captions; image records carry explicit,
    /// non-positional `img_idx` values.
    fn fixture(dataset_ext: &str) -> Fixture {
        let tmpdir = TempDir::new("captionset-test").unwrap();
        let base = tmpdir.path().to_path_buf();

        let images = vec![
            ImageRecord {
                img_idx: Some(10),
                file_path: "train/a.png".to_string(),
                id: Some(1),
            },
            ImageRecord {
                img_idx: Some(20),
                file_path: "train/b.png".to_string(),
                id: Some(2),
            },
        ];
        let corpus = CaptionCorpus {
            captions: vec![
                caption(100, 10, &["<bos>", "a", "dog", "<eos>"]),
                caption(101, 20, &["<bos>", "a", "cat", "<eos>"]),
                caption(102, 10, &["<bos>", "dog", "<eos>"]),
            ],
            images: images.clone(),
        };
        let dataset_path = base.join(format!("captions.{dataset_ext}"));
        save_data(&dataset_path, &corpus).unwrap();

        let word_ids: BTreeMap<usize, String> = ["<bos>", "<eos>", "a", "dog", "cat"]
            .iter()
            .enumerate()
            .map(|(i, t)| (i, t.to_string()))
            .collect();
        let vocab_path = base.join("vocab.json");
        save_data(&vocab_path, &word_ids).unwrap();

        let feature_root = base.join("features");
        let img_root = base.join("images");
        for (i, image) in images.iter().enumerate() {
            write_feature(
                &feature_path(&feature_root, &image.file_path),
                &Array1::from_elem(3, i as f32 + 1.0),
            );
            write_image(&img_root.join(&image.file_path), 6, 4, [0, 100, 200]);
        }

        Fixture {
            _tmpdir: tmpdir,
            dataset_path,
            vocab_path,
            feature_root,
            img_root,
        }
    }

    #[test]
    fn test_config_defaults() {
        let config = CaptionDatasetConfig::new(
            "d.json".to_string(),
            "v.json".to_string(),
            "feat".to_string(),
            "img".to_string(),
        );
        assert!(config.use_img_features);
        assert!(!config.preload_features);
        assert!(config.check_captions);
        assert_eq!(config.img_mean, "imagenet");
        assert_eq!(config.image_height, 224);
        assert_eq!(config.image_width, 224);
    }

    #[test]
    fn test_feature_dataset() -> CSResult<()> {
        let fx = fixture("json");
        let dataset = fx.config().init()?;

        assert_eq!(dataset.len(), 3);
        assert_eq!(dataset.num_captions(), 3);
        assert_eq!(dataset.num_images(), 2);
        assert_eq!(dataset.vocab().len(), 5);

        let item = dataset.get_example(1)?;
        assert_eq!(item.caption_idx, 101);
        assert_eq!(item.img_idx, 20);
        assert_eq!(item.file_path, "train/b.png");
        assert_eq!(item.token_ids, vec![0, 2, 4, 1]);
        assert_eq!(
            item.image,
            ImageInput::Feature(Array1::from_elem(3, 2.0f32).into_dyn())
        );

        assert_eq!(
            dataset.index_to_token(&item.token_ids)?,
            vec!["<bos>", "a", "cat", "<eos>"]
        );
        assert_eq!(dataset.token_to_index(&["dog"])?, vec![3]);

        assert_eq!(dataset.image_for_caption(102)?.file_path, "train/a.png");
        assert!(matches!(
            dataset.image_for_caption(7),
            Err(CaptionsetError::UnknownCaption(7))
        ));

        assert!(dataset.get(3).is_none());
        assert!(matches!(
            dataset.get_example(3),
            Err(CaptionsetError::IndexOutOfRange { index: 3, len: 3 })
        ));

        Ok(())
    }

    #[test]
    fn test_preloaded_matches_lazy() -> CSResult<()> {
        let fx = fixture("json");
        let lazy = fx.config().init()?;
        let preloaded = fx.config().with_preload_features(true).init()?;

        assert!(matches!(
            preloaded.source(),
            ImageSource::Features(store) if store.is_preloaded()
        ));

        for i in 0..lazy.len() {
            assert_eq!(lazy.get(i), preloaded.get(i));
        }

        Ok(())
    }

    #[test]
    fn test_pixel_dataset() -> CSResult<()> {
        let fx = fixture("json");
        let dataset = fx
            .config()
            .with_use_img_features(false)
            .with_img_mean("none".to_string())
            .with_image_height(4)
            .with_image_width(6)
            .init()?;

        let item = dataset.get(0).unwrap();
        match item.image {
            ImageInput::Pixels(arr) => {
                assert_eq!(arr.shape(), &[3, 4, 6]);
                // BGR order.
                assert_eq!(arr[[0, 0, 0]], 200.0);
                assert_eq!(arr[[1, 1, 1]], 100.0);
                assert_eq!(arr[[2, 3, 5]], 0.0);
            }
            other => panic!("expected pixels, got {other:?}"),
        }

        let arr = dataset.load_img(fx.img_root.join("train/b.png"), 2, 3)?;
        assert_eq!(arr.shape(), &[3, 2, 3]);

        Ok(())
    }

    #[test]
    fn test_pixel_dataset_subtracts_mean() -> CSResult<()> {
        let fx = fixture("json");
        let dataset = fx
            .config()
            .with_use_img_features(false)
            .with_img_mean("10,20,30".to_string())
            .with_image_height(4)
            .with_image_width(6)
            .init()?;

        let item = dataset.get_example(2)?;
        let ImageInput::Pixels(arr) = item.image else {
            panic!("expected pixels");
        };
        assert_eq!(arr[[0, 0, 0]], 190.0);
        assert_eq!(arr[[1, 0, 0]], 80.0);
        assert_eq!(arr[[2, 0, 0]], -30.0);

        Ok(())
    }

    #[cfg(feature = "pickle")]
    #[test]
    fn test_pickle_dataset() -> CSResult<()> {
        let fx = fixture("pickle");
        let dataset = fx.config().init()?;
        assert_eq!(dataset.num_captions(), 3);
        assert_eq!(dataset.get_example(0)?.token_ids, vec![0, 2, 3, 1]);
        Ok(())
    }

    #[test]
    fn test_missing_inputs() {
        let fx = fixture("json");

        let mut config = fx.config();
        config.dataset_path = "/nonexistent/captions.json".to_string();
        let err = config.init().unwrap_err();
        assert!(matches!(err, CaptionsetError::NotFound { .. }));

        let mut config = fx.config();
        config.vocab_path = "/nonexistent/vocab.json".to_string();
        let err = config.init().unwrap_err();
        assert!(matches!(err, CaptionsetError::NotFound { .. }));

        let mut config = fx.config();
        config.img_feature_root = "/nonexistent/features".to_string();
        let err = config.init().unwrap_err();
        assert!(matches!(err, CaptionsetError::NotFound { .. }));

        // The feature root is not consulted in pixel mode.
        config.use_img_features = false;
        config.init().unwrap();

        config.img_root = fx.vocab_path.to_string_lossy().to_string();
        let err = config.init().unwrap_err();
        assert!(matches!(err, CaptionsetError::NotADirectory { .. }));
    }

    #[test]
    fn test_invalid_options() {
        let fx = fixture("json");

        let err = fx
            .config()
            .with_use_img_features(false)
            .with_preload_features(true)
            .init()
            .unwrap_err();
        assert!(matches!(err, CaptionsetError::Config(_)));

        let err = fx
            .config()
            .with_use_img_features(false)
            .with_img_mean("bogus".to_string())
            .init()
            .unwrap_err();
        assert!(matches!(err, CaptionsetError::Config(_)));

        let unsupported = fx.dataset_path.with_extension("csv");
        std::fs::copy(&fx.dataset_path, &unsupported).unwrap();
        let mut config = fx.config();
        config.dataset_path = unsupported.to_string_lossy().to_string();
        let err = config.init().unwrap_err();
        assert!(matches!(err, CaptionsetError::UnsupportedFormat { .. }));
    }

    #[test]
    fn test_load_img_in_feature_mode() -> CSResult<()> {
        let fx = fixture("json");
        let path = fx.img_root.join("train/a.png");

        let dataset = fx.config().with_img_mean("none".to_string()).init()?;
        assert_eq!(dataset.processor().mean(), ImageMean::Zero);

        let arr = dataset.load_img(&path, 4, 6)?;
        assert_eq!(arr.shape(), &[3, 4, 6]);
        assert_eq!(arr[[0, 0, 0]], 200.0);
        assert_eq!(arr[[2, 0, 0]], 0.0);

        let batch = dataset.load_img_batch(&path, 2, 3)?;
        assert_eq!(batch.shape(), &[1, 3, 2, 3]);
        assert_eq!(batch[[0, 1, 1, 1]], 100.0);

        let dataset = fx.config().init()?;
        let arr = dataset.load_img(&path, 4, 6)?;
        assert_eq!(arr[[0, 0, 0]], 200.0 - 103.939);

        Ok(())
    }

    #[test]
    fn test_unknown_token() -> CSResult<()> {
        let fx = fixture("json");
        let corpus = CaptionCorpus {
            captions: vec![
                caption(0, 10, &["a", "dog"]),
                caption(1, 10, &["a", "zebra"]),
                caption(2, 20, &["a", "cat"]),
                caption(3, 20, &["dog"]),
            ],
            images: vec![
                ImageRecord {
                    img_idx: Some(10),
                    file_path: "train/a.png".to_string(),
                    id: None,
                },
                ImageRecord {
                    img_idx: Some(20),
                    file_path: "train/b.png".to_string(),
                    id: None,
                },
            ],
        };
        save_data(&fx.dataset_path, &corpus)?;

        assert!(matches!(
            fx.config().init(),
            Err(CaptionsetError::UnknownToken(ref t)) if t == "zebra"
        ));

        let dataset = fx.config().with_check_captions(false).init()?;
        assert_eq!(dataset.len(), 4);
        assert!(dataset.get(1).is_none());
        assert!(dataset.get(2).is_some());
        assert!(matches!(
            dataset.get_example(1),
            Err(CaptionsetError::UnknownToken(ref t)) if t == "zebra"
        ));

        // Iteration ends at the first unloadable caption.
        assert_eq!(dataset.iter().count(), 1);

        Ok(())
    }

    #[test]
    fn test_dangling_image() -> CSResult<()> {
        let fx = fixture("json");
        let corpus = CaptionCorpus {
            captions: vec![caption(5, 99, &["a"])],
            images: vec![],
        };
        save_data(&fx.dataset_path, &corpus)?;

        assert!(matches!(
            fx.config().init(),
            Err(CaptionsetError::DanglingImage {
                caption_idx: 5,
                img_idx: 99
            })
        ));

        let dataset = fx.config().with_check_captions(false).init()?;
        assert!(matches!(
            dataset.get_example(0),
            Err(CaptionsetError::DanglingImage {
                caption_idx: 5,
                img_idx: 99
            })
        ));

        Ok(())
    }

    #[test]
    fn test_config_file() -> CSResult<()> {
        let fx = fixture("json");
        let path = fx.dataset_path.with_file_name("dataset_config.json");

        let config = fx.config().with_image_height(32);
        config.save(&path)?;

        let loaded = CaptionDatasetConfig::load(&path)
            .map_err(|e| CaptionsetError::External(e.to_string()))?;
        assert_eq!(loaded.image_height, 32);
        assert_eq!(loaded.dataset_path, config.dataset_path);
        assert!(loaded.init().is_ok());

        Ok(())
    }
}
