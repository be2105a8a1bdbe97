//! # Image Features
//!
//! Precomputed image features are stored one-per-image as numpy ``.npz``
//! archives, mirroring the image tree:
//!
//! ```text
//! <feature_root>/<file_path without extension>.npz  ->  { "arr_0": f32[...] }
//! ```
//!
//! A [`FeatureStore`] either reads these on demand, or holds all of them
//! stacked into one array.

use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
};

use ndarray::{ArrayD, ArrayViewD, Axis, IxDyn};
use ndarray_npy::{NpzReader, ReadNpyError, ReadNpzError};

use crate::{CSResult, CaptionsetError, records::ImageRecord};

/// The array name numpy's ``savez`` gives to its first positional array.
pub const FEATURE_ARRAY_NAME: &str = "arr_0";

/// The feature file suffix.
pub const FEATURE_EXTENSION: &str = "npz";

/// The feature file path for an image path.
pub fn feature_path<P: AsRef<Path>>(
    feature_root: P,
    file_path: &str,
) -> PathBuf {
    feature_root
        .as_ref()
        .join(Path::new(file_path).with_extension(FEATURE_EXTENSION))
}

fn npz_error(
    path: &Path,
    err: impl std::fmt::Display,
) -> CaptionsetError {
    CaptionsetError::Parse {
        path: path.to_path_buf(),
        message: err.to_string(),
    }
}

/// Load the feature array from one ``.npz`` file.
///
/// Both stored and deflated (``savez_compressed``) archives are read;
/// ``f64`` arrays are narrowed to ``f32``.
pub fn load_feature<P: AsRef<Path>>(path: P) -> CSResult<ArrayD<f32>> {
    let path = path.as_ref();
    if !path.is_file() {
        return Err(CaptionsetError::NotFound {
            path: path.to_path_buf(),
        });
    }

    let mut npz =
        NpzReader::new(BufReader::new(File::open(path)?)).map_err(|e| npz_error(path, e))?;

    // numpy stores "arr_0.npy"; accept the bare name as well.
    let names = npz.names().map_err(|e| npz_error(path, e))?;
    let name = names
        .into_iter()
        .find(|n| n.strip_suffix(".npy").unwrap_or(n) == FEATURE_ARRAY_NAME)
        .ok_or_else(|| npz_error(path, format!("no \"{FEATURE_ARRAY_NAME}\" array")))?;

    match npz.by_name::<_, IxDyn>(&name) {
        Ok(arr) => Ok(arr),
        Err(ReadNpzError::Npy(ReadNpyError::WrongDescriptor(_))) => {
            let arr: ArrayD<f64> = npz.by_name(&name).map_err(|e| {
                npz_error(path, format!("\"{name}\" is neither f32 nor f64: {e}"))
            })?;
            Ok(arr.mapv(|v| v as f32))
        }
        Err(e) => Err(npz_error(path, e)),
    }
}

/// Access to per-image features.
#[derive(Debug, Clone)]
pub enum FeatureStore {
    /// Read each feature from disk on access.
    Lazy {
        /// The feature root directory.
        root: PathBuf,
    },

    /// All features, stacked on a leading image axis.
    Preloaded {
        /// The feature root directory.
        root: PathBuf,

        /// ``[num_images, ...feature_shape]``.
        features: ArrayD<f32>,
    },
}

impl FeatureStore {
    /// A store which reads features on demand.
    pub fn lazy<P: Into<PathBuf>>(root: P) -> Self {
        FeatureStore::Lazy { root: root.into() }
    }

    /// Load and stack the features of every image, in image order.
    ///
    /// # Errors
    /// [`CaptionsetError::ShapeMismatch`] if the features disagree in shape.
    pub fn preload<P: Into<PathBuf>>(
        root: P,
        images: &[ImageRecord],
    ) -> CSResult<Self> {
        let root = root.into();

        let mut loaded: Vec<ArrayD<f32>> = Vec::with_capacity(images.len());
        for image in images {
            let path = feature_path(&root, &image.file_path);
            let feature = load_feature(&path)?;

            if let Some(first) = loaded.first()
                && first.shape() != feature.shape()
            {
                return Err(CaptionsetError::ShapeMismatch {
                    path,
                    expected: first.shape().to_vec(),
                    found: feature.shape().to_vec(),
                });
            }
            loaded.push(feature);
        }

        let features = if loaded.is_empty() {
            ArrayD::zeros(IxDyn(&[0]))
        } else {
            let views: Vec<ArrayViewD<f32>> = loaded.iter().map(|a| a.view()).collect();
            ndarray::stack(Axis(0), &views)
                .map_err(|e| CaptionsetError::External(e.to_string()))?
        };
        log::debug!(
            "preloaded {} image features, shape {:?}",
            images.len(),
            features.shape()
        );

        Ok(FeatureStore::Preloaded { root, features })
    }

    /// The feature root directory.
    pub fn root(&self) -> &Path {
        match self {
            FeatureStore::Lazy { root } => root,
            FeatureStore::Preloaded { root, .. } => root,
        }
    }

    /// Is this store preloaded?
    pub fn is_preloaded(&self) -> bool {
        matches!(self, FeatureStore::Preloaded { .. })
    }

    /// The feature of the image at `position` in the image list.
    pub fn feature(
        &self,
        position: usize,
        image: &ImageRecord,
    ) -> CSResult<ArrayD<f32>> {
        match self {
            FeatureStore::Lazy { root } => load_feature(feature_path(root, &image.file_path)),
            FeatureStore::Preloaded { features, .. } => {
                let len = features.shape()[0];
                if position >= len {
                    return Err(CaptionsetError::IndexOutOfRange {
                        index: position,
                        len,
                    });
                }
                Ok(features.index_axis(Axis(0), position).to_owned())
            }
        }
    }
}
