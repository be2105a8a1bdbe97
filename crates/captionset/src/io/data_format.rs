//! # Data Formats

use std::{
    fs::File,
    io::{BufReader, BufWriter, Write},
    path::Path,
};

use serde::{Serialize, de::DeserializeOwned};
use strum::IntoEnumIterator;

use crate::{CSResult, CaptionsetError};

/// On-disk serialization formats for dataset and vocab files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display, strum::EnumIter)]
pub enum DataFormat {
    /// A JSON document.
    #[strum(serialize = "json")]
    Json,

    /// A python pickle.
    #[strum(serialize = "pickle")]
    Pickle,
}

impl DataFormat {
    /// The file suffixes which select this format.
    pub fn extensions(&self) -> &'static [&'static str] {
        match self {
            DataFormat::Json => &["json"],
            DataFormat::Pickle => &["pickle", "pkl"],
        }
    }

    /// Select a format from a path suffix.
    ///
    /// # Errors
    /// [`CaptionsetError::UnsupportedFormat`] when the suffix matches no format.
    pub fn from_path<P: AsRef<Path>>(path: P) -> CSResult<Self> {
        let path = path.as_ref();
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default();

        DataFormat::iter()
            .find(|f| f.extensions().contains(&ext))
            .ok_or_else(|| CaptionsetError::UnsupportedFormat {
                path: path.to_path_buf(),
                accepted: DataFormat::iter()
                    .map(|f| f.to_string())
                    .collect::<Vec<_>>()
                    .join(", "),
            })
    }

    /// Deserialize a value from a reader in this format.
    pub fn read<T, R>(
        &self,
        reader: R,
        path: &Path,
    ) -> CSResult<T>
    where
        T: DeserializeOwned,
        R: std::io::Read,
    {
        let parse_error = |message: String| CaptionsetError::Parse {
            path: path.to_path_buf(),
            message,
        };

        match self {
            DataFormat::Json => {
                serde_json::from_reader(reader).map_err(|e| parse_error(e.to_string()))
            }
            #[cfg(feature = "pickle")]
            DataFormat::Pickle => {
                serde_pickle::from_reader(reader, serde_pickle::DeOptions::new())
                    .map_err(|e| parse_error(e.to_string()))
            }
            #[cfg(not(feature = "pickle"))]
            DataFormat::Pickle => Err(CaptionsetError::External(
                "captionset was built without the \"pickle\" feature".to_string(),
            )),
        }
    }

    /// Serialize a value to a writer in this format.
    pub fn write<T, W>(
        &self,
        writer: &mut W,
        value: &T,
        path: &Path,
    ) -> CSResult<()>
    where
        T: Serialize,
        W: Write,
    {
        let parse_error = |message: String| CaptionsetError::Parse {
            path: path.to_path_buf(),
            message,
        };

        match self {
            DataFormat::Json => {
                serde_json::to_writer(writer, value).map_err(|e| parse_error(e.to_string()))
            }
            #[cfg(feature = "pickle")]
            DataFormat::Pickle => {
                serde_pickle::to_writer(writer, value, serde_pickle::SerOptions::new())
                    .map_err(|e| parse_error(e.to_string()))
            }
            #[cfg(not(feature = "pickle"))]
            DataFormat::Pickle => Err(CaptionsetError::External(
                "captionset was built without the \"pickle\" feature".to_string(),
            )),
        }
    }
}

/// Load a whole data file, choosing the format by suffix.
///
/// # Errors
/// * [`CaptionsetError::UnsupportedFormat`] for unknown suffixes.
/// * [`CaptionsetError::NotFound`] when the file does not exist.
/// * [`CaptionsetError::Parse`] when the contents do not deserialize as `T`.
pub fn load_data<T, P>(path: P) -> CSResult<T>
where
    T: DeserializeOwned,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let format = DataFormat::from_path(path)?;
    if !path.exists() {
        return Err(CaptionsetError::NotFound {
            path: path.to_path_buf(),
        });
    }

    log::debug!("loading {format} data from {}", path.display());
    let reader = BufReader::new(File::open(path)?);
    format.read(reader, path)
}

/// Save a value to a data file, choosing the format by suffix.
pub fn save_data<T, P>(
    path: P,
    value: &T,
) -> CSResult<()>
where
    T: Serialize,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let format = DataFormat::from_path(path)?;

    let mut writer = BufWriter::new(File::create(path)?);
    format.write(&mut writer, value, path)?;
    writer.flush()?;
    Ok(())
}
