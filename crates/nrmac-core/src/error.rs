use thiserror::Error;

#[derive(Error, Debug)]
pub enum NrmacError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image format error: {0}")]
    ImageError(#[from] image::ImageError),

    #[error("TIFF error: {0}")]
    TiffError(#[from] tiff::TiffError),

    #[error("Array shape error: {0}")]
    Shape(#[from] ndarray::ShapeError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid config: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Config serialization error: {0}")]
    ConfigSerialize(#[from] toml::ser::Error),

    #[error("Image has {height} rows, need more than {min_rows}")]
    ImageTooSmall { height: usize, min_rows: usize },

    #[error("Unsupported channel count: {0}")]
    UnsupportedChannels(usize),

    #[error("Image shapes differ: {expected:?} vs {actual:?}")]
    ShapeMismatch {
        expected: (usize, usize, usize),
        actual: (usize, usize, usize),
    },

    #[error("Unsupported sample format: {0}")]
    UnsupportedFormat(String),

    #[error("No geo-reference found in {0}")]
    MissingGeoReference(String),

    #[error("No supported image files were specified for processing")]
    NoInput,
}

pub type Result<T> = std::result::Result<T, NrmacError>;
