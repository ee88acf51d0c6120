//! Error type shared by the transition core and the GPU backend.

pub type TransitionResult<T> = Result<T, TransitionError>;

#[derive(thiserror::Error, Debug)]
pub enum TransitionError {
    /// Geometry could not be built for a node/transform pair.
    #[error("invalid geometry input: {0}")]
    InvalidGeometry(String),

    /// The renderer was used after `dispose()`.
    #[error("transition renderer used after dispose")]
    Disposed,

    /// Adapter, device or surface setup failed.
    #[error("gpu error: {0}")]
    Gpu(String),

    #[error(transparent)]
    Image(#[from] image::ImageError),
}

impl TransitionError {
    pub fn invalid_geometry(msg: impl Into<String>) -> Self {
        Self::InvalidGeometry(msg.into())
    }

    pub fn gpu(msg: impl Into<String>) -> Self {
        Self::Gpu(msg.into())
    }
}
