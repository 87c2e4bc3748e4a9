use thiserror::Error;

#[derive(Error, Debug)]
pub enum PaginateError {
    #[error("Invalid page geometry: {0}")]
    InvalidGeometry(String),

    #[error("Source image too small: {0}")]
    ImageTooSmall(String),

    #[error("No page bitmaps to assemble")]
    EmptyInput,

    #[error("Failed to decode source image: {0}")]
    Decode(String),

    #[error("Failed to encode page bitmap: {0}")]
    Encode(String),

    #[error("Failed to build output document: {0}")]
    Document(String),
}
