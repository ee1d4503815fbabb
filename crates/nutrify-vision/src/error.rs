use thiserror::Error;

#[derive(Debug, Error)]
pub enum VisionError {
    #[error("could not decode image: {0}")]
    InvalidImage(#[from] image::ImageError),

    #[error("no barcode detected")]
    NoBarcodeDetected,
}
