//! Image side of the lookup pipeline: preprocessing and barcode resolution.

pub mod error;
pub mod preprocess;
pub mod resolver;
pub mod strategies;

pub use error::VisionError;
pub use preprocess::preprocess;
pub use resolver::{BarcodeResolver, DecodeStrategy, ImageVariant};
pub use strategies::{LinearBarcodeStrategy, QrCodeStrategy};

/// An uploaded or captured bitmap, owned for the duration of one request.
pub type RawImage = image::DynamicImage;
