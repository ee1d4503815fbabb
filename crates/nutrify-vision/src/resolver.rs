//! Ordered chain of barcode decoding strategies.
//!
//! Strategies are tried in a fixed priority order and the first non-empty
//! payload wins. Order is a priority, not a quality ranking: if the first
//! strategy decodes something, later strategies are never consulted.

use image::GrayImage;
use nutrify_core::Barcode;

use crate::error::VisionError;
use crate::preprocess::preprocess;
use crate::strategies::{LinearBarcodeStrategy, QrCodeStrategy};
use crate::RawImage;

/// Which rendition of the input a strategy reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageVariant {
    /// Output of [`preprocess`].
    Preprocessed,
    /// The input converted to grayscale and nothing else.
    Original,
}

/// A pure decoding function tagged with the image variant it expects.
pub trait DecodeStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    fn variant(&self) -> ImageVariant;

    /// Returns the decoded payload, or `None` when nothing was found.
    fn decode(&self, image: &GrayImage) -> Option<String>;
}

/// Resolves a barcode from an image. Holds no mutable state; one instance
/// can serve concurrent requests.
pub struct BarcodeResolver {
    strategies: Vec<Box<dyn DecodeStrategy>>,
}

impl Default for BarcodeResolver {
    /// Linear symbols on the edge map first, then QR on the original, then
    /// linear symbols on the original.
    fn default() -> Self {
        let strategies: Vec<Box<dyn DecodeStrategy>> = vec![
            Box::new(LinearBarcodeStrategy::default()),
            Box::new(QrCodeStrategy),
            Box::new(LinearBarcodeStrategy::on_original()),
        ];
        Self::with_strategies(strategies)
    }
}

impl BarcodeResolver {
    #[must_use]
    pub fn with_strategies(strategies: Vec<Box<dyn DecodeStrategy>>) -> Self {
        Self { strategies }
    }

    #[must_use]
    pub fn strategy_names(&self) -> Vec<&'static str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    /// Runs the strategy chain once over `image`.
    #[must_use]
    pub fn resolve(&self, image: &RawImage) -> Option<Barcode> {
        if image.width() == 0 || image.height() == 0 {
            return None;
        }

        let mut preprocessed: Option<GrayImage> = None;
        let mut original: Option<GrayImage> = None;

        for strategy in &self.strategies {
            let input = match strategy.variant() {
                ImageVariant::Preprocessed => {
                    &*preprocessed.get_or_insert_with(|| preprocess(image))
                }
                ImageVariant::Original => &*original.get_or_insert_with(|| image.to_luma8()),
            };

            match strategy.decode(input).as_deref().and_then(Barcode::from_decoded) {
                Some(barcode) => {
                    tracing::debug!(strategy = strategy.name(), %barcode, "barcode resolved");
                    return Some(barcode);
                }
                None => {
                    tracing::debug!(strategy = strategy.name(), "strategy found no barcode");
                }
            }
        }

        None
    }

    /// Decodes an encoded image (PNG, JPEG, ...) and resolves it.
    ///
    /// # Errors
    ///
    /// - [`VisionError::InvalidImage`] if the bytes are not a supported image.
    /// - [`VisionError::NoBarcodeDetected`] if no strategy found a barcode.
    pub fn resolve_bytes(&self, bytes: &[u8]) -> Result<Barcode, VisionError> {
        let image = image::load_from_memory(bytes)?;
        self.resolve(&image).ok_or(VisionError::NoBarcodeDetected)
    }
}
