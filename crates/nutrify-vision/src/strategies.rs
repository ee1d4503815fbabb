//! Concrete decoding strategies backed by external symbology crates.

use std::collections::{HashMap, HashSet};

use image::GrayImage;
use rxing::common::HybridBinarizer;
use rxing::{
    BarcodeFormat, BinaryBitmap, DecodeHintType, DecodeHintValue, Luma8LuminanceSource,
    MultiFormatReader, Reader,
};

use crate::resolver::{DecodeStrategy, ImageVariant};

/// One-dimensional retail and logistics symbologies.
///
/// The default instance reads the edge map. Canny turns each solid bar into
/// a pair of edges, so [`LinearBarcodeStrategy::on_original`] reads the
/// plain grayscale image as well.
pub struct LinearBarcodeStrategy {
    name: &'static str,
    variant: ImageVariant,
    formats: HashSet<BarcodeFormat>,
}

impl LinearBarcodeStrategy {
    /// Same formats, read from the unprocessed grayscale image.
    #[must_use]
    pub fn on_original() -> Self {
        Self {
            name: "linear_original",
            variant: ImageVariant::Original,
            ..Self::default()
        }
    }
}

impl Default for LinearBarcodeStrategy {
    fn default() -> Self {
        let formats = [
            BarcodeFormat::EAN_13,
            BarcodeFormat::EAN_8,
            BarcodeFormat::UPC_A,
            BarcodeFormat::UPC_E,
            BarcodeFormat::CODE_128,
            BarcodeFormat::CODE_39,
            BarcodeFormat::CODE_93,
            BarcodeFormat::ITF,
            BarcodeFormat::CODABAR,
        ]
        .into_iter()
        .collect();
        Self {
            name: "linear",
            variant: ImageVariant::Preprocessed,
            formats,
        }
    }
}

impl DecodeStrategy for LinearBarcodeStrategy {
    fn name(&self) -> &'static str {
        self.name
    }

    fn variant(&self) -> ImageVariant {
        self.variant
    }

    fn decode(&self, image: &GrayImage) -> Option<String> {
        let (width, height) = image.dimensions();

        let mut hints = HashMap::new();
        hints.insert(DecodeHintType::TRY_HARDER, DecodeHintValue::TryHarder(true));
        hints.insert(
            DecodeHintType::POSSIBLE_FORMATS,
            DecodeHintValue::PossibleFormats(self.formats.clone()),
        );
        // Canny output is white-on-black.
        hints.insert(
            DecodeHintType::ALSO_INVERTED,
            DecodeHintValue::AlsoInverted(true),
        );

        let source = Luma8LuminanceSource::new(image.as_raw().clone(), width, height);
        let mut bitmap = BinaryBitmap::new(HybridBinarizer::new(source));
        let mut reader = MultiFormatReader::default();

        match reader.decode_with_hints(&mut bitmap, &hints) {
            Ok(result) => Some(result.getText().to_owned()),
            Err(e) => {
                tracing::trace!(strategy = self.name, error = %e, "linear decoder found nothing");
                None
            }
        }
    }
}

/// QR grid detection on the unprocessed grayscale image.
pub struct QrCodeStrategy;

impl DecodeStrategy for QrCodeStrategy {
    fn name(&self) -> &'static str {
        "qr"
    }

    fn variant(&self) -> ImageVariant {
        ImageVariant::Original
    }

    #[allow(clippy::cast_possible_truncation)] // pixel coordinates come from u32 dimensions
    fn decode(&self, image: &GrayImage) -> Option<String> {
        let width = image.width() as usize;
        let height = image.height() as usize;
        let pixels = image.as_raw();

        let mut prepared =
            rqrr::PreparedImage::prepare_from_greyscale(width, height, |x, y| pixels[y * width + x]);

        prepared
            .detect_grids()
            .into_iter()
            .find_map(|grid| match grid.decode() {
                Ok((_meta, content)) => Some(content),
                Err(e) => {
                    tracing::trace!(error = %e, "qr grid failed to decode");
                    None
                }
            })
    }
}
