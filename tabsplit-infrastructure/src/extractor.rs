use tabsplit_application::{ExtractedReceipt, ExtractionError, ReceiptExtractor, ReceiptImage};

use crate::response::parse_receipt_response;

/// The raw text round-trip to a vision provider. Implementations own the
/// HTTP call, credentials, and retries; this crate only owns what happens
/// to the reply text.
pub trait VisionTransport: Send + Sync {
    fn request_extraction(&self, image: &ReceiptImage<'_>) -> Result<String, ExtractionError>;
}

/// [`ReceiptExtractor`] over any vision transport: request, then parse or
/// fail. The calculation side never sees malformed provider output.
pub struct VisionReceiptExtractor<T> {
    transport: T,
}

impl<T> VisionReceiptExtractor<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }
}

impl<T: VisionTransport> ReceiptExtractor for VisionReceiptExtractor<T> {
    fn extract(&self, image: &ReceiptImage<'_>) -> Result<ExtractedReceipt, ExtractionError> {
        let reply = self.transport.request_extraction(image)?;
        parse_receipt_response(&reply).map_err(|err| {
            tracing::warn!(%err, "discarding unusable extraction response");
            ExtractionError::UnusableResponse {
                detail: err.to_string(),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tabsplit_domain::Money;

    struct StaticTransport(&'static str);

    impl VisionTransport for StaticTransport {
        fn request_extraction(
            &self,
            _image: &ReceiptImage<'_>,
        ) -> Result<String, ExtractionError> {
            Ok(self.0.to_string())
        }
    }

    struct FailingTransport;

    impl VisionTransport for FailingTransport {
        fn request_extraction(
            &self,
            _image: &ReceiptImage<'_>,
        ) -> Result<String, ExtractionError> {
            Err(ExtractionError::Transport("connection reset".into()))
        }
    }

    fn image() -> ReceiptImage<'static> {
        ReceiptImage {
            bytes: b"not-a-real-jpeg",
            filename: Some("receipt.jpg"),
            content_type: Some("image/jpeg"),
        }
    }

    #[test]
    fn extracts_through_transport() {
        let extractor = VisionReceiptExtractor::new(StaticTransport(
            r#"{"line_items": [{"item_name": "Bagel", "subtotal": 3.50}]}"#,
        ));

        let receipt = extractor.extract(&image()).expect("extract failed");
        assert_eq!(receipt.line_items.len(), 1);
        assert_eq!(receipt.line_items[0].subtotal, Some(Money::from_minor(350)));
    }

    #[test]
    fn unusable_reply_becomes_typed_error() {
        let extractor = VisionReceiptExtractor::new(StaticTransport("no receipt here"));
        let err = extractor.extract(&image()).expect_err("expected failure");
        assert!(matches!(err, ExtractionError::UnusableResponse { .. }));
    }

    #[test]
    fn transport_failure_propagates() {
        let extractor = VisionReceiptExtractor::new(FailingTransport);
        let err = extractor.extract(&image()).expect_err("expected failure");
        assert!(matches!(err, ExtractionError::Transport(_)));
    }
}
