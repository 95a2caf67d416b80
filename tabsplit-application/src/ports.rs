use crate::{error::ExtractionError, model::{ExtractedReceipt, ReceiptImage}};

/// The receipt-extraction collaborator: image in, structured receipt out.
///
/// Implementations own the provider call and its response parsing; callers
/// only ever see a typed document or a typed failure. A failure is always
/// recoverable: the bill simply starts with zero items.
pub trait ReceiptExtractor: Send + Sync {
    fn extract(&self, image: &ReceiptImage<'_>) -> Result<ExtractedReceipt, ExtractionError>;
}
