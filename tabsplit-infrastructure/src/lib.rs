#![warn(clippy::uninlined_format_args)]

pub mod extractor;
pub mod response;

pub use extractor::{VisionReceiptExtractor, VisionTransport};
pub use response::{ResponseParseError, parse_receipt_response};
