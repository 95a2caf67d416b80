use rust_decimal::Decimal;
use tabsplit_domain::Money;

/// A receipt image handed to the extraction collaborator.
pub struct ReceiptImage<'a> {
    pub bytes: &'a [u8],
    pub filename: Option<&'a str>,
    pub content_type: Option<&'a str>,
}

/// Header block of an extracted receipt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VendorInfo {
    pub name: String,
    pub date: String,
    pub location: Option<String>,
    pub time: Option<String>,
}

/// One itemized line recognized on the receipt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedLineItem {
    pub name: String,
    pub quantity: Option<u32>,
    pub unit_price: Option<Money>,
    pub subtotal: Option<Money>,
    pub notes: Option<String>,
}

/// A surcharge the vendor added outside the item list (service fee,
/// delivery fee, and the like).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedCharge {
    pub name: String,
    pub amount: Money,
}

/// The totals block the provider recognized. Every field is optional;
/// receipts routinely omit some of them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedTotals {
    pub subtotal: Option<Money>,
    pub tax: Option<Money>,
    pub tip: Option<Money>,
    pub tip_percentage: Option<Decimal>,
    pub total: Option<Money>,
}

/// The structured document the extraction collaborator returns.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedReceipt {
    pub vendor_info: Option<VendorInfo>,
    pub line_items: Vec<ExtractedLineItem>,
    pub additional_charges: Vec<ExtractedCharge>,
    pub totals: Option<ExtractedTotals>,
}
