//! "Parse or fail" boundary for the vision provider's receipt reply.
//!
//! The upstream model returns JSON wrapped in prose or markdown fences and
//! sometimes truncates it mid-document. This module either produces a typed
//! [`ExtractedReceipt`] (possibly partial, salvaged from a truncated reply)
//! or fails with a typed error; callers then proceed with zero items.

use rust_decimal::{Decimal, prelude::ToPrimitive};
use serde::Deserialize;
use tabsplit_application::{
    ExtractedCharge, ExtractedLineItem, ExtractedReceipt, ExtractedTotals, VendorInfo,
};
use tabsplit_domain::Money;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResponseParseError {
    #[error("response contains no JSON object")]
    NoJsonObject,
    #[error("response JSON carried no recognizable receipt data")]
    NoReceiptData,
}

#[derive(Debug, Deserialize)]
struct RawReceipt {
    vendor_info: Option<RawVendorInfo>,
    #[serde(default)]
    line_items: Vec<RawLineItem>,
    #[serde(default)]
    additional_charges: Vec<RawCharge>,
    totals: Option<RawTotals>,
}

#[derive(Debug, Deserialize)]
struct RawVendorInfo {
    name: Option<String>,
    date: Option<String>,
    location: Option<String>,
    time: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawLineItem {
    item_name: Option<String>,
    quantity: Option<Decimal>,
    unit_price: Option<Decimal>,
    subtotal: Option<Decimal>,
    notes: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawCharge {
    charge_name: Option<String>,
    amount: Option<Decimal>,
}

#[derive(Debug, Deserialize)]
struct RawTotals {
    subtotal: Option<Decimal>,
    tax: Option<Decimal>,
    tip: Option<Decimal>,
    tip_percentage: Option<Decimal>,
    total: Option<Decimal>,
}

/// Parses the provider's raw text reply into a receipt document.
///
/// Tries a strict parse of the first balanced JSON object; when the reply is
/// truncated, falls back to salvaging the vendor block and every complete
/// line-item element. Only a reply with no usable data at all is an error.
pub fn parse_receipt_response(content: &str) -> Result<ExtractedReceipt, ResponseParseError> {
    let stripped = strip_code_fences(content);
    let Some(start) = stripped.find('{') else {
        return Err(ResponseParseError::NoJsonObject);
    };
    let body = &stripped[start..];

    if let Some(object) = balanced_slice(body, '{', '}')
        && let Ok(raw) = serde_json::from_str::<RawReceipt>(object)
    {
        let receipt = convert(raw);
        if has_data(&receipt) {
            return Ok(receipt);
        }
    }

    tracing::warn!(
        content_len = content.len(),
        "extraction response is not complete receipt JSON, salvaging"
    );
    salvage(body)
}

fn has_data(receipt: &ExtractedReceipt) -> bool {
    receipt.vendor_info.is_some()
        || !receipt.line_items.is_empty()
        || !receipt.additional_charges.is_empty()
        || receipt.totals.is_some()
}

fn strip_code_fences(content: &str) -> String {
    content.replace("```json", "").replace("```", "")
}

fn salvage(body: &str) -> Result<ExtractedReceipt, ResponseParseError> {
    let mut receipt = ExtractedReceipt::default();

    if let Some(object) = object_after_key(body, "\"vendor_info\"")
        && let Ok(raw) = serde_json::from_str::<RawVendorInfo>(object)
    {
        receipt.vendor_info = vendor_from(raw);
    }

    if let Some(elements) = array_body_after_key(body, "\"line_items\"") {
        for object in objects_in(elements) {
            if let Ok(raw) = serde_json::from_str::<RawLineItem>(object)
                && let Some(item) = line_item_from(raw)
            {
                receipt.line_items.push(item);
            }
        }
    }

    if let Some(elements) = array_body_after_key(body, "\"additional_charges\"") {
        for object in objects_in(elements) {
            if let Ok(raw) = serde_json::from_str::<RawCharge>(object)
                && let Some(charge) = charge_from(raw)
            {
                receipt.additional_charges.push(charge);
            }
        }
    }

    if let Some(object) = object_after_key(body, "\"totals\"")
        && let Ok(raw) = serde_json::from_str::<RawTotals>(object)
    {
        receipt.totals = Some(totals_from(raw));
    }

    if has_data(&receipt) {
        tracing::debug!(
            line_items = receipt.line_items.len(),
            has_vendor = receipt.vendor_info.is_some(),
            "salvaged partial receipt from truncated response"
        );
        Ok(receipt)
    } else {
        Err(ResponseParseError::NoReceiptData)
    }
}

/// The balanced `{...}` object that follows `key`, if the reply got that far.
fn object_after_key<'a>(content: &'a str, key: &str) -> Option<&'a str> {
    let rest = &content[content.find(key)? + key.len()..];
    let brace = rest.find('{')?;
    balanced_slice(&rest[brace..], '{', '}')
}

/// The element region of the array that follows `key`. A truncated array
/// yields everything after `[`; complete elements are still recoverable.
fn array_body_after_key<'a>(content: &'a str, key: &str) -> Option<&'a str> {
    let rest = &content[content.find(key)? + key.len()..];
    let bracket = rest.find('[')?;
    match balanced_slice(&rest[bracket..], '[', ']') {
        Some(array) => Some(&array[1..array.len() - 1]),
        None => Some(&rest[bracket + 1..]),
    }
}

/// Every complete top-level `{...}` object in `body`, in order. A trailing
/// truncated object is dropped.
fn objects_in(body: &str) -> Vec<&str> {
    let mut objects = Vec::new();
    let mut rest = body;
    while let Some(start) = rest.find('{') {
        match balanced_slice(&rest[start..], '{', '}') {
            Some(object) => {
                objects.push(object);
                rest = &rest[start + object.len()..];
            }
            None => break,
        }
    }
    objects
}

/// The prefix of `s` (which must start with `open`) up to the matching
/// `close`, honoring JSON string and escape rules. `None` when unbalanced.
fn balanced_slice(s: &str, open: char, close: char) -> Option<&str> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (idx, c) in s.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        if in_string {
            match c {
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        if c == '"' {
            in_string = true;
        } else if c == open {
            depth += 1;
        } else if c == close {
            depth = depth.checked_sub(1)?;
            if depth == 0 {
                return Some(&s[..idx + c.len_utf8()]);
            }
        }
    }

    None
}

fn convert(raw: RawReceipt) -> ExtractedReceipt {
    ExtractedReceipt {
        vendor_info: raw.vendor_info.and_then(vendor_from),
        line_items: raw.line_items.into_iter().filter_map(line_item_from).collect(),
        additional_charges: raw
            .additional_charges
            .into_iter()
            .filter_map(charge_from)
            .collect(),
        totals: raw.totals.map(totals_from),
    }
}

fn vendor_from(raw: RawVendorInfo) -> Option<VendorInfo> {
    let name = raw.name.filter(|name| !name.trim().is_empty())?;
    Some(VendorInfo {
        name,
        date: raw.date.unwrap_or_default(),
        location: raw.location,
        time: raw.time,
    })
}

fn line_item_from(raw: RawLineItem) -> Option<ExtractedLineItem> {
    let name = raw.item_name.filter(|name| !name.trim().is_empty())?;
    Some(ExtractedLineItem {
        name,
        quantity: raw.quantity.and_then(|quantity| quantity.to_u32()),
        unit_price: raw.unit_price.map(Money::from_decimal_lossy),
        subtotal: raw.subtotal.map(Money::from_decimal_lossy),
        notes: raw.notes,
    })
}

fn charge_from(raw: RawCharge) -> Option<ExtractedCharge> {
    let name = raw.charge_name.filter(|name| !name.trim().is_empty())?;
    let amount = raw.amount?;
    Some(ExtractedCharge {
        name,
        amount: Money::from_decimal_lossy(amount),
    })
}

fn totals_from(raw: RawTotals) -> ExtractedTotals {
    ExtractedTotals {
        subtotal: raw.subtotal.map(Money::from_decimal_lossy),
        tax: raw.tax.map(Money::from_decimal_lossy),
        tip: raw.tip.map(Money::from_decimal_lossy),
        tip_percentage: raw.tip_percentage,
        total: raw.total.map(Money::from_decimal_lossy),
    }
}
