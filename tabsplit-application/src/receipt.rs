use rust_decimal::Decimal;
use tabsplit_domain::{ChargePolicy, Item, Money};

use crate::model::{ExtractedReceipt, ExtractedTotals};

/// Maps an extracted receipt into bill items.
///
/// Each line item takes its recognized subtotal, falling back to the unit
/// price; lines with neither are dropped. Additional charges (service fees
/// and the like) become unassigned items so their cost stays visible in the
/// bill subtotal. Everything starts unshared; assignment is the user's job.
pub fn items_from_receipt(receipt: &ExtractedReceipt) -> Vec<Item> {
    let mut items = Vec::with_capacity(receipt.line_items.len() + receipt.additional_charges.len());

    for line in &receipt.line_items {
        let Some(price) = line.subtotal.or(line.unit_price) else {
            tracing::warn!(item = %line.name, "dropping extracted line without a price");
            continue;
        };
        match Item::unassigned(&line.name, price) {
            Ok(item) => items.push(item),
            Err(err) => {
                tracing::warn!(item = %line.name, %err, "dropping invalid extracted line");
            }
        }
    }

    for charge in &receipt.additional_charges {
        match Item::unassigned(&charge.name, charge.amount) {
            Ok(item) => items.push(item),
            Err(err) => {
                tracing::warn!(charge = %charge.name, %err, "dropping invalid extracted charge");
            }
        }
    }

    items
}

/// Seeds a tip policy from the extracted totals, preferring an explicit
/// percentage; a raw amount is converted once, here, into a percentage of
/// the receipt subtotal.
pub fn seed_tip(receipt: &ExtractedReceipt, items: &[Item]) -> Option<ChargePolicy> {
    let totals = receipt.totals.as_ref()?;
    if let Some(rate) = totals.tip_percentage {
        return policy_or_warn(ChargePolicy::percentage(rate), "tip");
    }
    let amount = totals.tip?;
    amount_as_policy(amount, receipt_subtotal(totals, items), "tip")
}

/// Seeds a tax policy from the extracted totals. The wire only ever carries
/// a raw tax amount, so this is always the amount-to-percentage conversion.
pub fn seed_tax(receipt: &ExtractedReceipt, items: &[Item]) -> Option<ChargePolicy> {
    let totals = receipt.totals.as_ref()?;
    let amount = totals.tax?;
    amount_as_policy(amount, receipt_subtotal(totals, items), "tax")
}

fn receipt_subtotal(totals: &ExtractedTotals, items: &[Item]) -> Money {
    match totals.subtotal {
        Some(subtotal) if !subtotal.is_zero() => subtotal,
        _ => items.iter().map(|item| item.price).sum(),
    }
}

fn amount_as_policy(amount: Money, subtotal: Money, charge: &str) -> Option<ChargePolicy> {
    let policy = if subtotal.is_zero() {
        ChargePolicy::fixed_amount(amount)
    } else {
        let rate = amount.as_decimal() / subtotal.as_decimal() * Decimal::ONE_HUNDRED;
        ChargePolicy::percentage(rate)
    };
    policy_or_warn(policy, charge)
}

fn policy_or_warn(
    policy: Result<ChargePolicy, tabsplit_domain::BillValidationError>,
    charge: &str,
) -> Option<ChargePolicy> {
    match policy {
        Ok(policy) => Some(policy),
        Err(err) => {
            tracing::warn!(%charge, %err, "ignoring invalid extracted charge value");
            None
        }
    }
}
