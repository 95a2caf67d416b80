use indexmap::IndexMap;
use thiserror::Error;

use crate::model::{ChargePolicy, Item, Money, People, SplitResult};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SplitError {
    #[error("item '{item}' has a negative price ({price})")]
    NegativePrice { item: String, price: Money },
    #[error("item '{item}' is shared by unknown participant '{name}'")]
    UnknownParticipant { item: String, name: String },
    #[error("charge amount left the representable money range")]
    AmountOutOfRange,
}

/// Split calculation service.
///
/// Pure: each call computes a fresh [`SplitResult`] from its own snapshot of
/// items, participants, and charge policies.
pub struct SplitCalculator;

impl SplitCalculator {
    /// Computes the per-participant allocation for one bill snapshot.
    ///
    /// Tip and tax are distributed across items in proportion to each item's
    /// share of the subtotal; each item's fully-loaded amount is then split
    /// evenly among the people sharing it. Both distributions run in integer
    /// cents with largest-remainder apportionment, so when every item is
    /// assigned the per-person amounts sum to the total exactly.
    pub fn compute(
        &self,
        items: &[Item],
        people: &People,
        tip: &ChargePolicy,
        tax: &ChargePolicy,
    ) -> Result<SplitResult, SplitError> {
        validate_items(items, people)?;

        let subtotal: Money = items.iter().map(|item| item.price).sum();
        let tip_amount = tip.amount_of(subtotal).ok_or(SplitError::AmountOutOfRange)?;
        let tax_amount = tax.amount_of(subtotal).ok_or(SplitError::AmountOutOfRange)?;
        let total = subtotal + tip_amount + tax_amount;
        let surcharge = tip_amount + tax_amount;

        tracing::debug!(
            item_count = items.len(),
            people_count = people.len(),
            subtotal = %subtotal,
            surcharge = %surcharge,
            "computing split"
        );

        let prices: Vec<Money> = items.iter().map(|item| item.price).collect();
        let surcharge_shares = apportion_by_weight(surcharge, &prices);

        let mut per_person: IndexMap<String, Money> = people
            .iter()
            .map(|person| (person.clone(), Money::ZERO))
            .collect();

        for (item, surcharge_share) in items.iter().zip(surcharge_shares) {
            if item.shared_by.is_empty() {
                continue;
            }
            let loaded = item.price + surcharge_share;
            let shares = split_evenly(loaded, item.shared_by.len());
            for (name, share) in item.shared_by.iter().zip(shares) {
                if let Some(owed) = per_person.get_mut(name) {
                    *owed += share;
                }
            }
        }

        Ok(SplitResult {
            subtotal,
            tip_amount,
            tax_amount,
            total,
            per_person,
        })
    }
}

fn validate_items(items: &[Item], people: &People) -> Result<(), SplitError> {
    for item in items {
        if item.price.is_negative() {
            return Err(SplitError::NegativePrice {
                item: item.name.clone(),
                price: item.price,
            });
        }
        for name in &item.shared_by {
            if !people.contains(name) {
                return Err(SplitError::UnknownParticipant {
                    item: item.name.clone(),
                    name: name.clone(),
                });
            }
        }
    }
    Ok(())
}

/// Apportions `total` across `weights` proportionally, in whole cents.
///
/// Exact quotas are floored, then the leftover cents go one each to the
/// entries with the largest truncated remainders, earlier entries first on
/// ties. The returned shares always sum to `total`. A zero weight sum yields
/// all-zero shares.
fn apportion_by_weight(total: Money, weights: &[Money]) -> Vec<Money> {
    let weight_sum: i64 = weights.iter().map(|weight| weight.minor_units()).sum();
    if weight_sum == 0 || total.is_zero() {
        return vec![Money::ZERO; weights.len()];
    }

    let total_minor = total.minor_units() as i128;
    let weight_sum = weight_sum as i128;

    let mut shares = Vec::with_capacity(weights.len());
    let mut remainders = Vec::with_capacity(weights.len());
    let mut assigned: i128 = 0;
    for (idx, weight) in weights.iter().enumerate() {
        let exact = total_minor * weight.minor_units() as i128;
        let base = exact / weight_sum;
        assigned += base;
        shares.push(base as i64);
        remainders.push((idx, exact % weight_sum));
    }

    let leftover = (total_minor - assigned) as usize;
    remainders.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
    for &(idx, _) in remainders.iter().take(leftover) {
        shares[idx] += 1;
    }

    shares.into_iter().map(Money::from_minor).collect()
}

/// Splits `amount` into `count` even shares in whole cents; the first
/// `amount % count` shares carry one extra cent.
fn split_evenly(amount: Money, count: usize) -> Vec<Money> {
    let count_minor = count as i64;
    let base = amount.minor_units() / count_minor;
    let remainder = (amount.minor_units() % count_minor) as usize;

    (0..count)
        .map(|idx| Money::from_minor(if idx < remainder { base + 1 } else { base }))
        .collect()
}
