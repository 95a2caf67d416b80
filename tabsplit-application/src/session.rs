use indexmap::IndexSet;
use tabsplit_domain::{ChargePolicy, Item, Money, People, SplitCalculator, SplitError, SplitResult};

use crate::{
    error::SessionError,
    model::{ExtractedReceipt, VendorInfo},
    receipt,
};

/// The mutable state of one bill-splitting session: items, participants,
/// and the tip/tax policies, with the lifecycle rules the split engine
/// relies on (unique names, no stale share references).
///
/// Every mutation leaves the session consistent, so [`BillSession::compute_split`]
/// can be re-run after each edit.
#[derive(Debug, Default)]
pub struct BillSession {
    items: Vec<Item>,
    people: People,
    tip: ChargePolicy,
    tax: ChargePolicy,
    vendor_info: Option<VendorInfo>,
}

impl BillSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn people(&self) -> &People {
        &self.people
    }

    pub fn tip(&self) -> &ChargePolicy {
        &self.tip
    }

    pub fn tax(&self) -> &ChargePolicy {
        &self.tax
    }

    pub fn vendor_info(&self) -> Option<&VendorInfo> {
        self.vendor_info.as_ref()
    }

    pub fn add_person(&mut self, name: impl Into<String>) -> Result<(), SessionError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(tabsplit_domain::BillValidationError::BlankName.into());
        }
        if !self.people.insert(name.clone()) {
            return Err(SessionError::DuplicatePerson { name });
        }
        Ok(())
    }

    /// Removes a participant and prunes them from every item's share set, so
    /// no item is left pointing at a name the bill no longer knows.
    pub fn remove_person(&mut self, name: &str) -> Result<(), SessionError> {
        if !self.people.shift_remove(name) {
            return Err(SessionError::UnknownPerson {
                name: name.to_string(),
            });
        }
        for item in &mut self.items {
            item.shared_by.shift_remove(name);
        }
        Ok(())
    }

    pub fn add_item(&mut self, item: Item) -> Result<(), SessionError> {
        if item.price.is_negative() {
            return Err(
                tabsplit_domain::BillValidationError::NegativePrice { price: item.price }.into(),
            );
        }
        for name in &item.shared_by {
            if !self.people.contains(name) {
                return Err(SessionError::UnknownPerson { name: name.clone() });
            }
        }
        self.items.push(item);
        Ok(())
    }

    pub fn remove_item(&mut self, index: usize) -> Result<Item, SessionError> {
        if index >= self.items.len() {
            return Err(SessionError::ItemOutOfRange {
                index,
                len: self.items.len(),
            });
        }
        Ok(self.items.remove(index))
    }

    /// Replaces an item's share set wholesale.
    pub fn set_item_shares<I>(&mut self, index: usize, shared_by: I) -> Result<(), SessionError>
    where
        I: IntoIterator<Item = String>,
    {
        let shared_by: IndexSet<String> = shared_by.into_iter().collect();
        for name in &shared_by {
            if !self.people.contains(name) {
                return Err(SessionError::UnknownPerson { name: name.clone() });
            }
        }
        let len = self.items.len();
        let item = self
            .items
            .get_mut(index)
            .ok_or(SessionError::ItemOutOfRange { index, len })?;
        item.shared_by = shared_by;
        Ok(())
    }

    /// Adds the person to the item's share set, or removes them if already
    /// present (the tag-toggle gesture of the collecting UI).
    pub fn toggle_share(&mut self, index: usize, name: &str) -> Result<(), SessionError> {
        if !self.people.contains(name) {
            return Err(SessionError::UnknownPerson {
                name: name.to_string(),
            });
        }
        let len = self.items.len();
        let item = self
            .items
            .get_mut(index)
            .ok_or(SessionError::ItemOutOfRange { index, len })?;
        if !item.shared_by.insert(name.to_string()) {
            item.shared_by.shift_remove(name);
        }
        Ok(())
    }

    pub fn set_tip(&mut self, tip: ChargePolicy) {
        self.tip = tip;
    }

    pub fn set_tax(&mut self, tax: ChargePolicy) {
        self.tax = tax;
    }

    /// Replaces the item list with the extracted receipt's lines and seeds
    /// tip/tax from its totals where present. Participants are kept; share
    /// assignments start over.
    pub fn ingest_receipt(&mut self, extracted: &ExtractedReceipt) {
        self.items = receipt::items_from_receipt(extracted);
        if let Some(tip) = receipt::seed_tip(extracted, &self.items) {
            self.tip = tip;
        }
        if let Some(tax) = receipt::seed_tax(extracted, &self.items) {
            self.tax = tax;
        }
        self.vendor_info = extracted.vendor_info.clone();
        tracing::debug!(
            item_count = self.items.len(),
            has_vendor = self.vendor_info.is_some(),
            "ingested extracted receipt"
        );
    }

    /// Computes a fresh allocation from the current snapshot. Cheap enough
    /// to re-run on every edit; an empty bill yields a zero-valued result.
    pub fn compute_split(&self) -> Result<SplitResult, SplitError> {
        SplitCalculator.compute(&self.items, &self.people, &self.tip, &self.tax)
    }

    pub fn subtotal(&self) -> Money {
        self.items.iter().map(|item| item.price).sum()
    }
}
