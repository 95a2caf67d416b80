use std::fmt::Write;

use tabsplit_application::VendorInfo;
use tabsplit_domain::{Item, SplitResult};

const HEADER: &str = "🧾 Bill Split Summary 🧾";
const ITEMS_HEADING: &str = "Items:";
const SPLIT_HEADING: &str = "Split:";
const UNASSIGNED_LABEL: &str = "Unassigned";

/// Renders the shareable plain-text bill summary.
pub struct SummaryPresenter;

impl SummaryPresenter {
    /// Deterministic receipt-style report: header, optional vendor block,
    /// each item with its share list, the totals, then each person's owed
    /// amount. Items render in input order, people in the result's order;
    /// every monetary figure has exactly two decimals.
    pub fn render(items: &[Item], result: &SplitResult, vendor: Option<&VendorInfo>) -> String {
        let mut summary = String::new();
        let _ = writeln!(summary, "{HEADER}");
        summary.push('\n');

        if let Some(vendor) = vendor {
            let _ = writeln!(summary, "{}", vendor.name);
            if !vendor.date.is_empty() {
                let _ = writeln!(summary, "{}", vendor.date);
            }
            summary.push('\n');
        }

        let _ = writeln!(summary, "{ITEMS_HEADING}");
        for item in items {
            if item.shared_by.is_empty() {
                let _ = writeln!(summary, "- {}: ${} ({UNASSIGNED_LABEL})", item.name, item.price);
            } else {
                let shared: Vec<&str> = item.shared_by.iter().map(String::as_str).collect();
                let _ = writeln!(
                    summary,
                    "- {}: ${} (Shared by: {})",
                    item.name,
                    item.price,
                    shared.join(", ")
                );
            }
        }

        summary.push('\n');
        let _ = writeln!(summary, "Subtotal: ${}", result.subtotal);
        let _ = writeln!(summary, "Tip: ${}", result.tip_amount);
        let _ = writeln!(summary, "Tax: ${}", result.tax_amount);
        let _ = writeln!(summary, "Total: ${}", result.total);

        summary.push('\n');
        let _ = writeln!(summary, "{SPLIT_HEADING}");
        for (person, owed) in &result.per_person {
            let _ = writeln!(summary, "{person}: ${owed}");
        }

        summary
    }
}
