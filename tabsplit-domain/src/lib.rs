#![warn(clippy::uninlined_format_args)]

pub mod model;
pub mod services;

pub use model::{
    BillValidationError, ChargePolicy, Item, Money, MoneyConversionError, People, SplitResult,
};
pub use services::{SplitCalculator, SplitError};
