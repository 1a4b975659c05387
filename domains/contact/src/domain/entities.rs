//! Contact messages and customer orders
//!
//! Nothing here is persisted: a request is validated, rendered into a
//! notification and delivered to the shop inbox.

use chrono::{DateTime, Utc};
use regex::Regex;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use planmart_common::{Error, Result};

lazy_static::lazy_static! {
    /// Digits, spaces, hyphens and parentheses, with an optional leading `+`
    pub static ref PHONE_REGEX: Regex = Regex::new(r"^\+?[0-9\s\-()]+$").unwrap();
}

/// A storefront contact form submission
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ContactMessage {
    #[validate(length(min = 1, max = 100))]
    pub name: String,

    #[validate(email)]
    pub email: String,

    #[validate(length(max = 30), regex(path = *PHONE_REGEX))]
    pub phone: String,

    #[validate(length(min = 1, max = 5000))]
    pub message: String,
}

/// Customer contact details and postal address
#[derive(Debug, Clone, PartialEq, Deserialize, Validate)]
pub struct PostalAddress {
    #[validate(length(min = 1, max = 100))]
    pub first_name: String,

    #[validate(length(min = 1, max = 100))]
    pub last_name: String,

    #[validate(email)]
    pub email: String,

    #[validate(length(max = 30), regex(path = *PHONE_REGEX))]
    pub phone: String,

    #[validate(length(min = 1, max = 200))]
    pub street: String,

    #[validate(length(min = 1, max = 100))]
    pub city: String,

    #[validate(length(max = 20))]
    pub postal_code: Option<String>,

    #[validate(length(min = 1, max = 100))]
    pub country: String,
}

impl PostalAddress {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Where an order ships: the billing address, or a separate one
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct Shipping {
    pub same_as_billing: bool,

    #[validate(nested)]
    pub address: Option<PostalAddress>,
}

/// One line of an order
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct OrderItem {
    #[validate(length(min = 1, max = 200))]
    pub name: String,

    #[validate(custom(function = "validate_amount"))]
    pub unit_price: Decimal,

    #[validate(range(min = 1))]
    pub quantity: u32,

    #[validate(length(max = 100))]
    pub category: Option<String>,
}

impl OrderItem {
    /// Plan documents are delivered digitally rather than shipped
    pub fn is_digital(&self) -> bool {
        self.category.as_deref().is_some_and(|category| {
            let category = category.to_lowercase();
            ["plan", "pdf", "cnc"]
                .iter()
                .any(|marker| category.contains(marker))
        })
    }

    pub fn line_total(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity)
    }
}

/// A customer order submitted from the storefront checkout
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct Order {
    pub id: u64,

    #[validate(length(min = 1, max = 100), nested)]
    pub items: Vec<OrderItem>,

    #[validate(nested)]
    pub billing: PostalAddress,

    #[validate(nested)]
    pub shipping: Shipping,

    #[validate(length(min = 1, max = 50))]
    pub payment_method: String,

    #[validate(length(max = 2000))]
    pub notes: Option<String>,

    #[validate(custom(function = "validate_amount"))]
    pub subtotal: Decimal,

    #[validate(custom(function = "validate_amount"))]
    pub shipping_cost: Decimal,

    #[validate(custom(function = "validate_amount"))]
    pub total: Decimal,

    pub placed_at: DateTime<Utc>,
}

impl Order {
    /// The address the order ships to
    pub fn shipping_address(&self) -> Result<&PostalAddress> {
        if self.shipping.same_as_billing {
            return Ok(&self.billing);
        }
        self.shipping.address.as_ref().ok_or_else(|| {
            Error::BadRequest(
                "A shipping address is required unless shipping to the billing address"
                    .to_string(),
            )
        })
    }

    pub fn has_digital_items(&self) -> bool {
        self.items.iter().any(OrderItem::is_digital)
    }
}

fn validate_amount(amount: &Decimal) -> std::result::Result<(), ValidationError> {
    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(ValidationError::new("negative_amount"));
    }
    Ok(())
}
