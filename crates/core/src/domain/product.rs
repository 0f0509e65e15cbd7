use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::domain::rating::Rating;
use crate::errors::DomainError;

/// Share of the price granted as discount (10%).
pub const DISCOUNT_RATE: Decimal = Decimal::from_parts(1, 0, 0, false, 1);

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(pub u32);

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl FromStr for ProductId {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        value.trim().parse::<u32>().map(Self).map_err(|_| {
            DomainError::invalid_argument(format!(
                "product id must be a non-negative integer, got `{value}`"
            ))
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ProductKind {
    Drink,
    Food { best_before: NaiveDate },
}

/// Immutable catalog item. Equality and hashing use the id only, so a
/// re-rated copy still identifies the same product.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(try_from = "ProductFields")]
pub struct Product {
    id: ProductId,
    name: String,
    price: Decimal,
    rating: Rating,
    #[serde(flatten)]
    kind: ProductKind,
}

impl Product {
    pub fn new(
        id: ProductId,
        name: impl Into<String>,
        price: Decimal,
        rating: Rating,
        kind: ProductKind,
    ) -> Result<Self, DomainError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(DomainError::invalid_argument(format!(
                "product {id} must have a non-blank name"
            )));
        }
        if price.is_sign_negative() && !price.is_zero() {
            return Err(DomainError::invalid_argument(format!(
                "product {id} price must not be negative, got {price}"
            )));
        }

        Ok(Self { id, name, price, rating, kind })
    }

    pub fn id(&self) -> ProductId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn price(&self) -> Decimal {
        self.price
    }

    pub fn rating(&self) -> Rating {
        self.rating
    }

    pub fn best_before(&self) -> Option<NaiveDate> {
        match self.kind {
            ProductKind::Drink => None,
            ProductKind::Food { best_before } => Some(best_before),
        }
    }

    /// `price * DISCOUNT_RATE`, rounded half away from zero to cents.
    pub fn discount(&self) -> Decimal {
        (self.price * DISCOUNT_RATE)
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
    }

    /// Copy of this product carrying `rating`.
    pub fn with_rating(&self, rating: Rating) -> Self {
        Self { rating, ..self.clone() }
    }
}

impl PartialEq for Product {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Product {}

impl Hash for Product {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Display for Product {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}, {}, {}, {}, {}",
            self.id,
            self.name,
            self.price,
            self.discount(),
            self.rating
        )?;
        if let Some(best_before) = self.best_before() {
            write!(f, ", {best_before}")?;
        }
        Ok(())
    }
}

#[derive(Deserialize)]
struct ProductFields {
    id: ProductId,
    name: String,
    price: Decimal,
    rating: Rating,
    #[serde(flatten)]
    kind: ProductKind,
}

impl TryFrom<ProductFields> for Product {
    type Error = DomainError;

    fn try_from(fields: ProductFields) -> Result<Self, Self::Error> {
        Product::new(fields.id, fields.name, fields.price, fields.rating, fields.kind)
    }
}
