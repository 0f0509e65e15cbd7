use serde::{Deserialize, Serialize};

use crate::domain::product::ProductId;
use crate::domain::rating::Rating;

/// A customer review. Created once and never edited.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Review {
    product_id: ProductId,
    rating: Rating,
    comment: String,
}

impl Review {
    pub fn new(product_id: ProductId, rating: Rating, comment: impl Into<String>) -> Self {
        Self { product_id, rating, comment: comment.into() }
    }

    pub fn product_id(&self) -> ProductId {
        self.product_id
    }

    pub fn rating(&self) -> Rating {
        self.rating
    }

    pub fn comment(&self) -> &str {
        &self.comment
    }
}
