//! Comma-separated text records used to seed a catalog.
//!
//! Product: `D,101,Tea,1.99,0` (drink, optional trailing date ignored) or
//! `F,103,Cake,3.99,0,2022-12-06` (food with best-before date).
//! Review: `101,4,Nice hot cup of tea` (the comment may contain commas).

use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::catalog::NewProduct;
use crate::domain::product::ProductId;
use crate::domain::rating::Rating;
use crate::domain::review::Review;
use crate::errors::DomainError;

pub fn parse_product_record(record: &str) -> Result<NewProduct, DomainError> {
    let fields: Vec<&str> = record.trim().split(',').map(str::trim).collect();

    match fields.as_slice() {
        ["D", id, name, price, rating] | ["D", id, name, price, rating, _] => Ok(NewProduct {
            id: id.parse()?,
            name: (*name).to_string(),
            price: parse_price(price)?,
            rating: parse_rating(rating)?,
            best_before: None,
        }),
        ["F", id, name, price, rating, best_before] => Ok(NewProduct {
            id: id.parse()?,
            name: (*name).to_string(),
            price: parse_price(price)?,
            rating: parse_rating(rating)?,
            best_before: Some(parse_date(best_before)?),
        }),
        [kind, ..] if *kind != "D" && *kind != "F" => Err(DomainError::invalid_argument(format!(
            "unknown product kind `{kind}` in record `{record}` (expected D|F)"
        ))),
        _ => Err(DomainError::invalid_argument(format!(
            "malformed product record `{record}`"
        ))),
    }
}

pub fn parse_review_record(record: &str) -> Result<Review, DomainError> {
    let mut fields = record.trim().splitn(3, ',');
    let (Some(id), Some(rating), Some(comment)) = (fields.next(), fields.next(), fields.next())
    else {
        return Err(DomainError::invalid_argument(format!("malformed review record `{record}`")));
    };

    let product_id = ProductId::from_str(id)?;
    Ok(Review::new(product_id, parse_rating(rating)?, comment.trim()))
}

fn parse_price(value: &str) -> Result<Decimal, DomainError> {
    Decimal::from_str(value)
        .map_err(|_| DomainError::invalid_argument(format!("invalid price `{value}`")))
}

fn parse_rating(value: &str) -> Result<Rating, DomainError> {
    let stars = value
        .trim()
        .parse::<u8>()
        .map_err(|_| DomainError::invalid_argument(format!("invalid rating `{value}`")))?;
    Rating::from_stars(stars)
}

fn parse_date(value: &str) -> Result<NaiveDate, DomainError> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| DomainError::invalid_argument(format!("invalid date `{value}`")))
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    use super::{parse_product_record, parse_review_record};
    use crate::domain::product::ProductId;
    use crate::domain::rating::Rating;
    use crate::errors::DomainError;

    #[test]
    fn parses_drink_and_food_records() {
        let tea = parse_product_record("D,101,Tea,1.99,0,2022-12-06").expect("drink record");
        assert_eq!(tea.id, ProductId(101));
        assert_eq!(tea.name, "Tea");
        assert_eq!(tea.price, Decimal::new(199, 2));
        assert_eq!(tea.rating, Rating::NotRated);
        assert_eq!(tea.best_before, None);

        let cake = parse_product_record("F, 103, Cake, 3.99, 0, 2022-12-06").expect("food record");
        assert_eq!(cake.best_before, NaiveDate::from_ymd_opt(2022, 12, 6));
    }

    #[test]
    fn rejects_malformed_product_records() {
        for record in [
            "X,101,Tea,1.99,0",
            "F,103,Cake,3.99,0",
            "D,abc,Tea,1.99,0",
            "D,-1,Tea,1.99,0",
            "D,101,Tea,cheap,0",
            "D,101,Tea,1.99,9",
            "F,103,Cake,3.99,0,06/12/2022",
            "",
        ] {
            assert!(
                matches!(parse_product_record(record), Err(DomainError::InvalidArgument(_))),
                "record `{record}` should be rejected"
            );
        }
    }

    #[test]
    fn review_comment_keeps_embedded_commas() {
        let review = parse_review_record("103,4,It is good, but I expected more chocolate")
            .expect("review record");

        assert_eq!(review.product_id(), ProductId(103));
        assert_eq!(review.rating(), Rating::FourStar);
        assert_eq!(review.comment(), "It is good, but I expected more chocolate");
    }

    #[test]
    fn rejects_malformed_review_records() {
        assert!(parse_review_record("101,4").is_err());
        assert!(parse_review_record("101,seven,Nice").is_err());
        assert!(parse_review_record("tea,4,Nice").is_err());
    }
}
