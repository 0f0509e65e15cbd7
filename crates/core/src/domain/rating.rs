use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::DomainError;

/// Discrete 0-5 star score. Ordered by star count.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Rating {
    #[default]
    NotRated,
    OneStar,
    TwoStar,
    ThreeStar,
    FourStar,
    FiveStar,
}

impl Rating {
    pub const ALL: [Rating; 6] = [
        Rating::NotRated,
        Rating::OneStar,
        Rating::TwoStar,
        Rating::ThreeStar,
        Rating::FourStar,
        Rating::FiveStar,
    ];

    pub fn stars(self) -> &'static str {
        match self {
            Self::NotRated => "\u{2606}\u{2606}\u{2606}\u{2606}\u{2606}",
            Self::OneStar => "\u{2605}\u{2606}\u{2606}\u{2606}\u{2606}",
            Self::TwoStar => "\u{2605}\u{2605}\u{2606}\u{2606}\u{2606}",
            Self::ThreeStar => "\u{2605}\u{2605}\u{2605}\u{2606}\u{2606}",
            Self::FourStar => "\u{2605}\u{2605}\u{2605}\u{2605}\u{2606}",
            Self::FiveStar => "\u{2605}\u{2605}\u{2605}\u{2605}\u{2605}",
        }
    }

    pub fn star_count(self) -> u8 {
        match self {
            Self::NotRated => 0,
            Self::OneStar => 1,
            Self::TwoStar => 2,
            Self::ThreeStar => 3,
            Self::FourStar => 4,
            Self::FiveStar => 5,
        }
    }

    pub fn from_stars(stars: u8) -> Result<Self, DomainError> {
        Self::ALL.get(usize::from(stars)).copied().ok_or_else(|| {
            DomainError::invalid_argument(format!("rating must be in range 0..=5, got {stars}"))
        })
    }

    /// Average star count of `ratings`, rounded to the nearest whole star with
    /// ties rounded up. Returns `None` for an empty input.
    pub fn average<I>(ratings: I) -> Option<Self>
    where
        I: IntoIterator<Item = Rating>,
    {
        let (sum, count) = ratings
            .into_iter()
            .fold((0u64, 0u64), |(sum, count), rating| {
                (sum + u64::from(rating.star_count()), count + 1)
            });
        if count == 0 {
            return None;
        }

        // floor(sum / count + 1/2) in integer arithmetic
        let rounded = (2 * sum + count) / (2 * count);
        u8::try_from(rounded).ok().and_then(|stars| Self::from_stars(stars).ok())
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.stars())
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::Rating;
    use crate::errors::DomainError;

    #[test]
    fn stars_fill_left_to_right() {
        assert_eq!(Rating::NotRated.stars(), "☆☆☆☆☆");
        assert_eq!(Rating::ThreeStar.stars(), "★★★☆☆");
        assert_eq!(Rating::FiveStar.to_string(), "★★★★★");
    }

    #[test]
    fn from_stars_rejects_out_of_range() {
        assert_eq!(Rating::from_stars(4), Ok(Rating::FourStar));
        assert!(matches!(Rating::from_stars(6), Err(DomainError::InvalidArgument(_))));
    }

    #[test]
    fn ratings_order_by_star_count() {
        assert!(Rating::NotRated < Rating::OneStar);
        assert!(Rating::FourStar < Rating::FiveStar);
    }

    #[test]
    fn average_rounds_to_nearest_star() {
        use Rating::*;

        assert_eq!(Rating::average([FourStar, TwoStar, FourStar, FourStar, FiveStar]), Some(FourStar));
        assert_eq!(Rating::average([OneStar, TwoStar, TwoStar]), Some(TwoStar));
        assert_eq!(Rating::average(Vec::new()), None);
    }

    #[test]
    fn average_rounds_ties_up() {
        use Rating::*;

        assert_eq!(Rating::average([TwoStar, ThreeStar]), Some(ThreeStar));
        assert_eq!(Rating::average([ThreeStar, FourStar]), Some(FourStar));
        assert_eq!(Rating::average([NotRated, OneStar]), Some(OneStar));
    }

    proptest! {
        #[test]
        fn average_matches_rounded_mean(stars in proptest::collection::vec(0u8..=5, 1..64)) {
            let ratings = stars.iter().map(|value| Rating::from_stars(*value).unwrap());
            let mean = stars.iter().map(|value| f64::from(*value)).sum::<f64>() / stars.len() as f64;
            let expected = (mean + 0.5).floor() as u8;

            prop_assert_eq!(Rating::average(ratings).map(Rating::star_count), Some(expected));
        }
    }
}
