//! Locale-specific currency, date and label formatting.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::errors::DomainError;

/// Language tags accepted by [`Locale::from_str`], in display order.
pub const SUPPORTED_LOCALES: [&str; 5] = ["en-GB", "en-US", "es-US", "fr-FR", "zh-CN"];

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Locale {
    #[serde(rename = "en-GB")]
    EnGb,
    #[serde(rename = "en-US")]
    EnUs,
    #[serde(rename = "es-US")]
    EsUs,
    #[serde(rename = "fr-FR")]
    FrFr,
    #[serde(rename = "zh-CN")]
    ZhCn,
}

struct CurrencyStyle {
    symbol: &'static str,
    symbol_first: bool,
    decimal_separator: char,
    group_separator: &'static str,
}

impl Locale {
    pub const ALL: [Locale; 5] =
        [Locale::EnGb, Locale::EnUs, Locale::EsUs, Locale::FrFr, Locale::ZhCn];

    pub fn tag(self) -> &'static str {
        match self {
            Self::EnGb => "en-GB",
            Self::EnUs => "en-US",
            Self::EsUs => "es-US",
            Self::FrFr => "fr-FR",
            Self::ZhCn => "zh-CN",
        }
    }

    fn currency_style(self) -> CurrencyStyle {
        match self {
            Self::EnGb => CurrencyStyle {
                symbol: "£",
                symbol_first: true,
                decimal_separator: '.',
                group_separator: ",",
            },
            Self::EnUs | Self::EsUs => CurrencyStyle {
                symbol: "$",
                symbol_first: true,
                decimal_separator: '.',
                group_separator: ",",
            },
            Self::FrFr => CurrencyStyle {
                symbol: "\u{a0}€",
                symbol_first: false,
                decimal_separator: ',',
                group_separator: "\u{202f}",
            },
            Self::ZhCn => CurrencyStyle {
                symbol: "¥",
                symbol_first: true,
                decimal_separator: '.',
                group_separator: ",",
            },
        }
    }

    fn date_pattern(self) -> &'static str {
        match self {
            Self::EnGb | Self::FrFr => "%d/%m/%Y",
            Self::EnUs => "%-m/%-d/%y",
            Self::EsUs => "%-d/%-m/%y",
            Self::ZhCn => "%Y/%-m/%-d",
        }
    }

    /// Label printed in a report for a product without reviews.
    pub fn not_reviewed_label(self) -> &'static str {
        match self {
            Self::EnGb | Self::EnUs => "Not reviewed",
            Self::EsUs => "Sin reseñas",
            Self::FrFr => "Aucun avis",
            Self::ZhCn => "暂无评价",
        }
    }

    /// Formats `amount` as money, rounded half away from zero to cents.
    pub fn format_money(self, amount: Decimal) -> String {
        let style = self.currency_style();
        let rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        let negative = rounded.is_sign_negative() && !rounded.is_zero();
        let digits = format!("{:.2}", rounded.abs());
        let (integer, fraction) = digits.split_once('.').unwrap_or((digits.as_str(), "00"));

        let mut number = group_thousands(integer, style.group_separator);
        number.push(style.decimal_separator);
        number.push_str(fraction);

        let sign = if negative { "-" } else { "" };
        if style.symbol_first {
            format!("{sign}{}{number}", style.symbol)
        } else {
            format!("{sign}{number}{}", style.symbol)
        }
    }

    pub fn format_date(self, date: NaiveDate) -> String {
        date.format(self.date_pattern()).to_string()
    }
}

fn group_thousands(integer: &str, separator: &str) -> String {
    let mut grouped = String::with_capacity(integer.len() + integer.len() / 3 * separator.len());
    for (index, digit) in integer.chars().enumerate() {
        if index > 0 && (integer.len() - index) % 3 == 0 {
            grouped.push_str(separator);
        }
        grouped.push(digit);
    }
    grouped
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for Locale {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().replace('_', "-");
        Self::ALL
            .into_iter()
            .find(|locale| locale.tag().eq_ignore_ascii_case(&normalized))
            .ok_or_else(|| {
                DomainError::invalid_argument(format!(
                    "unsupported locale `{value}` (expected one of {})",
                    SUPPORTED_LOCALES.join("|")
                ))
            })
    }
}
