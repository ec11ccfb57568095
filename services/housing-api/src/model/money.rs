//! Fixed-point rental price with two fractional digits.
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Non-negative amount in cents, at most ten significant digits in total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RentalPrice {
    cents: i64,
}

impl RentalPrice {
    pub const MAX_CENTS: i64 = 9_999_999_999;

    pub fn from_cents(cents: i64) -> Result<Self, String> {
        if cents < 0 {
            return Err("rental_price must not be negative".to_string());
        }
        if cents > Self::MAX_CENTS {
            return Err("rental_price exceeds 10 digits".to_string());
        }
        Ok(Self { cents })
    }

    pub fn cents(self) -> i64 {
        self.cents
    }
}

impl fmt::Display for RentalPrice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}", self.cents / 100, self.cents % 100)
    }
}

impl FromStr for RentalPrice {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let raw = raw.trim();
        if raw.starts_with('-') {
            return Err("rental_price must not be negative".to_string());
        }
        let (whole, fraction) = match raw.split_once('.') {
            Some((whole, fraction)) => (whole, fraction),
            None => (raw, ""),
        };
        let digits_only = |part: &str| part.bytes().all(|b| b.is_ascii_digit());
        if whole.is_empty() || !digits_only(whole) || !digits_only(fraction) {
            return Err(format!("invalid rental_price: {raw}"));
        }
        let whole = whole.trim_start_matches('0');
        if whole.len() > 8 {
            return Err("rental_price exceeds 10 digits".to_string());
        }
        let whole: i64 = if whole.is_empty() {
            0
        } else {
            whole
                .parse()
                .map_err(|_| format!("invalid rental_price: {raw}"))?
        };
        let fraction = match fraction.as_bytes() {
            [] => 0,
            [tenths] => i64::from(tenths - b'0') * 10,
            [tenths, hundredths] => i64::from(tenths - b'0') * 10 + i64::from(hundredths - b'0'),
            _ => return Err("rental_price allows at most 2 decimal places".to_string()),
        };
        Self::from_cents(whole * 100 + fraction)
    }
}

impl Serialize for RentalPrice {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for RentalPrice {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(PriceVisitor)
    }
}

struct PriceVisitor;

impl Visitor<'_> for PriceVisitor {
    type Value = RentalPrice;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a decimal amount with at most 2 fractional digits")
    }

    fn visit_str<E: de::Error>(self, value: &str) -> Result<RentalPrice, E> {
        value.parse().map_err(E::custom)
    }

    fn visit_u64<E: de::Error>(self, value: u64) -> Result<RentalPrice, E> {
        self.visit_str(&value.to_string())
    }

    fn visit_i64<E: de::Error>(self, value: i64) -> Result<RentalPrice, E> {
        self.visit_str(&value.to_string())
    }

    fn visit_f64<E: de::Error>(self, value: f64) -> Result<RentalPrice, E> {
        if !value.is_finite() {
            return Err(E::custom("rental_price must be finite"));
        }
        self.visit_str(&value.to_string())
    }
}
