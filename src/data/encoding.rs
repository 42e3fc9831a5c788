use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Container attribute names
// ---------------------------------------------------------------------------

/// Field metadata key holding the encoding-tag ordinal as decimal text.
pub const ENCODING_TAG_ATTR: &str = "vr_at";

/// Field metadata key holding `[[label, ...]]` for category columns.
pub const LABELS_ATTR: &str = "vr_labels";

// ---------------------------------------------------------------------------
// Missing-value sentinels
// ---------------------------------------------------------------------------

/// Raw price value meaning "no price", compared before rescaling.
pub const NA_PRICE: f64 = i64::MIN as f64;

/// Prices are stored as fixed-point integers with seven decimal places.
pub const PRICE_SCALE: f64 = 10_000_000.0;

/// Category code for an unknown / missing label.
pub const MISSING_CODE: i32 = -1;

/// Timestamp nanoseconds meaning "not a time".
pub const NAT: i64 = i64::MIN;

pub const NA_INT64: i64 = i64::MIN;
pub const NA_INT32: i32 = i32::MIN;

// ---------------------------------------------------------------------------
// EncodingTag
// ---------------------------------------------------------------------------

/// Per-column type discriminator stored in the container.
///
/// The ordinals are part of the on-disk format and must not be renumbered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum EncodingTag {
    Category = 0,
    Timestamp = 1,
    Int64 = 2,
    Float64 = 3,
    Int32 = 4,
    Float32 = 5,
}

impl EncodingTag {
    pub const ALL: [EncodingTag; 6] = [
        EncodingTag::Category,
        EncodingTag::Timestamp,
        EncodingTag::Int64,
        EncodingTag::Float64,
        EncodingTag::Int32,
        EncodingTag::Float32,
    ];

    pub fn name(self) -> &'static str {
        match self {
            EncodingTag::Category => "category",
            EncodingTag::Timestamp => "timestamp",
            EncodingTag::Int64 => "int64",
            EncodingTag::Float64 => "float64",
            EncodingTag::Int32 => "int32",
            EncodingTag::Float32 => "float32",
        }
    }
}

impl TryFrom<i64> for EncodingTag {
    type Error = i64;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(EncodingTag::Category),
            1 => Ok(EncodingTag::Timestamp),
            2 => Ok(EncodingTag::Int64),
            3 => Ok(EncodingTag::Float64),
            4 => Ok(EncodingTag::Int32),
            5 => Ok(EncodingTag::Float32),
            other => Err(other),
        }
    }
}

impl fmt::Display for EncodingTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Undo the fixed-point price encoding in place.
///
/// The sentinel is replaced first: once divided it no longer compares equal.
pub fn decode_prices(values: &mut [f64]) {
    for v in values.iter_mut() {
        if *v == NA_PRICE {
            *v = f64::NAN;
        } else {
            *v /= PRICE_SCALE;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordinals_round_trip_through_try_from() {
        for tag in EncodingTag::ALL {
            assert_eq!(EncodingTag::try_from(tag as i64), Ok(tag));
        }
        assert_eq!(EncodingTag::try_from(6), Err(6));
        assert_eq!(EncodingTag::try_from(-1), Err(-1));
    }

    #[test]
    fn na_price_is_min_i64_as_float() {
        assert_eq!(NA_PRICE, -9223372036854775808.0);
    }

    #[test]
    fn prices_replace_sentinel_then_rescale() {
        // the sentinel divided by the scale must not survive as a number
        let border = NA_PRICE / PRICE_SCALE;
        let mut values = vec![NA_PRICE, 1_234_500_000.0, -50_000_000.0, 0.0, border];
        decode_prices(&mut values);

        assert!(values[0].is_nan());
        assert_eq!(values[1], 123.45);
        assert_eq!(values[2], -5.0);
        assert_eq!(values[3], 0.0);
        assert_eq!(values[4], border / PRICE_SCALE);
    }

    #[test]
    fn serde_uses_lowercase_names() {
        let json = serde_json::to_string(&EncodingTag::Float32).unwrap();
        assert_eq!(json, "\"float32\"");
        let tag: EncodingTag = serde_json::from_str("\"timestamp\"").unwrap();
        assert_eq!(tag, EncodingTag::Timestamp);
    }
}
