use bigdecimal::BigDecimal;
use serde::{de, Deserialize, Deserializer};

/// PostgreSQL caps NUMERIC precision at 1000 digits.
const MAX_DECIMAL_DIGITS: u64 = 1000;

/// Decodes a field that may be omitted but must not be `null` when present.
///
/// Use together with `#[serde(default)]`: omitted keys stay `None`, while an
/// explicit `null` is rejected with the usual "invalid type" error.
pub fn present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

/// Decodes a nullable field into three states.
///
/// With `#[serde(default)]` an omitted key becomes `None`, `null` becomes
/// `Some(None)` and a value becomes `Some(Some(value))`.
pub fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Decodes a decimal whose digit count and exponent fit a NUMERIC column.
///
/// Out-of-range values such as `1e-100000` fail at extraction instead of
/// reaching the connection pool.
pub fn decimal<'de, D>(deserializer: D) -> Result<BigDecimal, D::Error>
where
    D: Deserializer<'de>,
{
    check_decimal(BigDecimal::deserialize(deserializer)?)
}

pub fn optional_decimal<'de, D>(deserializer: D) -> Result<Option<BigDecimal>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<BigDecimal>::deserialize(deserializer)?
        .map(check_decimal)
        .transpose()
}

/// [`present`] for decimal columns.
pub fn present_decimal<'de, D>(deserializer: D) -> Result<Option<BigDecimal>, D::Error>
where
    D: Deserializer<'de>,
{
    decimal(deserializer).map(Some)
}

/// [`nullable`] for decimal columns.
pub fn nullable_decimal<'de, D>(deserializer: D) -> Result<Option<Option<BigDecimal>>, D::Error>
where
    D: Deserializer<'de>,
{
    optional_decimal(deserializer).map(Some)
}

fn check_decimal<E: de::Error>(value: BigDecimal) -> Result<BigDecimal, E> {
    let (_, scale) = value.as_bigint_and_exponent();
    if value.digits() > MAX_DECIMAL_DIGITS || scale.unsigned_abs() > MAX_DECIMAL_DIGITS {
        return Err(E::custom(format!(
            "decimal out of range: at most {MAX_DECIMAL_DIGITS} digits and exponent magnitude"
        )));
    }
    Ok(value)
}
