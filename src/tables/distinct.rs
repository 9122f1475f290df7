use std::collections::HashSet;
use std::hash::Hash;

/// Drops rows equal to an earlier row, keeping first-seen order.
pub fn distinct<T, I>(rows: I) -> Vec<T>
where
    T: Hash + Eq + Clone,
    I: IntoIterator<Item = T>,
{
    let mut seen = HashSet::new();
    rows.into_iter().filter(|row| seen.insert(row.clone())).collect()
}

/// Bit pattern used to compare optional floats for row equality.
///
/// `-0.0` groups with `0.0` and every NaN groups together, the way
/// grouping and DISTINCT treat them in SQL engines.
pub(crate) fn float_key(value: Option<f64>) -> Option<u64> {
    value.map(|v| {
        if v == 0.0 {
            0.0f64.to_bits()
        } else if v.is_nan() {
            f64::NAN.to_bits()
        } else {
            v.to_bits()
        }
    })
}
