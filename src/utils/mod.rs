use num_traits::Float;

/// Per-column centring and scaling applied in place.
///
/// `NaN` entries are skipped when estimating the column statistics and stay `NaN`.
pub trait SpanNormalize<T: Float> {
    /// Subtracts the column mean and divides by the column range (max − min).
    /// A zero range divides by one.
    fn span_normalize(&mut self) -> anyhow::Result<()>;

    /// Subtracts the column mean and divides by the population standard deviation.
    /// A zero deviation divides by one.
    fn standardize(&mut self) -> anyhow::Result<()>;
}

/// Divisor used for a column statistic that is zero or not finite.
pub(crate) fn safe_divisor<T: Float>(value: T) -> T {
    if value == T::zero() || !value.is_finite() {
        T::one()
    } else {
        value
    }
}
