use num_traits::{Float, FloatConst};

/// Constrain `value` to the range [-limit, limit].
pub fn constrain_abs<T: Float>(value: T, limit: T) -> T {
    constrain_min_max(value, -limit, limit)
}

pub fn constrain_min_max<T: Float>(value: T, low: T, high: T) -> T {
    if value.is_nan() {
        return (low + high) / (T::one() + T::one());
    }

    if value < low {
        low
    } else if value > high {
        high
    } else {
        value
    }
}

/// Weighted blend of two estimates: `a * weight + b * (1 - weight)`.
pub fn complementary<T: Float>(a: T, b: T, weight: T) -> T {
    a * weight + b * (T::one() - weight)
}

pub fn deg2rad<T: Float + FloatConst>(degrees: T) -> T {
    degrees * T::PI() / T::from(180).unwrap_or_else(T::one)
}
