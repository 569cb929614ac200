use bigdecimal::num_bigint::BigInt;
use bigdecimal::BigDecimal;

const F32_MIN_MAGNITUDE: f64 = 1.18e-38;
const F32_MAX_MAGNITUDE: f64 = 3.4e38;
const F64_MIN_MAGNITUDE: f64 = 2.23e-308;

const EXP_MASK: u64 = 0x7ff0_0000_0000_0000;
const MANT_MASK: u64 = 0x000f_ffff_ffff_ffff;
const SIGN_BIT: u64 = 0x8000_0000_0000_0000;

/// Wire representation chosen for a float.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FloatRepr {
    F32(f32),
    F64(f64),
    /// Infinities and NaN have no Draft-8 float encoding.
    Null,
    /// Magnitudes below the binary64 threshold travel as exact decimal text.
    Decimal,
}

/// Choose the narrowest float encoding that reproduces `v` exactly.
#[allow(clippy::cast_possible_truncation)]
pub fn classify(v: f64) -> FloatRepr {
    if !v.is_finite() {
        return FloatRepr::Null;
    }
    if v == 0.0 {
        return FloatRepr::F32(v as f32);
    }
    let mag = v.abs();
    if (F32_MIN_MAGNITUDE..=F32_MAX_MAGNITUDE).contains(&mag) {
        let narrow = v as f32;
        if f64::from(narrow) == v {
            return FloatRepr::F32(narrow);
        }
    }
    if mag >= F64_MIN_MAGNITUDE {
        return FloatRepr::F64(v);
    }
    FloatRepr::Decimal
}

/// Exact decimal expansion of a finite binary64 value.
pub fn exact_decimal(v: f64) -> BigDecimal {
    let bits = v.to_bits();
    let biased = (bits & EXP_MASK) >> 52;
    let mut mantissa = bits & MANT_MASK;
    let exp = if biased == 0 {
        -1074_i64
    } else {
        mantissa |= 1 << 52;
        i64::try_from(biased).unwrap_or(0) - 1075
    };

    let mut digits = BigInt::from(mantissa);
    if bits & SIGN_BIT != 0 {
        digits = -digits;
    }
    if exp >= 0 {
        let shift = usize::try_from(exp).unwrap_or(0);
        return BigDecimal::new(digits << shift, 0);
    }
    // m * 2^-k == m * 5^k / 10^k
    let k = u32::try_from(-exp).unwrap_or(0);
    BigDecimal::new(digits * BigInt::from(5u8).pow(k), i64::from(k)).normalized()
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::str::FromStr;

    #[test]
    fn exact_values_prefer_float32() {
        assert_eq!(classify(1.5), FloatRepr::F32(1.5));
        assert_eq!(classify(-3.0e9), FloatRepr::F32(-3.0e9));
        assert_eq!(classify(0.0), FloatRepr::F32(0.0));
    }

    #[test]
    fn inexact_values_keep_float64() {
        assert_eq!(classify(0.1), FloatRepr::F64(0.1));
        assert_eq!(classify(1.0e300), FloatRepr::F64(1.0e300));
        assert_eq!(classify(1.0e-40), FloatRepr::F64(1.0e-40));
    }

    #[test]
    fn non_finite_and_tiny_values() {
        assert_eq!(classify(f64::INFINITY), FloatRepr::Null);
        assert_eq!(classify(f64::NEG_INFINITY), FloatRepr::Null);
        assert_eq!(classify(f64::NAN), FloatRepr::Null);
        assert_eq!(classify(5e-324), FloatRepr::Decimal);
        assert_eq!(classify(f64::MIN_POSITIVE), FloatRepr::Decimal);
    }

    #[test]
    fn exact_decimal_expansion() {
        assert_eq!(exact_decimal(0.5), BigDecimal::from_str("0.5").unwrap());
        assert_eq!(exact_decimal(-2.0), BigDecimal::from_str("-2").unwrap());
        let tiny = exact_decimal(5e-324);
        assert!(tiny.to_string().len() > 254);
        assert!(tiny > BigDecimal::from_str("4.9e-324").unwrap());
        assert!(tiny < BigDecimal::from_str("5.0e-324").unwrap());
    }
}
