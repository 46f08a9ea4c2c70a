/*!
A no-std module for the few floating point operations this crate needs.

With `std` enabled, the inherent `f64` methods are used instead. The
routines here follow the bit manipulation approach of the [`libm`] crate.

[`libm`]: https://github.com/rust-lang/libm
*/

pub(crate) trait Float {
    fn round(self) -> Self;
    fn trunc(self) -> Self;
}

impl Float for f64 {
    fn round(self) -> f64 {
        // Adding just under one half (with the sign of `self`) and then
        // truncating rounds half away from zero, like `f64::round`.
        let half = copysign(0.5 - 0.25 * f64::EPSILON, self);
        (self + half).trunc()
    }

    fn trunc(self) -> f64 {
        const MANTISSA_BITS: i64 = 52;
        const EXPONENT_BIAS: i64 = 0x3ff;

        let mut bits = self.to_bits();
        let exponent =
            ((bits >> MANTISSA_BITS) & 0x7ff) as i64 - EXPONENT_BIAS;
        if exponent >= MANTISSA_BITS {
            // Already integral, infinite or NaN.
            return self;
        }
        if exponent < 0 {
            // Magnitude is less than one, so only the sign survives.
            return f64::from_bits(bits & (1 << 63));
        }
        let fraction_mask = (1u64 << (MANTISSA_BITS - exponent)) - 1;
        bits &= !fraction_mask;
        f64::from_bits(bits)
    }
}

fn copysign(x: f64, y: f64) -> f64 {
    let magnitude = x.to_bits() & !(1 << 63);
    let sign = y.to_bits() & (1 << 63);
    f64::from_bits(magnitude | sign)
}
