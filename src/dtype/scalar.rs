//! Host scalars and their conversion to the native argument layout

use super::{Complex128, Complex64, Precision};
use crate::error::{Error, Result};
use crate::native::types::{ClDouble2, ClFloat2};

/// A scalar argument (alpha, beta, cos, sin) as supplied by the caller
///
/// Real values are accepted for every precision; for complex routines they become
/// `(re, 0)`. Complex values are only accepted by complex routines.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Scalar {
    /// Real value
    Real(f64),
    /// Complex value
    Complex {
        /// Real part
        re: f64,
        /// Imaginary part
        im: f64,
    },
}

impl Scalar {
    /// Convert into the by-value form a routine of `precision` expects.
    ///
    /// `arg` names the parameter in the error raised for a complex value passed
    /// to a real routine.
    pub fn to_native(self, precision: Precision, arg: &'static str) -> Result<NativeScalar> {
        let (re, im) = match self {
            Scalar::Real(re) => (re, 0.0),
            Scalar::Complex { re, im } => {
                if !precision.is_complex() {
                    return Err(Error::InvalidArgument {
                        arg,
                        reason: format!(
                            "complex value {re}{im:+}i passed to a {} routine",
                            precision.dtype()
                        ),
                    });
                }
                (re, im)
            }
        };
        Ok(match precision {
            Precision::Single => NativeScalar::F32(re as f32),
            Precision::Double => NativeScalar::F64(re),
            Precision::ComplexSingle => NativeScalar::C64(ClFloat2 {
                s: [re as f32, im as f32],
            }),
            Precision::ComplexDouble => NativeScalar::C128(ClDouble2 { s: [re, im] }),
        })
    }
}

impl From<f64> for Scalar {
    #[inline]
    fn from(v: f64) -> Self {
        Scalar::Real(v)
    }
}

impl From<f32> for Scalar {
    #[inline]
    fn from(v: f32) -> Self {
        Scalar::Real(v as f64)
    }
}

impl From<Complex64> for Scalar {
    #[inline]
    fn from(z: Complex64) -> Self {
        Scalar::Complex {
            re: z.re as f64,
            im: z.im as f64,
        }
    }
}

impl From<Complex128> for Scalar {
    #[inline]
    fn from(z: Complex128) -> Self {
        Scalar::Complex { re: z.re, im: z.im }
    }
}

/// Scalar in the exact form passed across the C ABI
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum NativeScalar {
    /// `float`
    F32(f32),
    /// `double`
    F64(f64),
    /// `cl_float2`
    C64(ClFloat2),
    /// `cl_double2`
    C128(ClDouble2),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_real_to_real() {
        let s = Scalar::from(2.0f64);
        assert_eq!(
            s.to_native(Precision::Single, "alpha").unwrap(),
            NativeScalar::F32(2.0)
        );
        assert_eq!(
            s.to_native(Precision::Double, "alpha").unwrap(),
            NativeScalar::F64(2.0)
        );
    }

    #[test]
    fn test_real_promotes_to_complex() {
        let s = Scalar::from(1.5f32);
        assert_eq!(
            s.to_native(Precision::ComplexSingle, "alpha").unwrap(),
            NativeScalar::C64(ClFloat2 { s: [1.5, 0.0] })
        );
    }

    #[test]
    fn test_complex_keeps_both_parts() {
        let s = Scalar::from(Complex128::new(1.0, -2.0));
        assert_eq!(
            s.to_native(Precision::ComplexDouble, "beta").unwrap(),
            NativeScalar::C128(ClDouble2 { s: [1.0, -2.0] })
        );
    }

    #[test]
    fn test_complex_rejected_for_real_routine() {
        let err = Scalar::from(Complex64::new(1.0, 1.0))
            .to_native(Precision::Double, "alpha")
            .unwrap_err();
        assert!(matches!(err, Error::InvalidArgument { arg: "alpha", .. }));
    }
}
