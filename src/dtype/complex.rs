//! Host-side complex numbers and their native two-component layout
//!
//! Complex buffers are stored interleaved (re, im, re, im...), matching the
//! `cl_float2` / `cl_double2` layout CLBlast reads. Scalar arguments (alpha, beta)
//! are converted to [`ClFloat2`] / [`ClDouble2`] before a complex routine is called.

use crate::native::types::{ClDouble2, ClFloat2};
use bytemuck::{Pod, Zeroable};
use std::fmt;

/// Implements a complex scalar type together with its native counterpart.
macro_rules! impl_complex {
    ($name:ident, $float:ty, $native:ident, $doc_bits:literal) => {
        #[doc = concat!($doc_bits, "-bit complex number (two ", stringify!($float), ": re, im)")]
        ///
        #[doc = concat!("Layout-compatible with `", stringify!($native), "`.")]
        #[repr(C)]
        #[derive(Copy, Clone, Debug, Default, PartialEq, Pod, Zeroable)]
        pub struct $name {
            /// Real part
            pub re: $float,
            /// Imaginary part
            pub im: $float,
        }

        impl $name {
            /// Create a new complex number
            #[inline]
            pub const fn new(re: $float, im: $float) -> Self {
                Self { re, im }
            }

            /// Complex conjugate: conj(a + bi) = a - bi
            #[inline]
            pub fn conj(self) -> Self {
                Self {
                    re: self.re,
                    im: -self.im,
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                if self.im >= 0.0 {
                    write!(f, "{}+{}i", self.re, self.im)
                } else {
                    write!(f, "{}{}i", self.re, self.im)
                }
            }
        }

        impl From<$float> for $name {
            #[inline]
            fn from(re: $float) -> Self {
                Self { re, im: 0.0 }
            }
        }

        impl From<($float, $float)> for $name {
            #[inline]
            fn from((re, im): ($float, $float)) -> Self {
                Self { re, im }
            }
        }

        impl From<$name> for $native {
            #[inline]
            fn from(z: $name) -> Self {
                $native { s: [z.re, z.im] }
            }
        }

        impl From<$native> for $name {
            #[inline]
            fn from(v: $native) -> Self {
                Self {
                    re: v.s[0],
                    im: v.s[1],
                }
            }
        }
    };
}

impl_complex!(Complex64, f32, ClFloat2, "64");
impl_complex!(Complex128, f64, ClDouble2, "128");

impl From<Complex64> for Complex128 {
    #[inline]
    fn from(c: Complex64) -> Self {
        Self {
            re: c.re as f64,
            im: c.im as f64,
        }
    }
}

impl From<Complex128> for Complex64 {
    /// Narrows both components to f32.
    #[inline]
    fn from(c: Complex128) -> Self {
        Self {
            re: c.re as f32,
            im: c.im as f32,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_native_layout_matches() {
        assert_eq!(
            std::mem::size_of::<Complex64>(),
            std::mem::size_of::<ClFloat2>()
        );
        assert_eq!(
            std::mem::size_of::<Complex128>(),
            std::mem::size_of::<ClDouble2>()
        );
    }

    #[test]
    fn test_to_native_keeps_component_order() {
        let native: ClFloat2 = Complex64::new(1.5, -2.0).into();
        assert_eq!(native.s, [1.5, -2.0]);

        let native: ClDouble2 = Complex128::new(3.0, 4.0).into();
        assert_eq!(native.s, [3.0, 4.0]);
        assert_eq!(Complex128::from(native), Complex128::new(3.0, 4.0));
    }

    #[test]
    fn test_display_and_conj() {
        let z = Complex64::new(3.0, 4.0);
        assert_eq!(z.to_string(), "3+4i");
        assert_eq!(z.conj().to_string(), "3-4i");
        assert_eq!(Complex128::from(z), Complex128::new(3.0, 4.0));
    }
}
