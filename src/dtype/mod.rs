//! Element types of device and host buffers
//!
//! `DType` describes what a buffer holds. CLBlast only understands four of them,
//! which are mapped to a [`Precision`] before a routine is selected. A buffer whose
//! dtype is not declared reports `None`; output buffers with an undeclared dtype
//! match any operand dtype.

pub mod complex;
mod element;
mod scalar;

pub use complex::{Complex128, Complex64};
pub use element::Element;
pub use scalar::{NativeScalar, Scalar};

use std::fmt;

/// Element types known to the binding
///
/// # Discriminant Values
///
/// - Floats: 0-9 (F64=0, F32=1, F16=2, BF16=3)
/// - Signed ints: 10-19 (I64=10, I32=11, I16=12, I8=13)
/// - Unsigned ints: 20-29 (U64=20, U32=21, U16=22, U8=23)
/// - Bool: 30
/// - Complex: 40-49 (Complex64=40, Complex128=41)
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[non_exhaustive]
#[repr(u8)]
pub enum DType {
    /// 64-bit floating point
    F64 = 0,
    /// 32-bit floating point
    F32 = 1,
    /// 16-bit floating point (IEEE 754)
    F16 = 2,
    /// 16-bit brain floating point
    BF16 = 3,

    /// 64-bit signed integer
    I64 = 10,
    /// 32-bit signed integer
    I32 = 11,
    /// 16-bit signed integer
    I16 = 12,
    /// 8-bit signed integer
    I8 = 13,

    /// 64-bit unsigned integer
    U64 = 20,
    /// 32-bit unsigned integer
    U32 = 21,
    /// 16-bit unsigned integer
    U16 = 22,
    /// 8-bit unsigned integer
    U8 = 23,

    /// Boolean type
    Bool = 30,

    /// 64-bit complex (two f32: re, im)
    Complex64 = 40,
    /// 128-bit complex (two f64: re, im)
    Complex128 = 41,
}

impl DType {
    /// Size of one element in bytes
    #[inline]
    pub const fn size_in_bytes(self) -> usize {
        match self {
            Self::Complex128 => 16,
            Self::F64 | Self::I64 | Self::U64 | Self::Complex64 => 8,
            Self::F32 | Self::I32 | Self::U32 => 4,
            Self::F16 | Self::BF16 | Self::I16 | Self::U16 => 2,
            Self::I8 | Self::U8 | Self::Bool => 1,
        }
    }

    /// Returns true if this is a floating point type
    #[inline]
    pub const fn is_float(self) -> bool {
        matches!(self, Self::F64 | Self::F32 | Self::F16 | Self::BF16)
    }

    /// Returns true if this is a complex number type
    #[inline]
    pub const fn is_complex(self) -> bool {
        matches!(self, Self::Complex64 | Self::Complex128)
    }

    /// Returns true if this is any integer type (signed or unsigned)
    #[inline]
    pub const fn is_int(self) -> bool {
        matches!(
            self,
            Self::I64
                | Self::I32
                | Self::I16
                | Self::I8
                | Self::U64
                | Self::U32
                | Self::U16
                | Self::U8
        )
    }

    /// The CLBlast precision for this dtype, if it has one
    #[inline]
    pub const fn precision(self) -> Option<Precision> {
        match self {
            Self::F32 => Some(Precision::Single),
            Self::F64 => Some(Precision::Double),
            Self::Complex64 => Some(Precision::ComplexSingle),
            Self::Complex128 => Some(Precision::ComplexDouble),
            _ => None,
        }
    }

    /// Component type of a complex dtype; other dtypes map to themselves
    #[inline]
    pub const fn real_dtype(self) -> Self {
        match self {
            Self::Complex64 => Self::F32,
            Self::Complex128 => Self::F64,
            other => other,
        }
    }

    /// Short name for display
    pub const fn short_name(self) -> &'static str {
        match self {
            Self::F64 => "f64",
            Self::F32 => "f32",
            Self::F16 => "f16",
            Self::BF16 => "bf16",
            Self::I64 => "i64",
            Self::I32 => "i32",
            Self::I16 => "i16",
            Self::I8 => "i8",
            Self::U64 => "u64",
            Self::U32 => "u32",
            Self::U16 => "u16",
            Self::U8 => "u8",
            Self::Bool => "bool",
            Self::Complex64 => "c64",
            Self::Complex128 => "c128",
        }
    }
}

impl fmt::Display for DType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.short_name())
    }
}

/// Native routine precision, the `S`/`D`/`C`/`Z` letter of a CLBlast symbol
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Precision {
    /// `S`: f32
    Single,
    /// `D`: f64
    Double,
    /// `C`: complex of two f32
    ComplexSingle,
    /// `Z`: complex of two f64
    ComplexDouble,
}

impl Precision {
    /// All precisions in S, D, C, Z order
    pub const ALL: [Self; 4] = [
        Self::Single,
        Self::Double,
        Self::ComplexSingle,
        Self::ComplexDouble,
    ];

    /// Symbol prefix letter
    #[inline]
    pub const fn letter(self) -> char {
        match self {
            Self::Single => 'S',
            Self::Double => 'D',
            Self::ComplexSingle => 'C',
            Self::ComplexDouble => 'Z',
        }
    }

    /// Returns true for `C` and `Z`
    #[inline]
    pub const fn is_complex(self) -> bool {
        matches!(self, Self::ComplexSingle | Self::ComplexDouble)
    }

    /// The buffer dtype this precision operates on
    #[inline]
    pub const fn dtype(self) -> DType {
        match self {
            Self::Single => DType::F32,
            Self::Double => DType::F64,
            Self::ComplexSingle => DType::Complex64,
            Self::ComplexDouble => DType::Complex128,
        }
    }
}
