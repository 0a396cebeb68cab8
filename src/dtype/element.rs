//! Element trait for mapping Rust types to DType

use super::{Complex128, Complex64, DType};
use bytemuck::Pod;

/// Trait for types that can be stored in a host buffer handed to the native library
///
/// Connects Rust's type system to the runtime dtype carried by buffers, so that
/// host arrays (per-batch offsets and scalars) can be checked against the dtype
/// a routine expects.
pub trait Element: Copy + Send + Sync + Pod + 'static {
    /// The corresponding DType for this Rust type
    const DTYPE: DType;
}

macro_rules! impl_element {
    ($($ty:ty => $dtype:ident),* $(,)?) => {
        $(
            impl Element for $ty {
                const DTYPE: DType = DType::$dtype;
            }
        )*
    };
}

impl_element! {
    f64 => F64,
    f32 => F32,
    i64 => I64,
    i32 => I32,
    i16 => I16,
    i8 => I8,
    u64 => U64,
    u32 => U32,
    u16 => U16,
    u8 => U8,
    Complex64 => Complex64,
    Complex128 => Complex128,
}

#[cfg(feature = "f16")]
impl_element! {
    half::f16 => F16,
    half::bf16 => BF16,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dtype_of<T: Element>() -> DType {
        T::DTYPE
    }

    #[test]
    fn test_element_dtypes() {
        assert_eq!(dtype_of::<f32>(), DType::F32);
        assert_eq!(dtype_of::<u64>(), DType::U64);
        assert_eq!(dtype_of::<Complex128>(), DType::Complex128);
        assert_eq!(
            std::mem::size_of::<Complex64>(),
            DType::Complex64.size_in_bytes()
        );
    }
}
