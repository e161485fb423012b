/// Fixed-width tagged value for tries that mix integers, floats and opaque
/// handles under one value type.
///
/// The tag keeps the original type, so a float never comes back as the
/// integer with the same bit pattern.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Slot {
    Int(i64),
    UInt(u64),
    Float(f64),
    /// Pointer-sized index or handle into storage the caller owns.
    Handle(usize),
}

impl Default for Slot {
    /// The not-found sentinel returned by `Trie::search`.
    fn default() -> Self {
        Slot::UInt(0)
    }
}

impl Slot {
    pub fn as_i64(&self) -> Option<i64> {
        match *self {
            Slot::Int(v) => Some(v),
            Slot::UInt(v) => i64::try_from(v).ok(),
            _ => None,
        }
    }

    pub fn as_u64(&self) -> Option<u64> {
        match *self {
            Slot::UInt(v) => Some(v),
            Slot::Int(v) => u64::try_from(v).ok(),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            Slot::Float(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_handle(&self) -> Option<usize> {
        match *self {
            Slot::Handle(h) => Some(h),
            _ => None,
        }
    }

    /// Whether this is the zero value of its variant.
    pub fn is_zero(&self) -> bool {
        match *self {
            Slot::Int(v) => v == 0,
            Slot::UInt(v) => v == 0,
            Slot::Float(v) => v == 0.0,
            Slot::Handle(h) => h == 0,
        }
    }
}

macro_rules! impl_from {
    ($variant:ident, $target:ty: $($t:ty),*) => {
        $(
            impl From<$t> for Slot {
                fn from(value: $t) -> Self {
                    Slot::$variant(<$target>::from(value))
                }
            }
        )*
    };
}

impl_from!(Int, i64: i8, i16, i32, i64);
impl_from!(UInt, u64: u8, u16, u32, u64);
impl_from!(Float, f64: f32, f64);

impl From<usize> for Slot {
    fn from(handle: usize) -> Self {
        Slot::Handle(handle)
    }
}
