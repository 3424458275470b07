//! `Reflect` implementations for primitive, text, collection and pointer types.

use std::collections::VecDeque;
use std::sync::Arc;

use super::{Reflect, Sequence, Shape, ValueRef};

macro_rules! impl_reflect_scalar {
    ($shape:ident, $variant:ident as $wide:ty: $($ty:ty),*) => {
        $(
            impl Reflect for $ty {
                fn shape() -> Shape {
                    Shape::$shape
                }

                fn reflect(&self) -> ValueRef<'_> {
                    ValueRef::$variant(*self as $wide)
                }
            }
        )*
    };
}

impl_reflect_scalar!(Int, Int as i64: i8, i16, i32, i64, isize);
impl_reflect_scalar!(Uint, Uint as u64: u16, u32, u64, usize);
impl_reflect_scalar!(Byte, Uint as u64: u8);
impl_reflect_scalar!(Float, Float as f64: f32, f64);

impl Reflect for bool {
    fn shape() -> Shape {
        Shape::Bool
    }

    fn reflect(&self) -> ValueRef<'_> {
        ValueRef::Bool(*self)
    }
}

impl Reflect for char {
    fn shape() -> Shape {
        Shape::String
    }

    fn reflect(&self) -> ValueRef<'_> {
        ValueRef::Char(*self)
    }
}

impl Reflect for String {
    fn shape() -> Shape {
        Shape::String
    }

    fn reflect(&self) -> ValueRef<'_> {
        ValueRef::Str(self)
    }
}

impl Reflect for &str {
    fn shape() -> Shape {
        Shape::String
    }

    fn reflect(&self) -> ValueRef<'_> {
        ValueRef::Str(self)
    }
}

// ============================================================================
// Sequences
// ============================================================================

impl<T: Reflect> Sequence for Vec<T> {
    fn len(&self) -> usize {
        Vec::len(self)
    }

    fn get(&self, index: usize) -> Option<&dyn Reflect> {
        self.as_slice().get(index).map(|v| v as &dyn Reflect)
    }

    fn element_shape(&self) -> Shape {
        T::shape()
    }
}

impl<T: Reflect> Reflect for Vec<T> {
    fn shape() -> Shape {
        Shape::Sequence(T::shape)
    }

    fn reflect(&self) -> ValueRef<'_> {
        ValueRef::Seq(self)
    }
}

impl<T: Reflect> Sequence for VecDeque<T> {
    fn len(&self) -> usize {
        VecDeque::len(self)
    }

    fn get(&self, index: usize) -> Option<&dyn Reflect> {
        VecDeque::get(self, index).map(|v| v as &dyn Reflect)
    }

    fn element_shape(&self) -> Shape {
        T::shape()
    }
}

impl<T: Reflect> Reflect for VecDeque<T> {
    fn shape() -> Shape {
        Shape::Sequence(T::shape)
    }

    fn reflect(&self) -> ValueRef<'_> {
        ValueRef::Seq(self)
    }
}

impl<T: Reflect, const N: usize> Sequence for [T; N] {
    fn len(&self) -> usize {
        N
    }

    fn get(&self, index: usize) -> Option<&dyn Reflect> {
        self.as_slice().get(index).map(|v| v as &dyn Reflect)
    }

    fn element_shape(&self) -> Shape {
        T::shape()
    }
}

impl<T: Reflect, const N: usize> Reflect for [T; N] {
    fn shape() -> Shape {
        Shape::Sequence(T::shape)
    }

    fn reflect(&self) -> ValueRef<'_> {
        ValueRef::Seq(self)
    }
}

// ============================================================================
// Indirections
// ============================================================================

impl<T: Reflect> Reflect for Option<T> {
    fn shape() -> Shape {
        Shape::Indirect(T::shape)
    }

    fn reflect(&self) -> ValueRef<'_> {
        ValueRef::Indirect(self.as_ref().map(|v| v as &dyn Reflect))
    }
}

impl<T: Reflect> Reflect for Box<T> {
    fn shape() -> Shape {
        Shape::Indirect(T::shape)
    }

    fn reflect(&self) -> ValueRef<'_> {
        ValueRef::Indirect(Some(&**self))
    }
}

impl<T: Reflect> Reflect for Arc<T> {
    fn shape() -> Shape {
        Shape::Indirect(T::shape)
    }

    fn reflect(&self) -> ValueRef<'_> {
        ValueRef::Indirect(Some(&**self))
    }
}

impl<T: Reflect> Reflect for &T {
    fn shape() -> Shape {
        Shape::Indirect(T::shape)
    }

    fn reflect(&self) -> ValueRef<'_> {
        ValueRef::Indirect(Some(*self))
    }
}

impl Reflect for Box<dyn Reflect> {
    fn shape() -> Shape {
        Shape::Opaque
    }

    fn reflect(&self) -> ValueRef<'_> {
        ValueRef::Indirect(Some(&**self))
    }
}

impl Reflect for Arc<dyn Reflect> {
    fn shape() -> Shape {
        Shape::Opaque
    }

    fn reflect(&self) -> ValueRef<'_> {
        ValueRef::Indirect(Some(&**self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integer_widths_widen() {
        assert!(matches!((-5i8).reflect(), ValueRef::Int(-5)));
        assert!(matches!(u64::MAX.reflect(), ValueRef::Uint(u64::MAX)));
        assert!(matches!(7u8.reflect(), ValueRef::Uint(7)));
        assert!(matches!(<u8 as Reflect>::shape(), Shape::Byte));
        assert!(matches!(<u16 as Reflect>::shape(), Shape::Uint));
    }

    #[test]
    fn test_text_kinds() {
        let owned = String::from("hello");
        assert!(matches!(owned.reflect(), ValueRef::Str("hello")));
        assert!(matches!("x".reflect(), ValueRef::Str("x")));
        assert!(matches!('λ'.reflect(), ValueRef::Char('λ')));
        assert!(matches!(<char as Reflect>::shape(), Shape::String));
    }

    #[test]
    fn test_sequence_access() {
        let values = vec![10i32, 20, 30];
        let ValueRef::Seq(seq) = values.reflect() else {
            panic!("expected sequence");
        };
        assert_eq!(seq.len(), 3);
        assert!(matches!(seq.get(1).map(|v| v.reflect()), Some(ValueRef::Int(20))));
        assert!(seq.get(3).is_none());
        assert!(!seq.is_bytes());
    }

    #[test]
    fn test_byte_sequences() {
        let bytes = vec![1u8, 2, 255];
        let ValueRef::Seq(seq) = bytes.reflect() else {
            panic!("expected sequence");
        };
        assert!(seq.is_bytes());
        assert_eq!(seq.to_bytes(), Some(vec![1, 2, 255]));

        let array = [9u8, 8];
        let ValueRef::Seq(seq) = array.reflect() else {
            panic!("expected sequence");
        };
        assert_eq!(seq.to_bytes(), Some(vec![9, 8]));

        let deque: VecDeque<u8> = VecDeque::from(vec![4, 5]);
        let ValueRef::Seq(seq) = deque.reflect() else {
            panic!("expected sequence");
        };
        assert_eq!(seq.to_bytes(), Some(vec![4, 5]));
    }

    #[test]
    fn test_optional_bytes_are_not_a_byte_buffer() {
        let values: Vec<Option<u8>> = vec![Some(1), None];
        let ValueRef::Seq(seq) = values.reflect() else {
            panic!("expected sequence");
        };
        assert!(!seq.is_bytes());
        assert_eq!(seq.to_bytes(), None);
    }

    #[test]
    fn test_indirections() {
        let none: Option<i32> = None;
        assert!(matches!(none.reflect(), ValueRef::Indirect(None)));

        let boxed: Box<dyn Reflect> = Box::new(3.5f64);
        assert!(matches!(<Box<dyn Reflect> as Reflect>::shape(), Shape::Opaque));
        let ValueRef::Indirect(Some(inner)) = boxed.reflect() else {
            panic!("expected indirection");
        };
        assert!(matches!(inner.reflect(), ValueRef::Float(f) if f == 3.5));

        let shared = Arc::new(true);
        assert!(matches!(<Arc<bool> as Reflect>::shape(), Shape::Indirect(_)));
        assert!(matches!(shared.reflect(), ValueRef::Indirect(Some(_))));
    }
}
