//! Property test: every encoding shape the grammar can build survives a
//! decode/re-encode round trip byte for byte.

use proptest::prelude::*;
use sable_ir::{Encoding, StringInterner};
use sable_resolve::{encode_type, Builder, Decoder};

/// Type shapes in the canonical byte order the parser emits: cv marks
/// outermost, then pointer/reference marks, then the base; functions
/// carry their return type first.
#[derive(Clone, Debug)]
enum Shape {
    Simple {
        is_const: bool,
        is_volatile: bool,
        /// Pointer chain, innermost first; `true` is a reference.
        ptrs: Vec<bool>,
        base: u8,
    },
    Func {
        ret: Box<Shape>,
        args: Vec<Shape>,
    },
    Template {
        args: Vec<Shape>,
    },
}

fn build(shape: &Shape, enc: &mut Encoding) {
    match shape {
        Shape::Simple {
            is_const,
            is_volatile,
            ptrs,
            base,
        } => {
            let mut inner = Encoding::new();
            inner.append_byte(*base);
            for &is_ref in ptrs {
                inner.ptr_operator(if is_ref { b'&' } else { b'*' });
            }
            inner.cv_qualify(*is_const, *is_volatile);
            enc.append(&inner);
        }
        Shape::Func { ret, args } => {
            let mut ret_enc = Encoding::new();
            build(ret, &mut ret_enc);
            enc.start_function(&ret_enc);
            for arg in args {
                build(arg, enc);
            }
            enc.end_function();
        }
        Shape::Template { args } => {
            let mut args_enc = Encoding::new();
            for arg in args {
                build(arg, &mut args_enc);
            }
            enc.template_args("box", &args_enc);
        }
    }
}

fn shape_strategy() -> impl Strategy<Value = Shape> {
    let simple = (
        any::<bool>(),
        any::<bool>(),
        prop::collection::vec(any::<bool>(), 0..3),
        prop::sample::select(vec![b'i', b'c', b'd', b'b', b'l', b'f', b'v', b's']),
    )
        .prop_map(|(is_const, is_volatile, ptrs, base)| Shape::Simple {
            is_const,
            is_volatile,
            ptrs,
            base,
        });
    // Sizes stay comfortably under the one-byte length prefix of
    // template argument groups.
    simple.prop_recursive(2, 8, 2, |inner| {
        prop_oneof![
            (inner.clone(), prop::collection::vec(inner.clone(), 0..2))
                .prop_map(|(ret, args)| Shape::Func {
                    ret: Box::new(ret),
                    args,
                }),
            prop::collection::vec(inner, 1..2).prop_map(|args| Shape::Template { args }),
        ]
    })
}

proptest! {
    #[test]
    fn round_trip_is_identity(shape in shape_strategy()) {
        let interner = StringInterner::new();
        let mut builder = Builder::new(&interner, interner.intern("prop.cc"));

        let mut original = Encoding::new();
        build(&shape, &mut original);

        let ty = {
            let mut decoder = Decoder::new(&original, 1, &mut builder);
            decoder.decode_type().expect("canonical shapes decode")
        };
        let mut reencoded = Encoding::new();
        encode_type(builder.types(), &interner, ty, &mut reencoded);
        prop_assert_eq!(reencoded.bytes(), original.bytes());
    }
}
