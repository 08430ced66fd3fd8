use std::rc::Rc;

/// A decoded config tree node.
///
/// Mirrors the teacher's `Row` enum (a tagged variant wrapping one payload
/// per table kind), here wrapping one payload per entry tag instead.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigEntry {
    Class {
        name: Rc<[u8]>,
        parent: Vec<u8>,
        children: Vec<ConfigEntry>,
    },
    Scalar {
        name: Rc<[u8]>,
        value: ScalarValue,
    },
    Array {
        name: Rc<[u8]>,
        elements: Vec<ArrayElement>,
    },
    Defines {
        entries: Vec<(Vec<u8>, i32)>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum ScalarValue {
    String(Rc<[u8]>),
    Float32(f32),
    Int32(i32),
}

#[derive(Debug, Clone, PartialEq)]
pub enum ArrayElement {
    String(Rc<[u8]>),
    Float32(f32),
    Int32(i32),
    Array(Vec<ArrayElement>),
}
