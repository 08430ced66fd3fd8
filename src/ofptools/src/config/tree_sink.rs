use super::entry::{ArrayElement, ConfigEntry};
use super::sink::{ConfigEvent, ConfigSink};

/// Builds a [`ConfigEntry`] tree from a decoded event stream, the
/// alternative the emission contract allows to streaming straight to a
/// renderer (see `ConfigDecoder::decode`'s docs).
///
/// Grounded on the same explicit-stack shape `ConfigDecoder` itself uses
/// for nested classes and arrays, applied here to reassemble the tree the
/// decoder deliberately avoids materializing.
#[derive(Default)]
pub struct TreeSink {
    root: Option<ConfigEntry>,
    stack: Vec<Frame>,
}

enum Frame {
    Class {
        name: std::rc::Rc<[u8]>,
        parent: Vec<u8>,
        children: Vec<ConfigEntry>,
    },
    Array {
        name: std::rc::Rc<[u8]>,
        elements: Vec<ArrayElement>,
    },
    Defines {
        entries: Vec<(Vec<u8>, i32)>,
    },
}

impl TreeSink {
    pub fn new() -> Self {
        TreeSink::default()
    }

    /// Consumes the sink, returning the decoded root entry. `None` if no
    /// top-level entry was ever decoded.
    pub fn into_root(self) -> Option<ConfigEntry> {
        self.root
    }

    fn attach(&mut self, entry: ConfigEntry) {
        match self.stack.last_mut() {
            Some(Frame::Class { children, .. }) => children.push(entry),
            Some(Frame::Array { .. }) | Some(Frame::Defines { .. }) => {
                unreachable!("a finished Class/Defines can only nest inside a Class")
            }
            None => self.root = Some(entry),
        }
    }
}

impl ConfigSink for TreeSink {
    fn event(&mut self, event: ConfigEvent) {
        match event {
            ConfigEvent::EnterClass { name, parent } => {
                self.stack.push(Frame::Class {
                    name,
                    parent,
                    children: Vec::new(),
                });
            }
            ConfigEvent::LeaveClass => {
                let Some(Frame::Class { name, parent, children }) = self.stack.pop() else {
                    unreachable!("LeaveClass without a matching Class frame")
                };
                self.attach(ConfigEntry::Class { name, parent, children });
            }
            ConfigEvent::Scalar { name, value } => {
                self.attach(ConfigEntry::Scalar { name, value });
            }
            ConfigEvent::ArrayBegin { name } => {
                self.stack.push(Frame::Array {
                    name,
                    elements: Vec::new(),
                });
            }
            ConfigEvent::ArrayElement(element) => match self.stack.last_mut() {
                Some(Frame::Array { elements, .. }) => elements.push(element),
                _ => unreachable!("ArrayElement outside an Array frame"),
            },
            ConfigEvent::ArrayEnd => {
                let Some(Frame::Array { name, elements }) = self.stack.pop() else {
                    unreachable!("ArrayEnd without a matching Array frame")
                };
                self.attach(ConfigEntry::Array { name, elements });
            }
            ConfigEvent::DefinesBegin => {
                self.stack.push(Frame::Defines { entries: Vec::new() });
            }
            ConfigEvent::Define { name, value } => match self.stack.last_mut() {
                Some(Frame::Defines { entries }) => entries.push((name, value)),
                _ => unreachable!("Define outside a Defines frame"),
            },
            ConfigEvent::DefinesEnd => {
                let Some(Frame::Defines { entries }) = self.stack.pop() else {
                    unreachable!("DefinesEnd without a matching Defines frame")
                };
                self.attach(ConfigEntry::Defines { entries });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::entry::ScalarValue;

    #[test]
    fn builds_a_class_with_a_scalar_child() {
        let mut sink = TreeSink::new();
        sink.event(ConfigEvent::EnterClass {
            name: b"A".as_slice().into(),
            parent: vec![],
        });
        sink.event(ConfigEvent::Scalar {
            name: b"x".as_slice().into(),
            value: ScalarValue::Int32(42),
        });
        sink.event(ConfigEvent::LeaveClass);

        assert_eq!(
            sink.into_root(),
            Some(ConfigEntry::Class {
                name: b"A".as_slice().into(),
                parent: vec![],
                children: vec![ConfigEntry::Scalar {
                    name: b"x".as_slice().into(),
                    value: ScalarValue::Int32(42),
                }],
            })
        );
    }

    #[test]
    fn builds_a_top_level_defines_block() {
        let mut sink = TreeSink::new();
        sink.event(ConfigEvent::DefinesBegin);
        sink.event(ConfigEvent::Define {
            name: b"MAX_HP".to_vec(),
            value: 100,
        });
        sink.event(ConfigEvent::DefinesEnd);

        assert_eq!(
            sink.into_root(),
            Some(ConfigEntry::Defines {
                entries: vec![(b"MAX_HP".to_vec(), 100)],
            })
        );
    }
}
