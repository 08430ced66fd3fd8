use std::io::{Read, Seek};

use crate::byte_reader::ByteReader;
use crate::error::{OfpError, Result};
use crate::string_pool::StringPool;
use crate::varint::read_varint;

use super::entry::{ArrayElement, ScalarValue};
use super::sink::{ConfigEvent, ConfigSink};

/// Byte offset of the first entry tag; the bytes before it are an opaque
/// header this decoder does not interpret.
pub const HEADER_SIZE: u64 = 7;

/// Work item for the class-recursion stack driving [`ConfigDecoder::decode`].
///
/// Grounded on `original_source/bin2cpp.c`'s `read_entry`, which recurses
/// natively into its own children; here the same grammar is walked with an
/// explicit stack (per the design note on pathological nesting depth) so
/// neither a deeply nested class hierarchy nor a deeply nested array can
/// exhaust the native call stack.
enum Frame {
    /// `remaining` more sibling entries to decode at `depth` before this
    /// class's children are exhausted.
    Children { remaining: u32, depth: u32 },
    LeaveClass,
}

/// Recursive-descent decoder for the binarized config tree.
pub struct ConfigDecoder {
    pool: StringPool,
}

impl ConfigDecoder {
    pub fn new() -> Self {
        ConfigDecoder {
            pool: StringPool::new(),
        }
    }

    /// Decodes a full config stream, skipping the opaque 7-byte header and
    /// emitting one top-level entry (ordinarily a root `Class`).
    pub fn decode<R: Read + Seek>(
        &mut self,
        reader: &mut ByteReader<R>,
        sink: &mut dyn ConfigSink,
    ) -> Result<()> {
        reader.seek(HEADER_SIZE)?;
        let tag = reader.read_u8()?;
        let mut stack = Vec::new();
        self.dispatch_entry(tag, reader, sink, 0, &mut stack)?;

        while let Some(frame) = stack.pop() {
            match frame {
                Frame::LeaveClass => sink.event(ConfigEvent::LeaveClass),
                Frame::Children { remaining, depth } => {
                    if remaining > 0 {
                        stack.push(Frame::Children {
                            remaining: remaining - 1,
                            depth,
                        });
                        let tag = reader.read_u8()?;
                        self.dispatch_entry(tag, reader, sink, depth, &mut stack)?;
                    }
                }
            }
        }
        Ok(())
    }

    fn dispatch_entry<R: Read + Seek>(
        &mut self,
        tag: u8,
        reader: &mut ByteReader<R>,
        sink: &mut dyn ConfigSink,
        depth: u32,
        stack: &mut Vec<Frame>,
    ) -> Result<()> {
        match tag {
            0x00 => {
                let name = self.pool.read_indexed(reader)?;
                let parent = self.pool.read_inline(reader)?;
                let children = read_varint(reader)?;
                log::trace!("class {:?}: {} children at depth {depth}", name, children);
                sink.event(ConfigEvent::EnterClass { name, parent });
                stack.push(Frame::LeaveClass);
                stack.push(Frame::Children {
                    remaining: children,
                    depth: depth + 1,
                });
                Ok(())
            }
            0x01 => {
                let kind = reader.read_u8()?;
                let name = self.pool.read_indexed(reader)?;
                let value = match kind {
                    0x00 => ScalarValue::String(self.pool.read_indexed(reader)?),
                    0x01 => ScalarValue::Float32(reader.read_f32()?),
                    0x02 => ScalarValue::Int32(reader.read_i32()?),
                    other => return Err(OfpError::UnknownScalarKind { kind: other }),
                };
                sink.event(ConfigEvent::Scalar { name, value });
                Ok(())
            }
            0x02 => {
                let name = self.pool.read_indexed(reader)?;
                sink.event(ConfigEvent::ArrayBegin { name });
                self.decode_array_body(reader, sink)?;
                sink.event(ConfigEvent::ArrayEnd);
                Ok(())
            }
            0x63 => {
                if depth != 0 {
                    log::warn!("Defines block decoded at depth {depth}, expected only at top level");
                }
                self.decode_defines(reader, sink)
            }
            other => Err(OfpError::UnknownEntryTag { tag: other }),
        }
    }

    /// Reads a `Defines` section: 3 reserved bytes, then `(name, i32)`
    /// pairs until a clean EOF (there is no explicit count or sentinel).
    fn decode_defines<R: Read + Seek>(
        &mut self,
        reader: &mut ByteReader<R>,
        sink: &mut dyn ConfigSink,
    ) -> Result<()> {
        let mut reserved = [0u8; 3];
        reader.read_exact(&mut reserved)?;
        sink.event(ConfigEvent::DefinesBegin);
        loop {
            let Some(first) = reader.read_u8_opt()? else {
                break;
            };
            let mut name = vec![first];
            loop {
                let byte = reader.read_u8()?;
                if byte == 0 {
                    break;
                }
                name.push(byte);
            }
            let value = reader.read_i32()?;
            sink.event(ConfigEvent::Define { name, value });
        }
        sink.event(ConfigEvent::DefinesEnd);
        Ok(())
    }

    /// Reads an array body (a leading element count followed by that many
    /// tagged elements) with an explicit stack so nested arrays cannot
    /// recurse natively. Elements are buffered per nesting level and
    /// flushed to the sink, in stream order, once their enclosing level is
    /// fully read.
    fn decode_array_body<R: Read + Seek>(
        &mut self,
        reader: &mut ByteReader<R>,
        sink: &mut dyn ConfigSink,
    ) -> Result<()> {
        struct ArrayFrame {
            remaining: u32,
            collected: Vec<ArrayElement>,
        }

        let count = read_varint(reader)?;
        let mut stack = vec![ArrayFrame {
            remaining: count,
            collected: Vec::with_capacity(count as usize),
        }];

        loop {
            let frame = stack.last_mut().expect("array stack never empties mid-loop");
            if frame.remaining == 0 {
                let finished = stack.pop().unwrap();
                match stack.last_mut() {
                    Some(parent) => parent.collected.push(ArrayElement::Array(finished.collected)),
                    None => {
                        for element in finished.collected {
                            sink.event(ConfigEvent::ArrayElement(element));
                        }
                        return Ok(());
                    }
                }
                continue;
            }

            frame.remaining -= 1;
            let kind = reader.read_u8()?;
            let element = match kind {
                0x00 => Some(ArrayElement::String(self.pool.read_indexed(reader)?)),
                0x01 => Some(ArrayElement::Float32(reader.read_f32()?)),
                0x02 => Some(ArrayElement::Int32(reader.read_i32()?)),
                0x03 => {
                    let inner_count = read_varint(reader)?;
                    stack.push(ArrayFrame {
                        remaining: inner_count,
                        collected: Vec::with_capacity(inner_count as usize),
                    });
                    None
                }
                other => return Err(OfpError::UnknownArrayKind { kind: other }),
            };
            if let Some(element) = element {
                stack.last_mut().unwrap().collected.push(element);
            }
        }
    }
}

impl Default for ConfigDecoder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::sink::RecordingSink;
    use std::io::Cursor;

    fn decode(bytes: &[u8]) -> Vec<ConfigEvent> {
        let mut full = vec![0u8; HEADER_SIZE as usize];
        full.extend_from_slice(bytes);
        let mut reader = ByteReader::new(Cursor::new(full));
        let mut decoder = ConfigDecoder::new();
        let mut sink = RecordingSink::default();
        decoder.decode(&mut reader, &mut sink).unwrap();
        sink.events
    }

    #[test]
    fn minimal_class_with_no_children() {
        // tag Class, name id 0 + "A\0", empty parent, 0 children
        let events = decode(&[0x00, 0x00, b'A', 0x00, 0x00, 0x00]);
        assert_eq!(
            events,
            vec![
                ConfigEvent::EnterClass {
                    name: b"A".as_slice().into(),
                    parent: vec![]
                },
                ConfigEvent::LeaveClass,
            ]
        );
    }

    #[test]
    fn class_with_scalar_int_child() {
        let mut body = vec![0x00, 0x00, b'A', 0x00, 0x00, 0x01]; // class A, 1 child
        body.extend_from_slice(&[0x01, 0x02, 0x01, b'x', 0x00]); // scalar kind=int, name id1 "x"
        body.extend_from_slice(&42i32.to_le_bytes());
        let events = decode(&body);
        assert_eq!(
            events,
            vec![
                ConfigEvent::EnterClass {
                    name: b"A".as_slice().into(),
                    parent: vec![]
                },
                ConfigEvent::Scalar {
                    name: b"x".as_slice().into(),
                    value: ScalarValue::Int32(42)
                },
                ConfigEvent::LeaveClass,
            ]
        );
    }

    #[test]
    fn mixed_array_of_int_and_float() {
        let mut body = vec![0x00, 0x00, b'A', 0x00, 0x00, 0x01];
        body.push(0x02); // array tag
        body.extend_from_slice(&[0x01, b'a', 0x00]); // name id1 "a"
        body.push(0x02); // 2 elements
        body.push(0x02); // int element
        body.extend_from_slice(&1i32.to_le_bytes());
        body.push(0x01); // float element
        body.extend_from_slice(&1.5f32.to_le_bytes());
        let events = decode(&body);
        assert_eq!(
            events,
            vec![
                ConfigEvent::EnterClass {
                    name: b"A".as_slice().into(),
                    parent: vec![]
                },
                ConfigEvent::ArrayBegin {
                    name: b"a".as_slice().into()
                },
                ConfigEvent::ArrayElement(ArrayElement::Int32(1)),
                ConfigEvent::ArrayElement(ArrayElement::Float32(1.5)),
                ConfigEvent::ArrayEnd,
                ConfigEvent::LeaveClass,
            ]
        );
    }

    #[test]
    fn nested_array_as_sole_element() {
        let mut body = vec![0x00, 0x00, b'A', 0x00, 0x00, 0x01];
        body.push(0x02);
        body.extend_from_slice(&[0x01, b'a', 0x00]);
        body.push(0x01); // 1 outer element
        body.push(0x03); // nested array
        body.push(0x01); // 1 inner element
        body.push(0x02); // int
        body.extend_from_slice(&7i32.to_le_bytes());
        let events = decode(&body);
        assert_eq!(
            events[2],
            ConfigEvent::ArrayElement(ArrayElement::Array(vec![ArrayElement::Int32(7)]))
        );
    }

    #[test]
    fn unknown_entry_tag_is_an_error() {
        let mut full = vec![0u8; HEADER_SIZE as usize];
        full.push(0xAA);
        let mut reader = ByteReader::new(Cursor::new(full));
        let mut decoder = ConfigDecoder::new();
        let mut sink = RecordingSink::default();
        assert!(matches!(
            decoder.decode(&mut reader, &mut sink),
            Err(OfpError::UnknownEntryTag { tag: 0xAA })
        ));
    }
}
