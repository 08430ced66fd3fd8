use std::rc::Rc;

use super::entry::ScalarValue;

/// Structured events emitted by [`super::decoder::ConfigDecoder`] as it
/// walks the entry grammar.
///
/// No teacher analogue: `PeParser` hands back a fully materialized
/// `PeImage` rather than streaming events. This shape comes directly from
/// the driver-glue contract the config format's sink needs.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigEvent {
    EnterClass { name: Rc<[u8]>, parent: Vec<u8> },
    LeaveClass,
    Scalar { name: Rc<[u8]>, value: ScalarValue },
    ArrayBegin { name: Rc<[u8]> },
    ArrayEnd,
    ArrayElement(super::entry::ArrayElement),
    DefinesBegin,
    Define { name: Vec<u8>, value: i32 },
    DefinesEnd,
}

/// External collaborator consuming a decoded config event stream.
pub trait ConfigSink {
    fn event(&mut self, event: ConfigEvent);
}

/// A sink that simply records every event, useful for tests.
#[derive(Default)]
pub struct RecordingSink {
    pub events: Vec<ConfigEvent>,
}

impl ConfigSink for RecordingSink {
    fn event(&mut self, event: ConfigEvent) {
        self.events.push(event);
    }
}
