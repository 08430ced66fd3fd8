mod decoder;
mod entry;
mod sink;
mod text_renderer;
mod tree_sink;

pub use decoder::{ConfigDecoder, HEADER_SIZE};
pub use entry::{ArrayElement, ConfigEntry, ScalarValue};
pub use sink::{ConfigEvent, ConfigSink, RecordingSink};
pub use text_renderer::TextRenderer;
pub use tree_sink::TreeSink;
