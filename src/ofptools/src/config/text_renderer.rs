use std::io::Write;

use super::entry::{ArrayElement, ScalarValue};
use super::sink::{ConfigEvent, ConfigSink};

/// Renders a decoded config event stream as the indented, semicolon
/// terminated text `original_source/bin2cpp.c`'s `output()` produces.
pub struct TextRenderer<W: Write> {
    out: W,
    depth: usize,
    /// Set while rendering the elements of an array body, so a trailing
    /// comma can be suppressed after the last one.
    array_depth: usize,
}

impl<W: Write> TextRenderer<W> {
    pub fn new(out: W) -> Self {
        TextRenderer {
            out,
            depth: 0,
            array_depth: 0,
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn indent(&mut self) -> std::io::Result<()> {
        write!(self.out, "{:1$}", "", self.depth * 4)
    }

    fn render_array_element(&mut self, element: &ArrayElement) -> std::io::Result<()> {
        match element {
            ArrayElement::String(s) => write!(self.out, "\"{}\"", String::from_utf8_lossy(s)),
            ArrayElement::Float32(f) => write!(self.out, "{f}"),
            ArrayElement::Int32(i) => write!(self.out, "{i}"),
            ArrayElement::Array(elements) => {
                write!(self.out, "{{ ")?;
                for (i, e) in elements.iter().enumerate() {
                    if i > 0 {
                        write!(self.out, ", ")?;
                    }
                    self.render_array_element(e)?;
                }
                write!(self.out, " }}")
            }
        }
    }
}

impl<W: Write> ConfigSink for TextRenderer<W> {
    fn event(&mut self, event: ConfigEvent) {
        let result: std::io::Result<()> = (|| match event {
            ConfigEvent::EnterClass { name, parent } => {
                self.indent()?;
                if parent.is_empty() {
                    writeln!(
                        self.out,
                        "class {} {{",
                        String::from_utf8_lossy(&name)
                    )?;
                } else {
                    writeln!(
                        self.out,
                        "class {}: {} {{",
                        String::from_utf8_lossy(&name),
                        String::from_utf8_lossy(&parent)
                    )?;
                }
                self.depth += 1;
                Ok(())
            }
            ConfigEvent::LeaveClass => {
                self.depth = self.depth.saturating_sub(1);
                self.indent()?;
                writeln!(self.out, "}};")
            }
            ConfigEvent::Scalar { name, value } => {
                self.indent()?;
                match value {
                    ScalarValue::String(s) => writeln!(
                        self.out,
                        "{} = \"{}\";",
                        String::from_utf8_lossy(&name),
                        String::from_utf8_lossy(&s)
                    ),
                    ScalarValue::Float32(f) => {
                        writeln!(self.out, "{} = {};", String::from_utf8_lossy(&name), f)
                    }
                    ScalarValue::Int32(i) => {
                        writeln!(self.out, "{} = {};", String::from_utf8_lossy(&name), i)
                    }
                }
            }
            ConfigEvent::ArrayBegin { name } => {
                self.indent()?;
                write!(self.out, "{}[] = {{ ", String::from_utf8_lossy(&name))?;
                self.array_depth = 0;
                Ok(())
            }
            ConfigEvent::ArrayElement(element) => {
                if self.array_depth > 0 {
                    write!(self.out, ", ")?;
                }
                self.array_depth += 1;
                self.render_array_element(&element)
            }
            ConfigEvent::ArrayEnd => writeln!(self.out, " }};"),
            ConfigEvent::DefinesBegin | ConfigEvent::DefinesEnd => Ok(()),
            ConfigEvent::Define { name, value } => {
                self.indent()?;
                writeln!(self.out, "#define {}\t{}", String::from_utf8_lossy(&name), value)
            }
        })();
        if let Err(err) = result {
            log::error!("failed writing rendered config output: {err}");
        }
    }
}
