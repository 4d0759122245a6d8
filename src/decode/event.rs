//! Tokenizer-facing event interface.

/// One element attribute, name as written and value unescaped
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    pub value: String,
}

impl Attribute {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self { name: name.into(), value: value.into() }
    }
}

/// A parse event delivered to an [`EventSink`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum XmlEvent<'a> {
    Start { name: &'a str, attributes: &'a [Attribute] },
    End { name: &'a str },
    Text(&'a str),
}

/// Receiver of a sequential element-open/element-close/character-data stream.
///
/// Calls for one document arrive strictly in order and each runs to completion
/// before the next; implementors own all per-document state.
pub trait EventSink {
    fn start_element(&mut self, name: &str, attributes: &[Attribute]);

    fn end_element(&mut self, name: &str);

    fn characters(&mut self, text: &str);

    fn handle(&mut self, event: XmlEvent<'_>) {
        match event {
            XmlEvent::Start { name, attributes } => self.start_element(name, attributes),
            XmlEvent::End { name } => self.end_element(name),
            XmlEvent::Text(text) => self.characters(text),
        }
    }
}
