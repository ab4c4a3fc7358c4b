//! XML utilities for reading and writing Office Open XML parts.
//! Provides a reader wrapper, helper traits for attributes and text, and a
//! small writer facade used by the xlsx exporter.

use crate::error::ReducerError;
use quick_xml::escape::resolve_xml_entity;
use quick_xml::events::attributes::Attribute;
use quick_xml::events::BytesDecl;
use quick_xml::events::BytesEnd;
use quick_xml::events::BytesRef;
use quick_xml::events::BytesStart;
use quick_xml::events::BytesText;
use quick_xml::events::Event;
use quick_xml::Reader;
use quick_xml::Writer;
use std::borrow::Cow;
use std::io::BufRead;
use std::io::Write;
use std::str::FromStr;
use thiserror::Error;

/// Errors specific to XML parsing operations
#[derive(Error, Debug)]
pub enum XmlError {
    #[error("Parse entity '{0}' failed")]
    ParseEntityError(String),

    #[error("Parse attribute value '{0}' failed")]
    ParseAttributeValueError(String),
}

/// XML reader wrapper configured for spreadsheet parts
pub(crate) struct XmlReader<R: BufRead> {
    reader: Reader<R>,
    buffer: Vec<u8>,
}

impl<R: BufRead> XmlReader<R> {
    pub(crate) fn new(buf_reader: R) -> XmlReader<R> {
        let mut reader = Reader::from_reader(buf_reader);
        let config = reader.config_mut();
        config.check_comments = false;
        config.check_end_names = false;
        config.expand_empty_elements = true;
        config.trim_text(false);

        let buffer = Vec::with_capacity(1024);
        XmlReader { reader, buffer }
    }

    /// Reads the next XML event.
    /// Events are detached from the internal buffer so nested readers can
    /// be called from inside a match arm.
    pub(crate) fn next(&mut self) -> Result<Option<Event<'static>>, ReducerError> {
        self.buffer.clear();
        match self.reader.read_event_into(&mut self.buffer) {
            Ok(Event::Eof) => Ok(None),
            Ok(event) => Ok(Some(event.into_owned())),
            Err(error) => Err(ReducerError::XmlError(error)),
        }
    }
}

/// Helper trait for XML attributes providing value extraction
pub(crate) trait XmlAttributeHelper<'a> {
    /// Gets the unescaped attribute value as a string
    fn get_value(&self) -> Result<Cow<'a, str>, ReducerError>;
}

impl<'a> XmlAttributeHelper<'a> for Attribute<'a> {
    fn get_value(&self) -> Result<Cow<'a, str>, ReducerError> {
        Ok(self.unescape_value()?)
    }
}

/// Helper trait for XML nodes providing attribute access
pub(crate) trait XmlNodeHelper {
    /// Gets an attribute value by its qualified name
    fn get_attribute_value(&self, name: &str) -> Result<Option<Cow<'_, str>>, ReducerError>;

    /// Parses an attribute value to the specified type
    fn parse_attribute_value<T: FromStr>(&self, name: &str) -> Result<Option<T>, ReducerError>;
}

impl XmlNodeHelper for BytesStart<'_> {
    fn get_attribute_value(&self, name: &str) -> Result<Option<Cow<'_, str>>, ReducerError> {
        for result in self.attributes() {
            let attribute = result?;
            if attribute.key.as_ref() == name.as_bytes() {
                return Ok(Some(attribute.get_value()?));
            }
        }
        Ok(None)
    }

    fn parse_attribute_value<T: FromStr>(&self, name: &str) -> Result<Option<T>, ReducerError> {
        self.get_attribute_value(name)?
            .map(|value| {
                value
                    .trim()
                    .parse::<T>()
                    .map_err(|_| XmlError::ParseAttributeValueError(value.to_string()).into())
            })
            .transpose()
    }
}

/// Helper trait for building text content from XML events
pub(crate) trait XmlTextContextHelper {
    /// Appends text content from a BytesText event
    fn push_bytes_text(&mut self, text: &BytesText) -> Result<(), ReducerError>;

    /// Appends text content from a BytesRef event (entities and character references)
    fn push_bytes_ref(&mut self, bytes: &BytesRef) -> Result<(), ReducerError>;
}

impl XmlTextContextHelper for String {
    fn push_bytes_text(&mut self, text: &BytesText) -> Result<(), ReducerError> {
        self.push_str(&text.xml_content()?);
        Ok(())
    }

    fn push_bytes_ref(&mut self, bytes: &BytesRef) -> Result<(), ReducerError> {
        let raw = bytes.xml_content()?;
        if let Some(number) = raw.strip_prefix('#') {
            let code = if let Some(hex) = number.strip_prefix('x') {
                u32::from_str_radix(hex, 16)?
            } else {
                number.parse::<u32>()?
            };
            if let Some(character) = std::char::from_u32(code) {
                self.push(character);
            }
        } else if let Some(entity) = resolve_xml_entity(&raw) {
            self.push_str(entity);
        } else {
            Err(XmlError::ParseEntityError(raw.to_string()))?;
        }

        Ok(())
    }
}

/// Thin facade over `quick_xml::Writer` for emitting spreadsheet parts
pub(crate) trait XmlWriterHelper {
    /// Writes the standard `<?xml ...?>` declaration
    fn declaration(&mut self) -> Result<(), ReducerError>;

    /// Opens an element with the given attributes
    fn open(&mut self, name: &str, attributes: &[(&str, &str)]) -> Result<(), ReducerError>;

    /// Writes a self-closing element with the given attributes
    fn empty(&mut self, name: &str, attributes: &[(&str, &str)]) -> Result<(), ReducerError>;

    /// Closes an element
    fn close(&mut self, name: &str) -> Result<(), ReducerError>;

    /// Writes escaped text content
    fn text(&mut self, content: &str) -> Result<(), ReducerError>;
}

impl<W: Write> XmlWriterHelper for Writer<W> {
    fn declaration(&mut self) -> Result<(), ReducerError> {
        self.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))?;
        Ok(())
    }

    fn open(&mut self, name: &str, attributes: &[(&str, &str)]) -> Result<(), ReducerError> {
        let mut element = BytesStart::new(name);
        for attribute in attributes {
            element.push_attribute(*attribute);
        }
        self.write_event(Event::Start(element))?;
        Ok(())
    }

    fn empty(&mut self, name: &str, attributes: &[(&str, &str)]) -> Result<(), ReducerError> {
        let mut element = BytesStart::new(name);
        for attribute in attributes {
            element.push_attribute(*attribute);
        }
        self.write_event(Event::Empty(element))?;
        Ok(())
    }

    fn close(&mut self, name: &str) -> Result<(), ReducerError> {
        self.write_event(Event::End(BytesEnd::new(name)))?;
        Ok(())
    }

    fn text(&mut self, content: &str) -> Result<(), ReducerError> {
        self.write_event(Event::Text(BytesText::new(content)))?;
        Ok(())
    }
}

/// Loops over XML events, dispatching each to the given match arms.
/// Unmatched events are ignored.
macro_rules! match_xml_events {
    ($reader:expr => { $($arms:tt)* }) => {
        while let Some(result) = $reader.next()? {
            match result {
                Event::Eof => break,
                $($arms)*
                _ => (),
            }
        }
    };
}

pub(crate) use match_xml_events;
