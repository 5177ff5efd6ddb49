//! XML codec implementation.

use std::any::type_name;

use quick_xml::se::{QuoteLevel, Serializer};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::codec::Codec;
use crate::error::CodecError;
use crate::kind::ContentKind;

pub const DEFAULT_XML_HEADER: &str = r#"<?xml version="1.0" encoding="UTF-8"?>"#;

/// Registers the root element name used when a given type is the top-level
/// body.
///
/// Without a companion, a struct is written under an element named after the
/// struct itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlCompanion {
    type_name: &'static str,
    root: String,
}

impl XmlCompanion {
    pub fn of<T: ?Sized>(root: impl Into<String>) -> Self {
        Self {
            type_name: type_name::<T>(),
            root: root.into(),
        }
    }

    pub fn type_name(&self) -> &str {
        self.type_name
    }

    pub fn root(&self) -> &str {
        &self.root
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlOptions {
    /// Prolog written in front of every encoded body.
    pub header: Option<String>,
    /// Escape only `<` and `&` in text and attribute values.
    pub disable_escaping: bool,
    pub companions: Vec<XmlCompanion>,
}

impl Default for XmlOptions {
    fn default() -> Self {
        Self {
            header: Some(DEFAULT_XML_HEADER.to_string()),
            disable_escaping: true,
            companions: Vec::new(),
        }
    }
}

/// A codec that handles XML encoding/decoding through `quick-xml`'s serde
/// support.
#[derive(Debug, Clone, Default)]
pub struct XmlCodec {
    options: XmlOptions,
    kind: Option<ContentKind>,
}

impl XmlCodec {
    pub fn new(options: XmlOptions) -> Self {
        Self {
            options,
            kind: None,
        }
    }

    /// Report `kind` instead of `application/xml`, e.g. for SOAP.
    pub fn with_kind(mut self, kind: ContentKind) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn options(&self) -> &XmlOptions {
        &self.options
    }

    /// The root element registered for `T`, if any.
    pub fn root_for<T: ?Sized>(&self) -> Option<&str> {
        let name = type_name::<T>();
        self.options
            .companions
            .iter()
            .find(|companion| companion.type_name == name)
            .map(XmlCompanion::root)
    }
}

impl Codec for XmlCodec {
    fn kind(&self) -> ContentKind {
        self.kind.clone().unwrap_or(ContentKind::XML)
    }

    fn encode<T: Serialize + ?Sized>(&self, value: &T) -> Result<String, CodecError> {
        let mut fragment = String::new();
        let mut serializer =
            Serializer::with_root(&mut fragment, self.root_for::<T>()).map_err(CodecError::xml)?;
        if self.options.disable_escaping {
            serializer.set_quote_level(QuoteLevel::Minimal);
        }
        value.serialize(serializer).map_err(CodecError::xml)?;

        match self.options.header.as_deref() {
            Some(header) if !header.is_empty() => Ok(format!("{header}{fragment}")),
            _ => Ok(fragment),
        }
    }

    fn decode<T: DeserializeOwned + 'static>(&self, body: &str) -> Result<T, CodecError> {
        quick_xml::de::from_str(body).map_err(CodecError::xml)
    }
}
