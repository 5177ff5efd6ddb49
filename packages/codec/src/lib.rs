//! # courier-codec
//!
//! Body encoding for the courier HTTP API client.
//!
//! A [`ContentKind`] names the media type of a body. A [`Codec`] turns a
//! serde value into body text for one kind and back:
//!
//! - [`JsonCodec`] honours a null-serialization policy and a date format,
//!   and refuses to decode non-object bodies into [`JsonObject`];
//! - [`XmlCodec`] writes an XML prolog, resolves root element names through
//!   [`XmlCompanion`] registrations and can relax escaping;
//! - [`TextCodec`] is the plain-text fallback for every other kind.
//!
//! Form bodies are not serde values but ordered name/value pairs, see
//! [`form`].
//!
//! ```rust
//! use courier_codec::{Codec, ContentKind, XmlCodec, XmlOptions};
//! use serde::Serialize;
//!
//! #[derive(Serialize)]
//! struct Ping {
//!     seq: u32,
//! }
//!
//! let codec = XmlCodec::new(XmlOptions { header: None, ..Default::default() });
//! assert_eq!(codec.kind(), ContentKind::XML);
//! assert_eq!(codec.encode(&Ping { seq: 1 }).unwrap(), "<Ping><seq>1</seq></Ping>");
//! ```

pub mod codec;
pub mod date;
pub mod error;
pub mod form;
pub mod json;
pub mod kind;
pub mod xml;

pub use codec::{Codec, TextCodec};
pub use date::DEFAULT_DATE_FORMAT;
pub use error::CodecError;
pub use json::{JsonCodec, JsonObject, JsonOptions};
pub use kind::ContentKind;
pub use xml::{XmlCodec, XmlCompanion, XmlOptions, DEFAULT_XML_HEADER};
