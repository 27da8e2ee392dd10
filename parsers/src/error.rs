use quick_xml::{escape::EscapeError, events::attributes::AttrError};
use thiserror::Error;

use crate::jid::JidError;

/// Failure to turn a single framed element into a typed record
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("malformed xml: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("invalid escape sequence: {0}")]
    Escape(#[from] EscapeError),

    #[error("malformed attribute: {0}")]
    Attribute(#[from] AttrError),

    #[error("invalid address: {0}")]
    Jid(#[from] JidError),

    #[error("expected a start tag")]
    NotAnElement,

    #[error("expected <{expected}>, found <{found}>")]
    UnexpectedTag {
        expected: &'static str,
        found: String,
    },

    #[error("missing `{0}` attribute")]
    MissingAttribute(&'static str),

    #[error("invalid `{name}` attribute: {value:?}")]
    InvalidAttribute { name: &'static str, value: String },

    #[error("element ended unexpectedly")]
    UnexpectedEof,
}
