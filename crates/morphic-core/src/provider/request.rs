//! Typed requests
//!
//! Copyright (c) 2025 Morphic Team
//! Licensed under the Apache-2.0 license

use crate::codegen::Signature;
use crate::types::TypeRef;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Discriminant of [`Request`], used by kind checkers and static providers
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestKind {
    Parser,
    Serializer,
    ParserField,
    SerializerField,
    NameMapping,
    Conversion,
}

impl fmt::Display for RequestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RequestKind::Parser => "parser",
            RequestKind::Serializer => "serializer",
            RequestKind::ParserField => "parser_field",
            RequestKind::SerializerField => "serializer_field",
            RequestKind::NameMapping => "name_mapping",
            RequestKind::Conversion => "conversion",
        };
        f.write_str(name)
    }
}

/// Request about a whole type
#[derive(Debug, Clone, PartialEq)]
pub struct TypeRequest {
    pub subject: TypeRef,
}

/// Request about a single field; `subject` is the field's type
#[derive(Debug, Clone, PartialEq)]
pub struct FieldRequest {
    pub subject: TypeRef,
    pub field_name: String,
}

/// Request for a converter from `source` to `target` with a given signature
#[derive(Debug, Clone, PartialEq)]
pub struct ConversionRequest {
    pub source: TypeRef,
    pub target: TypeRef,
    pub signature: Signature,
}

/// An immutable query for a capability
#[derive(Debug, Clone, PartialEq)]
pub enum Request {
    Parser(TypeRequest),
    Serializer(TypeRequest),
    ParserField(FieldRequest),
    SerializerField(FieldRequest),
    NameMapping(FieldRequest),
    Conversion(ConversionRequest),
}

impl Request {
    pub fn parser(subject: TypeRef) -> Self {
        Request::Parser(TypeRequest { subject })
    }

    pub fn serializer(subject: TypeRef) -> Self {
        Request::Serializer(TypeRequest { subject })
    }

    pub fn parser_field(subject: TypeRef, field_name: impl Into<String>) -> Self {
        Request::ParserField(FieldRequest {
            subject,
            field_name: field_name.into(),
        })
    }

    pub fn serializer_field(subject: TypeRef, field_name: impl Into<String>) -> Self {
        Request::SerializerField(FieldRequest {
            subject,
            field_name: field_name.into(),
        })
    }

    pub fn name_mapping(subject: TypeRef, field_name: impl Into<String>) -> Self {
        Request::NameMapping(FieldRequest {
            subject,
            field_name: field_name.into(),
        })
    }

    pub fn conversion(source: TypeRef, target: TypeRef, signature: Signature) -> Self {
        Request::Conversion(ConversionRequest {
            source,
            target,
            signature,
        })
    }

    pub fn kind(&self) -> RequestKind {
        match self {
            Request::Parser(_) => RequestKind::Parser,
            Request::Serializer(_) => RequestKind::Serializer,
            Request::ParserField(_) => RequestKind::ParserField,
            Request::SerializerField(_) => RequestKind::SerializerField,
            Request::NameMapping(_) => RequestKind::NameMapping,
            Request::Conversion(_) => RequestKind::Conversion,
        }
    }

    /// The type the request is about. Conversions are about their target.
    pub fn subject(&self) -> &TypeRef {
        match self {
            Request::Parser(r) | Request::Serializer(r) => &r.subject,
            Request::ParserField(r) | Request::SerializerField(r) | Request::NameMapping(r) => {
                &r.subject
            }
            Request::Conversion(r) => &r.target,
        }
    }

    pub fn field_name(&self) -> Option<&str> {
        match self {
            Request::ParserField(r) | Request::SerializerField(r) | Request::NameMapping(r) => {
                Some(&r.field_name)
            }
            _ => None,
        }
    }
}

impl fmt::Display for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Request::Parser(r) | Request::Serializer(r) => {
                write!(f, "{} request for {}", self.kind(), r.subject)
            }
            Request::ParserField(r) | Request::SerializerField(r) | Request::NameMapping(r) => {
                write!(f, "{} request for field '{}': {}", self.kind(), r.field_name, r.subject)
            }
            Request::Conversion(r) => write!(
                f,
                "conversion request {} -> {} {}",
                r.source, r.target, r.signature
            ),
        }
    }
}
