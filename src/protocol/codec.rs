//! Attribute codec.
//!
//! Turns `(attribute, arguments)` into command text using the attribute's
//! [`Descriptor`], and turns a raw reply line back into a typed [`Value`].
//! Every check happens before any text is produced, so a failed encode never
//! results in a partially sent command.
use log::trace;
use thiserror::Error;

use super::{
    attribute::{AttributeTable, Descriptor},
    template::{Template, TemplateError},
};
use crate::{Kind, Value, value::CoercionError};

#[derive(Debug, Clone, Error, PartialEq)]
pub enum CodecError {
    #[error("unknown attribute '{0}'")]
    UnknownAttribute(String),

    #[error("attribute '{0}' is read-only")]
    WriteNotSupported(String),

    #[error("attribute '{0}' is write-only")]
    ReadNotSupported(String),

    #[error("attribute '{attribute}' takes {expected} arguments, {found} given")]
    ArityMismatch {
        attribute: String,
        expected: usize,
        found: usize,
    },

    #[error("cannot coerce '{value}' to {kind}")]
    TypeCoercion { kind: Kind, value: String },

    #[error("invalid reply '{0}' for boolean attribute")]
    InvalidBooleanReply(String),

    #[error(transparent)]
    MalformedTemplate(#[from] TemplateError),
}

impl From<CoercionError> for CodecError {
    fn from(value: CoercionError) -> Self {
        CodecError::TypeCoercion {
            kind: value.kind,
            value: value.value,
        }
    }
}

/// A rendered read command and the kind its reply decodes to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadRequest {
    pub command: String,
    pub result: Kind,
}

fn lookup<'t>(table: &'t AttributeTable, attribute: &str) -> Result<&'t Descriptor, CodecError> {
    table
        .get(attribute)
        .ok_or_else(|| CodecError::UnknownAttribute(attribute.to_string()))
}

fn render(template: &str, kinds: &[Kind], args: &[Value]) -> Result<String, CodecError> {
    let values = kinds
        .iter()
        .zip(args.iter().cloned())
        .map(|(kind, arg)| arg.coerce(*kind))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Template::parse(template)?.render(&values)?)
}

/// Renders the write command for `attribute`.
pub fn encode_write(
    table: &AttributeTable,
    attribute: &str,
    args: &[Value],
) -> Result<String, CodecError> {
    let desc = lookup(table, attribute)?;
    let template = desc
        .write_template()
        .ok_or_else(|| CodecError::WriteNotSupported(attribute.to_string()))?;

    if args.len() != desc.write_arity() {
        return Err(CodecError::ArityMismatch {
            attribute: attribute.to_string(),
            expected: desc.write_arity(),
            found: args.len(),
        });
    }

    let command = render(template, desc.kinds(), args)?;
    trace!("encoded write {attribute} -> {command:?}");
    Ok(command)
}

/// Renders the read command for `attribute`. The caller supplies every slot
/// except the last, which is the device's reply.
pub fn encode_read(
    table: &AttributeTable,
    attribute: &str,
    args: &[Value],
) -> Result<ReadRequest, CodecError> {
    let desc = lookup(table, attribute)?;
    let template = desc
        .read_template()
        .ok_or_else(|| CodecError::ReadNotSupported(attribute.to_string()))?;

    if args.len() + 1 != desc.kinds().len() {
        return Err(CodecError::ArityMismatch {
            attribute: attribute.to_string(),
            expected: desc.read_arity(),
            found: args.len(),
        });
    }

    let (result, kinds) = desc
        .kinds()
        .split_last()
        .ok_or_else(|| CodecError::UnknownAttribute(attribute.to_string()))?;

    let command = render(template, kinds, args)?;
    trace!("encoded read {attribute} -> {command:?}");
    Ok(ReadRequest {
        command,
        result: *result,
    })
}

/// Decodes a stripped reply line into a value of `kind`.
pub fn decode_reply(kind: Kind, reply: &str) -> Result<Value, CodecError> {
    let coercion = || CodecError::TypeCoercion {
        kind,
        value: reply.to_string(),
    };

    match kind {
        Kind::Boolean => match reply.parse::<i64>() {
            Ok(0) => Ok(Value::Bool(false)),
            Ok(1) => Ok(Value::Bool(true)),
            _ => Err(CodecError::InvalidBooleanReply(reply.to_string())),
        },
        Kind::Integer => reply.parse().map(Value::Int).map_err(|_| coercion()),
        Kind::Float => reply.parse().map(Value::Float).map_err(|_| coercion()),
        Kind::String => Ok(Value::Str(reply.to_string())),
        Kind::Unit if reply.is_empty() => Ok(Value::Unit),
        Kind::Unit => Err(coercion()),
    }
}
