//! Instrument command protocol.
//!
//! This module defines how named instrument attributes are turned into ASCII
//! commands and how the single-line ASCII replies are turned back into typed
//! values.
//!
//! # Overview
//!
//! Each instrument model publishes an [`AttributeTable`]: a fixed mapping from
//! attribute name to a [`Descriptor`] holding the slot kinds, an optional write
//! template and an optional read template. Reads and writes of every attribute
//! go through the same generic [`codec`] functions, so the write and read
//! formats of an attribute can never drift apart.
//!
//! # Wire Format
//!
//! - Commands are plain ASCII with no terminator, one command per query.
//! - Replies are ASCII lines terminated by a bare `\n`; surrounding whitespace
//!   (including `\r`) is stripped.
//! - Booleans travel as the single digits `0` and `1`.
//! - Floats use the fixed precision embedded in each template, e.g. `f{:.8f}`.
//! - Indexed attributes place the index and the value in one command, e.g.
//!   `@{}a{:.3f}` renders to `@3a-12.500`.
//!
//! # Key Components
//!
//! - [`Template`]: placeholder parsing and rendering.
//! - [`codec`]: write/read encoding and reply decoding.
//! - [`LineTransport`]: blocking line-oriented I/O over any [`Stream`].
//!
//! # See Also
//!
//! - [`device`](crate::device): binds a table and a transport into a connection.
pub mod attribute;
pub mod codec;
pub mod template;
pub mod transport;

pub use attribute::{AttributeTable, Descriptor};
pub use codec::{CodecError, ReadRequest, decode_reply, encode_read, encode_write};
pub use template::{Template, TemplateError};
pub use transport::{DEFAULT_TIMEOUT, LineTransport, MAX_LINE_LENGTH, Stream, TransportError};
