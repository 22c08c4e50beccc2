//! Host-side driver for Windfreak frequency synthesizers.
//!
//! Instrument settings are exposed as named attributes. A declarative
//! [`AttributeTable`](protocol::AttributeTable) maps each name to its wire
//! commands, the [`protocol`] codec turns typed [`Value`]s into command lines
//! and replies back into values, and a [`Connection`] moves lines over a
//! serial port. [`synth_nv_pro`] layers typed accessors over a connection.
pub mod cli;
pub mod device;
pub mod protocol;
pub mod sim;
pub mod synth_nv_pro;
pub mod value;

pub use cli::{Command, prompt};
pub use device::{Connection, Connector, DeviceError, SerialConnector};
pub use synth_nv_pro::SynthNvPro;
pub use value::{Kind, Value};
