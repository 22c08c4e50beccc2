//! Connection to a single instrument.
//!
//! A [`Connection`] owns one [`LineTransport`] to one device path and exposes
//! generic attribute reads and writes by name, driven by the model's
//! [`AttributeTable`].
//!
//! # Lifecycle
//!
//! - The connection is opened when constructed.
//! - [`Connection::open`] on an open connection fails with [`DeviceError::AlreadyOpen`].
//! - [`Connection::close`] is idempotent and also runs when the connection is dropped.
//! - Attribute operations on a closed connection fail with [`DeviceError::NotOpen`].
//!
//! # Concurrency
//!
//! A connection is meant to have a single owner. Queries are a write followed
//! by a read and are not atomic with respect to other writers; callers sharing
//! a connection across threads must wrap it in their own lock.
use std::{
    io::{self, Write},
    time::Duration,
};

use log::{debug, info, warn};
use serialport::SerialPort;
use thiserror::Error;

use crate::{
    Value,
    protocol::{
        AttributeTable, CodecError, DEFAULT_TIMEOUT, LineTransport, Stream, TransportError,
        decode_reply, encode_read, encode_write,
    },
    value::UnexpectedKind,
};

#[derive(Debug, Error)]
pub enum DeviceError {
    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("device '{0}' is already open")]
    AlreadyOpen(String),

    #[error("device is not open")]
    NotOpen,

    #[error("failed to open device '{path}': {source}")]
    Open {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("invalid {kind} '{value}'")]
    InvalidEnumValue { kind: &'static str, value: String },

    #[error("{property} {value} outside of range [{start}, {stop}]")]
    OutOfRange {
        property: &'static str,
        value: f64,
        start: f64,
        stop: f64,
    },

    #[error(transparent)]
    UnexpectedKind(#[from] UnexpectedKind),
}

/// Opens the byte stream behind a [`Connection`].
pub trait Connector {
    type Stream: Stream;

    fn connect(&self, path: &str) -> io::Result<Self::Stream>;

    /// Read timeout applied to every reply.
    fn timeout(&self) -> Duration {
        DEFAULT_TIMEOUT
    }
}

/// Opens real serial ports through the `serialport` crate.
#[derive(Debug, Clone)]
pub struct SerialConnector {
    baud_rate: u32,
    timeout: Duration,
}

impl SerialConnector {
    pub fn new(baud_rate: u32) -> Self {
        Self {
            baud_rate,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl Connector for SerialConnector {
    type Stream = Box<dyn SerialPort>;

    fn connect(&self, path: &str) -> io::Result<Self::Stream> {
        let port = serialport::new(path, self.baud_rate)
            .timeout(self.timeout)
            .open()?;
        Ok(port)
    }

    fn timeout(&self) -> Duration {
        self.timeout
    }
}

pub struct Connection<C: Connector> {
    path: String,
    connector: C,
    table: &'static AttributeTable,
    transport: Option<LineTransport<C::Stream>>,
}

impl<C: Connector> Connection<C> {
    /// Creates a connection to `path` and opens it.
    pub fn new(
        path: impl Into<String>,
        connector: C,
        table: &'static AttributeTable,
    ) -> Result<Self, DeviceError> {
        let mut conn = Self {
            path: path.into(),
            connector,
            table,
            transport: None,
        };
        conn.open()?;
        Ok(conn)
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn table(&self) -> &'static AttributeTable {
        self.table
    }

    pub fn is_open(&self) -> bool {
        self.transport.is_some()
    }

    pub fn open(&mut self) -> Result<(), DeviceError> {
        if self.transport.is_some() {
            return Err(DeviceError::AlreadyOpen(self.path.clone()));
        }

        let stream = self
            .connector
            .connect(&self.path)
            .map_err(|source| DeviceError::Open {
                path: self.path.clone(),
                source,
            })?;
        self.transport = Some(LineTransport::with_timeout(
            stream,
            self.connector.timeout(),
        ));

        info!("opened {}", self.path);
        Ok(())
    }

    /// Releases the stream. Does nothing when already closed.
    pub fn close(&mut self) {
        if let Some(transport) = self.transport.take() {
            let mut stream = transport.into_inner();
            if let Err(e) = stream.flush() {
                warn!("failed to flush {} before closing: {e}", self.path);
            }
            info!("closed {}", self.path);
        }
    }

    fn transport(&mut self) -> Result<&mut LineTransport<C::Stream>, DeviceError> {
        self.transport.as_mut().ok_or(DeviceError::NotOpen)
    }

    /// Writes `attribute` with one argument per declared slot.
    pub fn write(&mut self, attribute: &str, args: &[Value]) -> Result<(), DeviceError> {
        let command = encode_write(self.table, attribute, args)?;
        debug!("write {attribute} {args:?}");
        self.transport()?.send(&command)?;
        Ok(())
    }

    /// Reads `attribute`, passing every slot but the last as arguments.
    pub fn read(&mut self, attribute: &str, args: &[Value]) -> Result<Value, DeviceError> {
        let request = encode_read(self.table, attribute, args)?;
        let reply = self.transport()?.query(&request.command)?;
        let value = decode_reply(request.result, &reply)?;
        debug!("read {attribute} {args:?} -> {value:?}");
        Ok(value)
    }

    /// Like [`read`](Self::read), converting the result to a native type.
    pub fn read_as<T>(&mut self, attribute: &str, args: &[Value]) -> Result<T, DeviceError>
    where
        T: TryFrom<Value, Error = UnexpectedKind>,
    {
        Ok(self.read(attribute, args)?.try_into()?)
    }

    /// Discards buffered input and output on the stream.
    pub fn clear(&mut self) -> Result<(), DeviceError> {
        self.transport()?.clear()?;
        Ok(())
    }
}

impl<C: Connector> Drop for Connection<C> {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Kind, sim::SimulatedSynth, synth_nv_pro::attribute_table};

    fn connect(sim: &SimulatedSynth) -> Connection<SimulatedSynth> {
        Connection::new("sim0", sim.clone(), attribute_table()).unwrap()
    }

    #[test]
    fn open_on_construct_and_close_on_drop() {
        let sim = SimulatedSynth::synth_nv_pro();
        let conn = connect(&sim);
        assert!(conn.is_open());
        assert!(sim.is_connected());

        drop(conn);
        assert!(!sim.is_connected());
    }

    #[test]
    fn lifecycle_misuse() {
        let sim = SimulatedSynth::synth_nv_pro();
        let mut conn = connect(&sim);

        assert!(matches!(conn.open(), Err(DeviceError::AlreadyOpen(p)) if p == "sim0"));

        conn.close();
        conn.close();
        assert!(!conn.is_open());
        assert!(matches!(
            conn.write("rf_enable", &[true.into()]),
            Err(DeviceError::NotOpen)
        ));

        conn.open().unwrap();
        conn.write("rf_enable", &[true.into()]).unwrap();
        assert_eq!(sim.sent(), vec!["h1"]);
    }

    #[test]
    fn frequency_scenario() {
        let sim = SimulatedSynth::synth_nv_pro();
        let mut conn = connect(&sim);

        conn.write("frequency", &[Value::Float(2441.2976)]).unwrap();
        let f: f64 = conn.read_as("frequency", &[]).unwrap();

        assert_eq!(sim.sent(), vec!["f2441.29760000", "f?"]);
        assert_eq!(f, 2441.2976);
    }

    #[test]
    fn boolean_scenario() {
        let sim = SimulatedSynth::synth_nv_pro();
        let mut conn = connect(&sim);

        conn.write("rf_enable", &[true.into()]).unwrap();
        assert_eq!(conn.read("rf_enable", &[]).unwrap(), Value::Bool(true));

        sim.set_reply("h?", "9");
        assert!(matches!(
            conn.read("rf_enable", &[]),
            Err(DeviceError::Codec(CodecError::InvalidBooleanReply(r))) if r == "9"
        ));
    }

    #[test]
    fn lookup_row_scenario() {
        let sim = SimulatedSynth::synth_nv_pro();
        let mut conn = connect(&sim);

        conn.write("am_lookup_table", &[Value::Int(3), Value::Float(-12.5)])
            .unwrap();
        let row: f64 = conn.read_as("am_lookup_table", &[Value::Int(3)]).unwrap();

        assert_eq!(sim.sent(), vec!["@3a-12.500", "@3a?"]);
        assert_eq!(row, -12.5);
    }

    #[test]
    fn failed_encodes_send_nothing() {
        let sim = SimulatedSynth::synth_nv_pro();
        let mut conn = connect(&sim);

        assert!(matches!(
            conn.write("frequency", &[]),
            Err(DeviceError::Codec(CodecError::ArityMismatch { .. }))
        ));
        assert!(matches!(
            conn.write("warp_drive", &[true.into()]),
            Err(DeviceError::Codec(CodecError::UnknownAttribute(_)))
        ));
        assert!(matches!(
            conn.read("warp_drive", &[]),
            Err(DeviceError::Codec(CodecError::UnknownAttribute(_)))
        ));
        assert!(matches!(
            conn.read("save", &[]),
            Err(DeviceError::Codec(CodecError::ReadNotSupported(_)))
        ));
        assert!(sim.sent().is_empty());
    }

    #[test]
    fn silent_device_times_out() {
        let sim = SimulatedSynth::synth_nv_pro();
        let mut conn = connect(&sim);
        sim.set_muted(true);

        assert!(matches!(
            conn.read("power", &[]),
            Err(DeviceError::Transport(TransportError::Timeout(_)))
        ));
    }

    fn samples(kind: Kind) -> Vec<Value> {
        match kind {
            Kind::Integer => vec![Value::Int(0), Value::Int(42), Value::Int(-7)],
            Kind::Float => vec![
                Value::Float(-3.5),
                Value::Float(1234.5),
                Value::Float(2441.2976),
            ],
            Kind::Boolean => vec![Value::Bool(true), Value::Bool(false)],
            Kind::String => vec![Value::from("SynthNVP")],
            Kind::Unit => vec![Value::Unit],
        }
    }

    #[test]
    fn every_read_write_attribute_round_trips() {
        let sim = SimulatedSynth::synth_nv_pro();
        let mut conn = connect(&sim);
        let mut checked = 0;

        for (name, desc) in attribute_table().iter() {
            if desc.write_template().is_none() || desc.read_template().is_none() {
                continue;
            }
            let Some((&kind, index)) = desc.kinds().split_last() else {
                continue;
            };
            let index: Vec<Value> = index.iter().map(|_| Value::Int(3)).collect();

            for sample in samples(kind) {
                let mut args = index.clone();
                args.push(sample.clone());
                conn.write(name, &args).unwrap();

                // coarsest template precision is one decimal
                match (sample, conn.read(name, &index).unwrap()) {
                    (Value::Float(wrote), Value::Float(read)) => {
                        assert!((wrote - read).abs() <= 0.05, "{name}: wrote {wrote}, read {read}")
                    }
                    (wrote, read) => assert_eq!(wrote, read, "{name}"),
                }
            }
            checked += 1;
        }

        assert!(checked >= 40);
    }

    #[test]
    fn channel_spacing_rounds_to_template_precision() {
        let sim = SimulatedSynth::synth_nv_pro();
        let mut conn = connect(&sim);

        conn.write("channel_spacing", &[Value::Float(-3.25)]).unwrap();
        let read: f64 = conn.read_as("channel_spacing", &[]).unwrap();
        assert!((read + 3.25).abs() <= 0.05);
    }

    #[test]
    fn every_boolean_attribute_uses_zero_and_one() {
        let sim = SimulatedSynth::synth_nv_pro();
        let mut conn = connect(&sim);
        let booleans = attribute_table()
            .iter()
            .filter(|(_, d)| d.kinds() == [Kind::Boolean]);

        for (name, desc) in booleans {
            if let Some(write) = desc.write_template() {
                sim.clear_sent();
                conn.write(name, &[true.into()]).unwrap();
                conn.write(name, &[false.into()]).unwrap();
                assert_eq!(
                    sim.sent(),
                    vec![write.replace("{}", "1"), write.replace("{}", "0")],
                    "{name}"
                );
            }

            if let Some(read) = desc.read_template() {
                sim.set_reply(read, "1");
                assert_eq!(conn.read(name, &[]).unwrap(), Value::Bool(true), "{name}");
                sim.set_reply(read, "0");
                assert_eq!(conn.read(name, &[]).unwrap(), Value::Bool(false), "{name}");
                sim.set_reply(read, "2");
                assert!(
                    matches!(
                        conn.read(name, &[]),
                        Err(DeviceError::Codec(CodecError::InvalidBooleanReply(r))) if r == "2"
                    ),
                    "{name}"
                );
            }
        }
    }

    #[test]
    fn wrong_arity_never_reaches_the_wire() {
        let sim = SimulatedSynth::synth_nv_pro();
        let mut conn = connect(&sim);

        for (name, desc) in attribute_table().iter() {
            let n = desc.kinds().len();
            let args = vec![Value::Int(1); n + 1];

            if desc.write_template().is_some() {
                assert!(
                    matches!(
                        conn.write(name, &args),
                        Err(DeviceError::Codec(CodecError::ArityMismatch { expected, found, .. }))
                            if expected == n && found == n + 1
                    ),
                    "{name}"
                );
                assert!(
                    matches!(
                        conn.write(name, &args[..n - 1]),
                        Err(DeviceError::Codec(CodecError::ArityMismatch { .. }))
                    ),
                    "{name}"
                );
            }
            if desc.read_template().is_some() {
                assert!(
                    matches!(
                        conn.read(name, &args[..n]),
                        Err(DeviceError::Codec(CodecError::ArityMismatch { .. }))
                    ),
                    "{name}"
                );
            }
        }

        assert!(sim.sent().is_empty());
    }

    #[test]
    fn read_as_rejects_wrong_type() {
        let sim = SimulatedSynth::synth_nv_pro();
        let mut conn = connect(&sim);

        assert!(matches!(
            conn.read_as::<bool>("frequency", &[]),
            Err(DeviceError::UnexpectedKind(_))
        ));
    }
}
