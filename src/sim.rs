//! In-process simulated instrument.
//!
//! [`SimulatedSynth`] speaks the same wire protocol as the hardware, driven by
//! an [`AttributeTable`]:
//!
//! - a write command stores its value, so the matching read returns it;
//! - a read with nothing stored answers a zero value of the attribute's kind;
//! - unknown commands are recorded and otherwise ignored.
//!
//! Every command received is logged for inspection. The simulator is both the
//! [`Connector`] and, through [`SimPort`], the stream, and clones share state,
//! so a test can keep a handle while a [`Connection`](crate::Connection) owns
//! the port.
//!
//! # Example
//! ```rust
//! use windfreak::{Connection, Value, sim::SimulatedSynth, synth_nv_pro::attribute_table};
//!
//! let sim = SimulatedSynth::synth_nv_pro();
//! let mut conn = Connection::new("sim", sim.clone(), attribute_table()).unwrap();
//!
//! conn.write("power", &[Value::Float(-3.5)]).unwrap();
//! assert_eq!(conn.read("power", &[]).unwrap(), Value::Float(-3.5));
//! assert_eq!(sim.sent(), vec!["W-3.500", "W?"]);
//! ```
use std::{
    collections::{HashMap, VecDeque},
    io::{self, Read, Write},
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use log::{debug, trace};

use crate::{
    Kind, Value,
    device::Connector,
    protocol::{AttributeTable, Stream, Template},
    synth_nv_pro::attribute_table,
};

#[derive(Debug)]
struct SimState {
    table: &'static AttributeTable,
    registers: HashMap<String, String>,
    inbox: Vec<u8>,
    outbox: VecDeque<u8>,
    sent: Vec<String>,
    clears: usize,
    connected: bool,
    muted: bool,
}

impl SimState {
    fn process(&mut self, command: String) {
        trace!("sim received {command:?}");
        self.sent.push(command.clone());
        if self.muted {
            return;
        }

        if let Some(reply) = self.answer(&command) {
            debug!("sim reply to {command:?}: {reply:?}");
            self.outbox.extend(reply.bytes());
            self.outbox.push_back(b'\n');
        } else if !self.store(&command) {
            debug!("sim ignored {command:?}");
        }
    }

    /// Reply to a read command, if `command` is one.
    fn answer(&self, command: &str) -> Option<String> {
        for (_, desc) in self.table.iter() {
            let Some(read) = desc.read_template() else {
                continue;
            };
            let Ok(template) = Template::parse(read) else {
                continue;
            };
            if template.captures(command).is_some() {
                let reply = self.registers.get(command).cloned().unwrap_or_else(|| {
                    zero_reply(desc.result_kind().unwrap_or(Kind::String)).to_string()
                });
                return Some(reply);
            }
        }
        None
    }

    /// Remembers the value of a write command under its read command.
    fn store(&mut self, command: &str) -> bool {
        for (name, desc) in self.table.iter() {
            let Some(write) = desc.write_template() else {
                continue;
            };
            let Some(captures) = Template::parse(write)
                .ok()
                .and_then(|t| t.captures(command))
            else {
                continue;
            };

            let (Some(read), Some((value, index))) = (desc.read_template(), captures.split_last())
            else {
                trace!("sim executed {name}");
                return true;
            };

            let index: Vec<Value> = index.iter().map(|s| Value::from(*s)).collect();
            if let Ok(key) = Template::parse(read).and_then(|t| t.render(&index)) {
                self.registers.insert(key, value.to_string());
            }
            return true;
        }
        false
    }
}

fn zero_reply(kind: Kind) -> &'static str {
    match kind {
        Kind::Boolean | Kind::Integer => "0",
        Kind::Float => "0.000",
        Kind::String | Kind::Unit => "",
    }
}

/// Simulated instrument. Cheap to clone; clones share state.
#[derive(Debug, Clone)]
pub struct SimulatedSynth {
    state: Arc<Mutex<SimState>>,
}

impl SimulatedSynth {
    pub fn new(table: &'static AttributeTable) -> Self {
        Self {
            state: Arc::new(Mutex::new(SimState {
                table,
                registers: HashMap::new(),
                inbox: Vec::new(),
                outbox: VecDeque::new(),
                sent: Vec::new(),
                clears: 0,
                connected: false,
                muted: false,
            })),
        }
    }

    /// A SynthNV PRO with plausible power-up settings.
    pub fn synth_nv_pro() -> Self {
        let sim = Self::new(attribute_table());
        for (command, reply) in [
            ("+", "SynthNVP"),
            ("-", "1042"),
            ("v0", "Firmware Version 1.01"),
            ("v1", "Hardware Version 2.0"),
            ("V", "1"),
            ("p", "1"),
            ("z", "32.500"),
            ("w", "-40.000"),
            ("f?", "1000.00000000"),
            ("W?", "0.000"),
            ("E?", "1"),
            ("x?", "1"),
            ("*?", "27.00000000"),
            ("Z?", "3"),
            ("^?", "1"),
        ] {
            sim.set_reply(command, reply);
        }
        sim
    }

    fn state(&self) -> MutexGuard<'_, SimState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Sets the reply to read command `command`. Extra lines in `reply` are
    /// sent as trailing output.
    pub fn set_reply(&self, command: &str, reply: &str) {
        self.state()
            .registers
            .insert(command.to_string(), reply.to_string());
    }

    /// A muted simulator records commands but never replies.
    pub fn set_muted(&self, muted: bool) {
        self.state().muted = muted;
    }

    /// Commands received so far, oldest first.
    pub fn sent(&self) -> Vec<String> {
        self.state().sent.clone()
    }

    pub fn clear_sent(&self) {
        self.state().sent.clear();
    }

    /// Number of buffer discards requested by the host.
    pub fn clears(&self) -> usize {
        self.state().clears
    }

    pub fn is_connected(&self) -> bool {
        self.state().connected
    }
}

impl Connector for SimulatedSynth {
    type Stream = SimPort;

    fn connect(&self, path: &str) -> io::Result<SimPort> {
        let mut state = self.state();
        if state.connected {
            return Err(io::Error::new(
                io::ErrorKind::ResourceBusy,
                format!("{path} is busy"),
            ));
        }
        state.connected = true;
        Ok(SimPort {
            state: Arc::clone(&self.state),
        })
    }
}

/// Host side of a [`SimulatedSynth`].
///
/// Each flush delivers the bytes written since the previous flush as one
/// command. Reads drain queued replies and report end of stream when none are
/// left.
#[derive(Debug)]
pub struct SimPort {
    state: Arc<Mutex<SimState>>,
}

impl SimPort {
    fn state(&self) -> MutexGuard<'_, SimState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Read for SimPort {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let mut state = self.state();
        let n = buf.len().min(state.outbox.len());
        for (slot, byte) in buf.iter_mut().zip(state.outbox.drain(..n)) {
            *slot = byte;
        }
        Ok(n)
    }
}

impl Write for SimPort {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.state().inbox.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        let mut state = self.state();
        if !state.inbox.is_empty() {
            let command = String::from_utf8_lossy(&state.inbox).into_owned();
            state.inbox.clear();
            state.process(command);
        }
        Ok(())
    }
}

impl Stream for SimPort {
    fn discard_buffers(&mut self) -> io::Result<()> {
        let mut state = self.state();
        state.inbox.clear();
        state.outbox.clear();
        state.clears += 1;
        Ok(())
    }
}

impl Drop for SimPort {
    fn drop(&mut self) {
        self.state().connected = false;
    }
}
