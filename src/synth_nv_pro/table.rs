//! SynthNV PRO serial command set.
//!
//! Reference: Windfreak "SynthNV PRO Serial Programming API". Float
//! precisions are part of the command grammar and must not change.
use std::sync::LazyLock;

use crate::{
    Kind,
    protocol::{AttributeTable, Descriptor},
};

const INT: &[Kind] = &[Kind::Integer];
const FLOAT: &[Kind] = &[Kind::Float];
const BOOL: &[Kind] = &[Kind::Boolean];
const STR: &[Kind] = &[Kind::String];
const UNIT: &[Kind] = &[Kind::Unit];
const ROW: &[Kind] = &[Kind::Integer, Kind::Float];

#[rustfmt::skip]
const ENTRIES: &[(&str, Descriptor)] = &[
    // main settings
    ("frequency",          Descriptor::read_write(FLOAT, "f{:.8f}", "f?")), // MHz
    ("power",              Descriptor::read_write(FLOAT, "W{:.3f}", "W?")), // dBm
    ("rf_enable",          Descriptor::read_write(BOOL,  "h{}",     "h?")),
    ("calibrated",         Descriptor::read_only(BOOL,   "V")),
    ("phase_step",         Descriptor::read_write(FLOAT, "~{:.3f}", "~?")), // degrees
    ("trig_function",      Descriptor::read_write(INT,   "y{}",     "y?")),
    ("reference_mode",     Descriptor::read_write(INT,   "x{}",     "x?")),
    ("ref_frequency",      Descriptor::read_write(FLOAT, "*{:.8f}", "*?")), // MHz
    ("ref_freq_doubler",   Descriptor::read_write(BOOL,  "D{}",     "D?")),
    ("pll_power_on",       Descriptor::read_write(BOOL,  "E{}",     "E?")),
    ("pll_cp_current",     Descriptor::read_write(INT,   "U{}",     "U?")), // [0, 15]
    ("pll_lock",           Descriptor::read_only(BOOL,   "p")),
    ("temperature",        Descriptor::read_only(FLOAT,  "z")),             // Celsius
    ("temp_comp_mode",     Descriptor::read_write(INT,   "Z{}",     "Z?")),
    ("vga_dac",            Descriptor::read_write(INT,   "a{}",     "a?")),
    ("channel_spacing",    Descriptor::read_write(FLOAT, "i{:.1f}", "i?")), // Hz
    ("save",               Descriptor::write_only(UNIT,  "e{}")),           // EEPROM

    // sweep
    ("sweep_freq_low",     Descriptor::read_write(FLOAT, "l{:.8f}", "l?")), // MHz
    ("sweep_freq_high",    Descriptor::read_write(FLOAT, "u{:.8f}", "u?")), // MHz
    ("sweep_freq_step",    Descriptor::read_write(FLOAT, "s{:.8f}", "s?")), // MHz
    ("sweep_time_step",    Descriptor::read_write(FLOAT, "t{:.3f}", "t?")), // ms
    ("sweep_power_low",    Descriptor::read_write(FLOAT, "[{:.3f}", "[?")), // dBm
    ("sweep_power_high",   Descriptor::read_write(FLOAT, "]{:.3f}", "]?")), // dBm
    ("sweep_direction",    Descriptor::read_write(INT,   "^{}",     "^?")),
    ("sweep_type",         Descriptor::read_write(INT,   "X{}",     "X?")),
    ("sweep_single",       Descriptor::read_write(BOOL,  "g{}",     "g?")),
    ("sweep_cont",         Descriptor::read_write(BOOL,  "c{}",     "c?")),

    // detector (RFin)
    ("detect_power",       Descriptor::read_only(FLOAT,  "w")),             // dBm
    ("detector_mode",      Descriptor::read_write(INT,   "&{}",     "&?")),
    ("detect_powers",      Descriptor::read_write(BOOL,  "r{}",     "r?")),
    ("detect_powers_styl", Descriptor::read_write(INT,   "d{}",     "d?")),

    // amplitude modulation
    ("am_time_step",       Descriptor::read_write(INT,   "F{}",     "F?")), // us
    ("am_num_samples",     Descriptor::read_write(INT,   "q{}",     "q?")),
    ("am_cont",            Descriptor::read_write(BOOL,  "A{}",     "A?")),
    ("am_lookup_table",    Descriptor::read_write(ROW,   "@{}a{:.3f}", "@{}a?")), // dBm

    // pulse modulation
    ("pulse_on_time",      Descriptor::read_write(INT,   "P{}",     "P?")), // us
    ("pulse_off_time",     Descriptor::read_write(INT,   "O{}",     "O?")), // us
    ("pulse_num_rep",      Descriptor::read_write(INT,   "R{}",     "R?")),
    ("pulse_invert",       Descriptor::read_write(BOOL,  ":{}",     ":?")),
    ("pulse_single",       Descriptor::write_only(UNIT,  "G{}")),
    ("pulse_cont",         Descriptor::read_write(BOOL,  "j{}",     "j?")),

    // frequency modulation
    ("fm_frequency",       Descriptor::read_write(INT,   "<{}",     "<?")), // Hz
    ("fm_deviation",       Descriptor::read_write(INT,   ">{}",     ">?")), // Hz
    ("fm_num_samples",     Descriptor::read_write(INT,   ",{}",     ",?")),
    ("fm_mod_type",        Descriptor::read_write(INT,   ";{}",     ";?")),
    ("fm_cont",            Descriptor::read_write(BOOL,  "/{}",     "/?")),

    // identity
    ("model_type",         Descriptor::read_only(STR,    "+")),
    ("serial_number",      Descriptor::read_only(INT,    "-")),
    ("fw_version",         Descriptor::read_only(STR,    "v0")),
    ("hw_version",         Descriptor::read_only(STR,    "v1")),
];

static TABLE: LazyLock<AttributeTable> = LazyLock::new(|| AttributeTable::from_entries(ENTRIES));

/// The SynthNV PRO attribute table, built on first use.
pub fn attribute_table() -> &'static AttributeTable {
    &TABLE
}
