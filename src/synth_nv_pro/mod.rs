//! Windfreak SynthNV PRO.
//!
//! [`SynthNvPro`] wraps a [`Connection`] with typed accessors for every
//! attribute in the model's [`attribute_table`]. Setters validate against the
//! model's [`Ranges`] before anything is written; frequencies are exposed in
//! Hz while the wire uses MHz.
//!
//! # Example
//! ```rust
//! use windfreak::{sim::SimulatedSynth, synth_nv_pro::{SynthNvPro, SweepDirection}};
//!
//! let sim = SimulatedSynth::synth_nv_pro();
//! let mut synth = SynthNvPro::open("sim", sim.clone()).unwrap();
//!
//! synth.set_frequency(2.4e9).unwrap();
//! synth.set_sweep_direction(SweepDirection::Reverse).unwrap();
//! assert_eq!(synth.sweep_direction().unwrap(), SweepDirection::Reverse);
//! ```
mod modes;
mod table;

use log::debug;

use crate::{
    Value,
    device::{Connection, Connector, DeviceError},
};

pub use modes::{
    DetectPowersStyle, DetectorMode, FmType, ReferenceMode, SweepDirection, SweepType,
    TempCompensation, TriggerMode, WireEnum,
};
pub use table::attribute_table;

const MHZ: f64 = 1e6;

/// Inclusive value range with the device's resolution.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Range {
    pub start: f64,
    pub stop: f64,
    pub step: f64,
}

impl Range {
    pub const fn new(start: f64, stop: f64, step: f64) -> Self {
        Self { start, stop, step }
    }

    pub fn contains(&self, value: f64) -> bool {
        self.start <= value && value <= self.stop
    }

    fn check(&self, property: &'static str, value: f64) -> Result<(), DeviceError> {
        if self.contains(value) {
            Ok(())
        } else {
            Err(DeviceError::OutOfRange {
                property,
                value,
                start: self.start,
                stop: self.stop,
            })
        }
    }
}

/// Reference frequency range in Hz, independent of model.
pub const REFERENCE_FREQUENCY_RANGE: Range = Range::new(10e6, 100e6, 1e3);
/// Phase step range in degrees, independent of model.
pub const PHASE_RANGE: Range = Range::new(0.0, 360.0, 0.001);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Model {
    SynthNvPro,
}

impl Model {
    /// Bins the identity string reported by the device.
    pub fn detect(model_type: &str) -> Option<Self> {
        model_type.contains("SynthNVP").then_some(Model::SynthNvPro)
    }

    pub fn ranges(self) -> Ranges {
        match self {
            Model::SynthNvPro => Ranges {
                frequency: Range::new(12.5e6, 6400e6, 0.1),
                power: Range::new(-60.0, 20.0, 0.001),
                vga_dac: Range::new(0.0, 4000.0, 1.0),
                channel_spacing: Range::new(0.1, 1000.0, 0.1),
                pll_cp_current: Range::new(0.0, 15.0, 1.0),
                sweep_time_step: Range::new(0.1, 60000.0, 0.1),
                pulse_on_time: Range::new(1.0, 10e6, 1.0),
                pulse_off_time: Range::new(2.0, 10e6, 1.0),
                pulse_repetitions: Range::new(1.0, 65500.0, 1.0),
                fm_frequency: Range::new(1.0, 5000.0, 1.0),
            },
        }
    }
}

impl std::fmt::Display for Model {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Model::SynthNvPro => f.write_str("SynthNV PRO"),
        }
    }
}

/// Per-model input ranges. Frequencies in Hz, powers in dBm, times in the
/// units of the matching accessor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ranges {
    pub frequency: Range,
    pub power: Range,
    pub vga_dac: Range,
    pub channel_spacing: Range,
    pub pll_cp_current: Range,
    pub sweep_time_step: Range,
    pub pulse_on_time: Range,
    pub pulse_off_time: Range,
    pub pulse_repetitions: Range,
    pub fm_frequency: Range,
}

pub struct SynthNvPro<C: Connector> {
    conn: Connection<C>,
    model: Option<Model>,
}

impl<C: Connector> SynthNvPro<C> {
    /// Opens the device at `path` and identifies its model.
    ///
    /// Unsupported models stay usable, but setters skip model-specific range
    /// checks.
    pub fn open(path: impl Into<String>, connector: C) -> Result<Self, DeviceError> {
        let mut conn = Connection::new(path, connector, attribute_table())?;
        let model_type: String = conn.read_as("model_type", &[])?;
        let model = Model::detect(&model_type);
        debug!("{} identified as {model_type:?} ({model:?})", conn.path());

        Ok(Self { conn, model })
    }

    pub fn model(&self) -> Option<Model> {
        self.model
    }

    pub fn ranges(&self) -> Option<Ranges> {
        self.model.map(Model::ranges)
    }

    /// Raw attribute access.
    pub fn connection(&mut self) -> &mut Connection<C> {
        &mut self.conn
    }

    pub fn close(&mut self) {
        self.conn.close();
    }

    /// Puts the device into a known, safe state.
    pub fn init(&mut self) -> Result<(), DeviceError> {
        self.conn.clear()?;
        self.set_rf_enable(false)?;
        if let Some(ranges) = self.ranges() {
            self.set_frequency(ranges.frequency.start)?;
            self.set_power(ranges.power.start)?;
        }
        self.set_phase(0.0)?;
        self.set_temp_compensation_mode(TempCompensation::TenSeconds)?;
        self.set_reference_mode(ReferenceMode::Internal27MHz)?;
        self.set_trigger_mode(TriggerMode::Disabled)?;
        self.set_sweep_enable(false)?;
        self.set_sweep_direction(SweepDirection::Forward)?;
        self.set_am_enable(false)?;
        self.set_pulse_mod_enable(false)?;
        self.set_fm_enable(false)?;
        self.set_detect_mode(DetectorMode::Instant)?;
        self.set_measure_powers(false)?;
        self.set_detect_powers_style(DetectPowersStyle::None)
    }

    fn get<T>(&mut self, attribute: &str) -> Result<T, DeviceError>
    where
        T: TryFrom<Value, Error = crate::value::UnexpectedKind>,
    {
        self.conn.read_as(attribute, &[])
    }

    fn set(&mut self, attribute: &str, value: impl Into<Value>) -> Result<(), DeviceError> {
        self.conn.write(attribute, &[value.into()])
    }

    fn get_enum<T: WireEnum>(&mut self, attribute: &str) -> Result<T, DeviceError> {
        let code: i64 = self.get(attribute)?;
        T::from_code(code)
    }

    fn set_enum<T: WireEnum>(&mut self, attribute: &str, value: T) -> Result<(), DeviceError> {
        self.set(attribute, value.code())
    }

    fn model_range(&self, select: fn(&Ranges) -> Range) -> Option<Range> {
        self.ranges().map(|r| select(&r))
    }

    fn set_checked(
        &mut self,
        attribute: &'static str,
        range: Option<Range>,
        value: Value,
    ) -> Result<(), DeviceError> {
        let number = match value {
            Value::Int(i) => Some(i as f64),
            Value::Float(f) => Some(f),
            _ => None,
        };
        if let (Some(range), Some(number)) = (range, number) {
            range.check(attribute, number)?;
        }
        self.conn.write(attribute, &[value])
    }

    // identity

    pub fn model_type(&mut self) -> Result<String, DeviceError> {
        self.get("model_type")
    }

    pub fn serial_number(&mut self) -> Result<i64, DeviceError> {
        self.get("serial_number")
    }

    pub fn firmware_version(&mut self) -> Result<String, DeviceError> {
        self.get("fw_version")
    }

    pub fn hardware_version(&mut self) -> Result<String, DeviceError> {
        self.get("hw_version")
    }

    /// Stores all current settings in EEPROM as power-up defaults.
    pub fn save(&mut self) -> Result<(), DeviceError> {
        self.conn.write("save", &[Value::Unit])
    }

    // output

    /// Output frequency in Hz.
    pub fn frequency(&mut self) -> Result<f64, DeviceError> {
        Ok(self.get::<f64>("frequency")? * MHZ)
    }

    pub fn set_frequency(&mut self, hz: f64) -> Result<(), DeviceError> {
        let range = self.model_range(|r| r.frequency);
        if let Some(range) = range {
            range.check("frequency", hz)?;
        }
        self.set("frequency", hz / MHZ)
    }

    /// Output power in dBm.
    pub fn power(&mut self) -> Result<f64, DeviceError> {
        self.get("power")
    }

    pub fn set_power(&mut self, dbm: f64) -> Result<(), DeviceError> {
        let range = self.model_range(|r| r.power);
        self.set_checked("power", range, dbm.into())
    }

    pub fn rf_enable(&mut self) -> Result<bool, DeviceError> {
        self.get("rf_enable")
    }

    pub fn set_rf_enable(&mut self, enable: bool) -> Result<(), DeviceError> {
        self.set("rf_enable", enable)
    }

    pub fn pll_enable(&mut self) -> Result<bool, DeviceError> {
        self.get("pll_power_on")
    }

    pub fn set_pll_enable(&mut self, enable: bool) -> Result<(), DeviceError> {
        self.set("pll_power_on", enable)
    }

    /// True when both RF output and PLL are on.
    pub fn enable(&mut self) -> Result<bool, DeviceError> {
        Ok(self.rf_enable()? && self.pll_enable()?)
    }

    pub fn set_enable(&mut self, enable: bool) -> Result<(), DeviceError> {
        self.set_rf_enable(enable)?;
        self.set_pll_enable(enable)
    }

    /// Whether calibration succeeded on the last frequency or amplitude change.
    pub fn calibrated(&mut self) -> Result<bool, DeviceError> {
        self.get("calibrated")
    }

    /// Phase step in degrees.
    pub fn phase(&mut self) -> Result<f64, DeviceError> {
        self.get("phase_step")
    }

    pub fn set_phase(&mut self, degrees: f64) -> Result<(), DeviceError> {
        self.set_checked("phase_step", Some(PHASE_RANGE), degrees.into())
    }

    pub fn vga_dac(&mut self) -> Result<i64, DeviceError> {
        self.get("vga_dac")
    }

    pub fn set_vga_dac(&mut self, value: i64) -> Result<(), DeviceError> {
        let range = self.model_range(|r| r.vga_dac);
        self.set_checked("vga_dac", range, value.into())
    }

    /// Channel spacing in Hz.
    pub fn channel_spacing(&mut self) -> Result<f64, DeviceError> {
        self.get("channel_spacing")
    }

    pub fn set_channel_spacing(&mut self, hz: f64) -> Result<(), DeviceError> {
        let range = self.model_range(|r| r.channel_spacing);
        self.set_checked("channel_spacing", range, hz.into())
    }

    // reference and PLL

    pub fn trigger_mode(&mut self) -> Result<TriggerMode, DeviceError> {
        self.get_enum("trig_function")
    }

    pub fn set_trigger_mode(&mut self, mode: TriggerMode) -> Result<(), DeviceError> {
        self.set_enum("trig_function", mode)
    }

    pub fn reference_mode(&mut self) -> Result<ReferenceMode, DeviceError> {
        self.get_enum("reference_mode")
    }

    pub fn set_reference_mode(&mut self, mode: ReferenceMode) -> Result<(), DeviceError> {
        self.set_enum("reference_mode", mode)
    }

    /// Reference frequency in Hz.
    pub fn reference_frequency(&mut self) -> Result<f64, DeviceError> {
        Ok(self.get::<f64>("ref_frequency")? * MHZ)
    }

    pub fn set_reference_frequency(&mut self, hz: f64) -> Result<(), DeviceError> {
        REFERENCE_FREQUENCY_RANGE.check("ref_frequency", hz)?;
        self.set("ref_frequency", hz / MHZ)
    }

    pub fn reference_doubler(&mut self) -> Result<bool, DeviceError> {
        self.get("ref_freq_doubler")
    }

    pub fn set_reference_doubler(&mut self, enable: bool) -> Result<(), DeviceError> {
        self.set("ref_freq_doubler", enable)
    }

    pub fn pll_charge_pump_current(&mut self) -> Result<i64, DeviceError> {
        self.get("pll_cp_current")
    }

    pub fn set_pll_charge_pump_current(&mut self, value: i64) -> Result<(), DeviceError> {
        let range = self.model_range(|r| r.pll_cp_current);
        self.set_checked("pll_cp_current", range, value.into())
    }

    pub fn lock_status(&mut self) -> Result<bool, DeviceError> {
        self.get("pll_lock")
    }

    /// Internal temperature in Celsius.
    pub fn temperature(&mut self) -> Result<f64, DeviceError> {
        self.get("temperature")
    }

    pub fn temp_compensation_mode(&mut self) -> Result<TempCompensation, DeviceError> {
        self.get_enum("temp_comp_mode")
    }

    pub fn set_temp_compensation_mode(&mut self, mode: TempCompensation) -> Result<(), DeviceError> {
        self.set_enum("temp_comp_mode", mode)
    }

    // sweep

    /// Lower sweep frequency in Hz.
    pub fn sweep_frequency_low(&mut self) -> Result<f64, DeviceError> {
        Ok(self.get::<f64>("sweep_freq_low")? * MHZ)
    }

    pub fn set_sweep_frequency_low(&mut self, hz: f64) -> Result<(), DeviceError> {
        if let Some(range) = self.model_range(|r| r.frequency) {
            range.check("sweep_freq_low", hz)?;
        }
        self.set("sweep_freq_low", hz / MHZ)
    }

    /// Upper sweep frequency in Hz.
    pub fn sweep_frequency_high(&mut self) -> Result<f64, DeviceError> {
        Ok(self.get::<f64>("sweep_freq_high")? * MHZ)
    }

    pub fn set_sweep_frequency_high(&mut self, hz: f64) -> Result<(), DeviceError> {
        if let Some(range) = self.model_range(|r| r.frequency) {
            range.check("sweep_freq_high", hz)?;
        }
        self.set("sweep_freq_high", hz / MHZ)
    }

    /// Sweep frequency step in Hz.
    pub fn sweep_frequency_step(&mut self) -> Result<f64, DeviceError> {
        Ok(self.get::<f64>("sweep_freq_step")? * MHZ)
    }

    pub fn set_sweep_frequency_step(&mut self, hz: f64) -> Result<(), DeviceError> {
        self.set("sweep_freq_step", hz / MHZ)
    }

    /// Dwell time per sweep step in ms.
    pub fn sweep_time_step(&mut self) -> Result<f64, DeviceError> {
        self.get("sweep_time_step")
    }

    pub fn set_sweep_time_step(&mut self, ms: f64) -> Result<(), DeviceError> {
        let range = self.model_range(|r| r.sweep_time_step);
        self.set_checked("sweep_time_step", range, ms.into())
    }

    pub fn sweep_power_low(&mut self) -> Result<f64, DeviceError> {
        self.get("sweep_power_low")
    }

    pub fn set_sweep_power_low(&mut self, dbm: f64) -> Result<(), DeviceError> {
        let range = self.model_range(|r| r.power);
        self.set_checked("sweep_power_low", range, dbm.into())
    }

    pub fn sweep_power_high(&mut self) -> Result<f64, DeviceError> {
        self.get("sweep_power_high")
    }

    pub fn set_sweep_power_high(&mut self, dbm: f64) -> Result<(), DeviceError> {
        let range = self.model_range(|r| r.power);
        self.set_checked("sweep_power_high", range, dbm.into())
    }

    pub fn sweep_direction(&mut self) -> Result<SweepDirection, DeviceError> {
        self.get_enum("sweep_direction")
    }

    pub fn set_sweep_direction(&mut self, direction: SweepDirection) -> Result<(), DeviceError> {
        self.set_enum("sweep_direction", direction)
    }

    pub fn sweep_type(&mut self) -> Result<SweepType, DeviceError> {
        self.get_enum("sweep_type")
    }

    pub fn set_sweep_type(&mut self, kind: SweepType) -> Result<(), DeviceError> {
        self.set_enum("sweep_type", kind)
    }

    /// Continuous sweep.
    pub fn sweep_enable(&mut self) -> Result<bool, DeviceError> {
        self.get("sweep_cont")
    }

    pub fn set_sweep_enable(&mut self, enable: bool) -> Result<(), DeviceError> {
        self.set("sweep_cont", enable)
    }

    pub fn sweep_single(&mut self) -> Result<bool, DeviceError> {
        self.get("sweep_single")
    }

    pub fn set_sweep_single(&mut self, run: bool) -> Result<(), DeviceError> {
        self.set("sweep_single", run)
    }

    // detector

    pub fn detect_mode(&mut self) -> Result<DetectorMode, DeviceError> {
        self.get_enum("detector_mode")
    }

    pub fn set_detect_mode(&mut self, mode: DetectorMode) -> Result<(), DeviceError> {
        self.set_enum("detector_mode", mode)
    }

    /// Power at the RFin connector in dBm.
    ///
    /// The device follows the reading with extra output, so the stream is
    /// cleared afterwards.
    pub fn measure_power(&mut self) -> Result<f64, DeviceError> {
        let power = self.get("detect_power")?;
        self.conn.clear()?;
        Ok(power)
    }

    /// Measure RFin power while sweeping RFout.
    pub fn measure_powers(&mut self) -> Result<bool, DeviceError> {
        self.get("detect_powers")
    }

    pub fn set_measure_powers(&mut self, enable: bool) -> Result<(), DeviceError> {
        self.set("detect_powers", enable)
    }

    pub fn detect_powers_style(&mut self) -> Result<DetectPowersStyle, DeviceError> {
        self.get_enum("detect_powers_styl")
    }

    pub fn set_detect_powers_style(&mut self, style: DetectPowersStyle) -> Result<(), DeviceError> {
        self.set_enum("detect_powers_styl", style)
    }

    // amplitude modulation

    /// AM time step in microseconds.
    pub fn am_time_step(&mut self) -> Result<i64, DeviceError> {
        self.get("am_time_step")
    }

    pub fn set_am_time_step(&mut self, us: i64) -> Result<(), DeviceError> {
        self.set("am_time_step", us)
    }

    pub fn am_num_samples(&mut self) -> Result<i64, DeviceError> {
        self.get("am_num_samples")
    }

    pub fn set_am_num_samples(&mut self, samples: i64) -> Result<(), DeviceError> {
        self.set("am_num_samples", samples)
    }

    pub fn am_enable(&mut self) -> Result<bool, DeviceError> {
        self.get("am_cont")
    }

    pub fn set_am_enable(&mut self, enable: bool) -> Result<(), DeviceError> {
        self.set("am_cont", enable)
    }

    /// Power in dBm stored in row `index` of the AM lookup table.
    pub fn am_lookup_row(&mut self, index: i64) -> Result<f64, DeviceError> {
        self.conn.read_as("am_lookup_table", &[index.into()])
    }

    pub fn set_am_lookup_row(&mut self, index: i64, dbm: f64) -> Result<(), DeviceError> {
        if let Some(range) = self.model_range(|r| r.power) {
            range.check("am_lookup_table", dbm)?;
        }
        self.conn
            .write("am_lookup_table", &[index.into(), dbm.into()])
    }

    // pulse modulation

    /// Pulse on time in microseconds.
    pub fn pulse_on_time(&mut self) -> Result<i64, DeviceError> {
        self.get("pulse_on_time")
    }

    pub fn set_pulse_on_time(&mut self, us: i64) -> Result<(), DeviceError> {
        let range = self.model_range(|r| r.pulse_on_time);
        self.set_checked("pulse_on_time", range, us.into())
    }

    /// Pulse off time in microseconds.
    pub fn pulse_off_time(&mut self) -> Result<i64, DeviceError> {
        self.get("pulse_off_time")
    }

    pub fn set_pulse_off_time(&mut self, us: i64) -> Result<(), DeviceError> {
        let range = self.model_range(|r| r.pulse_off_time);
        self.set_checked("pulse_off_time", range, us.into())
    }

    pub fn pulse_repetitions(&mut self) -> Result<i64, DeviceError> {
        self.get("pulse_num_rep")
    }

    pub fn set_pulse_repetitions(&mut self, count: i64) -> Result<(), DeviceError> {
        let range = self.model_range(|r| r.pulse_repetitions);
        self.set_checked("pulse_num_rep", range, count.into())
    }

    pub fn pulse_invert(&mut self) -> Result<bool, DeviceError> {
        self.get("pulse_invert")
    }

    pub fn set_pulse_invert(&mut self, invert: bool) -> Result<(), DeviceError> {
        self.set("pulse_invert", invert)
    }

    /// Runs one pulse burst.
    pub fn pulse_single(&mut self) -> Result<(), DeviceError> {
        self.conn.write("pulse_single", &[Value::Unit])
    }

    pub fn pulse_mod_enable(&mut self) -> Result<bool, DeviceError> {
        self.get("pulse_cont")
    }

    pub fn set_pulse_mod_enable(&mut self, enable: bool) -> Result<(), DeviceError> {
        self.set("pulse_cont", enable)
    }

    // frequency modulation

    /// FM rate in Hz.
    pub fn fm_frequency(&mut self) -> Result<i64, DeviceError> {
        self.get("fm_frequency")
    }

    pub fn set_fm_frequency(&mut self, hz: i64) -> Result<(), DeviceError> {
        let range = self.model_range(|r| r.fm_frequency);
        self.set_checked("fm_frequency", range, hz.into())
    }

    /// FM deviation in Hz.
    pub fn fm_deviation(&mut self) -> Result<i64, DeviceError> {
        self.get("fm_deviation")
    }

    pub fn set_fm_deviation(&mut self, hz: i64) -> Result<(), DeviceError> {
        self.set("fm_deviation", hz)
    }

    pub fn fm_num_samples(&mut self) -> Result<i64, DeviceError> {
        self.get("fm_num_samples")
    }

    pub fn set_fm_num_samples(&mut self, samples: i64) -> Result<(), DeviceError> {
        self.set("fm_num_samples", samples)
    }

    pub fn fm_type(&mut self) -> Result<FmType, DeviceError> {
        self.get_enum("fm_mod_type")
    }

    pub fn set_fm_type(&mut self, kind: FmType) -> Result<(), DeviceError> {
        self.set_enum("fm_mod_type", kind)
    }

    pub fn fm_enable(&mut self) -> Result<bool, DeviceError> {
        self.get("fm_cont")
    }

    pub fn set_fm_enable(&mut self, enable: bool) -> Result<(), DeviceError> {
        self.set("fm_cont", enable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{protocol::CodecError, sim::SimulatedSynth};

    fn open() -> (SimulatedSynth, SynthNvPro<SimulatedSynth>) {
        let sim = SimulatedSynth::synth_nv_pro();
        let synth = SynthNvPro::open("sim0", sim.clone()).unwrap();
        sim.clear_sent();
        (sim, synth)
    }

    #[test]
    fn identifies_model() {
        let (_, mut synth) = open();
        assert_eq!(synth.model(), Some(Model::SynthNvPro));
        assert_eq!(synth.model().unwrap().to_string(), "SynthNV PRO");
        assert!(synth.serial_number().unwrap() > 0);
        assert!(!synth.firmware_version().unwrap().is_empty());
    }

    #[test]
    fn unknown_model_skips_range_checks() {
        let sim = SimulatedSynth::synth_nv_pro();
        sim.set_reply("+", "SynthHD");
        let mut synth = SynthNvPro::open("sim0", sim.clone()).unwrap();

        assert_eq!(synth.model(), None);
        synth.set_frequency(1e12).unwrap();
        assert_eq!(sim.sent().last().unwrap(), "f1000000.00000000");
    }

    #[test]
    fn frequency_is_in_hz() {
        let (sim, mut synth) = open();

        synth.set_frequency(2441.2976e6).unwrap();
        assert_eq!(sim.sent(), vec!["f2441.29760000"]);

        let hz = synth.frequency().unwrap();
        assert!((hz - 2441.2976e6).abs() < 1e-2);
    }

    #[test]
    fn out_of_range_writes_nothing() {
        let (sim, mut synth) = open();

        assert!(matches!(
            synth.set_frequency(1e9 * 7.0),
            Err(DeviceError::OutOfRange {
                property: "frequency",
                ..
            })
        ));
        assert!(matches!(
            synth.set_phase(361.0),
            Err(DeviceError::OutOfRange { .. })
        ));
        assert!(matches!(
            synth.set_vga_dac(4001),
            Err(DeviceError::OutOfRange { .. })
        ));
        assert!(matches!(
            synth.set_reference_frequency(5e6),
            Err(DeviceError::OutOfRange { .. })
        ));
        assert!(sim.sent().is_empty());
    }

    #[test]
    fn enum_properties_round_trip() {
        let (sim, mut synth) = open();

        synth.set_trigger_mode(TriggerMode::AmModulation).unwrap();
        assert_eq!(synth.trigger_mode().unwrap(), TriggerMode::AmModulation);

        synth.set_reference_mode(ReferenceMode::Internal10MHz).unwrap();
        assert_eq!(synth.reference_mode().unwrap(), ReferenceMode::Internal10MHz);

        synth.set_fm_type(FmType::Sine).unwrap();
        assert_eq!(synth.fm_type().unwrap(), FmType::Sine);

        assert_eq!(sim.sent()[0], "y8");
    }

    #[test]
    fn unknown_enum_code_is_rejected() {
        let (sim, mut synth) = open();
        sim.set_reply("X?", "7");

        assert!(matches!(
            synth.sweep_type(),
            Err(DeviceError::InvalidEnumValue {
                kind: "sweep type",
                ..
            })
        ));
    }

    #[test]
    fn enable_combines_rf_and_pll() {
        let (sim, mut synth) = open();

        synth.set_enable(true).unwrap();
        assert_eq!(sim.sent(), vec!["h1", "E1"]);
        assert!(synth.enable().unwrap());

        synth.set_pll_enable(false).unwrap();
        assert!(!synth.enable().unwrap());
    }

    #[test]
    fn measure_power_discards_trailing_output() {
        let (sim, mut synth) = open();
        sim.set_reply("w", "-12.500\n2441.3 MHz -12.5 dBm");

        assert_eq!(synth.measure_power().unwrap(), -12.5);
        assert_eq!(sim.clears(), 1);
        assert!(synth.rf_enable().is_ok());
    }

    #[test]
    fn lookup_rows_are_indexed() {
        let (sim, mut synth) = open();

        synth.set_am_lookup_row(3, -12.5).unwrap();
        synth.set_am_lookup_row(4, 1.25).unwrap();
        assert_eq!(synth.am_lookup_row(3).unwrap(), -12.5);
        assert_eq!(synth.am_lookup_row(4).unwrap(), 1.25);
        assert_eq!(sim.sent()[..2], ["@3a-12.500", "@4a1.250"]);
    }

    #[test]
    fn fm_deviation_is_unchecked() {
        let (sim, mut synth) = open();

        synth.set_fm_deviation(0).unwrap();
        synth.set_fm_deviation(250_000).unwrap();
        assert_eq!(synth.fm_deviation().unwrap(), 250_000);
        assert_eq!(sim.sent()[..2], [">0", ">250000"]);

        assert!(matches!(
            synth.set_fm_frequency(5001),
            Err(DeviceError::OutOfRange {
                property: "fm_frequency",
                ..
            })
        ));
    }

    #[test]
    fn argumentless_commands() {
        let (sim, mut synth) = open();

        synth.save().unwrap();
        synth.pulse_single().unwrap();
        assert_eq!(sim.sent(), vec!["e", "G"]);
    }

    #[test]
    fn boolean_reply_outside_zero_one() {
        let (sim, mut synth) = open();
        sim.set_reply("p", "2");

        assert!(matches!(
            synth.lock_status(),
            Err(DeviceError::Codec(CodecError::InvalidBooleanReply(_)))
        ));
    }

    #[test]
    fn init_puts_device_in_safe_state() {
        let (sim, mut synth) = open();

        synth.init().unwrap();
        assert_eq!(
            sim.sent(),
            vec![
                "h0",
                "f12.50000000",
                "W-60.000",
                "~0.000",
                "Z3",
                "x1",
                "y0",
                "c0",
                "^1",
                "A0",
                "j0",
                "/0",
                "&0",
                "r0",
                "d0",
            ]
        );
        assert_eq!(synth.sweep_direction().unwrap(), SweepDirection::Forward);
        assert_eq!(
            synth.temp_compensation_mode().unwrap(),
            TempCompensation::TenSeconds
        );
    }

    #[test]
    fn sweep_settings() {
        let (sim, mut synth) = open();

        synth.set_sweep_frequency_low(100e6).unwrap();
        synth.set_sweep_frequency_high(200e6).unwrap();
        synth.set_sweep_time_step(1.5).unwrap();
        synth.set_sweep_power_low(-10.0).unwrap();
        assert_eq!(
            sim.sent(),
            vec!["l100.00000000", "u200.00000000", "t1.500", "[-10.000"]
        );
        assert!((synth.sweep_frequency_high().unwrap() - 200e6).abs() < 1e-3);
        assert!(synth.set_sweep_time_step(0.0).is_err());
    }
}
