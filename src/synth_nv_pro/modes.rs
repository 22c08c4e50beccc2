//! Closed enumerations for the integer-coded SynthNV PRO settings.
//!
//! Each type maps its variants to the integer the device uses on the wire and
//! to the display name used by the CLI. Unknown names or codes are rejected
//! with [`DeviceError::InvalidEnumValue`].
use std::{fmt, str::FromStr};

use crate::device::DeviceError;

/// Integer-coded device setting.
pub trait WireEnum: Sized + Copy + 'static {
    /// Human readable name of the setting, used in errors.
    const KIND: &'static str;
    const ALL: &'static [Self];

    fn code(self) -> i64;
    fn name(self) -> &'static str;

    fn from_code(code: i64) -> Result<Self, DeviceError> {
        Self::ALL
            .iter()
            .copied()
            .find(|v| v.code() == code)
            .ok_or_else(|| DeviceError::InvalidEnumValue {
                kind: Self::KIND,
                value: code.to_string(),
            })
    }

    /// Case-insensitive lookup by name; the first variant wins on duplicates.
    fn from_name(name: &str) -> Result<Self, DeviceError> {
        Self::ALL
            .iter()
            .copied()
            .find(|v| v.name().eq_ignore_ascii_case(name.trim()))
            .ok_or_else(|| DeviceError::InvalidEnumValue {
                kind: Self::KIND,
                value: name.to_string(),
            })
    }
}

macro_rules! wire_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $kind:literal {
            $($variant:ident = $code:literal => $text:literal,)+
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant,)+
        }

        impl WireEnum for $name {
            const KIND: &'static str = $kind;
            const ALL: &'static [Self] = &[$($name::$variant,)+];

            fn code(self) -> i64 {
                match self {
                    $($name::$variant => $code,)+
                }
            }

            fn name(self) -> &'static str {
                match self {
                    $($name::$variant => $text,)+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.name())
            }
        }

        impl FromStr for $name {
            type Err = DeviceError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::from_name(s)
            }
        }
    };
}

wire_enum! {
    /// What the trigger input does.
    TriggerMode, "trigger mode" {
        Disabled = 0 => "disabled",
        FullFrequencySweep = 1 => "full frequency sweep",
        SingleFrequencyStep = 2 => "single frequency step",
        StopAll = 3 => "stop all",
        RfEnable = 4 => "rf enable",
        RemoveInterrupts = 5 => "remove interrupts",
        Reserved6 = 6 => "reserved",
        Reserved7 = 7 => "reserved",
        AmModulation = 8 => "am modulation",
        FmModulation = 9 => "fm modulation",
    }
}

wire_enum! {
    ReferenceMode, "reference mode" {
        External = 0 => "external",
        Internal27MHz = 1 => "internal 27MHz",
        Internal10MHz = 2 => "internal 10MHz",
    }
}

wire_enum! {
    SweepType, "sweep type" {
        Linear = 0 => "linear",
        Tabular = 1 => "tabular",
        Percentage = 2 => "percentage",
    }
}

wire_enum! {
    SweepDirection, "sweep direction" {
        Reverse = 0 => "reverse",
        Forward = 1 => "forward",
    }
}

wire_enum! {
    /// How often the synthesizer re-calibrates against temperature drift.
    TempCompensation, "temperature compensation mode" {
        None = 0 => "none",
        OnSet = 1 => "on set",
        OneSecond = 2 => "1 sec",
        TenSeconds = 3 => "10 sec",
    }
}

wire_enum! {
    FmType, "FM type" {
        Chirp = 0 => "chirp",
        Sine = 1 => "sine",
    }
}

wire_enum! {
    DetectorMode, "detector mode" {
        Instant = 0 => "instant",
        Average = 1 => "average",
        Uncalibrated = 2 => "uncalibrated",
    }
}

wire_enum! {
    /// Display style of powers measured during an RF sweep.
    DetectPowersStyle, "detect powers style" {
        None = 0 => "none",
        MhzAndDbm = 1 => "MHz and dBm",
        Dbm = 2 => "dBm",
    }
}
