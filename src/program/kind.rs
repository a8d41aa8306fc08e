use crate::error::ProgramError;

const PROGRAM_NAME_NONE: &str = "none";
const PROGRAM_NAME_WELDING: &str = "welding";
const PROGRAM_NAME_HEARTBEAT: &str = "heartbeat";
const PROGRAM_NAME_BREATHING: &str = "breathing";
const PROGRAM_NAME_SIMPLE_BLINK: &str = "simple_blink";
const PROGRAM_NAME_TV_FLICKER: &str = "tv_flicker";
const PROGRAM_NAME_FIREBOX_GLOW: &str = "firebox_glow";
const PROGRAM_NAME_CANDLE_FLICKER: &str = "candle_flicker";
const PROGRAM_NAME_FRENCH_CROSSING: &str = "french_crossing";

const PROGRAM_ID_NONE: u8 = 0;
const PROGRAM_ID_WELDING: u8 = 1;
const PROGRAM_ID_HEARTBEAT: u8 = 2;
const PROGRAM_ID_BREATHING: u8 = 3;
const PROGRAM_ID_SIMPLE_BLINK: u8 = 4;
const PROGRAM_ID_TV_FLICKER: u8 = 5;
const PROGRAM_ID_FIREBOX_GLOW: u8 = 6;
const PROGRAM_ID_CANDLE_FLICKER: u8 = 7;
const PROGRAM_ID_FRENCH_CROSSING: u8 = 8;

/// Known programs that can be assigned to a channel.
///
/// `None` is both a valid value and the "nothing assigned" sentinel.
/// Raw ids are stable and used for persistence.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ProgramKind {
    #[default]
    None = PROGRAM_ID_NONE,
    Welding = PROGRAM_ID_WELDING,
    Heartbeat = PROGRAM_ID_HEARTBEAT,
    Breathing = PROGRAM_ID_BREATHING,
    SimpleBlink = PROGRAM_ID_SIMPLE_BLINK,
    TvFlicker = PROGRAM_ID_TV_FLICKER,
    FireboxGlow = PROGRAM_ID_FIREBOX_GLOW,
    CandleFlicker = PROGRAM_ID_CANDLE_FLICKER,
    FrenchCrossing = PROGRAM_ID_FRENCH_CROSSING,
}

/// Static description of an assignable program
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ProgramInfo {
    pub kind: ProgramKind,
    pub name: &'static str,
    pub description: &'static str,
}

/// Every assignable program, in id order
pub const CATALOGUE: [ProgramInfo; 8] = [
    ProgramKind::Welding.info(),
    ProgramKind::Heartbeat.info(),
    ProgramKind::Breathing.info(),
    ProgramKind::SimpleBlink.info(),
    ProgramKind::TvFlicker.info(),
    ProgramKind::FireboxGlow.info(),
    ProgramKind::CandleFlicker.info(),
    ProgramKind::FrenchCrossing.info(),
];

impl ProgramKind {
    pub const fn from_raw(value: u8) -> Option<Self> {
        Some(match value {
            PROGRAM_ID_NONE => Self::None,
            PROGRAM_ID_WELDING => Self::Welding,
            PROGRAM_ID_HEARTBEAT => Self::Heartbeat,
            PROGRAM_ID_BREATHING => Self::Breathing,
            PROGRAM_ID_SIMPLE_BLINK => Self::SimpleBlink,
            PROGRAM_ID_TV_FLICKER => Self::TvFlicker,
            PROGRAM_ID_FIREBOX_GLOW => Self::FireboxGlow,
            PROGRAM_ID_CANDLE_FLICKER => Self::CandleFlicker,
            PROGRAM_ID_FRENCH_CROSSING => Self::FrenchCrossing,
            _ => return None,
        })
    }

    pub const fn as_raw(self) -> u8 {
        self as u8
    }

    pub const fn is_none(self) -> bool {
        matches!(self, Self::None)
    }

    /// Stable machine name
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::None => PROGRAM_NAME_NONE,
            Self::Welding => PROGRAM_NAME_WELDING,
            Self::Heartbeat => PROGRAM_NAME_HEARTBEAT,
            Self::Breathing => PROGRAM_NAME_BREATHING,
            Self::SimpleBlink => PROGRAM_NAME_SIMPLE_BLINK,
            Self::TvFlicker => PROGRAM_NAME_TV_FLICKER,
            Self::FireboxGlow => PROGRAM_NAME_FIREBOX_GLOW,
            Self::CandleFlicker => PROGRAM_NAME_CANDLE_FLICKER,
            Self::FrenchCrossing => PROGRAM_NAME_FRENCH_CROSSING,
        }
    }

    pub fn parse_from_str(s: &str) -> Option<Self> {
        match s {
            PROGRAM_NAME_NONE => Some(Self::None),
            PROGRAM_NAME_WELDING => Some(Self::Welding),
            PROGRAM_NAME_HEARTBEAT => Some(Self::Heartbeat),
            PROGRAM_NAME_BREATHING => Some(Self::Breathing),
            PROGRAM_NAME_SIMPLE_BLINK => Some(Self::SimpleBlink),
            PROGRAM_NAME_TV_FLICKER => Some(Self::TvFlicker),
            PROGRAM_NAME_FIREBOX_GLOW => Some(Self::FireboxGlow),
            PROGRAM_NAME_CANDLE_FLICKER => Some(Self::CandleFlicker),
            PROGRAM_NAME_FRENCH_CROSSING => Some(Self::FrenchCrossing),
            _ => None,
        }
    }

    /// Human-readable name
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::None => "None",
            Self::Welding => "Welding",
            Self::Heartbeat => "Heartbeat",
            Self::Breathing => "Breathing",
            Self::SimpleBlink => "Simple Blink",
            Self::TvFlicker => "TV Flicker",
            Self::FireboxGlow => "Firebox Glow",
            Self::CandleFlicker => "Candle Flicker",
            Self::FrenchCrossing => "French Level Crossing",
        }
    }

    /// One-line description
    pub const fn description(self) -> &'static str {
        match self {
            Self::None => "No program",
            Self::Welding => "Simulates welding arc flashes with random intensity and timing",
            Self::Heartbeat => "Simulates a heartbeat rhythm with double pulse pattern",
            Self::Breathing => "Slow breathing fade with eased inhale and exhale",
            Self::SimpleBlink => "Simple 1 second on/off blinking pattern",
            Self::TvFlicker => "Television screen flickering with random intensity changes",
            Self::FireboxGlow => {
                "Wood fire simulation with crackling flames, ember pops and wind effects"
            }
            Self::CandleFlicker => {
                "Gentle candle or gas lamp flame flickering with organic variations"
            }
            Self::FrenchCrossing => {
                "French railway level crossing light with realistic filament bulb behavior"
            }
        }
    }

    pub const fn info(self) -> ProgramInfo {
        ProgramInfo {
            kind: self,
            name: self.display_name(),
            description: self.description(),
        }
    }
}

impl TryFrom<u8> for ProgramKind {
    type Error = ProgramError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::from_raw(value).ok_or(ProgramError::UnknownProgram(value))
    }
}

impl From<ProgramKind> for u8 {
    fn from(kind: ProgramKind) -> Self {
        kind.as_raw()
    }
}
