use crate::duty::MAX_DUTY;

/// Full-scale count of the PCA9685 ON/OFF registers
const FULL_SCALE: u16 = 4096;

/// Register-level command for one PWM output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PwmOutput {
    /// Output held low
    FullOff,
    /// Output held high
    FullOn,
    /// Output high for `duty` counts out of 4096
    Duty(u16),
}

impl PwmOutput {
    /// Output command for a channel's enabled flag and duty value
    pub const fn for_channel(enabled: bool, duty: u16) -> Self {
        if !enabled || duty == 0 {
            Self::FullOff
        } else if duty >= MAX_DUTY {
            Self::FullOn
        } else {
            Self::Duty(duty)
        }
    }

    /// ON and OFF counts as written to the LEDn registers
    pub const fn counts(self) -> (u16, u16) {
        match self {
            Self::FullOff => (0, FULL_SCALE),
            Self::FullOn => (FULL_SCALE, 0),
            Self::Duty(duty) => (0, duty),
        }
    }

    /// Duty value this command produces
    pub const fn duty(self) -> u16 {
        match self {
            Self::FullOff => 0,
            Self::FullOn => MAX_DUTY,
            Self::Duty(duty) => duty,
        }
    }
}
