//! 12-bit duty value helpers.

/// Maximum duty value of a 12-bit PWM output
pub const MAX_DUTY: u16 = 4095;

/// Clamp a signed intermediate value into `0..=MAX_DUTY`
#[inline]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub const fn clamp_duty(value: i32) -> u16 {
    if value < 0 {
        0
    } else if value > MAX_DUTY as i32 {
        MAX_DUTY
    } else {
        value as u16
    }
}

/// Clamp a signed value into `min..=max`, then into the duty range
#[inline]
pub const fn clamp_between(value: i32, min: u16, max: u16) -> u16 {
    let value = if value < min as i32 {
        min as i32
    } else if value > max as i32 {
        max as i32
    } else {
        value
    };
    clamp_duty(value)
}

/// Scale a duty value by a factor, truncating like an integer PWM register would
#[inline]
#[allow(clippy::cast_possible_truncation)]
pub fn scale_duty(duty: u16, factor: f32) -> u16 {
    let scaled = f32::from(duty) * factor;
    if scaled.is_nan() {
        return 0;
    }
    clamp_duty(scaled as i32)
}

/// Calculate progress (0.0-1.0) of `elapsed` through `duration` milliseconds
#[inline]
#[allow(clippy::cast_precision_loss)]
pub fn progress(elapsed_ms: u64, duration_ms: u64) -> f32 {
    if duration_ms == 0 || elapsed_ms >= duration_ms {
        return 1.0;
    }
    elapsed_ms as f32 / duration_ms as f32
}

/// Duty value as a percentage of full scale
#[inline]
pub fn duty_to_percent(duty: u16) -> f32 {
    f32::from(duty.min(MAX_DUTY)) / f32::from(MAX_DUTY) * 100.0
}

/// Duty value for a percentage of full scale, clamped to `0.0..=100.0`
#[inline]
pub fn percent_to_duty(percent: f32) -> u16 {
    let percent = if percent.is_nan() {
        0.0
    } else {
        percent.clamp(0.0, 100.0)
    };
    scale_duty(MAX_DUTY, percent / 100.0)
}
