mod tests {
    use pwm_light_programs::duty::{
        MAX_DUTY, clamp_between, clamp_duty, duty_to_percent, percent_to_duty, progress,
        scale_duty,
    };

    #[test]
    fn test_clamp_duty() {
        assert_eq!(clamp_duty(-20), 0);
        assert_eq!(clamp_duty(1_234), 1_234);
        assert_eq!(clamp_duty(5_000), MAX_DUTY);
    }

    #[test]
    fn test_clamp_between() {
        assert_eq!(clamp_between(100, 200, 2_500), 200);
        assert_eq!(clamp_between(3_000, 200, 2_500), 2_500);
        assert_eq!(clamp_between(900, 200, 2_500), 900);
        assert_eq!(clamp_between(5_000, 200, 5_000), MAX_DUTY);
    }

    #[test]
    fn test_scale_duty_truncates() {
        assert_eq!(scale_duty(4_095, 0.5), 2_047);
        assert_eq!(scale_duty(4_095, 0.0), 0);
        assert_eq!(scale_duty(1_000, 2.0), 2_000);
        assert_eq!(scale_duty(4_095, 2.0), MAX_DUTY);
        assert_eq!(scale_duty(4_095, -1.0), 0);
        assert_eq!(scale_duty(4_095, f32::NAN), 0);
    }

    #[test]
    fn test_progress() {
        assert_eq!(progress(0, 100), 0.0);
        assert_eq!(progress(50, 100), 0.5);
        assert_eq!(progress(100, 100), 1.0);
        assert_eq!(progress(250, 100), 1.0);
        assert_eq!(progress(10, 0), 1.0);
    }

    #[test]
    fn test_percent_conversion() {
        assert_eq!(percent_to_duty(100.0), MAX_DUTY);
        assert_eq!(percent_to_duty(0.0), 0);
        assert_eq!(percent_to_duty(150.0), MAX_DUTY);
        assert_eq!(percent_to_duty(-5.0), 0);
        assert_eq!(duty_to_percent(MAX_DUTY), 100.0);
        assert_eq!(duty_to_percent(0), 0.0);
    }
}
