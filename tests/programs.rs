mod tests {
    use embassy_time::{Duration, Instant};
    use pwm_light_programs::program::{
        CANDLE_MAX_INTENSITY, CANDLE_MIN_INTENSITY, CATALOGUE, FIREBOX_MAX_INTENSITY,
        FIREBOX_MIN_INTENSITY, FlashPhase, HEARTBEAT_INTENSITY, HEARTBEAT_SECOND_INTENSITY,
        ProgramKind, ProgramState, RuntimeState, TV_FLICKER_MAX_INTENSITY,
        TV_FLICKER_MIN_INTENSITY, smooth_toward,
    };
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    fn at(ms: u64) -> Instant {
        Instant::from_millis(ms)
    }

    fn rng() -> SmallRng {
        SmallRng::seed_from_u64(42)
    }

    /// First output of a program started at 0 and ticked once at `ms`
    fn sample(kind: ProgramKind, ms: u64) -> Option<u16> {
        let mut rng = rng();
        let mut state = ProgramState::start(kind, at(0), &mut rng).unwrap();
        state.tick(at(ms), 0, &mut rng)
    }

    /// Run a program from 0 to `until_ms` in `step_ms` ticks, feeding the
    /// output back as the displayed duty. Returns `(time, duty)` for every
    /// tick that produced a value.
    fn run(kind: ProgramKind, seed: u64, until_ms: u64, step_ms: u64) -> Vec<(u64, u16)> {
        let mut rng = SmallRng::seed_from_u64(seed);
        let mut state = ProgramState::start(kind, at(0), &mut rng).unwrap();
        let mut duty = 0;
        let mut outputs = Vec::new();
        for ms in (0..until_ms).step_by(step_ms as usize) {
            if let Some(next) = state.tick(at(ms), duty, &mut rng) {
                duty = next;
                outputs.push((ms, next));
            }
        }
        outputs
    }

    #[test]
    fn test_start_none_has_no_state() {
        assert!(ProgramState::start(ProgramKind::None, at(0), &mut rng()).is_none());
    }

    #[test]
    fn test_state_reports_kind() {
        for info in CATALOGUE {
            let state = ProgramState::start(info.kind, at(0), &mut rng()).unwrap();
            assert_eq!(state.kind(), info.kind);
            assert_eq!(state.runtime().last_update, None);
        }
    }

    #[test]
    fn test_runtime_is_due() {
        let mut state = RuntimeState::new();
        assert!(state.is_due(at(0), Duration::from_millis(20)));

        state.last_update = Some(at(100));
        assert!(!state.is_due(at(119), Duration::from_millis(20)));
        assert!(state.is_due(at(120), Duration::from_millis(20)));
        // Clock going backwards never panics
        assert!(!state.is_due(at(50), Duration::from_millis(20)));
    }

    #[test]
    fn test_runtime_cycle_time_anchors_once() {
        let mut state = RuntimeState::new();
        assert_eq!(state.cycle_time(at(500), 1_000), 0);
        assert_eq!(state.start_time, Some(at(500)));
        assert_eq!(state.cycle_time(at(1_750), 1_000), 250);
    }

    #[test]
    fn test_heartbeat_pattern() {
        let kind = ProgramKind::Heartbeat;
        assert_eq!(sample(kind, 0), Some(HEARTBEAT_INTENSITY));
        assert_eq!(sample(kind, 99), Some(HEARTBEAT_INTENSITY));
        assert_eq!(sample(kind, 100), Some(0));
        assert_eq!(sample(kind, 179), Some(0));
        assert_eq!(sample(kind, 180), Some(HEARTBEAT_SECOND_INTENSITY));
        assert_eq!(sample(kind, 239), Some(HEARTBEAT_SECOND_INTENSITY));
        assert_eq!(sample(kind, 240), Some(0));
        assert_eq!(sample(kind, 999), Some(0));
        assert_eq!(sample(kind, 1_050), Some(HEARTBEAT_INTENSITY));
    }

    #[test]
    fn test_heartbeat_second_beat_is_sixty_percent() {
        assert_eq!(HEARTBEAT_SECOND_INTENSITY, 2_100);
    }

    #[test]
    fn test_simple_blink_pattern() {
        let kind = ProgramKind::SimpleBlink;
        assert_eq!(sample(kind, 0), Some(4095));
        assert_eq!(sample(kind, 999), Some(4095));
        assert_eq!(sample(kind, 1_000), Some(0));
        assert_eq!(sample(kind, 1_999), Some(0));
        assert_eq!(sample(kind, 2_000), Some(4095));
    }

    #[test]
    fn test_breathing_phases() {
        let kind = ProgramKind::Breathing;
        assert_eq!(sample(kind, 0), Some(0));

        let mid_inhale = sample(kind, 750).unwrap();
        assert!((2_880..=2_910).contains(&mid_inhale), "got {mid_inhale}");

        assert_eq!(sample(kind, 1_500), Some(4095));
        assert_eq!(sample(kind, 1_999), Some(4095));
        assert_eq!(sample(kind, 2_000), Some(4095));

        let mid_exhale = sample(kind, 2_750).unwrap();
        assert!((2_880..=2_910).contains(&mid_exhale), "got {mid_exhale}");

        assert_eq!(sample(kind, 3_500), Some(0));
        assert_eq!(sample(kind, 3_999), Some(0));
    }

    #[test]
    fn test_breathing_inhale_rises() {
        let outputs = run(ProgramKind::Breathing, 1, 1_500, 20);
        assert!(outputs.windows(2).all(|pair| pair[0].1 <= pair[1].1));
    }

    #[test]
    fn test_french_crossing_filament() {
        let outputs = run(ProgramKind::FrenchCrossing, 3, 2_000, 10);
        assert_eq!(outputs.len(), 200);

        for &(ms, duty) in &outputs {
            let phase = ms % 1_000;
            if phase == 0 {
                assert_eq!(duty, 0, "at {ms}");
            } else if phase == 50 {
                assert!((3_500..=3_600).contains(&duty), "at {ms}: {duty}");
            } else if (100..500).contains(&phase) {
                assert!((4_045..=4_095).contains(&duty), "at {ms}: {duty}");
            } else if phase >= 650 {
                assert_eq!(duty, 0, "at {ms}");
            }
        }

        let warm_up: Vec<_> = outputs.iter().filter(|(ms, _)| *ms < 100).collect();
        assert!(warm_up.windows(2).all(|pair| pair[0].1 <= pair[1].1));

        let cool_down: Vec<_> = outputs
            .iter()
            .filter(|(ms, _)| (500..650).contains(ms))
            .collect();
        assert!(cool_down[0].1 >= 4_000);
        assert!(cool_down.windows(2).all(|pair| pair[0].1 >= pair[1].1));
    }

    #[test]
    fn test_french_crossing_edge_detection() {
        let mut rng = rng();
        let mut state = ProgramState::start(ProgramKind::FrenchCrossing, at(0), &mut rng).unwrap();

        state.tick(at(0), 0, &mut rng);
        state.tick(at(490), 4_090, &mut rng);
        state.tick(at(500), 4_070, &mut rng);

        let ProgramState::FrenchCrossing(program) = &state else {
            panic!("unexpected state {state:?}");
        };
        let lamp = program.lamp();
        assert!(!lamp.lit);
        assert_eq!(lamp.since, at(500));
        assert_eq!(lamp.extinguished_from, 4_070);

        // Same half-cycle keeps its anchor
        state.tick(at(510), 4_000, &mut rng);
        let ProgramState::FrenchCrossing(program) = &state else {
            panic!("unexpected state {state:?}");
        };
        assert_eq!(program.lamp().since, at(500));
    }

    #[test]
    fn test_welding_waits_for_first_flash() {
        let outputs = run(ProgramKind::Welding, 9, 1_000, 10);
        assert!(outputs.is_empty());
    }

    #[test]
    fn test_welding_flashes() {
        let outputs = run(ProgramKind::Welding, 9, 30_000, 10);
        assert!(outputs.iter().any(|&(_, duty)| duty > 0));
        assert!(outputs.iter().any(|&(_, duty)| duty == 0));
        assert!(outputs.iter().all(|&(_, duty)| duty <= 3_200));
    }

    #[test]
    fn test_welding_hold_ends_at_38_5_ms() {
        assert_eq!(FlashPhase::at(0), FlashPhase::Hold);
        assert_eq!(FlashPhase::at(38), FlashPhase::Hold);

        // 0.5 ms into a 16.5 ms fade
        let FlashPhase::Fade(fade) = FlashPhase::at(39) else {
            panic!("expected fade at 39 ms");
        };
        assert!((fade - 5.0 / 165.0).abs() < 1e-6);

        let FlashPhase::Fade(fade) = FlashPhase::at(54) else {
            panic!("expected fade at 54 ms");
        };
        assert!((fade - 155.0 / 165.0).abs() < 1e-6);

        assert_eq!(FlashPhase::at(55), FlashPhase::Done);
        assert_eq!(FlashPhase::at(1_000), FlashPhase::Done);
    }

    #[test]
    fn test_tv_flicker_range_and_spacing() {
        let mut rng = rng();
        let mut state = ProgramState::start(ProgramKind::TvFlicker, at(0), &mut rng).unwrap();

        let first = state.tick(at(0), 0, &mut rng).unwrap();
        assert!((TV_FLICKER_MIN_INTENSITY..=TV_FLICKER_MAX_INTENSITY).contains(&first));
        // Events are at least 40 ms apart
        assert_eq!(state.tick(at(20), first, &mut rng), None);

        let outputs = run(ProgramKind::TvFlicker, 5, 60_000, 10);
        assert!(outputs.len() > 100);
        assert!(outputs.iter().all(|&(_, duty)| {
            (TV_FLICKER_MIN_INTENSITY..=TV_FLICKER_MAX_INTENSITY).contains(&duty)
        }));
    }

    #[test]
    fn test_firebox_rate_limits_from_dark() {
        assert_eq!(sample(ProgramKind::FireboxGlow, 0), Some(150));
    }

    #[test]
    fn test_firebox_settles_in_range() {
        let outputs = run(ProgramKind::FireboxGlow, 11, 60_000, 10);
        assert!(
            outputs
                .iter()
                .filter(|(ms, _)| *ms >= 1_000)
                .all(|&(_, duty)| (FIREBOX_MIN_INTENSITY..=FIREBOX_MAX_INTENSITY).contains(&duty))
        );
    }

    #[test]
    fn test_firebox_flares_occur() {
        let mut rng = SmallRng::seed_from_u64(13);
        let mut state = ProgramState::start(ProgramKind::FireboxGlow, at(0), &mut rng).unwrap();
        let mut duty = 0;
        let mut flared = false;
        for ms in (0..60_000).step_by(20) {
            if let Some(next) = state.tick(at(ms), duty, &mut rng) {
                duty = next;
            }
            if let ProgramState::FireboxGlow(program) = &state {
                flared |= program.flare().is_some();
            }
        }
        assert!(flared);
    }

    #[test]
    fn test_candle_smoothing_steps() {
        assert_eq!(smooth_toward(0, 1_000), 80);
        assert_eq!(smooth_toward(1_000, 0), 920);
        assert_eq!(smooth_toward(1_000, 1_201), 1_080);
        assert_eq!(smooth_toward(1_000, 1_200), 1_066);
        assert_eq!(smooth_toward(1_000, 1_150), 1_050);
        assert_eq!(smooth_toward(1_000, 940), 980);
        assert_eq!(smooth_toward(1_000, 1_040), 1_040);
        assert_eq!(smooth_toward(1_000, 1_000), 1_000);
    }

    #[test]
    fn test_candle_settles_in_range() {
        let outputs = run(ProgramKind::CandleFlicker, 17, 60_000, 10);
        // Ramps up from dark in fixed steps
        assert_eq!(outputs[0].1, 80);
        assert!(
            outputs
                .iter()
                .filter(|(ms, _)| *ms >= 2_000)
                .all(|&(_, duty)| (CANDLE_MIN_INTENSITY..=CANDLE_MAX_INTENSITY).contains(&duty))
        );
    }

    #[test]
    fn test_every_program_stays_in_duty_range() {
        for (seed, info) in CATALOGUE.iter().enumerate() {
            let outputs = run(info.kind, seed as u64, 30_000, 10);
            assert!(!outputs.is_empty(), "{} never produced a value", info.name);
            assert!(outputs.iter().all(|&(_, duty)| duty <= 4_095));
        }
    }
}
