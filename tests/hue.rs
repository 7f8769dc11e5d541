mod tests {
    use embassy_time::Instant;
    use segment_light_engine::{Transition, normalize_hue, shortest_arc, start_hue_transition};

    #[test]
    fn normalize_in_range_is_identity() {
        assert_eq!(normalize_hue(0), 0);
        assert_eq!(normalize_hue(359), 359);
        assert_eq!(normalize_hue(360), 0);
    }

    #[test]
    fn normalize_handles_wrapped_negatives() {
        // -60 stored as the two's-complement bit pattern
        assert_eq!(normalize_hue(65476), 300);
        // -1
        assert_eq!(normalize_hue(65535), 359);
    }

    #[test]
    fn normalize_handles_overshoot() {
        assert_eq!(normalize_hue(400), 40);
        assert_eq!(normalize_hue(720), 0);
    }

    #[test]
    fn arc_is_identity_within_half_turn() {
        assert_eq!(shortest_arc(0, 90), 90);
        assert_eq!(shortest_arc(200, 30), 30);
        assert_eq!(shortest_arc(0, 180), 180);
    }

    #[test]
    fn arc_wraps_downward_through_zero() {
        // 10 -> 300 is shorter backwards through 0
        assert_eq!(shortest_arc(10, 300), -60);
    }

    #[test]
    fn arc_wraps_upward_through_360() {
        // 300 -> 10 is shorter forwards through 360
        assert_eq!(shortest_arc(300, 10), 370);
    }

    #[test]
    fn arc_never_exceeds_half_turn() {
        for current in (0u16..360).step_by(7) {
            for target in (0u16..360).step_by(11) {
                let adjusted = shortest_arc(current, target);
                assert!(
                    (adjusted - current as i16).abs() <= 180,
                    "arc {current} -> {target} gave {adjusted}"
                );
                assert_eq!(adjusted.rem_euclid(360) as u16, target);
            }
        }
    }

    #[test]
    fn hue_transition_takes_short_way_through_zero() {
        let mut t = Transition::new();
        t.seed(10);
        start_hue_transition(&mut t, 300, 1000, Instant::from_millis(0));

        // Halfway along the 70 degree arc 10 -> 0 -> 300
        t.tick(Instant::from_millis(500));
        assert_eq!(normalize_hue(t.value()), 335);

        t.tick(Instant::from_millis(1000));
        assert_eq!(normalize_hue(t.value()), 300);
        assert!(!t.is_active());
    }

    #[test]
    fn hue_transition_takes_short_way_through_360() {
        let mut t = Transition::new();
        t.seed(300);
        start_hue_transition(&mut t, 10, 1000, Instant::from_millis(0));

        t.tick(Instant::from_millis(500));
        assert_eq!(normalize_hue(t.value()), 335);

        t.tick(Instant::from_millis(1000));
        assert_eq!(normalize_hue(t.value()), 10);
    }

    #[test]
    fn retarget_from_wrapped_value_renormalizes() {
        let mut t = Transition::new();
        // A prior arc-adjusted transition can complete above 360
        t.seed(370);
        start_hue_transition(&mut t, 90, 1000, Instant::from_millis(0));

        // 370 normalizes to 10; 10 -> 90 is a direct 80 degree arc
        t.tick(Instant::from_millis(500));
        assert_eq!(normalize_hue(t.value()), 50);
        t.tick(Instant::from_millis(1000));
        assert_eq!(normalize_hue(t.value()), 90);
    }

    #[test]
    fn every_intermediate_stays_on_the_short_arc() {
        let mut t = Transition::new();
        t.seed(350);
        start_hue_transition(&mut t, 40, 1000, Instant::from_millis(0));

        // The 50 degree arc runs 350 -> 360/0 -> 40; no intermediate may
        // wander into the far side of the wheel.
        for ms in (0..=1000).step_by(50) {
            t.tick(Instant::from_millis(ms));
            let hue = normalize_hue(t.value());
            assert!(hue >= 350 || hue <= 40, "intermediate hue {hue} off-arc");
        }
    }

    #[test]
    fn zero_duration_hue_change_is_instant() {
        let mut t = Transition::new();
        t.seed(10);
        start_hue_transition(&mut t, 300, 0, Instant::from_millis(0));
        assert!(!t.is_active());
        assert_eq!(normalize_hue(t.value()), 300);
    }
}
