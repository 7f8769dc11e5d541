mod tests {
    use segment_light_engine::color::degrees_to_enhanced_hue;
    use segment_light_engine::{Rgb, hsv_to_rgb, rgb_to_xy, xy_to_rgb, zcl_hue_to_degrees};

    #[test]
    fn primary_hues() {
        assert_eq!(hsv_to_rgb(0, 254, 255), Rgb { r: 255, g: 0, b: 0 });
        assert_eq!(hsv_to_rgb(120, 254, 255), Rgb { r: 0, g: 255, b: 0 });
        assert_eq!(hsv_to_rgb(240, 254, 255), Rgb { r: 0, g: 0, b: 255 });
    }

    #[test]
    fn zero_saturation_is_gray() {
        assert_eq!(
            hsv_to_rgb(123, 0, 200),
            Rgb {
                r: 200,
                g: 200,
                b: 200
            }
        );
    }

    #[test]
    fn wrapped_negative_hue_matches_normalized() {
        // -60 degrees as a u16 bit pattern must render like 300 degrees
        assert_eq!(hsv_to_rgb(65476, 254, 255), hsv_to_rgb(300, 254, 255));
    }

    #[test]
    fn overshoot_hue_matches_normalized() {
        assert_eq!(hsv_to_rgb(480, 254, 255), hsv_to_rgb(120, 254, 255));
    }

    #[test]
    fn value_scales_brightness() {
        let dim = hsv_to_rgb(0, 254, 64);
        assert_eq!(dim.r, 64);
        assert_eq!(dim.g, 0);
        assert_eq!(dim.b, 0);
    }

    #[test]
    fn zcl_hue_rescale() {
        assert_eq!(zcl_hue_to_degrees(0), 0);
        assert_eq!(zcl_hue_to_degrees(127), 180);
        assert_eq!(zcl_hue_to_degrees(254), 360);
    }

    #[test]
    fn enhanced_hue_rescale() {
        assert_eq!(degrees_to_enhanced_hue(0), 0);
        assert_eq!(degrees_to_enhanced_hue(360), 65535);
        assert_eq!(degrees_to_enhanced_hue(120), 21845);
    }

    #[test]
    fn black_falls_back_to_d65_white_point() {
        let (x, y) = rgb_to_xy(Rgb { r: 0, g: 0, b: 0 });
        let x = f32::from(x) / 65535.0;
        let y = f32::from(y) / 65535.0;
        assert!((x - 0.31271).abs() < 1e-3);
        assert!((y - 0.32902).abs() < 1e-3);
    }

    #[test]
    fn white_is_near_d65() {
        let (x, y) = rgb_to_xy(Rgb {
            r: 255,
            g: 255,
            b: 255,
        });
        let x = f32::from(x) / 65535.0;
        let y = f32::from(y) / 65535.0;
        assert!((x - 0.31271).abs() < 0.005);
        assert!((y - 0.32902).abs() < 0.005);
    }

    #[test]
    fn red_chromaticity() {
        // sRGB red primary sits near (0.64, 0.33)
        let (x, y) = rgb_to_xy(Rgb { r: 255, g: 0, b: 0 });
        let x = f32::from(x) / 65535.0;
        let y = f32::from(y) / 65535.0;
        assert!((x - 0.64).abs() < 0.01);
        assert!((y - 0.33).abs() < 0.01);
    }

    #[test]
    fn xy_round_trip_preserves_dominant_channel() {
        let original = Rgb { r: 255, g: 40, b: 20 };
        let (x, y) = rgb_to_xy(original);
        let restored = xy_to_rgb(x, y, 200);
        assert!(restored.r > restored.g);
        assert!(restored.g >= restored.b);
    }

    #[test]
    fn degenerate_y_does_not_divide_by_zero() {
        let rgb = xy_to_rgb(20000, 0, 128);
        // Only reachability matters: output must be a defined color
        let _ = (rgb.r, rgb.g, rgb.b);
    }
}
