mod tests {
    use std::collections::HashMap;

    use embassy_time::{Duration, Instant};
    use segment_light_engine::sync::diff_snapshot;
    use segment_light_engine::{
        AttributeSink, ColorMode, CommandQueue, ExternalSnapshot, LightChange, LightEngine,
        PixelSink, PowerOnBehavior, QueueFull, SegmentCommand, SegmentReport, StateStore,
        StoreError, TickScheduler,
    };

    const SEGS: usize = 4;
    const POOL: usize = 16;
    const QUEUE: usize = 8;
    const STRIP_LEN: usize = 16;

    type Engine<'a> = LightEngine<'a, SEGS, POOL, QUEUE>;

    struct BufferSink {
        strips: [[(u8, u8, u8, u8); STRIP_LEN]; 2],
    }

    impl BufferSink {
        fn new() -> Self {
            Self {
                strips: [[(0, 0, 0, 0); STRIP_LEN]; 2],
            }
        }
    }

    impl PixelSink for BufferSink {
        fn strip_count(&self) -> u8 {
            2
        }

        fn strip_len(&self, _strip: u8) -> u16 {
            STRIP_LEN as u16
        }

        fn clear(&mut self, strip: u8) {
            self.strips[usize::from(strip)] = [(0, 0, 0, 0); STRIP_LEN];
        }

        fn set_pixel(&mut self, strip: u8, index: u16, r: u8, g: u8, b: u8, w: u8) {
            self.strips[usize::from(strip)][usize::from(index)] = (r, g, b, w);
        }

        fn refresh(&mut self) {}
    }

    #[derive(Default)]
    struct MemStore {
        blobs: HashMap<String, Vec<u8>>,
        saves: usize,
    }

    impl StateStore for MemStore {
        fn load(&mut self, key: &str, buf: &mut [u8]) -> Result<usize, StoreError> {
            let blob = self.blobs.get(key).ok_or(StoreError::NotFound)?;
            let len = blob.len().min(buf.len());
            buf[..len].copy_from_slice(&blob[..len]);
            Ok(len)
        }

        fn save(&mut self, key: &str, data: &[u8]) -> Result<(), StoreError> {
            self.saves += 1;
            self.blobs.insert(key.into(), data.into());
            Ok(())
        }
    }

    #[derive(Default)]
    struct ReportSink {
        reports: Vec<(u8, SegmentReport)>,
    }

    impl AttributeSink for ReportSink {
        fn publish(&mut self, segment: u8, report: &SegmentReport) {
            self.reports.push((segment, *report));
        }
    }

    #[test]
    fn fresh_engine_starts_at_committed_defaults() {
        let queue: CommandQueue<QUEUE> = CommandQueue::new();
        let engine = Engine::new(queue.receiver(), STRIP_LEN as u16).unwrap();

        // Transitions must sit at the defaults before any boot or command,
        // so the first fade moves from 128, not up from zero.
        for light in engine.store().light() {
            assert_eq!(engine.pool().value(light.fades.level), 128);
            assert_eq!(engine.pool().value(light.fades.color_temp), 250);
            assert!(!engine.pool().is_active(light.fades.level));
        }
    }

    #[test]
    fn commands_start_transitions_with_default_duration() {
        let queue: CommandQueue<QUEUE> = CommandQueue::new();
        let mut engine = Engine::new(queue.receiver(), STRIP_LEN as u16).unwrap();
        let sender = queue.sender();
        let mut sink = BufferSink::new();

        sender
            .try_send(SegmentCommand::new(0, LightChange::Power(true)))
            .unwrap();
        sender
            .try_send(SegmentCommand::new(0, LightChange::Level(228)))
            .unwrap();

        assert!(engine.service(Instant::from_millis(0), &mut sink));

        // Default 100 ms fade from the default level 128 toward 228
        let fade = engine.store().light()[0].fades.level;
        assert!(engine.pool().is_active(fade));
        engine.service(Instant::from_millis(50), &mut sink);
        assert_eq!(engine.pool().value(fade), 178);
        engine.service(Instant::from_millis(100), &mut sink);
        assert_eq!(engine.pool().value(fade), 228);
        assert!(!engine.pool().is_active(fade));
    }

    #[test]
    fn duration_override_and_global_default() {
        let queue: CommandQueue<QUEUE> = CommandQueue::new();
        let mut engine = Engine::new(queue.receiver(), STRIP_LEN as u16).unwrap();
        let sender = queue.sender();
        let mut sink = BufferSink::new();

        engine.set_default_transition_ms(0);
        sender
            .try_send(SegmentCommand::new(0, LightChange::Level(42)))
            .unwrap();
        engine.service(Instant::from_millis(0), &mut sink);

        // Zero default means an instant snap
        let fade = engine.store().light()[0].fades.level;
        assert_eq!(engine.pool().value(fade), 42);
        assert!(!engine.pool().is_active(fade));

        // An explicit duration wins over the default
        sender
            .try_send(SegmentCommand::with_duration(0, LightChange::Level(242), 1000))
            .unwrap();
        engine.service(Instant::from_millis(10), &mut sink);
        engine.service(Instant::from_millis(510), &mut sink);
        assert_eq!(engine.pool().value(fade), 142);
    }

    #[test]
    fn unknown_segment_commands_are_dropped() {
        let queue: CommandQueue<QUEUE> = CommandQueue::new();
        let mut engine = Engine::new(queue.receiver(), STRIP_LEN as u16).unwrap();
        let mut sink = BufferSink::new();

        queue
            .try_send(SegmentCommand::new(99, LightChange::Power(true)))
            .unwrap();
        assert!(!engine.service(Instant::from_millis(0), &mut sink));
    }

    #[test]
    fn queue_overflow_returns_the_rejected_command() {
        let queue: CommandQueue<2> = CommandQueue::new();
        let first = SegmentCommand::new(0, LightChange::Power(true));
        let second = SegmentCommand::new(0, LightChange::Level(10));
        let third = SegmentCommand::new(0, LightChange::Level(20));

        queue.try_send(first).unwrap();
        queue.try_send(second).unwrap();
        assert_eq!(queue.try_send(third), Err(QueueFull(third)));

        // Earlier entries are untouched
        assert_eq!(queue.try_receive().unwrap(), first);
        assert_eq!(queue.try_receive().unwrap(), second);
    }

    #[test]
    fn save_is_debounced_after_mutation() {
        let queue: CommandQueue<QUEUE> = CommandQueue::new();
        let mut engine = Engine::new(queue.receiver(), STRIP_LEN as u16).unwrap();
        let mut sink = BufferSink::new();
        let mut backend = MemStore::default();

        queue
            .try_send(SegmentCommand::new(0, LightChange::Level(200)))
            .unwrap();
        engine.service(Instant::from_millis(0), &mut sink);
        assert!(engine.save_pending());

        engine.poll_save(Instant::from_millis(499), &mut backend);
        assert_eq!(backend.saves, 0);

        engine.poll_save(Instant::from_millis(501), &mut backend);
        assert_eq!(backend.saves, 2); // geometry + light blobs
        assert!(!engine.save_pending());

        // Fires only once per mutation
        engine.poll_save(Instant::from_millis(1000), &mut backend);
        assert_eq!(backend.saves, 2);
    }

    #[test]
    fn state_round_trips_through_persistence() {
        let mut backend = MemStore::default();
        let mut attrs = ReportSink::default();

        {
            let queue: CommandQueue<QUEUE> = CommandQueue::new();
            let mut engine = Engine::new(queue.receiver(), STRIP_LEN as u16).unwrap();
            let mut sink = BufferSink::new();

            for command in [
                SegmentCommand::new(1, LightChange::Power(true)),
                SegmentCommand::new(1, LightChange::Level(42)),
                SegmentCommand::new(1, LightChange::Hue(120)),
                SegmentCommand::new(1, LightChange::Saturation(200)),
                SegmentCommand::new(2, LightChange::ColorTemp(370)),
            ] {
                queue.try_send(command).unwrap();
            }
            engine.service(Instant::from_millis(0), &mut sink);
            engine.poll_save(Instant::from_millis(600), &mut backend);
        }

        let queue: CommandQueue<QUEUE> = CommandQueue::new();
        let mut engine = Engine::new(queue.receiver(), STRIP_LEN as u16).unwrap();
        engine.boot(&mut backend, &mut attrs);

        let light = &engine.store().light()[1];
        assert!(light.on);
        assert_eq!(light.level, 42);
        assert_eq!(light.hue, 120);
        assert_eq!(light.saturation, 200);
        assert_eq!(light.color_mode, ColorMode::HueSat);

        assert_eq!(engine.store().light()[2].color_temp, 370);
        assert_eq!(engine.store().light()[2].color_mode, ColorMode::ColorTemp);

        // Transitions are seeded from the restored state, not zero
        let fade = light.fades.level;
        assert_eq!(engine.pool().value(fade), 42);
        let hue_fade = light.fades.hue;
        assert_eq!(engine.pool().value(hue_fade), 120);
    }

    #[test]
    fn boot_applies_power_on_behavior() {
        let mut backend = MemStore::default();
        let mut attrs = ReportSink::default();

        {
            let queue: CommandQueue<QUEUE> = CommandQueue::new();
            let mut engine = Engine::new(queue.receiver(), STRIP_LEN as u16).unwrap();
            let mut sink = BufferSink::new();

            for command in [
                SegmentCommand::new(0, LightChange::Power(true)),
                SegmentCommand::new(0, LightChange::PowerOn(PowerOnBehavior::Toggle)),
                SegmentCommand::new(1, LightChange::Power(true)),
                SegmentCommand::new(1, LightChange::PowerOn(PowerOnBehavior::Off)),
                SegmentCommand::new(2, LightChange::PowerOn(PowerOnBehavior::On)),
                SegmentCommand::new(3, LightChange::Power(true)),
                SegmentCommand::new(3, LightChange::PowerOn(PowerOnBehavior::Restore)),
            ] {
                queue.try_send(command).unwrap();
            }
            engine.service(Instant::from_millis(0), &mut sink);
            engine.poll_save(Instant::from_millis(600), &mut backend);
        }

        let queue: CommandQueue<QUEUE> = CommandQueue::new();
        let mut engine = Engine::new(queue.receiver(), STRIP_LEN as u16).unwrap();
        engine.boot(&mut backend, &mut attrs);

        let light = engine.store().light();
        assert!(!light[0].on, "toggle inverts the persisted on");
        assert!(!light[1].on, "off forces off");
        assert!(light[2].on, "on forces on");
        assert!(light[3].on, "restore keeps the persisted on");
    }

    #[test]
    fn corrupt_blobs_degrade_to_defaults() {
        let mut attrs = ReportSink::default();

        // Unknown version byte: everything stays at defaults
        let mut backend = MemStore::default();
        backend.blobs.insert("seg_state".into(), vec![0xAB, 1, 2, 3]);
        let queue: CommandQueue<QUEUE> = CommandQueue::new();
        let mut engine = Engine::new(queue.receiver(), STRIP_LEN as u16).unwrap();
        engine.boot(&mut backend, &mut attrs);
        assert_eq!(engine.store().light()[0].level, 128);
        assert_eq!(engine.store().light()[0].color_temp, 250);

        // Truncated blob: the one whole record applies, the rest default
        let mut full = MemStore::default();
        {
            let queue: CommandQueue<QUEUE> = CommandQueue::new();
            let mut engine = Engine::new(queue.receiver(), STRIP_LEN as u16).unwrap();
            let mut sink = BufferSink::new();
            queue
                .try_send(SegmentCommand::new(0, LightChange::Level(42)))
                .unwrap();
            queue
                .try_send(SegmentCommand::new(1, LightChange::Level(77)))
                .unwrap();
            engine.service(Instant::from_millis(0), &mut sink);
            engine.poll_save(Instant::from_millis(600), &mut full);
        }
        let blob = full.blobs.get("seg_state").unwrap().clone();
        let mut truncated = MemStore::default();
        truncated.blobs.insert("seg_state".into(), blob[..1 + 9].to_vec());

        let queue: CommandQueue<QUEUE> = CommandQueue::new();
        let mut engine = Engine::new(queue.receiver(), STRIP_LEN as u16).unwrap();
        engine.boot(&mut truncated, &mut attrs);
        assert_eq!(engine.store().light()[0].level, 42);
        assert_eq!(engine.store().light()[1].level, 128);
    }

    #[test]
    fn sync_reports_committed_state() {
        let queue: CommandQueue<QUEUE> = CommandQueue::new();
        let mut engine = Engine::new(queue.receiver(), STRIP_LEN as u16).unwrap();
        let mut sink = BufferSink::new();
        let mut attrs = ReportSink::default();

        for command in [
            SegmentCommand::new(0, LightChange::Power(true)),
            SegmentCommand::new(0, LightChange::Hue(120)),
            SegmentCommand::new(0, LightChange::Level(200)),
        ] {
            queue.try_send(command).unwrap();
        }
        engine.service(Instant::from_millis(0), &mut sink);

        // Mid-fade: the report carries targets, not interpolated values
        engine.service(Instant::from_millis(50), &mut sink);
        engine.sync_attributes(&mut attrs);

        assert_eq!(attrs.reports.len(), SEGS);
        let (segment, report) = attrs.reports[0];
        assert_eq!(segment, 0);
        assert!(report.on);
        assert_eq!(report.level, 200);
        assert_eq!(report.enhanced_hue, 21845); // 120 degrees
        assert_eq!(report.color_mode, ColorMode::HueSat);
    }

    #[test]
    fn snapshot_diff_maps_changes_to_commands() {
        let prev = [ExternalSnapshot::default(); SEGS];
        assert!(diff_snapshot::<SEGS, 8>(&prev, &prev).is_empty());

        let mut next = prev;
        next[1].enhanced_hue = 21845;
        let commands = diff_snapshot::<SEGS, 8>(&prev, &next);
        assert_eq!(commands.len(), 1);
        assert_eq!(
            commands[0],
            SegmentCommand::new(1, LightChange::Hue(120))
        );

        // Color temperature only matters in color-temperature mode
        let mut next = prev;
        next[2].color_mode = ColorMode::ColorTemp;
        next[2].color_temp = 300;
        let commands = diff_snapshot::<SEGS, 8>(&prev, &next);
        assert_eq!(commands.len(), 1);
        assert_eq!(
            commands[0],
            SegmentCommand::new(2, LightChange::ColorTemp(300))
        );
    }

    #[test]
    fn scheduler_paces_and_recovers_from_stalls() {
        let queue: CommandQueue<QUEUE> = CommandQueue::new();
        let engine = Engine::new(queue.receiver(), STRIP_LEN as u16).unwrap();
        let mut scheduler = TickScheduler::new(engine);
        let mut sink = BufferSink::new();
        let mut backend = MemStore::default();

        let result = scheduler.tick(Instant::from_millis(0), &mut sink, &mut backend);
        assert_eq!(result.next_deadline, Instant::from_millis(5));
        assert_eq!(result.sleep, Duration::from_millis(5));

        let result = scheduler.tick(Instant::from_millis(5), &mut sink, &mut backend);
        assert_eq!(result.next_deadline, Instant::from_millis(10));

        // A long stall resets the schedule instead of bursting
        let result = scheduler.tick(Instant::from_millis(500), &mut sink, &mut backend);
        assert_eq!(result.next_deadline, Instant::from_millis(505));
        assert_eq!(result.sleep, Duration::from_millis(5));
    }
}
