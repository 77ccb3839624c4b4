use jigsaw_engine::{
    DescriptorError, InputEvent, InputQueue, InstanceBuffer, PackedEvent, PuzzleSession,
    PuzzleTuning, Viewport,
};

/// Owns one puzzle session and the flat buffers the host reads.
///
/// Host input is queued and applied serially at the start of the next `tick`, which then
/// publishes every cue and event produced since the previous one. The host reads the
/// buffers after each `tick`.
pub struct PuzzleRunner {
    session: PuzzleSession,
    input: InputQueue,
    instances: InstanceBuffer,
    /// Flat buffer of cue ids for host reads.
    cue_buffer: Vec<u8>,
    event_buffer: Vec<PackedEvent>,
}

impl PuzzleRunner {
    pub fn new() -> Self {
        Self::with_tuning(PuzzleTuning::default())
    }

    pub fn with_tuning(tuning: PuzzleTuning) -> Self {
        Self {
            session: PuzzleSession::new(tuning),
            input: InputQueue::new(),
            instances: InstanceBuffer::new(),
            cue_buffer: Vec::with_capacity(32),
            event_buffer: Vec::with_capacity(32),
        }
    }

    pub fn session(&self) -> &PuzzleSession {
        &self.session
    }

    /// Replace the puzzle. Pending input belongs to the old board and is dropped.
    /// Piece transforms are rebuilt at once; the load events go out with the next `tick`.
    pub fn load_manifest(&mut self, json: &str) -> Result<(), DescriptorError> {
        self.session.load_json(json)?;
        self.input.drain();
        self.clear_buffers();
        self.session.build_instances(&mut self.instances);
        Ok(())
    }

    /// Client rectangle of the render surface. A zero-size rectangle detaches it.
    pub fn set_viewport(&mut self, left: f32, top: f32, width: f32, height: f32) {
        let viewport = (width > 0.0 && height > 0.0).then(|| Viewport::new(left, top, width, height));
        self.session.set_viewport(viewport);
    }

    pub fn push_input(&mut self, event: InputEvent) {
        self.input.push(event);
    }

    pub fn shuffle(&mut self) {
        self.push_input(InputEvent::Shuffle);
    }

    /// Queued input or unpublished output is waiting, or something is animating.
    /// A host whose loop has stopped restarts it when this turns true.
    pub fn needs_frame(&self) -> bool {
        !self.input.is_empty()
            || !self.session.cues.is_empty()
            || !self.session.events.is_empty()
            || self.session.needs_frame()
    }

    /// Run one animation frame. Returns whether the host should request another.
    pub fn tick(&mut self, timestamp_ms: f64) -> bool {
        self.clear_buffers();
        for event in self.input.drain() {
            self.session.dispatch(&event);
        }
        let more = self.session.advance_frame(timestamp_ms);
        self.publish();
        more
    }

    fn clear_buffers(&mut self) {
        self.cue_buffer.clear();
        self.event_buffer.clear();
    }

    /// Move session output into the host buffers and rebuild piece transforms.
    fn publish(&mut self) {
        self.cue_buffer.extend(self.session.cues.iter().map(|c| c.as_u8()));
        self.event_buffer.extend(self.session.events.iter().map(PackedEvent::from));
        self.session.clear_frame_data();
        self.session.build_instances(&mut self.instances);
    }

    // ---- Pointer accessors for host reads ----

    pub fn instances_ptr(&self) -> *const f32 {
        self.instances.instances_ptr()
    }

    pub fn instance_count(&self) -> u32 {
        self.instances.instance_count()
    }

    pub fn band_split(&self) -> u32 {
        self.instances.band_split
    }

    pub fn cue_events_ptr(&self) -> *const u8 {
        self.cue_buffer.as_ptr()
    }

    pub fn cue_events_len(&self) -> u32 {
        self.cue_buffer.len() as u32
    }

    pub fn session_events_ptr(&self) -> *const f32 {
        self.event_buffer.as_ptr() as *const f32
    }

    pub fn session_events_len(&self) -> u32 {
        self.event_buffer.len() as u32
    }

    // ---- Board and stats accessors ----

    pub fn board_min_x(&self) -> f32 {
        self.session.board().min_x
    }

    pub fn board_min_y(&self) -> f32 {
        self.session.board().min_y
    }

    pub fn board_width(&self) -> f32 {
        self.session.board().width()
    }

    pub fn board_height(&self) -> f32 {
        self.session.board().height()
    }

    pub fn piece_count(&self) -> u32 {
        self.session.stats().pieces as u32
    }

    pub fn group_count(&self) -> u32 {
        self.session.stats().groups as u32
    }

    pub fn largest_group(&self) -> u32 {
        self.session.stats().largest_group as u32
    }

    pub fn is_won(&self) -> bool {
        self.session.is_won()
    }
}

impl Default for PuzzleRunner {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;
    use jigsaw_engine::{CueEvent, PieceId};

    const MANIFEST: &str = r#"{
        "puzzle": { "id": "duo", "name": "Duo", "cols": 2, "rows": 1, "piece_count": 2,
                    "view_box": { "x": 0, "y": 0, "width": 200, "height": 100 } },
        "shapes": [
            { "bounds": { "x": 0, "y": 0, "width": 100, "height": 100 } },
            { "bounds": { "x": 100, "y": 0, "width": 100, "height": 100 } }
        ]
    }"#;

    fn loaded() -> PuzzleRunner {
        let mut r = PuzzleRunner::new();
        r.load_manifest(MANIFEST).unwrap();
        r.set_viewport(r.board_min_x(), r.board_min_y(), r.board_width(), r.board_height());
        r
    }

    /// Output gathered across ticks, read the way the host reads it.
    #[derive(Default)]
    struct HostLog {
        cues: Vec<u8>,
        events: Vec<PackedEvent>,
    }

    impl HostLog {
        fn tick(&mut self, r: &mut PuzzleRunner, t: f64) -> bool {
            let more = r.tick(t);
            self.cues.extend_from_slice(&r.cue_buffer);
            self.events.extend_from_slice(&r.event_buffer);
            more
        }

        fn count_cue(&self, cue: CueEvent) -> usize {
            self.cues.iter().filter(|c| **c == cue.as_u8()).count()
        }

        fn count_event(&self, kind: f32) -> usize {
            self.events.iter().filter(|e| e.kind == kind).count()
        }
    }

    /// Drag the group holding `piece` to `target` offset, ticking after every pointer event.
    fn gesture(r: &mut PuzzleRunner, log: &mut HostLog, piece: u32, target: Vec2, t: &mut f64) {
        let base = r.session().store().piece(PieceId(piece)).unwrap().base;
        let world = r.session().store().world_position(PieceId(piece)).unwrap();
        let events = [
            InputEvent::PointerDown { piece: PieceId(piece), x: world.x, y: world.y, time_ms: *t },
            InputEvent::PointerMove { x: base.x + target.x, y: base.y + target.y, time_ms: *t + 8.0 },
            InputEvent::PointerUp { time_ms: *t + 16.0 },
        ];
        for event in events {
            r.push_input(event);
            assert!(r.needs_frame());
            *t += 16.7;
            log.tick(r, *t);
        }
        while log.tick(r, *t) {
            *t += 16.7;
            assert!(*t < 20_000.0, "loop never stopped");
        }
    }

    #[test]
    fn load_publishes_instances_and_events() {
        let mut r = loaded();
        assert_eq!(r.instance_count(), 2);
        assert_eq!(r.piece_count(), 2);
        assert_eq!(r.group_count(), 2);
        assert_eq!(r.session_events_len(), 0);
        assert!(r.needs_frame(), "load events wait for a tick");
        assert!(!r.tick(0.0));
        assert_eq!(r.session_events_len(), 2);
        assert_eq!(r.event_buffer[0].kind, PackedEvent::KIND_SHUFFLED);
        assert_eq!(r.event_buffer[1].kind, PackedEvent::KIND_STATS);
        assert!(!r.is_won());
    }

    #[test]
    fn rejected_manifest_is_an_error() {
        let mut r = PuzzleRunner::new();
        assert!(r.load_manifest(r#"{ "puzzle": { "cols": 0, "rows": 1, "piece_count": 0 } }"#).is_err());
        assert_eq!(r.instance_count(), 0);
    }

    #[test]
    fn gesture_cues_reach_the_buffer_on_next_tick() {
        let mut r = loaded();
        let world = r.session().store().world_position(PieceId(1)).unwrap();
        r.push_input(InputEvent::PointerDown { piece: PieceId(1), x: world.x, y: world.y, time_ms: 0.0 });
        r.push_input(InputEvent::PointerMove { x: world.x + 4000.0, y: world.y, time_ms: 8.0 });
        r.push_input(InputEvent::PointerUp { time_ms: 16.0 });

        assert!(r.tick(16.0), "snapback should keep the loop alive");
        assert_eq!(
            r.cue_buffer,
            vec![CueEvent::Pickup.as_u8(), CueEvent::Drop.as_u8(), CueEvent::SnapbackStart.as_u8()]
        );

        let mut t = 16.0;
        let mut landed = 0;
        while r.tick(t) {
            landed += r.cue_buffer.iter().filter(|c| **c == CueEvent::SnapbackLand.as_u8()).count();
            t += 16.7;
            assert!(t < 10_000.0, "loop never stopped");
        }
        landed += r.cue_buffer.iter().filter(|c| **c == CueEvent::SnapbackLand.as_u8()).count();
        assert_eq!(landed, 1);
    }

    #[test]
    fn idle_tick_clears_transient_buffers() {
        let mut r = loaded();
        r.tick(0.0);
        assert!(!r.needs_frame());
        assert!(!r.tick(16.0));
        assert_eq!(r.session_events_len(), 0);
        assert_eq!(r.cue_events_len(), 0);
        assert_eq!(r.instance_count(), 2);
    }

    #[test]
    fn shuffle_is_published_by_the_next_tick() {
        let mut r = loaded();
        r.tick(0.0);
        r.shuffle();
        assert!(r.needs_frame());
        assert_eq!(r.session_events_len(), 0);
        r.tick(16.0);
        assert_eq!(r.event_buffer[0].kind, PackedEvent::KIND_SHUFFLED);
        assert_eq!(r.session_events_len(), 2);
        assert_eq!(r.group_count(), 2);
    }

    #[test]
    fn solving_drop_reaches_the_host_after_tick() {
        let mut r = loaded();
        let mut log = HostLog::default();
        let mut t = 0.0;
        log.tick(&mut r, t);

        // Home offsets are on the board, so at least one of the two drops lands and merges.
        gesture(&mut r, &mut log, 2, Vec2::ZERO, &mut t);
        if r.group_count() > 1 {
            gesture(&mut r, &mut log, 1, Vec2::ZERO, &mut t);
        }

        assert!(r.is_won());
        assert_eq!(r.group_count(), 1);
        assert_eq!(log.count_cue(CueEvent::Connect), 1);
        assert_eq!(log.count_event(PackedEvent::KIND_MERGED), 1);
        assert_eq!(log.count_event(PackedEvent::KIND_WON), 1);
        assert!(log.count_cue(CueEvent::Pickup) >= 1);
        assert_eq!(log.count_cue(CueEvent::Pickup), log.count_cue(CueEvent::Drop));
        assert!(!r.needs_frame());
    }

    #[test]
    fn zero_size_viewport_detaches() {
        let mut r = loaded();
        r.set_viewport(0.0, 0.0, 0.0, 0.0);
        r.push_input(InputEvent::PointerDown { piece: PieceId(1), x: 10.0, y: 10.0, time_ms: 0.0 });
        r.tick(0.0);
        assert_eq!(r.cue_events_len(), 0);
        assert!(r.session().dragged_group().is_none());
    }
}
