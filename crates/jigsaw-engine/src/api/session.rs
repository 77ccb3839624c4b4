use glam::Vec2;
use serde::{Deserialize, Serialize};
use crate::api::types::{CueEvent, GroupId, PieceId, PuzzleStats, SessionEvent};
use crate::assets::descriptor::{assign_piece_ids, grid_cell, DescriptorError, PuzzleDescriptor, PuzzleManifest};
use crate::components::group::GroupPhase;
use crate::components::piece::Piece;
use crate::core::geometry::{map_pointer, BoardBounds, Viewport};
use crate::core::store::PieceStore;
use crate::core::time::FrameClock;
use crate::extensions::easing::Easing;
use crate::input::queue::InputEvent;
use crate::renderer::instance::InstanceBuffer;
use crate::systems::drag::{DragController, ReleaseOutcome};
use crate::systems::render::{build_instance_buffer, DrawOrder};
use crate::systems::rng::Rng;
use crate::systems::scatter::scatter_all_groups;
use crate::systems::snap::{self, GridSpec, WinLatch};
use crate::systems::spring;

/// Feel and policy constants for one puzzle session.
/// Any subset can be overridden from a manifest; missing fields keep their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PuzzleTuning {
    /// Snap tolerance as a fraction of one piece's native width.
    pub snap_tolerance_factor: f32,
    /// Board margin as a fraction of the native extent, per side.
    pub board_margin_factor: f32,
    /// Inset applied to the board when validating member centers on release.
    pub center_bounds_padding: f32,
    pub scatter_attempts: u32,
    /// Scatter radius band as fractions of min(puzzle width, height).
    pub scatter_radius_min: f32,
    pub scatter_radius_max: f32,
    /// Weight of the newest pointer delta in the velocity filter.
    pub velocity_smoothing: f32,
    /// Filtered speed (client px per event) under which swing torque is zero.
    pub torque_velocity_threshold: f32,
    pub torque_velocity_gain_x: f32,
    pub torque_velocity_gain_y: f32,
    pub torque_accel_gain_x: f32,
    pub torque_accel_gain_y: f32,
    /// Clamp for the swing torque (degrees per second squared).
    pub max_torque: f32,
    pub stiffness: f32,
    pub damping: f32,
    /// Degrees per second.
    pub max_angular_velocity: f32,
    /// Degrees.
    pub max_angle: f32,
    pub release_boost_ms: f32,
    pub boost_stiffness_scale: f32,
    pub boost_damping_scale: f32,
    pub settle_angle_epsilon: f32,
    pub settle_velocity_epsilon: f32,
    pub snapback_min_ms: f32,
    pub snapback_max_ms: f32,
    /// Snapback travel that earns the full duration, as a fraction of min(puzzle width, height).
    pub snapback_reference_factor: f32,
    pub snapback_easing: Easing,
    /// Frame delta clamp in seconds.
    pub min_frame_dt: f32,
    pub max_frame_dt: f32,
    /// Upward pivot shift as a fraction of one piece's native height.
    pub pivot_bias_factor: f32,
    /// Scatter RNG seed.
    pub seed: u64,
}

impl Default for PuzzleTuning {
    fn default() -> Self {
        Self {
            snap_tolerance_factor: 0.18,
            board_margin_factor: 0.2,
            center_bounds_padding: 1.0,
            scatter_attempts: 8,
            scatter_radius_min: 0.25,
            scatter_radius_max: 0.6,
            velocity_smoothing: 0.22,
            torque_velocity_threshold: 0.35,
            torque_velocity_gain_x: 40.0,
            torque_velocity_gain_y: 12.0,
            torque_accel_gain_x: 90.0,
            torque_accel_gain_y: 25.0,
            max_torque: 2400.0,
            stiffness: 180.0,
            damping: 18.0,
            max_angular_velocity: 420.0,
            max_angle: 15.0,
            release_boost_ms: 150.0,
            boost_stiffness_scale: 1.25,
            boost_damping_scale: 1.9,
            settle_angle_epsilon: 0.02,
            settle_velocity_epsilon: 0.05,
            snapback_min_ms: 180.0,
            snapback_max_ms: 360.0,
            snapback_reference_factor: 0.5,
            snapback_easing: Easing::CubicOut,
            min_frame_dt: 1.0 / 240.0,
            max_frame_dt: 1.0 / 30.0,
            pivot_bias_factor: 0.08,
            seed: 0x9E37_79B9_7F4A_7C15,
        }
    }
}

/// One loaded puzzle and everything that mutates it.
///
/// Pointer events and animation frames are applied serially; cues and events accumulate
/// until the host reads them and calls [`PuzzleSession::clear_frame_data`].
pub struct PuzzleSession {
    tuning: PuzzleTuning,
    descriptor: Option<PuzzleDescriptor>,
    grid: GridSpec,
    board: BoardBounds,
    puzzle_size: Vec2,
    active_pieces: usize,
    store: PieceStore,
    drag: DragController,
    order: DrawOrder,
    clock: FrameClock,
    rng: Rng,
    win: WinLatch,
    viewport: Option<Viewport>,
    pub cues: Vec<CueEvent>,
    pub events: Vec<SessionEvent>,
}

impl PuzzleSession {
    pub fn new(tuning: PuzzleTuning) -> Self {
        Self {
            clock: FrameClock::new(tuning.min_frame_dt, tuning.max_frame_dt),
            rng: Rng::new(tuning.seed),
            tuning,
            descriptor: None,
            grid: GridSpec { cols: 0, rows: 0, piece_width: 0.0, piece_height: 0.0 },
            board: BoardBounds::default(),
            puzzle_size: Vec2::ZERO,
            active_pieces: 0,
            store: PieceStore::new(),
            drag: DragController::new(),
            order: DrawOrder::new(),
            win: WinLatch::new(),
            viewport: None,
            cues: Vec::new(),
            events: Vec::new(),
        }
    }

    pub fn load_json(&mut self, json: &str) -> Result<(), DescriptorError> {
        self.load(PuzzleManifest::from_json(json)?)
    }

    /// Replace the whole board with a new puzzle and scatter it.
    /// Nothing changes if the manifest is invalid.
    pub fn load(&mut self, manifest: PuzzleManifest) -> Result<(), DescriptorError> {
        manifest.validate()?;
        let PuzzleManifest { puzzle, shapes, tuning } = manifest;

        if let Some(tuning) = tuning {
            self.clock = FrameClock::new(tuning.min_frame_dt, tuning.max_frame_dt);
            self.rng = Rng::new(tuning.seed);
            self.tuning = tuning;
        }
        if let Some(group) = self.drag.abandon() {
            log::debug!("drag of {:?} abandoned by reload", group);
        }

        let ids = assign_piece_ids(&shapes);
        self.store.clear();
        for (handle, (shape, id)) in shapes.iter().zip(ids).enumerate() {
            if puzzle.is_skipped(id) {
                continue;
            }
            let (col, row) = grid_cell(id, puzzle.cols);
            self.store.spawn(
                Piece::new(id, shape.center())
                    .with_grid(col, row)
                    .with_bounds(shape.bounds)
                    .with_handle(handle),
            );
        }

        let cell = puzzle.cell_size();
        self.grid = GridSpec {
            cols: puzzle.cols,
            rows: puzzle.rows,
            piece_width: cell.x,
            piece_height: cell.y,
        };
        self.board = puzzle.board_bounds(self.tuning.board_margin_factor);
        self.puzzle_size = Vec2::new(puzzle.view_box.width, puzzle.view_box.height);
        self.active_pieces = puzzle.active_piece_count();
        self.order = DrawOrder::new();
        log::info!(
            "loaded puzzle '{}': {}x{} grid, {} active pieces",
            puzzle.name,
            puzzle.cols,
            puzzle.rows,
            self.active_pieces
        );
        self.descriptor = Some(puzzle);

        self.scatter(false);
        Ok(())
    }

    /// Client rectangle of the render surface; `None` while it is detached.
    pub fn set_viewport(&mut self, viewport: Option<Viewport>) {
        self.viewport = viewport;
    }

    /// Break groups when `reset_groups` is set, cancel all motion and scatter the board.
    pub fn shuffle(&mut self, reset_groups: bool) {
        if self.store.is_empty() {
            log::warn!("shuffle ignored: no puzzle loaded");
            return;
        }
        if let Some(group) = self.drag.abandon() {
            log::debug!("drag of {:?} abandoned by shuffle", group);
        }
        self.scatter(reset_groups);
    }

    fn scatter(&mut self, reset_groups: bool) {
        if reset_groups {
            self.store.create_singleton_groups();
        }
        for group in self.store.groups_mut() {
            group.phase = GroupPhase::Idle;
            group.rotation.settle();
        }
        scatter_all_groups(&mut self.store, &self.board, self.puzzle_size, &self.tuning, &mut self.rng);
        self.order.enforce(&self.store);
        self.win.reset();
        self.clock.reset();
        log::info!("scattered {} groups", self.store.group_count());
        self.events.push(SessionEvent::Shuffled);
        self.events.push(SessionEvent::StatsChanged(self.store.stats()));
    }

    /// Apply one host input event.
    pub fn dispatch(&mut self, event: &InputEvent) {
        match *event {
            InputEvent::PointerDown { piece, x, y, .. } => {
                self.pointer_down(piece, Vec2::new(x, y));
            }
            InputEvent::PointerMove { x, y, .. } => {
                self.pointer_move(Vec2::new(x, y));
            }
            InputEvent::PointerUp { time_ms } => {
                self.pointer_up(time_ms);
            }
            InputEvent::PointerCancel { time_ms } => {
                self.pointer_cancel(time_ms);
            }
            InputEvent::Shuffle => self.shuffle(true),
        }
    }

    /// Grab the group owning `piece` at client position `client`.
    pub fn pointer_down(&mut self, piece: PieceId, client: Vec2) -> bool {
        let Some(group) = self.store.group_of(piece) else {
            log::warn!("pointer down on unknown piece {:?}", piece);
            return false;
        };
        let Some(pointer) = map_pointer(self.viewport.as_ref(), &self.board, client) else {
            log::debug!("pointer down skipped: render surface unavailable");
            return false;
        };
        let inner = self.inner_bounds();
        if !self.drag.begin(&mut self.store, group, pointer, client, &inner) {
            return false;
        }
        self.order.bring_group_to_front(&self.store, group);
        self.cues.push(CueEvent::Pickup);
        true
    }

    /// Move the dragged group. A move without an active drag is a no-op.
    pub fn pointer_move(&mut self, client: Vec2) -> bool {
        if !self.drag.is_dragging() {
            return false;
        }
        let Some(pointer) = map_pointer(self.viewport.as_ref(), &self.board, client) else {
            log::debug!("pointer move skipped: render surface unavailable");
            return false;
        };
        self.drag.update(&mut self.store, pointer, client, &self.tuning).is_some()
    }

    pub fn pointer_up(&mut self, time_ms: f64) -> bool {
        self.release(time_ms)
    }

    /// An interrupted gesture ends exactly like a release.
    pub fn pointer_cancel(&mut self, time_ms: f64) -> bool {
        self.release(time_ms)
    }

    fn release(&mut self, time_ms: f64) -> bool {
        let inner = self.inner_bounds();
        let reference = self.puzzle_size.min_element() * self.tuning.snapback_reference_factor;
        let Some(outcome) = self.drag.release(&mut self.store, &inner, time_ms, reference, &self.tuning) else {
            return false;
        };
        self.cues.push(CueEvent::Drop);
        match outcome {
            ReleaseOutcome::Kept { group } => self.finish_move(group),
            ReleaseOutcome::SnappingBack { group, from, to } => {
                log::debug!("group {:?} out of bounds at {}, snapping back to {}", group, from, to);
                self.cues.push(CueEvent::SnapbackStart);
            }
        }
        true
    }

    /// Snap a group whose offset is final, then check for a solve.
    fn finish_move(&mut self, group: GroupId) {
        let threshold = self.grid.snap_threshold(self.tuning.snap_tolerance_factor);
        let Some(outcome) = snap::snap_and_merge(&mut self.store, group, &self.grid, threshold) else {
            return;
        };
        if outcome.merged() {
            for step in &outcome.merges {
                self.cues.push(CueEvent::Connect);
                self.events.push(SessionEvent::Merged {
                    anchor: step.anchor,
                    absorbed: step.absorbed,
                    size: step.size,
                });
            }
            self.order.enforce(&self.store);
            self.order.bring_group_to_front(&self.store, outcome.group);
            self.events.push(SessionEvent::StatsChanged(self.store.stats()));
        }
        if self.win.trigger(snap::is_solved(&self.store, self.active_pieces)) {
            log::info!("puzzle solved with {} pieces", self.active_pieces);
            self.events.push(SessionEvent::Won { pieces: self.active_pieces });
        }
    }

    /// Advance one animation frame at host timestamp `timestamp_ms`.
    /// Returns whether another frame should be requested.
    pub fn advance_frame(&mut self, timestamp_ms: f64) -> bool {
        if !self.needs_frame() {
            self.clock.reset();
            return false;
        }
        let dt = self.clock.advance(timestamp_ms);
        self.drag.frame(&mut self.store, &self.tuning);
        let report = spring::advance_all(&mut self.store, dt, timestamp_ms, &self.tuning);
        for group in report.landed {
            self.cues.push(CueEvent::SnapbackLand);
            self.finish_move(group);
        }
        let more = self.needs_frame();
        if !more {
            self.clock.reset();
        }
        more
    }

    /// Some group is dragging, snapping back or settling.
    pub fn needs_frame(&self) -> bool {
        self.store.groups().any(|g| g.is_animating())
    }

    fn inner_bounds(&self) -> BoardBounds {
        self.board.shrunk(self.tuning.center_bounds_padding)
    }

    /// Write per-piece transforms in draw order.
    pub fn build_instances(&self, buffer: &mut InstanceBuffer) {
        let pivot_bias = self.tuning.pivot_bias_factor * self.grid.piece_height;
        build_instance_buffer(&self.order, &self.store, pivot_bias, buffer);
    }

    /// Clear per-frame transient data (cues, events).
    pub fn clear_frame_data(&mut self) {
        self.cues.clear();
        self.events.clear();
    }

    pub fn stats(&self) -> PuzzleStats {
        self.store.stats()
    }

    /// The current solve has been signalled.
    pub fn is_won(&self) -> bool {
        self.win.has_fired()
    }

    pub fn store(&self) -> &PieceStore {
        &self.store
    }

    pub fn draw_order(&self) -> &[PieceId] {
        self.order.as_slice()
    }

    pub fn board(&self) -> &BoardBounds {
        &self.board
    }

    pub fn grid(&self) -> &GridSpec {
        &self.grid
    }

    pub fn tuning(&self) -> &PuzzleTuning {
        &self.tuning
    }

    pub fn descriptor(&self) -> Option<&PuzzleDescriptor> {
        self.descriptor.as_ref()
    }

    pub fn active_piece_count(&self) -> usize {
        self.active_pieces
    }

    pub fn dragged_group(&self) -> Option<GroupId> {
        self.drag.active_group()
    }
}

impl Default for PuzzleSession {
    fn default() -> Self {
        Self::new(PuzzleTuning::default())
    }
}
