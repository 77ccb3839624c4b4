pub mod runner;

pub use runner::PuzzleRunner;

use std::cell::RefCell;
use wasm_bindgen::prelude::*;
use jigsaw_engine::{InputEvent, PieceId};

thread_local! {
    static RUNNER: RefCell<Option<PuzzleRunner>> = RefCell::new(None);
}

/// Run `f` against the page's runner, creating it on first use.
fn with_runner<R>(f: impl FnOnce(&mut PuzzleRunner) -> R) -> R {
    RUNNER.with(|cell| {
        let mut borrow = cell.borrow_mut();
        f(borrow.get_or_insert_with(PuzzleRunner::new))
    })
}

#[wasm_bindgen]
pub fn puzzle_init() {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Info);

    RUNNER.with(|cell| {
        *cell.borrow_mut() = Some(PuzzleRunner::new());
    });
    log::info!("jigsaw: initialized");
}

/// Load a puzzle manifest. Returns false (and logs why) if it is rejected.
/// Its load events are published by the next tick.
#[wasm_bindgen]
pub fn puzzle_load(json: &str) -> bool {
    with_runner(|r| match r.load_manifest(json) {
        Ok(()) => true,
        Err(err) => {
            log::error!("puzzle manifest rejected: {}", err);
            false
        }
    })
}

/// Client rectangle of the render surface; pass a zero size when it is detached.
#[wasm_bindgen]
pub fn puzzle_set_viewport(left: f32, top: f32, width: f32, height: f32) {
    with_runner(|r| r.set_viewport(left, top, width, height));
}

// ---- Input: queued and applied by the next tick, like every frame's output ----
//
// Each returns whether a frame is needed, so a host with a stopped loop knows to restart it.

fn queue(event: InputEvent) -> bool {
    with_runner(|r| {
        r.push_input(event);
        r.needs_frame()
    })
}

#[wasm_bindgen]
pub fn puzzle_pointer_down(piece: u32, x: f32, y: f32, time_ms: f64) -> bool {
    queue(InputEvent::PointerDown { piece: PieceId(piece), x, y, time_ms })
}

#[wasm_bindgen]
pub fn puzzle_pointer_move(x: f32, y: f32, time_ms: f64) -> bool {
    queue(InputEvent::PointerMove { x, y, time_ms })
}

#[wasm_bindgen]
pub fn puzzle_pointer_up(time_ms: f64) -> bool {
    queue(InputEvent::PointerUp { time_ms })
}

#[wasm_bindgen]
pub fn puzzle_pointer_cancel(time_ms: f64) -> bool {
    queue(InputEvent::PointerCancel { time_ms })
}

#[wasm_bindgen]
pub fn puzzle_shuffle() -> bool {
    queue(InputEvent::Shuffle)
}

#[wasm_bindgen]
pub fn puzzle_needs_frame() -> bool {
    with_runner(|r| r.needs_frame())
}

/// Advance one animation frame. Request another frame only while this returns true.
#[wasm_bindgen]
pub fn puzzle_tick(timestamp_ms: f64) -> bool {
    with_runner(|r| r.tick(timestamp_ms))
}

// ---- Data accessors ----

#[wasm_bindgen]
pub fn get_instances_ptr() -> *const f32 {
    with_runner(|r| r.instances_ptr())
}

#[wasm_bindgen]
pub fn get_instance_count() -> u32 {
    with_runner(|r| r.instance_count())
}

#[wasm_bindgen]
pub fn get_band_split() -> u32 {
    with_runner(|r| r.band_split())
}

#[wasm_bindgen]
pub fn get_cue_events_ptr() -> *const u8 {
    with_runner(|r| r.cue_events_ptr())
}

#[wasm_bindgen]
pub fn get_cue_events_len() -> u32 {
    with_runner(|r| r.cue_events_len())
}

#[wasm_bindgen]
pub fn get_session_events_ptr() -> *const f32 {
    with_runner(|r| r.session_events_ptr())
}

#[wasm_bindgen]
pub fn get_session_events_len() -> u32 {
    with_runner(|r| r.session_events_len())
}

#[wasm_bindgen]
pub fn get_board_min_x() -> f32 {
    with_runner(|r| r.board_min_x())
}

#[wasm_bindgen]
pub fn get_board_min_y() -> f32 {
    with_runner(|r| r.board_min_y())
}

#[wasm_bindgen]
pub fn get_board_width() -> f32 {
    with_runner(|r| r.board_width())
}

#[wasm_bindgen]
pub fn get_board_height() -> f32 {
    with_runner(|r| r.board_height())
}

// ---- Stats accessors ----

#[wasm_bindgen]
pub fn get_piece_count() -> u32 {
    with_runner(|r| r.piece_count())
}

#[wasm_bindgen]
pub fn get_group_count() -> u32 {
    with_runner(|r| r.group_count())
}

#[wasm_bindgen]
pub fn get_largest_group() -> u32 {
    with_runner(|r| r.largest_group())
}

#[wasm_bindgen]
pub fn get_is_won() -> bool {
    with_runner(|r| r.is_won())
}
