pub mod api;
pub mod core;
pub mod components;
pub mod systems;
pub mod renderer;
pub mod input;
pub mod assets;
pub mod extensions;

// Re-export key types at crate root for convenience
pub use api::session::{PuzzleSession, PuzzleTuning};
pub use api::types::{PieceId, GroupId, CueEvent, SessionEvent, PackedEvent, PuzzleStats};
pub use assets::descriptor::{PuzzleDescriptor, PieceShape, PuzzleManifest, DescriptorError};
pub use components::piece::Piece;
pub use components::group::{Group, GroupPhase, RotationState};
pub use components::layer::RenderBand;
pub use core::geometry::{Rect, BoardBounds, Viewport};
pub use core::store::PieceStore;
pub use core::time::FrameClock;
pub use renderer::instance::{PieceInstance, InstanceBuffer};
pub use input::queue::{InputEvent, InputQueue};
pub use systems::drag::{DragController, ReleaseOutcome};
pub use systems::render::DrawOrder;
pub use systems::snap::{GridSpec, WinLatch};

// Extensions
pub use extensions::{Easing, Tween, TweenStep};
