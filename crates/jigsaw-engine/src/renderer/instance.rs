use bytemuck::{Pod, Zeroable};

/// Per-piece transform read by the host renderer.
/// 8 floats = 32 bytes stride. The host applies
/// `translate(dx, dy) rotate(angle, pivot_x, pivot_y)` to the piece's drawable.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct PieceInstance {
    /// Piece id.
    pub piece: f32,
    /// Drawable handle the piece was built from.
    pub handle: f32,
    /// Group offset X.
    pub dx: f32,
    /// Group offset Y.
    pub dy: f32,
    /// Group tilt in degrees.
    pub angle: f32,
    /// Rotation pivot X in puzzle units (world space).
    pub pivot_x: f32,
    /// Rotation pivot Y in puzzle units (world space).
    pub pivot_y: f32,
    /// Render band (0 = grouped, 1 = single).
    pub band: f32,
}

impl PieceInstance {
    pub const FLOATS: usize = 8;
    pub const STRIDE_BYTES: usize = Self::FLOATS * 4;
}

/// Piece transforms in back-to-front draw order.
pub struct InstanceBuffer {
    pub instances: Vec<PieceInstance>,
    /// Index of the first single-piece instance; `[0..band_split)` are grouped pieces.
    pub band_split: u32,
}

impl InstanceBuffer {
    pub fn new() -> Self {
        Self::with_capacity(256)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            instances: Vec::with_capacity(capacity),
            band_split: 0,
        }
    }

    pub fn clear(&mut self) {
        self.instances.clear();
        self.band_split = 0;
    }

    pub fn push(&mut self, instance: PieceInstance) {
        self.instances.push(instance);
    }

    pub fn instance_count(&self) -> u32 {
        self.instances.len() as u32
    }

    /// Raw pointer to instance data for host reads.
    pub fn instances_ptr(&self) -> *const f32 {
        self.instances.as_ptr() as *const f32
    }

    /// Flat float view of the instances.
    pub fn as_floats(&self) -> &[f32] {
        bytemuck::cast_slice(&self.instances)
    }
}

impl Default for InstanceBuffer {
    fn default() -> Self {
        Self::new()
    }
}
