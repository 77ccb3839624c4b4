use std::collections::BTreeSet;
use glam::Vec2;
use crate::api::types::{GroupId, PieceId};
use crate::components::layer::RenderBand;
use crate::core::store::PieceStore;
use crate::renderer::instance::{InstanceBuffer, PieceInstance};

fn band_of(store: &PieceStore, piece: PieceId) -> Option<RenderBand> {
    let gid = store.group_of(piece)?;
    store.group(gid).map(|g| RenderBand::for_group_size(g.len()))
}

/// Re-band a draw order: pieces of merged groups first, single pieces after.
///
/// Relative order inside each band is preserved. Pieces no longer in the store are
/// dropped; store pieces missing from `order` are appended in id order.
pub fn banded_order(order: &[PieceId], store: &PieceStore) -> Vec<PieceId> {
    let mut seen = BTreeSet::new();
    let mut grouped = Vec::new();
    let mut singles = Vec::new();
    let known = order.iter().copied();
    let missing = store.pieces().map(|p| p.id);
    for pid in known.chain(missing) {
        if !seen.insert(pid) {
            continue;
        }
        match band_of(store, pid) {
            Some(RenderBand::Grouped) => grouped.push(pid),
            Some(RenderBand::Single) => singles.push(pid),
            None => {}
        }
    }
    grouped.extend(singles);
    grouped
}

/// Back-to-front stacking order of all pieces.
#[derive(Debug, Clone, Default)]
pub struct DrawOrder {
    order: Vec<PieceId>,
}

impl DrawOrder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn as_slice(&self) -> &[PieceId] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Re-apply banding after any partition change.
    pub fn enforce(&mut self, store: &PieceStore) {
        self.order = banded_order(&self.order, store);
    }

    /// Raise a group to the top of its band. A single piece goes to the absolute front;
    /// a merged group goes just below the first single piece.
    pub fn bring_group_to_front(&mut self, store: &PieceStore, group: GroupId) {
        let Some(g) = store.group(group) else {
            return;
        };
        let members: Vec<PieceId> = self
            .order
            .iter()
            .copied()
            .filter(|pid| g.contains(*pid))
            .collect();
        self.order.retain(|pid| !g.contains(*pid));
        let insert_at = if g.is_single() {
            self.order.len()
        } else {
            self.order
                .iter()
                .position(|pid| band_of(store, *pid) == Some(RenderBand::Single))
                .unwrap_or(self.order.len())
        };
        self.order.splice(insert_at..insert_at, members);
    }
}

/// Rotation pivot of a group: center of its members' base positions plus the offset,
/// raised by `pivot_bias` puzzle units.
pub fn group_pivot(store: &PieceStore, group: GroupId, pivot_bias: f32) -> Option<Vec2> {
    let center = store.group_base_center(group)?;
    let offset = store.group(group)?.offset;
    Some(center + offset - Vec2::new(0.0, pivot_bias))
}

/// Write one instance per piece, in draw order.
pub fn build_instance_buffer(order: &DrawOrder, store: &PieceStore, pivot_bias: f32, buffer: &mut InstanceBuffer) {
    buffer.clear();
    let mut split = None;
    for pid in order.as_slice() {
        let Some(piece) = store.piece(*pid) else {
            continue;
        };
        let Some(group) = store.group(piece.group) else {
            continue;
        };
        let band = RenderBand::for_group_size(group.len());
        if band == RenderBand::Single && split.is_none() {
            split = Some(buffer.instance_count());
        }
        let pivot = group_pivot(store, group.id, pivot_bias).unwrap_or(piece.base + group.offset);
        buffer.push(PieceInstance {
            piece: piece.id.0 as f32,
            handle: piece.handle as f32,
            dx: group.offset.x,
            dy: group.offset.y,
            angle: group.rotation.angle,
            pivot_x: pivot.x,
            pivot_y: pivot.y,
            band: band.as_u8() as f32,
        });
    }
    buffer.band_split = split.unwrap_or(buffer.instance_count());
}
