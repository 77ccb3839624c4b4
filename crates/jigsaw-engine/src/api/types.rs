use bytemuck::{Pod, Zeroable};

/// Identity of a piece: 1..=N in sorted scan order, stable across shuffles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PieceId(pub u32);

/// Identity of a group. Generated by the store and never reused within a session,
/// so an id captured before a reshuffle or reload can be detected as stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GroupId(pub u32);

/// Drag lifecycle cue for the audio layer.
/// Each variant fires exactly once per corresponding transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum CueEvent {
    /// A group was grabbed.
    Pickup = 0,
    /// A grabbed group was released (or the gesture was cancelled).
    Drop = 1,
    /// Two groups merged.
    Connect = 2,
    /// A release was out of bounds and the group started animating back.
    SnapbackStart = 3,
    /// A snapback animation reached its target.
    SnapbackLand = 4,
}

impl CueEvent {
    /// Convert to u8 for the flat cue buffer.
    pub fn as_u8(self) -> u8 {
        self as u8
    }
}

/// Partition statistics for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PuzzleStats {
    /// Active pieces (configured count minus skip-listed ones).
    pub pieces: usize,
    /// Number of groups currently on the board.
    pub groups: usize,
    /// Member count of the largest group.
    pub largest_group: usize,
}

/// State-change notifications consumed by the timer, celebration and stats layers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SessionEvent {
    /// `absorbed` was merged into `anchor`, which now holds `size` pieces.
    Merged { anchor: GroupId, absorbed: GroupId, size: usize },
    /// All active pieces form one group. Fires at most once per solve.
    Won { pieces: usize },
    /// The board was scattered (initial load or reshuffle).
    Shuffled,
    /// Group/piece statistics changed.
    StatsChanged(PuzzleStats),
}

/// A session event flattened for the host: `kind` identifies the event, `a/b/c` carry payload.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, Pod, Zeroable)]
pub struct PackedEvent {
    pub kind: f32,
    pub a: f32,
    pub b: f32,
    pub c: f32,
}

impl PackedEvent {
    pub const FLOATS: usize = 4;

    pub const KIND_MERGED: f32 = 1.0;
    pub const KIND_WON: f32 = 2.0;
    pub const KIND_SHUFFLED: f32 = 3.0;
    pub const KIND_STATS: f32 = 4.0;
}

impl From<&SessionEvent> for PackedEvent {
    fn from(event: &SessionEvent) -> Self {
        match *event {
            SessionEvent::Merged { anchor, absorbed, size } => PackedEvent {
                kind: Self::KIND_MERGED,
                a: anchor.0 as f32,
                b: absorbed.0 as f32,
                c: size as f32,
            },
            SessionEvent::Won { pieces } => PackedEvent {
                kind: Self::KIND_WON,
                a: pieces as f32,
                ..Default::default()
            },
            SessionEvent::Shuffled => PackedEvent {
                kind: Self::KIND_SHUFFLED,
                ..Default::default()
            },
            SessionEvent::StatsChanged(stats) => PackedEvent {
                kind: Self::KIND_STATS,
                a: stats.pieces as f32,
                b: stats.groups as f32,
                c: stats.largest_group as f32,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn packed_event_is_four_floats() {
        assert_eq!(std::mem::size_of::<PackedEvent>(), PackedEvent::FLOATS * 4);
    }

    #[test]
    fn stats_event_packs_counts() {
        let packed = PackedEvent::from(&SessionEvent::StatsChanged(PuzzleStats {
            pieces: 28,
            groups: 3,
            largest_group: 20,
        }));
        assert_eq!(packed.kind, PackedEvent::KIND_STATS);
        assert_eq!(packed.a, 28.0);
        assert_eq!(packed.b, 3.0);
        assert_eq!(packed.c, 20.0);
    }

    #[test]
    fn cue_codes_are_stable() {
        assert_eq!(CueEvent::Pickup.as_u8(), 0);
        assert_eq!(CueEvent::SnapbackLand.as_u8(), 4);
    }
}
