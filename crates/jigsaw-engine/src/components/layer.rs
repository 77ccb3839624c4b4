/// Render band: controls stacking of pieces.
///
/// Bands are drawn back-to-front: merged groups first, loose pieces on top of them,
/// so a freshly scattered piece is never hidden under a large assembled region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[repr(u8)]
pub enum RenderBand {
    /// Pieces belonging to a group of two or more.
    Grouped = 0,
    /// Pieces that are still on their own.
    #[default]
    Single = 1,
}

impl RenderBand {
    /// Band for a group with `members` pieces.
    pub fn for_group_size(members: usize) -> Self {
        if members > 1 {
            Self::Grouped
        } else {
            Self::Single
        }
    }

    /// Convert to u8 for the instance buffer.
    pub fn as_u8(self) -> u8 {
        self as u8
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grouped_draws_below_single() {
        assert!(RenderBand::Grouped < RenderBand::Single);
    }

    #[test]
    fn band_follows_size() {
        assert_eq!(RenderBand::for_group_size(1), RenderBand::Single);
        assert_eq!(RenderBand::for_group_size(2), RenderBand::Grouped);
    }
}
