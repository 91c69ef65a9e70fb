//! Sorting-order band allocation.
//!
//! Every non-pinned root controller reserves a band of
//! `child_count + band_increment` orders starting at `next_band`. Releasing a
//! band gives back exactly that width and tells every window above the
//! released threshold to slide down, so bands stay dense no matter which
//! order windows close in.
use std::collections::HashMap;

use tracing::trace;

use crate::config::LayoutConfig;
use crate::types::NodeId;
use crate::window::WindowStore;

/// Band held by one controller.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Reservation {
    pub band: i32,
    pub width: i32,
}

/// Outcome of a release, as broadcast to the windows.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BandRelease {
    pub threshold: i32,
    pub amount: i32,
    pub shifted: usize,
}

#[derive(Debug)]
pub struct SortingOrderAllocator {
    next_band: i32,
    /// Lowest value `next_band` may fall back to.
    floor: i32,
    layout: LayoutConfig,
    reservations: HashMap<NodeId, Reservation>,
}

impl SortingOrderAllocator {
    pub fn new(layout: LayoutConfig) -> Self {
        Self {
            next_band: layout.initial_band,
            floor: layout.initial_band,
            layout,
            reservations: HashMap::new(),
        }
    }

    pub fn next_band(&self) -> i32 {
        self.next_band
    }

    pub fn layout(&self) -> &LayoutConfig {
        &self.layout
    }

    pub fn reservation(&self, node: NodeId) -> Option<Reservation> {
        self.reservations.get(&node).copied()
    }

    /// Assign a band for `node`.
    ///
    /// Pinned nodes get the reserved order and hold no reservation.
    pub fn assign(&mut self, node: NodeId, child_count: usize, pinned: bool) -> i32 {
        if pinned {
            return self.layout.pinned_order;
        }

        let band = self.next_band;
        let width = child_count as i32 + self.layout.band_increment;
        self.next_band += width;
        self.reservations.insert(node, Reservation { band, width });

        trace!(
            target: "ui::sorting",
            node = %node,
            band,
            width,
            next_band = self.next_band,
            "band assigned"
        );

        band
    }

    /// Release the band held by `node` and shift the windows above it.
    ///
    /// `threshold` is the node's current order, which may differ from the
    /// band it was assigned if earlier releases slid it down. Returns `None`
    /// when the node holds no reservation (pinned, or reset by a scene change).
    pub fn release(
        &mut self,
        node: NodeId,
        threshold: i32,
        windows: &mut WindowStore,
    ) -> Option<BandRelease> {
        let reservation = self.reservations.remove(&node)?;

        self.next_band = (self.next_band - reservation.width).max(self.floor);

        for other in self.reservations.values_mut() {
            if other.band > threshold {
                other.band -= reservation.width;
            }
        }
        let shifted = windows.broadcast_band_release(threshold, reservation.width);

        trace!(
            target: "ui::sorting",
            node = %node,
            threshold,
            width = reservation.width,
            shifted,
            next_band = self.next_band,
            "band released"
        );

        Some(BandRelease {
            threshold,
            amount: reservation.width,
            shifted,
        })
    }

    /// Forget every reservation and start over from the initial band.
    pub fn reset(&mut self) {
        self.next_band = self.layout.initial_band;
        self.floor = self.layout.initial_band;
        self.reservations.clear();
    }

    /// Keep future bands above `order`, held by a window no reservation
    /// accounts for.
    pub fn resume_above(&mut self, order: i32) {
        self.floor = self.floor.max(order + 1);
        self.next_band = self.next_band.max(self.floor);
    }
}

impl Default for SortingOrderAllocator {
    fn default() -> Self {
        Self::new(LayoutConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::window::RawWindow;

    #[test]
    fn assign_then_release_restores_next_band() {
        let mut allocator = SortingOrderAllocator::default();
        let mut windows = WindowStore::new();
        let before = allocator.next_band();

        let band = allocator.assign(NodeId(1), 3, false);
        assert_eq!(band, before);
        assert_eq!(allocator.next_band(), before + 13);

        allocator.release(NodeId(1), band, &mut windows);
        assert_eq!(allocator.next_band(), before);
    }

    #[test]
    fn pinned_nodes_use_sentinel_and_never_release() {
        let mut allocator = SortingOrderAllocator::default();
        let mut windows = WindowStore::new();

        let band = allocator.assign(NodeId(7), 2, true);

        assert_eq!(band, LayoutConfig::DEFAULT_PINNED_ORDER);
        assert_eq!(allocator.next_band(), 1);
        assert!(allocator.release(NodeId(7), band, &mut windows).is_none());
    }

    #[test]
    fn out_of_order_release_shifts_later_windows_by_exact_width() {
        let mut allocator = SortingOrderAllocator::default();
        let mut windows = WindowStore::new();

        let r_band = allocator.assign(NodeId(1), 2, false);
        let r_window = windows.insert(RawWindow::new(), r_band, false);
        assert_eq!(r_band, 1);
        assert_eq!(allocator.next_band(), 13);

        let s_band = allocator.assign(NodeId(2), 0, false);
        let s_window = windows.insert(RawWindow::new(), s_band, false);
        assert_eq!(s_band, 13);
        assert_eq!(allocator.next_band(), 23);

        let release = allocator.release(NodeId(1), r_band, &mut windows).unwrap();
        windows.remove(r_window);

        assert_eq!(release.amount, 12);
        assert_eq!(release.shifted, 1);
        assert_eq!(allocator.next_band(), 11);
        assert_eq!(windows.sorting_order(s_window), Some(1));
        assert_eq!(allocator.reservation(NodeId(2)).unwrap().band, 1);

        // The next band starts right after the shifted window.
        assert_eq!(allocator.assign(NodeId(3), 0, false), 11);
    }

    #[test]
    fn next_band_never_drops_below_initial() {
        let mut allocator = SortingOrderAllocator::default();
        let mut windows = WindowStore::new();

        let band = allocator.assign(NodeId(1), 0, false);
        allocator.reset();
        allocator.assign(NodeId(2), 0, false);
        allocator.reservations.insert(
            NodeId(1),
            Reservation {
                band,
                width: 50,
            },
        );

        allocator.release(NodeId(1), band, &mut windows);
        assert_eq!(allocator.next_band(), 1);
    }

    #[test]
    fn bands_resumed_above_a_survivor_never_drop_back_onto_it() {
        let mut allocator = SortingOrderAllocator::default();
        let mut windows = WindowStore::new();

        allocator.reset();
        allocator.resume_above(11);
        assert_eq!(allocator.next_band(), 12);

        let band = allocator.assign(NodeId(1), 0, false);
        assert_eq!(band, 12);
        allocator.release(NodeId(1), band, &mut windows);
        assert_eq!(allocator.next_band(), 12);

        allocator.reset();
        assert_eq!(allocator.next_band(), 1);
    }
}
