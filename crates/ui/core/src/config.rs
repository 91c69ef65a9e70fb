/// Sorting-order layout constants and tunable parameters.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct LayoutConfig {
    /// First band handed out, and the floor `next_band` is clamped to.
    pub initial_band: i32,
    /// Fixed width added to every non-pinned band on top of its child count.
    pub band_increment: i32,
    /// Order step between consecutive child windows inside a parent band.
    pub child_order_offset: i32,
    /// Reserved order given to pinned windows.
    pub pinned_order: i32,
}

impl LayoutConfig {
    pub const DEFAULT_INITIAL_BAND: i32 = 1;
    pub const DEFAULT_BAND_INCREMENT: i32 = 10;
    pub const DEFAULT_CHILD_ORDER_OFFSET: i32 = 1;
    pub const DEFAULT_PINNED_ORDER: i32 = 1000;

    pub const fn new() -> Self {
        Self {
            initial_band: Self::DEFAULT_INITIAL_BAND,
            band_increment: Self::DEFAULT_BAND_INCREMENT,
            child_order_offset: Self::DEFAULT_CHILD_ORDER_OFFSET,
            pinned_order: Self::DEFAULT_PINNED_ORDER,
        }
    }
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self::new()
    }
}
