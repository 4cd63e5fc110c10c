//! Memory layout constants for the game structures touched by hook callbacks
//!
//! Offsets are relative to the register that holds the structure pointer at
//! the hook site. Constants are organized by fix.

/// Graphics settings block (pointer in RDX)
pub mod graphics {
    /// Anti-aliasing level byte: 1 LOW, 2 MEDIUM, 3 HIGH
    pub const ANTI_ALIASING: u64 = 0x10;
    /// Highest level the widened viewport survives
    pub const MAX_ANTI_ALIASING: u8 = 2;
}

/// UI component being laid out (pointer in RBX)
pub mod ui_element {
    /// X offset where rendering of the component starts
    pub const X_OFFSET: u64 = 0x388;
    /// Horizontal pixel count to render (written by the hook)
    pub const X_EXTENT: u64 = 0x390;
    /// Horizontal pixel count the game computed
    pub const X_EXTENT_SOURCE: u64 = 0x394;

    /// Reference width the map offset is expressed in
    pub const MAP_REFERENCE_WIDTH: f32 = 682.0;
    /// Map inset at the reference width
    pub const MAP_INSET: f32 = 40.0;
    /// Alternate map inset seen in some areas (~41.87)
    pub const MAP_INSET_ALT_BITS: u32 = 0x4227_799A;
}

/// Combat overlay sub-object (pointer in RDX)
pub mod combat_overlay {
    /// Object id carried in R13 when the overlay is being copied
    pub const OBJECT_ID: u64 = 0x68;
    pub const SCALE: u64 = 0x280;
    pub const ORIGIN: u64 = 0x2B0;
    /// -1.0f32
    pub const ORIGIN_VALUE: u32 = 0xBF80_0000;
}

/// Text bubble projection (pointer in RBX)
pub mod text_bubble {
    /// Aspect ratio operand of the `divss xmm1, [rbx+4]`
    pub const ASPECT_RATIO: u64 = 0x4;
    /// 16:9 as f32 (1.7777778)
    pub const STOCK_ASPECT_BITS: u32 = 0x3FE3_8E39;
}

/// In-engine cutscene frustum (stack locals)
pub mod cutscene {
    /// Left frustum bound (-4.84 at 16:9)
    pub const LEFT: u64 = 0x38;
    /// Right frustum bound (4.84 at 16:9)
    pub const RIGHT: u64 = 0x3C;
}

/// Timing constants for module polling
pub mod timing {
    /// First delay after an unsuccessful module poll (ms)
    pub const MODULE_POLL_INTERVAL_MS: u64 = 1;

    /// Ceiling the poll delay backs off to (ms)
    pub const MAX_MODULE_POLL_INTERVAL_MS: u64 = 50;
}
