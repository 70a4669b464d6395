//! Fixed color tables shared with clients.

use protocol::Palette;

/// Snake color pairs, indexed by `Snake::palette_idx`.
pub const PALETTES: [[&str; 2]; 12] = [
    ["#ff6b6b", "#ee5a24"],
    ["#48dbfb", "#0abde3"],
    ["#feca57", "#ff9f43"],
    ["#55efc4", "#00b894"],
    ["#a29bfe", "#6c5ce7"],
    ["#fd79a8", "#e84393"],
    ["#fdcb6e", "#f39c12"],
    ["#00cec9", "#00b894"],
    ["#e17055", "#d63031"],
    ["#74b9ff", "#0984e3"],
    ["#dfe6e9", "#b2bec3"],
    ["#fab1a0", "#e17055"],
];

/// Food colors.
pub const FOOD_COLORS: [&str; 10] = [
    "#ff6b6b", "#48dbfb", "#feca57", "#55efc4", "#a29bfe", "#fd79a8", "#fdcb6e", "#00cec9",
    "#ff9ff3", "#f368e0",
];

/// The palette table in its wire form (sent with every welcome).
pub fn palette_table() -> Vec<Palette> {
    PALETTES
        .iter()
        .map(|[a, b]| [a.to_string(), b.to_string()])
        .collect()
}
