//! Server -> Client message definitions.

use serde::{Deserialize, Serialize};

/// A palette entry: primary and secondary color as CSS hex strings.
pub type Palette = [String; 2];

/// Server message, serialized as a JSON object tagged by `t`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "t")]
pub enum ServerMessage {
    /// Sent on join/respawn.
    #[serde(rename = "w")]
    Welcome {
        /// The freshly created snake id.
        id: String,
        #[serde(rename = "ws")]
        world_size: f32,
        #[serde(rename = "p")]
        palettes: Vec<Palette>,
    },
    /// Per-client view of the world.
    #[serde(rename = "s")]
    State {
        #[serde(rename = "s")]
        snakes: Vec<SnakeView>,
        #[serde(rename = "f")]
        foods: Vec<FoodView>,
        /// The recipient's own snake id.
        #[serde(rename = "y")]
        you: String,
    },
    /// Sent once when the client's current snake dies.
    #[serde(rename = "d")]
    Death {
        #[serde(rename = "sc")]
        score: usize,
        #[serde(rename = "l")]
        length: usize,
    },
}

impl ServerMessage {
    /// Encode as a JSON text frame payload.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// Compact snake entry.
///
/// Encoded as `[id, name, [x0, y0, x1, y1, ...], paletteIdx, length, angle, boost, score]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "SnakeTuple", into = "SnakeTuple")]
pub struct SnakeView {
    pub id: String,
    pub name: String,
    /// Subsampled body as flat rounded x/y pairs, head first, tail last.
    pub points: Vec<i32>,
    pub palette_idx: usize,
    pub length: usize,
    /// Heading rounded to two decimals.
    pub angle: f32,
    pub boosting: bool,
    pub score: usize,
}

type SnakeTuple = (String, String, Vec<i32>, usize, usize, f32, u8, usize);

impl From<SnakeTuple> for SnakeView {
    fn from(t: SnakeTuple) -> Self {
        Self {
            id: t.0,
            name: t.1,
            points: t.2,
            palette_idx: t.3,
            length: t.4,
            angle: t.5,
            boosting: t.6 != 0,
            score: t.7,
        }
    }
}

impl From<SnakeView> for SnakeTuple {
    fn from(v: SnakeView) -> Self {
        (
            v.id,
            v.name,
            v.points,
            v.palette_idx,
            v.length,
            v.angle,
            v.boosting as u8,
            v.score,
        )
    }
}

/// Compact food entry, encoded as `[x, y, color, radius]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "FoodTuple", into = "FoodTuple")]
pub struct FoodView {
    pub x: i32,
    pub y: i32,
    pub color: String,
    pub radius: f32,
}

type FoodTuple = (i32, i32, String, f32);

impl From<FoodTuple> for FoodView {
    fn from((x, y, color, radius): FoodTuple) -> Self {
        Self { x, y, color, radius }
    }
}

impl From<FoodView> for FoodTuple {
    fn from(v: FoodView) -> Self {
        (v.x, v.y, v.color, v.radius)
    }
}
