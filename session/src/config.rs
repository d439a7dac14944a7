use serde::{Deserialize, Serialize};
use withersweeper_core::BoardConfig;

/// Match configuration as supplied by the host framework. Everything except the
/// board shape is optional and falls back to the classic defaults: a single
/// allowed mistake and a red-banner flag marker.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MatchConfig {
    pub board: BoardConfig,
    #[serde(default = "default_max_mistakes")]
    pub max_mistakes: u32,
    /// Cosmetic marker descriptor for the flag item; ignored by all game logic.
    #[serde(default = "default_flag_icon")]
    pub flag_icon: String,
}

fn default_max_mistakes() -> u32 {
    1
}

fn default_flag_icon() -> String {
    "red_banner".into()
}

impl MatchConfig {
    pub fn new(board: BoardConfig) -> Self {
        Self {
            board,
            max_mistakes: default_max_mistakes(),
            flag_icon: default_flag_icon(),
        }
    }

    pub fn from_json(raw: &str) -> serde_json::Result<Self> {
        serde_json::from_str(raw)
    }
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self::new(BoardConfig::default())
    }
}
