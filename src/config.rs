//! Runtime knobs for the controller.
//!
//! Everything has a default matching the stock page; `start_hive_with_config`
//! lets the host page override any subset through a JSON object.

use serde::Deserialize;

/// Animation and banner timings, all in milliseconds.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct Timing {
    pub spin_ms: u32,
    pub stagger_ms: u32,
    pub center_extra_ms: u32,
    pub message_ms: u32,
    pub new_game_message_ms: u32,
    pub selection_error_ms: u32,
    pub shake_ms: u32,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            spin_ms: 1500,
            stagger_ms: 200,
            center_extra_ms: 100,
            message_ms: 3000,
            new_game_message_ms: 2000,
            selection_error_ms: 3000,
            shake_ms: 400,
        }
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct HiveConfig {
    /// Prefix for every endpoint; empty means same origin.
    pub api_base: String,
    pub ticker_capacity: usize,
    pub timing: Timing,
    /// Server messages that clear the guess even though the word was not accepted.
    pub clear_on_messages: Vec<String>,
}

impl Default for HiveConfig {
    fn default() -> Self {
        Self {
            api_base: String::new(),
            ticker_capacity: 7,
            timing: Timing::default(),
            clear_on_messages: vec!["Already found!".to_string()],
        }
    }
}

impl HiveConfig {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.api_base.trim_end_matches('/'), path)
    }
}
