//! Network adapter: request/response shapes for the four game endpoints and
//! thin `gloo-net` wrappers around them.

use std::collections::BTreeMap;

use gloo::net::http::{Request, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::hive::{Hive, SuppliedSegment};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ApiError {
    #[error("{0}")]
    Network(String),
    #[error("{}", status_text(.status, .message))]
    Status { status: u16, message: Option<String> },
    #[error("{0}")]
    Decode(String),
    #[error("{0}")]
    Rejected(String),
}

impl From<gloo::net::Error> for ApiError {
    fn from(e: gloo::net::Error) -> Self {
        match e {
            gloo::net::Error::SerdeError(inner) => ApiError::Decode(inner.to_string()),
            other => ApiError::Network(other.to_string()),
        }
    }
}

fn status_text(status: &u16, message: &Option<String>) -> String {
    match message {
        Some(m) => m.clone(),
        None => format!("HTTP error! status: {status}"),
    }
}

/// Scores and ranks are echoed verbatim; accept numbers or strings.
fn echo<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    Ok(match Option::<Value>::deserialize(d)? {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s),
        Some(other) => Some(other.to_string()),
    })
}

fn first_letter(s: &str) -> Option<char> {
    s.trim().chars().next().filter(|c| c.is_ascii_alphabetic()).map(|c| c.to_ascii_lowercase())
}

// --- /guess -------------------------------------------------------------------

#[derive(Serialize, Debug)]
pub struct GuessRequest<'a> {
    pub guess: &'a str,
}

#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct GuessResponse {
    pub status: Option<String>,
    pub valid: Option<bool>,
    pub message: Option<String>,
    #[serde(deserialize_with = "echo")]
    pub score: Option<String>,
    #[serde(deserialize_with = "echo")]
    pub rank: Option<String>,
    pub found_words_count: Option<u32>,
    pub updated_list_type: Option<String>,
    pub new_found_count: Option<u32>,
    pub found_words: Option<Vec<String>>,
    pub word: Option<String>,
    pub is_pangram: bool,
    pub all_found: bool,
}

// --- /definition/{word} ------------------------------------------------------

#[derive(Deserialize, Debug, Default)]
#[serde(default)]
struct DefinitionResponse {
    definition: Option<String>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(default)]
struct ErrorBody {
    message: Option<String>,
    error: Option<String>,
}

// --- /get_dictionary_options -------------------------------------------------

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Icon {
    Emoji(String),
    Image(String),
}

impl Icon {
    fn from_parts(kind: Option<&str>, value: Option<&str>) -> Option<Icon> {
        let value = value.map(str::trim).filter(|v| !v.is_empty())?.to_string();
        match kind.unwrap_or("emoji") {
            "image" | "img" | "url" => Some(Icon::Image(value)),
            _ => Some(Icon::Emoji(value)),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct DictionaryOption {
    pub id: String,
    pub label: String,
    pub icon: Option<Icon>,
    /// False means the list is always on and the checkbox is locked.
    pub optional: bool,
    pub selected: bool,
}

#[derive(Deserialize, Debug)]
#[serde(untagged)]
enum RawOption {
    Id(String),
    Full(FullOption),
}

#[derive(Deserialize, Debug, Default)]
#[serde(default)]
struct FullOption {
    id: Option<String>,
    value: Option<String>,
    label: Option<String>,
    optional: Option<bool>,
    checked: Option<bool>,
    icon_type: Option<String>,
    icon_value: Option<String>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(default)]
pub struct DictionaryOptionsResponse {
    options: Option<Vec<RawOption>>,
    selected: Option<Vec<String>>,
}

fn capitalize(id: &str) -> String {
    let mut chars = id.chars();
    match chars.next() {
        Some(c) => c.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

impl DictionaryOptionsResponse {
    pub fn into_options(self) -> Result<Vec<DictionaryOption>, ApiError> {
        let (Some(options), Some(selected)) = (self.options, self.selected) else {
            return Err(ApiError::Decode("Invalid data format received from server.".into()));
        };
        Ok(options
            .into_iter()
            .filter_map(|raw| match raw {
                RawOption::Id(id) => Some(DictionaryOption {
                    label: capitalize(&id),
                    selected: selected.contains(&id),
                    id,
                    icon: None,
                    optional: true,
                }),
                RawOption::Full(f) => {
                    let id = f.id.or(f.value)?;
                    Some(DictionaryOption {
                        label: f.label.unwrap_or_else(|| capitalize(&id)),
                        selected: f.checked.unwrap_or(false) || selected.contains(&id),
                        icon: Icon::from_parts(f.icon_type.as_deref(), f.icon_value.as_deref()),
                        optional: f.optional.unwrap_or(true),
                        id,
                    })
                }
            })
            .collect())
    }
}

// --- /start_game --------------------------------------------------------------

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct StartGameRequest {
    pub selected_lists: Vec<String>,
}

#[derive(Deserialize, Debug, Clone, Copy, Default, PartialEq)]
#[serde(default)]
pub struct WordCount {
    pub found: u32,
    pub total: u32,
}

#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct ListMetadata {
    pub label: Option<String>,
    pub icon_type: Option<String>,
    pub icon_value: Option<String>,
}

impl ListMetadata {
    pub fn icon(&self) -> Option<Icon> {
        Icon::from_parts(self.icon_type.as_deref(), self.icon_value.as_deref())
    }
}

#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct SegmentData {
    pub letter: Option<String>,
    #[serde(alias = "d", alias = "segment_path")]
    pub path: Option<String>,
    #[serde(alias = "text_x", alias = "label_x")]
    pub x: Option<f64>,
    #[serde(alias = "text_y", alias = "label_y")]
    pub y: Option<f64>,
}

#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct StartGameResponse {
    pub success: bool,
    pub center_letter: Option<String>,
    pub outer_letters: Option<Vec<String>>,
    pub outer_segments_data: Option<Vec<SegmentData>>,
    pub center_radius: Option<f64>,
    pub all_letters: Vec<String>,
    pub total_score: Option<u32>,
    #[serde(deserialize_with = "echo")]
    pub current_score: Option<String>,
    #[serde(deserialize_with = "echo")]
    pub rank: Option<String>,
    pub word_counts_by_type: BTreeMap<String, WordCount>,
    pub active_dict_metadata: BTreeMap<String, ListMetadata>,
    pub message: Option<String>,
    pub error: Option<String>,
}

impl StartGameResponse {
    pub fn center(&self) -> Option<char> {
        self.center_letter.as_deref().and_then(first_letter)
    }

    /// Build the hive from whichever letter shape the server sent. Returns
    /// `None` when no center letter is present.
    pub fn hive(&self) -> Option<Hive> {
        let center = self.center()?;
        if let Some(outer) = &self.outer_letters {
            return Some(Hive::new(center, outer.iter().filter_map(|l| first_letter(l)).collect()));
        }
        if let Some(segs) = &self.outer_segments_data {
            let outer: Vec<char> = segs.iter().filter_map(|s| s.letter.as_deref().and_then(first_letter)).collect();
            let supplied: Vec<SuppliedSegment> = segs
                .iter()
                .filter_map(|s| match (&s.path, s.x, s.y) {
                    (Some(path), Some(x), Some(y)) => Some(SuppliedSegment { path: path.clone(), label: (x, y) }),
                    _ => None,
                })
                .collect();
            let mut hive = Hive::new(center, outer);
            if supplied.len() == hive.outer.len() {
                hive.supplied = supplied;
            }
            return Some(hive);
        }
        let all: Vec<char> = self.all_letters.iter().filter_map(|l| first_letter(l)).collect();
        Some(Hive::from_letters(center, &all))
    }

    /// Letters accepted from the keyboard. Prefers `all_letters`, then the hive.
    pub fn letter_set(&self) -> std::collections::BTreeSet<char> {
        let from_all: std::collections::BTreeSet<char> =
            self.all_letters.iter().filter_map(|l| first_letter(l)).collect();
        if !from_all.is_empty() {
            return from_all;
        }
        self.hive().map(|h| h.letters()).unwrap_or_default()
    }
}

// --- Client -----------------------------------------------------------------

#[derive(Clone, Debug)]
pub struct Api {
    base: String,
}

impl Api {
    pub fn new(base: impl Into<String>) -> Self {
        Self { base: base.into().trim_end_matches('/').to_string() }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    pub async fn guess(&self, guess: &str) -> Result<GuessResponse, ApiError> {
        let resp = Request::post(&self.url("/guess")).json(&GuessRequest { guess })?.send().await?;
        decode(resp).await
    }

    pub async fn definition(&self, word: &str) -> Result<String, ApiError> {
        let encoded: String = js_sys::encode_uri_component(word).into();
        let resp = Request::get(&self.url(&format!("/definition/{encoded}"))).send().await?;
        if !resp.ok() {
            let body = resp.json::<ErrorBody>().await.unwrap_or_default();
            return Err(ApiError::Status {
                status: resp.status(),
                message: Some(body.message.or(body.error).unwrap_or_else(|| "Failed to fetch definition".into())),
            });
        }
        let data: DefinitionResponse = resp.json().await?;
        Ok(data.definition.unwrap_or_default())
    }

    pub async fn dictionary_options(&self) -> Result<Vec<DictionaryOption>, ApiError> {
        let resp = Request::get(&self.url("/get_dictionary_options")).send().await?;
        if !resp.ok() {
            return Err(ApiError::Status { status: resp.status(), message: None });
        }
        resp.json::<DictionaryOptionsResponse>().await?.into_options()
    }

    pub async fn start_game(&self, selected_lists: Vec<String>) -> Result<StartGameResponse, ApiError> {
        let resp = Request::post(&self.url("/start_game"))
            .json(&StartGameRequest { selected_lists })?
            .send()
            .await?;
        let status = resp.status();
        let ok = resp.ok();
        let data: StartGameResponse = resp.json().await.unwrap_or_default();
        let reason = data.error.clone().or_else(|| data.message.clone());
        if !ok {
            return Err(ApiError::Status {
                status,
                message: Some(reason.unwrap_or_else(|| format!("Failed to start game (Status: {status})"))),
            });
        }
        if !data.success {
            return Err(ApiError::Rejected(reason.unwrap_or_else(|| "Invalid response data received.".into())));
        }
        Ok(data)
    }
}

/// Non-2xx becomes `Status` carrying the body's `message`/`error` if any.
async fn decode<T: DeserializeOwned>(resp: Response) -> Result<T, ApiError> {
    if !resp.ok() {
        let body = resp.json::<ErrorBody>().await.unwrap_or_default();
        return Err(ApiError::Status { status: resp.status(), message: body.message.or(body.error) });
    }
    Ok(resp.json::<T>().await?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guess_response_accepts_numeric_or_text_score() {
        let r: GuessResponse = serde_json::from_str(r#"{"valid":true,"score":12,"rank":"Good"}"#).unwrap();
        assert_eq!(r.score.as_deref(), Some("12"));
        assert_eq!(r.rank.as_deref(), Some("Good"));
        let r: GuessResponse = serde_json::from_str(r#"{"score":"7","rank":null}"#).unwrap();
        assert_eq!(r.score.as_deref(), Some("7"));
        assert_eq!(r.rank, None);
    }

    #[test]
    fn dictionary_options_accept_both_shapes() {
        let resp: DictionaryOptionsResponse = serde_json::from_str(
            r#"{"options":["animals",{"id":"csw21","label":"Scrabble","optional":false,"icon_type":"emoji","icon_value":"🔤"},{"value":"food","icon_type":"image","icon_value":"/i/food.png","checked":true}],
                "selected":["animals"]}"#,
        )
        .unwrap();
        let opts = resp.into_options().unwrap();
        assert_eq!(opts.len(), 3);
        assert_eq!(opts[0].label, "Animals");
        assert!(opts[0].selected);
        assert!(!opts[1].optional);
        assert!(!opts[1].selected);
        assert_eq!(opts[1].icon, Some(Icon::Emoji("🔤".into())));
        assert_eq!(opts[2].id, "food");
        assert!(opts[2].selected);
        assert_eq!(opts[2].icon, Some(Icon::Image("/i/food.png".into())));
    }

    #[test]
    fn dictionary_options_without_selected_is_malformed() {
        let resp: DictionaryOptionsResponse = serde_json::from_str(r#"{"options":[]}"#).unwrap();
        assert!(matches!(resp.into_options(), Err(ApiError::Decode(_))));
    }

    #[test]
    fn start_game_prefers_explicit_outer_letters() {
        let r: StartGameResponse = serde_json::from_str(
            r#"{"success":true,"center_letter":"T","outer_letters":["f","e","d","c","b","a"],"all_letters":["a","b","c","d","e","f","t"]}"#,
        )
        .unwrap();
        let hive = r.hive().unwrap();
        assert_eq!(hive.center, 't');
        assert_eq!(hive.outer, vec!['f', 'e', 'd', 'c', 'b', 'a']);
    }

    #[test]
    fn start_game_keeps_server_geometry_when_complete() {
        let segs: Vec<String> = (0..6)
            .map(|i| format!(r#"{{"letter":"{}","d":"M0,0 Z","text_x":{i}.0,"text_y":1.0}}"#, (b'a' + i) as char))
            .collect();
        let json = format!(r#"{{"success":true,"center_letter":"t","outer_segments_data":[{}],"center_radius":40}}"#, segs.join(","));
        let r: StartGameResponse = serde_json::from_str(&json).unwrap();
        let hive = r.hive().unwrap();
        assert_eq!(hive.supplied.len(), 6);
        assert_eq!(hive.supplied[3].label, (3.0, 1.0));
        assert_eq!(r.center_radius, Some(40.0));
        // No all_letters: the set is rebuilt from the hive.
        assert_eq!(r.letter_set().len(), 7);
    }

    #[test]
    fn status_error_falls_back_to_http_code() {
        let e = ApiError::Status { status: 502, message: None };
        assert_eq!(e.to_string(), "HTTP error! status: 502");
        let e = ApiError::Status { status: 404, message: Some("Word not found".into()) };
        assert_eq!(e.to_string(), "Word not found");
    }
}
