use thiserror::Error;
use wasm_bindgen::JsValue;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("transport error: {0}")]
    Transport(String),
    #[error("not connected")]
    NotConnected,
    #[error("decode error: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("malformed {topic} payload: {reason}")]
    Protocol { topic: String, reason: String },
    #[error("credential rejected by server")]
    CredentialRejected,
    #[error("server unreachable after {attempts} attempts")]
    ServerUnreachable { attempts: u32 },
    #[error("browser error: {0}")]
    Js(String),
}

impl From<JsValue> for ClientError {
    fn from(value: JsValue) -> Self {
        let text = value
            .as_string()
            .unwrap_or_else(|| format!("{:?}", value));
        ClientError::Js(text)
    }
}

pub type ClientResult<T> = Result<T, ClientError>;

/// Why a structure cannot go on a tile. The display text is shown to the
/// player as-is.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum PlacementError {
    #[error("You can only build inside your territory")]
    NotOwned,
    #[error("Cannot build on this terrain")]
    TerrainNotAllowed,
    #[error("Tile is already occupied")]
    Occupied,
    #[error("Not enough resources")]
    InsufficientResources,
    #[error("No tile here")]
    UnknownTile,
    #[error("Waiting for player assignment")]
    NoPlayerIdentity,
}
