//! UI state for the outlet map: the chat answer formatter, the chat widget,
//! the map view model, and the session loop that feeds them from the network.

pub mod chat;
pub mod format;
pub mod host;
pub mod map;
pub mod session;

pub use chat::{ChatEvent, ChatFailure, ChatRequest, ChatWidget, RequestTag};
pub use format::format_response;
pub use host::MapHost;
pub use map::{CatchmentRequest, CircleOverlay, LineOverlay, MapView, Marker, Popup, TileLayer};
pub use session::{MapSession, Update};
