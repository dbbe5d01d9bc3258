//! Lifecycle owner for the map and its chat overlay.

use crate::chat::{ChatWidget, RequestTag};
use crate::map::MapView;

/// The mounted map view.
///
/// Owns at most one [`ChatWidget`]: created on the first `mount`, dropped on
/// `unmount`. Mounting an already-mounted host is a no-op.
#[derive(Debug, Default)]
pub struct MapHost {
    map: MapView,
    chat: Option<ChatWidget>,
    issued_tags: u64,
}

impl MapHost {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if this call created the chat overlay.
    pub fn mount(&mut self) -> bool {
        if self.chat.is_some() {
            return false;
        }
        self.chat = Some(ChatWidget::continuing_after(self.issued_tags));
        tracing::debug!("chat overlay attached");
        true
    }

    /// Detaches the chat overlay and clears the map. Returns the tag of a
    /// request that was still in flight so the caller can abort its transfer.
    pub fn unmount(&mut self) -> Option<RequestTag> {
        self.map.reset();
        let mut chat = self.chat.take()?;
        self.issued_tags = chat.issued();
        tracing::debug!("chat overlay detached");
        chat.cancel()
    }

    #[must_use]
    pub fn is_mounted(&self) -> bool {
        self.chat.is_some()
    }

    #[must_use]
    pub fn overlay_count(&self) -> usize {
        usize::from(self.chat.is_some())
    }

    #[must_use]
    pub fn map(&self) -> &MapView {
        &self.map
    }

    pub fn map_mut(&mut self) -> &mut MapView {
        &mut self.map
    }

    #[must_use]
    pub fn chat(&self) -> Option<&ChatWidget> {
        self.chat.as_ref()
    }

    pub fn chat_mut(&mut self) -> Option<&mut ChatWidget> {
        self.chat.as_mut()
    }
}
