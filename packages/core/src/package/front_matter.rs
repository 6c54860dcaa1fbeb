//! Space metadata block prepended to the README.
//!
//! Hugging Face reads the YAML front matter at the top of a Space's
//! README.md to decide how to build and display it.

use crate::server::DEFAULT_PORT;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FrontMatter {
    pub title: String,
    pub emoji: String,
    pub color_from: String,
    pub color_to: String,
    /// Execution SDK identifier ("docker" builds from the Dockerfile)
    pub sdk: String,
    pub pinned: bool,
    pub license: String,
    pub app_port: u16,
}

impl Default for FrontMatter {
    fn default() -> Self {
        Self {
            title: "OpenHands Backend API".to_string(),
            emoji: "🤖".to_string(),
            color_from: "blue".to_string(),
            color_to: "purple".to_string(),
            sdk: "docker".to_string(),
            pinned: false,
            license: "mit".to_string(),
            app_port: DEFAULT_PORT,
        }
    }
}

impl FrontMatter {
    /// Render the block, including the blank line that separates it from
    /// the README body.
    pub fn render(&self) -> String {
        format!(
            "---\n\
             title: {}\n\
             emoji: {}\n\
             colorFrom: {}\n\
             colorTo: {}\n\
             sdk: {}\n\
             pinned: {}\n\
             license: {}\n\
             app_port: {}\n\
             ---\n\
             \n",
            self.title,
            self.emoji,
            self.color_from,
            self.color_to,
            self.sdk,
            self.pinned,
            self.license,
            self.app_port,
        )
    }

    /// Front matter followed by `body`, byte for byte
    pub fn prepend_to(&self, body: &[u8]) -> Vec<u8> {
        let header = self.render();
        let mut out = Vec::with_capacity(header.len() + body.len());
        out.extend_from_slice(header.as_bytes());
        out.extend_from_slice(body);
        out
    }
}
