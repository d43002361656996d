use std::path::Path;

use anyhow::{Context, Result};
use shared::protocol::{decode_frame, DispatcherPermission, InboundMessage, MessageKind};

/// Frames replayed to every client, in file order.
#[derive(Debug, Clone, PartialEq)]
pub struct Script {
    pub frames: Vec<String>,
}

impl Script {
    pub async fn load(path: &Path) -> Result<Self> {
        let text = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("failed to read script {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("invalid script {}", path.display()))
    }

    /// One frame per non-empty line. Every line must decode against the inbound catalog.
    pub fn parse(text: &str) -> Result<Self> {
        let mut frames = Vec::new();
        for (index, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            decode_frame(line).with_context(|| format!("line {}", index + 1))?;
            frames.push(line.to_string());
        }
        Ok(Self { frames })
    }

    /// How many frames of each meaningful kind the script carries.
    pub fn count(&self, kind: MessageKind) -> usize {
        self.frames
            .iter()
            .filter_map(|frame| decode_frame(frame).ok())
            .filter(|message| message.kind() == kind)
            .count()
    }
}

pub fn permission_frame(permission: DispatcherPermission) -> Result<String> {
    InboundMessage::PermissionUpdate(permission)
        .encode()
        .context("failed to encode the permission update")
}

#[cfg(test)]
#[path = "tests/script_tests.rs"]
mod tests;
