// SPDX-FileCopyrightText: 2026 Kaonashi Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Attachment downloads from Telegram file storage.

use kaonashi_core::error::KaonashiError;
use kaonashi_core::types::Attachment;
use teloxide::net::Download;
use teloxide::prelude::*;
use teloxide::types::FileId;
use tracing::debug;

/// Downloads the bytes behind an attachment reference.
///
/// Resolves the storage path with `getFile`, then streams the content into
/// memory. Credential payloads are small, so no size cap is applied here.
pub async fn download_attachment(
    bot: &Bot,
    attachment: &Attachment,
) -> Result<Vec<u8>, KaonashiError> {
    let file = bot
        .get_file(FileId(attachment.file_id.clone()))
        .await
        .map_err(|e| KaonashiError::Channel {
            message: format!("failed to get file info: {e}"),
            source: Some(Box::new(e)),
        })?;

    let mut buf = Vec::new();
    bot.download_file(&file.path, &mut buf)
        .await
        .map_err(|e| KaonashiError::Channel {
            message: format!("failed to download file: {e}"),
            source: Some(Box::new(e)),
        })?;

    debug!(
        file_id = attachment.file_id.as_str(),
        file_name = attachment.file_name.as_deref().unwrap_or("-"),
        size = buf.len(),
        "downloaded attachment"
    );
    Ok(buf)
}
