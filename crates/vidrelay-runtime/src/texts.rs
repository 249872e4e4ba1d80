//! Texts shown to the chat user during a delivery.

use vidrelay_core::utils::truncate_str;
use vidrelay_core::FailureKind;

/// Reply for input that is not a supported video link
pub const UNSUPPORTED_URL: &str =
    "❌ Пожалуйста, отправьте действительную ссылку на видео с YouTube, TikTok или Instagram.";

/// Initial status message
pub const STATUS_STARTING: &str = "⏳ Начинаю скачивание видео...";
/// Status while the extractor runs
pub const STATUS_DOWNLOADING: &str = "📥 Скачиваю видео...";
/// Status while the video is uploaded
pub const STATUS_UPLOADING: &str = "📤 Отправляю видео...";

const EXTRACTION_FAILED: &str = "❌ Не удалось скачать видео.\n\
     Возможно, оно недоступно, удалено или является приватным.\n\
     Попробуйте другую ссылку или повторите попытку позже.";

const OUTPUT_MISSING: &str = "❌ Видео было обработано, но итоговый файл не найден.\n\
     Попробуйте другую ссылку или повторите попытку позже.";

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// Telegram caption limit is 1024 characters
const MAX_TITLE_CHARS: usize = 1000;

/// Caption attached to a delivered video.
#[must_use]
pub fn caption(title: &str) -> String {
    format!("✅ {}", truncate_str(title, MAX_TITLE_CHARS))
}

/// Status text for a file above the upload ceiling.
#[must_use]
pub fn too_large(size: u64, limit: u64) -> String {
    format!(
        "❌ Видео слишком большое ({:.1} МБ). Telegram поддерживает файлы до {:.0} МБ.",
        size as f64 / BYTES_PER_MB,
        limit as f64 / BYTES_PER_MB
    )
}

/// Terminal status text for a failed delivery.
#[must_use]
pub fn failure(kind: FailureKind) -> String {
    match kind {
        FailureKind::Extraction => EXTRACTION_FAILED.to_string(),
        FailureKind::MissingOutput => OUTPUT_MISSING.to_string(),
        FailureKind::Unclassified(category) => format!(
            "❌ Произошла ошибка при скачивании видео ({category}).\n\
             Попробуйте другую ссылку или повторите попытку позже."
        ),
    }
}
