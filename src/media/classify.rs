//! Row classification
//!
//! Turns one raw store [`Row`] into a [`MediaRecord`], or drops it. The type
//! decision is a reconciliation: trust the store's type tag when it carries
//! one, fall back to the MIME prefix when the tag is absent or generic, and
//! finally guess from the file extension. Rows that still come out as plain
//! files get one refinement pass into document subtypes.
//!
//! Classification never fails: anything unrecognizable is a [`MediaType::File`].

use crate::config::Configurations;
use crate::media::{ContentRef, MediaRecord, MediaType};
use crate::query::file_name_of;
use crate::store::{Row, Store, Table};

/// Classify one row
///
/// Returns `None` only when the row is dropped: a row whose reported size is
/// not positive and whose direct size probe does not rescue it while
/// `skip_zero_size_files` is set. A failed probe keeps the store-reported
/// size, so such rows are dropped too.
#[must_use]
pub fn classify_row<S: Store + ?Sized>(
    row: &Row,
    table: Table,
    configs: &Configurations,
    store: &S,
) -> Option<MediaRecord> {
    let mut size = row.size;
    if size <= 0 {
        if !row.path.is_empty() {
            if let Ok(real) = store.stat_file_size(&row.path) {
                size = i64::try_from(real).unwrap_or(i64::MAX);
            }
        }
        if size <= 0 && configs.skip_zero_size_files() {
            return None;
        }
    }

    let tagged = row.media_type.and_then(MediaType::from_store_code);
    let mut media_type = match tagged {
        Some(tag) if tag != MediaType::File => tag,
        _ => untagged_media_type(row),
    };
    if media_type == MediaType::File {
        media_type = refine_document_type(&extension_of(&row.path));
    }

    let display_name = match row.display_name.as_deref() {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => file_name_of(&row.path).to_string(),
    };

    let thumbnail = match (media_type, row.album_id) {
        (MediaType::Audio, Some(album)) if album > 0 => Some(ContentRef::album_art(album)),
        _ => None,
    };

    Some(MediaRecord {
        id: row.id,
        path: row.path.clone(),
        display_name,
        size_bytes: size,
        date_added: row.date_added,
        mime_type: row.mime_type.clone(),
        media_type,
        bucket_id: row.bucket_id,
        bucket_name: row.bucket_name.clone(),
        width: row.width,
        height: row.height,
        duration_ms: row.duration_ms,
        thumbnail,
        content: ContentRef::for_record(table, row.id),
    })
}

/// Type decision for rows without a usable store tag
fn untagged_media_type(row: &Row) -> MediaType {
    match row.mime_type.as_deref() {
        Some(mime) if !mime.is_empty() && mime != "application/octet-stream" => {
            media_type_for_mime(mime)
        }
        _ => media_type_for_extension(&extension_of(&row.path)),
    }
}

fn media_type_for_mime(mime: &str) -> MediaType {
    if mime.starts_with("image/") {
        MediaType::Image
    } else if mime.starts_with("video/") {
        MediaType::Video
    } else if mime.starts_with("audio/") {
        MediaType::Audio
    } else {
        MediaType::File
    }
}

fn media_type_for_extension(ext: &str) -> MediaType {
    match ext {
        "jpg" | "jpeg" | "png" | "gif" | "bmp" => MediaType::Image,
        "avi" | "mp4" | "mpeg" | "mov" => MediaType::Video,
        _ => MediaType::File,
    }
}

/// Document refinement for rows classified as plain files
fn refine_document_type(ext: &str) -> MediaType {
    match ext {
        "doc" | "docx" => MediaType::Word,
        "xls" | "xlsx" => MediaType::Excel,
        "ppt" | "pptx" => MediaType::Ppt,
        "pdf" => MediaType::Pdf,
        "zip" | "rar" | "tar" | "gz" | "7z" => MediaType::Zip,
        "txt" | "log" => MediaType::Txt,
        _ => MediaType::File,
    }
}

/// Lowercased extension of the path's final segment; empty when there is none
fn extension_of(path: &str) -> String {
    let name = file_name_of(path);
    match name.rfind('.') {
        Some(idx) if idx + 1 < name.len() => name[idx + 1..].to_ascii_lowercase(),
        _ => String::new(),
    }
}
