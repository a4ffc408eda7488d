//! Local files picked as attachments or error screenshots.
//!
//! Only a file's name, size and guessed mime type are read. Contents stay
//! on disk and are never part of a submission.

use std::path::Path;

use strum_macros::Display;
use support_protocol::FileMeta;
use support_protocol::RecordPatch;
use support_protocol::SupportRecord;
use tracing::debug;

#[derive(Debug, thiserror::Error)]
pub enum AttachmentError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{0} is not a regular file")]
    NotAFile(String),

    #[error("{name} is not an image ({mime_type}); screenshots must be images")]
    NotAnImage { name: String, mime_type: String },

    #[error("there is no {kind} number {index}")]
    NoSuchFile { kind: FileKind, index: usize },
}

/// Which of the two record lists a file belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum FileKind {
    Attachment,
    Screenshot,
}

impl FileKind {
    pub fn files(self, record: &SupportRecord) -> &[FileMeta] {
        match self {
            Self::Attachment => &record.attachments,
            Self::Screenshot => &record.error_screenshots,
        }
    }

    fn patch(self, files: Vec<FileMeta>) -> RecordPatch {
        let mut patch = RecordPatch::default();
        match self {
            Self::Attachment => patch.attachments = Some(files),
            Self::Screenshot => patch.error_screenshots = Some(files),
        }
        patch
    }
}

/// Name, size and mime type of the file at `path`. The mime type is guessed
/// from the extension; unknown extensions are `application/octet-stream`.
pub fn describe_file(path: &Path) -> Result<FileMeta, AttachmentError> {
    let metadata = std::fs::metadata(path).map_err(|source| AttachmentError::Io {
        path: path.display().to_string(),
        source,
    })?;
    if !metadata.is_file() {
        return Err(AttachmentError::NotAFile(path.display().to_string()));
    }

    let name = path.file_name().map_or_else(
        || path.display().to_string(),
        |name| name.to_string_lossy().into_owned(),
    );
    let mime = mime_guess::from_path(path).first_or_octet_stream();
    Ok(FileMeta::new(name, metadata.len(), mime.essence_str()))
}

/// Update that appends the file at `path` to the `kind` list.
pub fn attach(
    record: &SupportRecord,
    kind: FileKind,
    path: &Path,
) -> Result<RecordPatch, AttachmentError> {
    let file = describe_file(path)?;
    if kind == FileKind::Screenshot && !file.mime_type.starts_with("image/") {
        return Err(AttachmentError::NotAnImage {
            name: file.name,
            mime_type: file.mime_type,
        });
    }
    debug!(%kind, name = %file.name, size = file.size, "file attached");

    let mut files = kind.files(record).to_vec();
    files.push(file);
    Ok(kind.patch(files))
}

/// Update that drops entry `index` (1-based, as listed) from the `kind` list.
pub fn detach(
    record: &SupportRecord,
    kind: FileKind,
    index: usize,
) -> Result<RecordPatch, AttachmentError> {
    let mut files = kind.files(record).to_vec();
    let position = index
        .checked_sub(1)
        .filter(|position| *position < files.len())
        .ok_or(AttachmentError::NoSuchFile { kind, index })?;
    files.remove(position);
    Ok(kind.patch(files))
}
