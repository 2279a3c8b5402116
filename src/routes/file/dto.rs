use crate::{
    guards::RequestOrigin,
    services::{StoredFileData, StoredFileInfo},
};
use chrono::{DateTime, Utc};
use rocket::{
    http::{ContentType, Header},
    request::Request,
    response::{self, Responder, Response},
};
use serde::Serialize;

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FileEntry {
    pub filename: String,
    pub size: u64,
    pub created_at: DateTime<Utc>,
    pub view_url: String,
    pub download_url: String,
}

impl FileEntry {
    pub fn new(info: StoredFileInfo, origin: &RequestOrigin) -> Self {
        Self {
            view_url: origin.view_url(&info.filename),
            download_url: origin.download_url(&info.filename),
            filename: info.filename,
            size: info.size,
            created_at: info.created_at,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    Inline,
    Attachment,
}

impl Disposition {
    fn as_str(self) -> &'static str {
        match self {
            Disposition::Inline => "inline",
            Disposition::Attachment => "attachment",
        }
    }
}

/// Builds a `Content-Disposition` value that is safe to put into a header.
/// Non-ASCII names are additionally carried in the RFC 5987 `filename*` parameter.
pub fn content_disposition(disposition: Disposition, filename: &str) -> String {
    let sanitized = filename
        .chars()
        .filter(|c| !c.is_control())
        .map(|c| match c {
            '"' | '\\' => '_',
            c if !c.is_ascii() => '_',
            c => c,
        })
        .collect::<String>();

    if sanitized == filename {
        return format!("{}; filename=\"{}\"", disposition.as_str(), filename);
    }

    format!(
        "{}; filename=\"{}\"; filename*=UTF-8''{}",
        disposition.as_str(),
        sanitized,
        urlencoding::encode(filename)
    )
}

/// Raw bytes of a stored file.
pub struct FileData {
    pub disposition: Disposition,
    pub data: StoredFileData,
}

impl<'r> Responder<'r, 'static> for FileData {
    fn respond_to(self, _request: &'r Request<'_>) -> response::Result<'static> {
        let content_type =
            ContentType::parse_flexible(self.data.mime).unwrap_or(ContentType::Binary);

        Response::build()
            .header(content_type)
            .header(Header::new(
                "Content-Disposition",
                content_disposition(self.disposition, &self.data.filename),
            ))
            .sized_body(self.data.size as usize, self.data.file)
            .ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_disposition_ascii() {
        assert_eq!(
            content_disposition(Disposition::Inline, "a-1-2.txt"),
            "inline; filename=\"a-1-2.txt\""
        );
        assert_eq!(
            content_disposition(Disposition::Attachment, "my file-1-2.txt"),
            "attachment; filename=\"my file-1-2.txt\""
        );
    }

    #[test]
    fn test_content_disposition_escapes_unsafe_names() {
        let value = content_disposition(Disposition::Attachment, "bad\"name\r\n-1-2.txt");

        assert!(!value.contains('\r') && !value.contains('\n'));
        assert!(value.starts_with("attachment; filename=\"bad_name-1-2.txt\""));
        assert!(value.contains("filename*=UTF-8''bad%22name%0D%0A-1-2.txt"));
    }

    #[test]
    fn test_content_disposition_non_ascii() {
        let value = content_disposition(Disposition::Attachment, "résumé-1-2.pdf");

        assert_eq!(
            value,
            "attachment; filename=\"r_sum_-1-2.pdf\"; filename*=UTF-8''r%C3%A9sum%C3%A9-1-2.pdf"
        );
    }
}
