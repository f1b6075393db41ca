use axum::extract::{FromRequest, Multipart, Request};

use crate::endpoints;

/// One part of a multipart form body.
pub(crate) enum MultipartPart {
    Text {
        name: &'static str,
        value: &'static str,
    },
    File {
        name: &'static str,
        file_name: &'static str,
        content_type: &'static str,
        data: Vec<u8>,
    },
}

impl MultipartPart {
    pub(crate) fn text(name: &'static str, value: &'static str) -> Self {
        Self::Text { name, value }
    }

    pub(crate) fn file(
        name: &'static str,
        file_name: &'static str,
        content_type: &'static str,
        data: impl Into<Vec<u8>>,
    ) -> Self {
        Self::File {
            name,
            file_name,
            content_type,
            data: data.into(),
        }
    }
}

const BOUNDARY: &str = "MY_BOUNDARY123456789";

/// The content type header for bodies made by [multipart_body].
pub(crate) fn multipart_content_type() -> String {
    format!("multipart/form-data; boundary={BOUNDARY}")
}

/// Encode `parts` as a multipart form body.
pub(crate) fn multipart_body(parts: &[MultipartPart]) -> Vec<u8> {
    let boundary_start = format!("--{BOUNDARY}");
    let boundary_end = format!("--{BOUNDARY}--");

    let mut lines: Vec<Vec<u8>> = Vec::new();

    for part in parts {
        lines.push(boundary_start.clone().into_bytes());

        match part {
            MultipartPart::Text { name, value } => {
                lines.push(format!("Content-Disposition: form-data; name=\"{name}\"").into_bytes());
                lines.push(Vec::new());
                lines.push(value.as_bytes().to_vec());
            }
            MultipartPart::File {
                name,
                file_name,
                content_type,
                data,
            } => {
                lines.push(
                    format!(
                        "Content-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\""
                    )
                    .into_bytes(),
                );
                lines.push(format!("Content-Type: {content_type}").into_bytes());
                lines.push(Vec::new());
                lines.push(data.clone());
            }
        }
    }

    lines.push(boundary_end.into_bytes());

    lines.join(b"\r\n".as_slice())
}

pub(crate) async fn must_make_multipart(parts: &[MultipartPart]) -> Multipart {
    let request = Request::builder()
        .method("POST")
        .uri(endpoints::TRANSACTIONS_API)
        .header("Content-Type", multipart_content_type())
        .body(multipart_body(parts).into())
        .unwrap();

    Multipart::from_request(request, &{}).await.unwrap()
}
