use crate::errors::ServiceError;
use base64::{Engine as _, engine::general_purpose::STANDARD};
use uuid::Uuid;

/// A file received as a labelled base64 payload:
/// `data:<mime>;name=<filename>;base64,<payload>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedFile {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl DecodedFile {
    /// Decodes `payload`, reporting failures against `field`.
    pub fn decode(field: &str, payload: &str) -> Result<Self, ServiceError> {
        let invalid = |reason: &str| ServiceError::validation(format!("{field}: {reason}"));

        let rest = payload
            .trim()
            .strip_prefix("data:")
            .ok_or_else(|| invalid("expected a data: payload"))?;

        let (header, data) = rest
            .split_once(',')
            .ok_or_else(|| invalid("missing payload separator"))?;

        let mut params = header.split(';');
        let content_type = params.next().unwrap_or_default().trim().to_string();
        if content_type.is_empty() || !content_type.contains('/') {
            return Err(invalid("missing content type"));
        }

        let mut declared_name = None;
        let mut is_base64 = false;
        for param in params {
            let param = param.trim();
            if param == "base64" {
                is_base64 = true;
            } else if let Some(name) = param.strip_prefix("name=") {
                declared_name = Some(name.trim().to_string());
            }
        }

        if !is_base64 {
            return Err(invalid("payload is not base64 encoded"));
        }

        let bytes = STANDARD
            .decode(data.trim())
            .map_err(|_| invalid("invalid base64 payload"))?;

        if bytes.is_empty() {
            return Err(invalid("file is empty"));
        }

        let file_name = match declared_name {
            Some(name) if name.is_empty() => return Err(invalid("empty file name")),
            Some(name) if name.contains(['/', '\\']) || name == "." || name == ".." => {
                return Err(invalid("file name must not contain path separators"));
            }
            Some(name) => name,
            None => generated_name(&content_type),
        };

        Ok(Self {
            file_name,
            content_type,
            bytes,
        })
    }
}

fn generated_name(content_type: &str) -> String {
    let extension = content_type
        .split_once('/')
        .map(|(_, subtype)| subtype.split('+').next().unwrap_or(subtype))
        .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .unwrap_or("bin");

    format!("upload-{}.{extension}", Uuid::new_v4())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(err: ServiceError) -> String {
        match err {
            ServiceError::Validation(errors) => errors.join("; "),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn recovers_declared_name_and_bytes() {
        let payload = format!(
            "data:application/pdf;name=spec-sheet.pdf;base64,{}",
            STANDARD.encode(b"%PDF-1.4")
        );

        let file = DecodedFile::decode("brochure", &payload).unwrap();

        assert_eq!(file.file_name, "spec-sheet.pdf");
        assert_eq!(file.content_type, "application/pdf");
        assert_eq!(file.bytes, b"%PDF-1.4");
    }

    #[test]
    fn generates_name_from_mime_when_label_has_none() {
        let payload = format!("data:image/svg+xml;base64,{}", STANDARD.encode(b"<svg/>"));

        let file = DecodedFile::decode("image", &payload).unwrap();

        assert!(file.file_name.starts_with("upload-"));
        assert!(file.file_name.ends_with(".svg"));
    }

    #[test]
    fn malformed_payloads_fail_on_the_field() {
        let cases = [
            "not a data uri",
            "data:image/png;base64",
            "data:;base64,aGVsbG8=",
            "data:image/png,aGVsbG8=",
            "data:image/png;base64,***",
            "data:image/png;base64,",
            "data:image/png;name=../etc/passwd;base64,aGVsbG8=",
        ];

        for payload in cases {
            let err = DecodedFile::decode("category_image", payload).unwrap_err();
            assert!(
                message(err).starts_with("category_image: "),
                "payload {payload:?} should fail on its field"
            );
        }
    }
}
