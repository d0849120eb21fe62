use reqwest::multipart::{Form, Part};
use serde_json::Value;

/// One outbound fax request, snapshotted from the form at submit time.
#[derive(Debug, Clone, Default)]
pub struct FaxSubmission {
    pub to_number: String,
    pub from_number: String,
    pub cover_letter: String,
    pub attachment: Option<Attachment>,
}

/// The selected PDF, read into memory at submit time and passed through unmodified.
#[derive(Debug, Clone)]
pub struct Attachment {
    pub filename: String,
    pub bytes: Vec<u8>,
}

/// A single multipart field, in wire order.
#[derive(Debug)]
pub enum FormField {
    Text { name: &'static str, value: String },
    File { name: &'static str, filename: String, bytes: Vec<u8> },
}

impl FaxSubmission {
    /// The text fields are always present, even when empty; the file field
    /// exists only when an attachment was selected.
    pub fn into_fields(self) -> Vec<FormField> {
        let mut fields = vec![
            FormField::Text { name: "to_number", value: self.to_number },
            FormField::Text { name: "from_number", value: self.from_number },
            FormField::Text { name: "cover_letter", value: self.cover_letter },
        ];
        if let Some(att) = self.attachment {
            fields.push(FormField::File {
                name: "file",
                filename: att.filename,
                bytes: att.bytes,
            });
        }
        fields
    }

    pub fn into_form(self) -> Form {
        let mut form = Form::new();
        for field in self.into_fields() {
            form = match field {
                FormField::Text { name, value } => form.text(name, value),
                FormField::File { name, filename, bytes } => {
                    form.part(name, Part::bytes(bytes).file_name(filename))
                }
            };
        }
        form
    }
}

/// What the endpoint said about one submission. The HTTP status alone picks
/// the variant; `fax_id` and `detail` are optional lookups over the body.
#[derive(Debug, Clone)]
pub enum FaxOutcome {
    Sent { fax_id: Option<String>, body: Value },
    Rejected { status: u16, detail: Option<String>, body: Value },
}
