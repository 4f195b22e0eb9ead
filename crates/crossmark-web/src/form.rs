//! The upload form: multipart parsing and field validation.

use std::collections::BTreeMap;

use axum::extract::multipart::{Multipart, MultipartError};
use crossmark_adapters::{is_allowed_upload, secure_filename};
use crossmark_core::{ChannelPercents, CrossPosition, DisplayOptions, Percent, Submission};
use serde::Serialize;
use tracing::debug;

/// Multipart field names.
pub mod fields {
    pub const CROSS_POSITION: &str = "cross_position";
    pub const UPLOAD_IMAGE: &str = "upload_image";
    pub const PERCENT_RED: &str = "percent_red";
    pub const PERCENT_GREEN: &str = "percent_green";
    pub const PERCENT_BLUE: &str = "percent_blue";
    pub const ORIGINAL_COLORS: &str = "original_image_color_option";
    pub const PROCESSED_COLORS: &str = "processed_image_color_option";
    pub const CAPTCHA: &str = "g-recaptcha-response";
    pub const CSRF: &str = "csrf_token";
}

const REQUIRED: &str = "This field is required.";
const BAD_FORMAT: &str = "Incorrect image format";

/// What the user typed, echoed back when the form is re-rendered.
#[derive(Debug, Clone, Default, Serialize)]
pub struct FormValues {
    pub cross_position: String,
    pub percent_red: String,
    pub percent_green: String,
    pub percent_blue: String,
    pub original_image_color_option: bool,
    pub processed_image_color_option: bool,
}

/// Error messages keyed by field name.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<&'static str, Vec<String>>);

impl FieldErrors {
    /// Records a message against `field`.
    pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.entry(field).or_default().push(message.into());
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Messages recorded for `field`.
    #[must_use]
    pub fn get(&self, field: &str) -> &[String] {
        self.0.get(field).map_or(&[], Vec::as_slice)
    }
}

/// The uploaded file part.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: String,
    pub data: Vec<u8>,
}

/// A submitted form before validation.
#[derive(Debug, Clone, Default)]
pub struct ImageForm {
    pub values: FormValues,
    pub upload: Option<UploadedFile>,
    pub captcha_response: Option<String>,
    pub csrf_token: Option<String>,
}

impl ImageForm {
    /// Reads every part of a multipart body.
    ///
    /// Unknown fields are ignored. A file input left empty by the browser
    /// counts as no upload.
    ///
    /// # Errors
    ///
    /// Returns an error if the body is not valid multipart data.
    pub async fn from_multipart(multipart: &mut Multipart) -> Result<Self, MultipartError> {
        let mut form = Self::default();

        while let Some(field) = multipart.next_field().await? {
            let Some(name) = field.name().map(str::to_owned) else {
                continue;
            };

            if name == fields::UPLOAD_IMAGE {
                let file_name = field.file_name().unwrap_or_default().to_owned();
                let data = field.bytes().await?;
                if !file_name.is_empty() {
                    form.upload = Some(UploadedFile {
                        file_name,
                        data: data.to_vec(),
                    });
                }
                continue;
            }

            let value = field.text().await?;
            match name.as_str() {
                fields::CROSS_POSITION => form.values.cross_position = value,
                fields::PERCENT_RED => form.values.percent_red = value,
                fields::PERCENT_GREEN => form.values.percent_green = value,
                fields::PERCENT_BLUE => form.values.percent_blue = value,
                fields::ORIGINAL_COLORS => {
                    form.values.original_image_color_option = is_checked(&value);
                }
                fields::PROCESSED_COLORS => {
                    form.values.processed_image_color_option = is_checked(&value);
                }
                fields::CAPTCHA => form.captcha_response = Some(value),
                fields::CSRF => form.csrf_token = Some(value),
                other => debug!("Ignoring form field {other}"),
            }
        }

        Ok(form)
    }

    /// Validates the data fields and builds a submission.
    ///
    /// Every field is checked so all problems are reported together.
    /// Returns `None` if `errors` is non-empty afterwards, including errors
    /// recorded by the caller beforehand.
    pub fn into_submission(self, errors: &mut FieldErrors) -> Option<Submission> {
        let position = match self.values.cross_position.parse::<CrossPosition>() {
            Ok(position) => Some(position),
            Err(e) => {
                errors.add(fields::CROSS_POSITION, e.to_string());
                None
            }
        };

        let red = parse_percent(&self.values.percent_red, fields::PERCENT_RED, errors);
        let green = parse_percent(&self.values.percent_green, fields::PERCENT_GREEN, errors);
        let blue = parse_percent(&self.values.percent_blue, fields::PERCENT_BLUE, errors);

        let upload = match self.upload {
            None => {
                errors.add(fields::UPLOAD_IMAGE, REQUIRED);
                None
            }
            Some(upload) if !is_usable_upload_name(&upload.file_name) => {
                errors.add(fields::UPLOAD_IMAGE, BAD_FORMAT);
                None
            }
            Some(upload) => Some(upload),
        };

        if !errors.is_empty() {
            return None;
        }

        let upload = upload?;
        Some(Submission {
            position: position?,
            percents: ChannelPercents {
                red: red?,
                green: green?,
                blue: blue?,
            },
            display: DisplayOptions {
                original_colors: self.values.original_image_color_option,
                processed_colors: self.values.processed_image_color_option,
            },
            file_name: upload.file_name,
            data: upload.data,
        })
    }
}

/// The extension must be allowed both as sent and after sanitising, so the
/// stored file keeps a decodable name.
fn is_usable_upload_name(name: &str) -> bool {
    is_allowed_upload(name) && secure_filename(name).is_some_and(|safe| is_allowed_upload(&safe))
}

/// Checkbox semantics: present and neither empty nor exactly `false`.
fn is_checked(value: &str) -> bool {
    !value.is_empty() && value != "false"
}

fn parse_percent(raw: &str, field: &'static str, errors: &mut FieldErrors) -> Option<Percent> {
    match raw.parse::<Percent>() {
        Ok(percent) => Some(percent),
        Err(e) => {
            errors.add(field, e.to_string());
            None
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn valid_form() -> ImageForm {
        ImageForm {
            values: FormValues {
                cross_position: "vertical".into(),
                percent_red: "10".into(),
                percent_green: "20.5".into(),
                percent_blue: "100".into(),
                original_image_color_option: true,
                processed_image_color_option: false,
            },
            upload: Some(UploadedFile {
                file_name: "cat.JPG".into(),
                data: vec![1, 2, 3],
            }),
            captcha_response: None,
            csrf_token: None,
        }
    }

    #[test]
    fn test_valid_form_builds_submission() {
        let mut errors = FieldErrors::default();
        let submission = valid_form().into_submission(&mut errors).unwrap();

        assert!(errors.is_empty());
        assert_eq!(submission.position, CrossPosition::Vertical);
        assert!((submission.percents.green.value() - 20.5).abs() < f64::EPSILON);
        assert!(submission.display.original_colors);
        assert!(!submission.display.processed_colors);
        assert_eq!(submission.file_name, "cat.JPG");
    }

    #[test]
    fn test_all_errors_collected() {
        let form = ImageForm {
            values: FormValues {
                cross_position: "diagonal".into(),
                percent_red: String::new(),
                percent_green: "abc".into(),
                percent_blue: "101".into(),
                ..FormValues::default()
            },
            ..ImageForm::default()
        };
        let mut errors = FieldErrors::default();
        assert!(form.into_submission(&mut errors).is_none());

        assert_eq!(errors.get(fields::CROSS_POSITION), ["Not a valid choice."]);
        assert_eq!(errors.get(fields::PERCENT_RED), ["This field is required."]);
        assert_eq!(errors.get(fields::PERCENT_GREEN), ["Not a valid decimal value."]);
        assert_eq!(
            errors.get(fields::PERCENT_BLUE),
            ["The value must be in the range from 0 to 100"]
        );
        assert_eq!(errors.get(fields::UPLOAD_IMAGE), ["This field is required."]);
    }

    #[test]
    fn test_wrong_extension_rejected() {
        let mut form = valid_form();
        form.upload = Some(UploadedFile {
            file_name: "anim.gif".into(),
            data: vec![0],
        });
        let mut errors = FieldErrors::default();
        assert!(form.into_submission(&mut errors).is_none());
        assert_eq!(errors.get(fields::UPLOAD_IMAGE), ["Incorrect image format"]);
    }

    #[test]
    fn test_earlier_errors_block_submission() {
        let mut errors = FieldErrors::default();
        errors.add(fields::CSRF, "The CSRF token is missing.");
        assert!(valid_form().into_submission(&mut errors).is_none());
        assert_eq!(errors.get(fields::CSRF).len(), 1);
        assert!(errors.get(fields::PERCENT_RED).is_empty());
    }

    #[test]
    fn test_name_without_usable_stem_rejected() {
        assert!(is_usable_upload_name("photo (1).png"));
        assert!(!is_usable_upload_name("\u{65e5}\u{672c}.png"));
    }

    #[test]
    fn test_bounds_inclusive() {
        let mut form = valid_form();
        form.values.percent_red = "0".into();
        form.values.percent_blue = "100.0".into();
        let mut errors = FieldErrors::default();
        assert!(form.into_submission(&mut errors).is_some());
    }

    #[test]
    fn test_checkbox_values() {
        assert!(is_checked("y"));
        assert!(is_checked("on"));
        assert!(is_checked("1"));
        assert!(!is_checked(""));
        assert!(!is_checked("false"));
        // only the exact lowercase spelling unchecks
        assert!(is_checked("False"));
        assert!(is_checked(" false"));
    }
}
