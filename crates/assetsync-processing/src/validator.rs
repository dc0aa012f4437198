use std::sync::Arc;

use assetsync_core::{UploadConfig, UploadRequest, ValidatorOptions};

/// Constraint violations reported for an uploaded file
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Please upload a file.")]
    NoFile,

    #[error("The file \"{file}\" is too big. Its size cannot exceed {limit}.")]
    TooBig { file: String, limit: String },

    #[error("The file \"{file}\" is too small. Its size cannot be smaller than {limit}.")]
    TooSmall { file: String, limit: String },

    #[error("Only files with these extensions are allowed: {allowed}.")]
    WrongExtension { allowed: String },

    #[error("Only files with these MIME types are allowed: {allowed}.")]
    WrongMimeType { allowed: String },

    #[error("The file \"{file}\" is not an image.")]
    NotAnImage { file: String },

    #[error("The image \"{file}\" is too small. The width cannot be smaller than {limit} pixels.")]
    UnderWidth { file: String, limit: u32 },

    #[error("The image \"{file}\" is too large. The width cannot be larger than {limit} pixels.")]
    OverWidth { file: String, limit: u32 },

    #[error("The image \"{file}\" is too small. The height cannot be smaller than {limit} pixels.")]
    UnderHeight { file: String, limit: u32 },

    #[error("The image \"{file}\" is too large. The height cannot be larger than {limit} pixels.")]
    OverHeight { file: String, limit: u32 },
}

/// Classifies an uploaded file (or its absence) as acceptable or not.
///
/// Returns every violation found, in check order; an empty list means the
/// file is accepted. Callers that report a single message use the first one.
pub trait Validator: Send + Sync {
    fn validate(&self, file: Option<&UploadRequest>) -> Vec<ValidationError>;
}

/// Size, extension and MIME type checks for generic files
pub struct FileValidator {
    options: ValidatorOptions,
}

impl FileValidator {
    pub fn new(options: ValidatorOptions) -> Self {
        Self { options }
    }

    /// Validate file size
    pub fn validate_file_size(&self, file: &UploadRequest) -> Result<(), ValidationError> {
        if let Some(max) = self.options.max_size {
            if file.declared_size > max {
                return Err(ValidationError::TooBig {
                    file: file.original_name.clone(),
                    limit: format_size(max),
                });
            }
        }

        if let Some(min) = self.options.min_size {
            if file.declared_size < min {
                return Err(ValidationError::TooSmall {
                    file: file.original_name.clone(),
                    limit: format_size(min),
                });
            }
        }

        Ok(())
    }

    /// Validate file extension, case insensitive
    pub fn validate_extension(&self, file: &UploadRequest) -> Result<(), ValidationError> {
        if self.options.extensions.is_empty() {
            return Ok(());
        }

        if !self.options.extensions.contains(&file.extension) {
            return Err(ValidationError::WrongExtension {
                allowed: self.options.extensions.join(", "),
            });
        }

        Ok(())
    }

    /// Validate content type; `image/*` style wildcards are accepted
    pub fn validate_content_type(&self, file: &UploadRequest) -> Result<(), ValidationError> {
        if self.options.mime_types.is_empty() {
            return Ok(());
        }

        let normalized = file
            .content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_lowercase();

        let allowed = self.options.mime_types.iter().any(|pattern| {
            match pattern.strip_suffix("/*") {
                Some(kind) => normalized
                    .split_once('/')
                    .is_some_and(|(actual, _)| actual == kind),
                None => pattern == &normalized,
            }
        });

        if !allowed {
            return Err(ValidationError::WrongMimeType {
                allowed: self.options.mime_types.join(", "),
            });
        }

        Ok(())
    }
}

impl Validator for FileValidator {
    fn validate(&self, file: Option<&UploadRequest>) -> Vec<ValidationError> {
        let file = match file {
            Some(file) if !file.original_name.is_empty() => file,
            _ => return vec![ValidationError::NoFile],
        };

        [
            self.validate_file_size(file),
            self.validate_extension(file),
            self.validate_content_type(file),
        ]
        .into_iter()
        .filter_map(Result::err)
        .collect()
    }
}

/// File checks followed by image decoding and dimension limits.
///
/// Pixel checks only run once the file checks pass.
#[cfg(feature = "image")]
pub struct ImageValidator {
    files: FileValidator,
    options: ValidatorOptions,
}

#[cfg(feature = "image")]
impl ImageValidator {
    pub fn new(options: ValidatorOptions) -> Self {
        Self {
            files: FileValidator::new(options.clone()),
            options,
        }
    }

    /// Reads the image header; `None` when the bytes are not a supported image
    pub fn dimensions(data: &[u8]) -> Option<(u32, u32)> {
        let reader = image::ImageReader::new(std::io::Cursor::new(data))
            .with_guessed_format()
            .ok()?;
        reader.format()?;
        reader.into_dimensions().ok()
    }

    fn validate_dimensions(&self, file: &UploadRequest, width: u32, height: u32) -> Vec<ValidationError> {
        let name = || file.original_name.clone();
        let mut errors = Vec::new();

        if let Some(limit) = self.options.min_width {
            if width < limit {
                errors.push(ValidationError::UnderWidth { file: name(), limit });
            }
        }
        if let Some(limit) = self.options.max_width {
            if width > limit {
                errors.push(ValidationError::OverWidth { file: name(), limit });
            }
        }
        if let Some(limit) = self.options.min_height {
            if height < limit {
                errors.push(ValidationError::UnderHeight { file: name(), limit });
            }
        }
        if let Some(limit) = self.options.max_height {
            if height > limit {
                errors.push(ValidationError::OverHeight { file: name(), limit });
            }
        }

        errors
    }
}

#[cfg(feature = "image")]
impl Validator for ImageValidator {
    fn validate(&self, file: Option<&UploadRequest>) -> Vec<ValidationError> {
        let errors = self.files.validate(file);
        if !errors.is_empty() {
            return errors;
        }

        // file checks passed, so a file is present
        let Some(file) = file else {
            return vec![ValidationError::NoFile];
        };

        match Self::dimensions(&file.bytes) {
            Some((width, height)) => self.validate_dimensions(file, width, height),
            None => {
                tracing::debug!(
                    file = %file.original_name,
                    content_type = %file.content_type,
                    "Upload is not a decodable image"
                );
                vec![ValidationError::NotAnImage {
                    file: file.original_name.clone(),
                }]
            }
        }
    }
}

/// Create the validator an endpoint is configured for
pub fn validator_for_endpoint(config: &UploadConfig) -> Arc<dyn Validator> {
    let options = config.validator_options.clone();

    if config.only_images {
        image_validator(options)
    } else {
        Arc::new(FileValidator::new(options))
    }
}

#[cfg(feature = "image")]
fn image_validator(options: ValidatorOptions) -> Arc<dyn Validator> {
    Arc::new(ImageValidator::new(options))
}

#[cfg(not(feature = "image"))]
fn image_validator(options: ValidatorOptions) -> Arc<dyn Validator> {
    tracing::warn!("Image validation requested but the image feature is disabled");
    Arc::new(FileValidator::new(options))
}

/// Binary-prefixed size, e.g. `97.66 KiB`
fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["B", "KiB", "MiB", "GiB", "TiB"];

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    if unit == 0 {
        format!("{} B", bytes)
    } else {
        format!("{:.2} {}", value, UNITS[unit])
    }
}
