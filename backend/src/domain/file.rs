//! Stored file descriptors and the value types the upload flow derives.

use std::fmt;
use std::io::Cursor;
use std::path::Path;
use std::str::FromStr;

use serde_json::{Map, Value, json};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use super::entity::{EntityData, EntityKind, RecordFilter, eq_or_any};
use super::record::{EntityId, FilterScope};
use super::validation::{ValidationError, require_text};

/// Purpose tag controlling the storage subdirectory and post-processing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilePurpose {
    RestaurantImage,
    MenuImage,
    MenuItemImage,
    ReviewPhoto,
}

impl FilePurpose {
    pub const ALLOWED: &'static str = "restaurant_image, menu_image, menu_item_image, review_photo";

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::RestaurantImage => "restaurant_image",
            Self::MenuImage => "menu_image",
            Self::MenuItemImage => "menu_item_image",
            Self::ReviewPhoto => "review_photo",
        }
    }

    /// Physical subdirectory under the upload root.
    #[must_use]
    pub const fn dir_name(self) -> &'static str {
        match self {
            Self::RestaurantImage => "restaurant_images",
            Self::MenuImage => "menu_images",
            Self::MenuItemImage => "menu_item_images",
            Self::ReviewPhoto => "review_photos",
        }
    }

    /// Menu images are additionally forwarded to the data pipeline.
    #[must_use]
    pub const fn is_forwarded(self) -> bool {
        matches!(self, Self::MenuImage)
    }
}

impl fmt::Display for FilePurpose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FilePurpose {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "restaurant_image" => Ok(Self::RestaurantImage),
            "menu_image" => Ok(Self::MenuImage),
            "menu_item_image" => Ok(Self::MenuItemImage),
            "review_photo" => Ok(Self::ReviewPhoto),
            "" => Err(ValidationError::Missing { field: "purpose" }),
            other => Err(ValidationError::Unsupported {
                field: "purpose",
                value: other.to_owned(),
                allowed: Self::ALLOWED,
            }),
        }
    }
}

/// Lower-case hex SHA-256 digest of a file's content.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Checksum(String);

impl Checksum {
    /// Digest a complete payload.
    ///
    /// # Examples
    /// ```
    /// use food_backend::domain::Checksum;
    ///
    /// let digest = Checksum::of(b"abc");
    /// assert_eq!(
    ///     digest.as_str(),
    ///     "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
    /// );
    /// ```
    #[must_use]
    pub fn of(bytes: &[u8]) -> Self {
        Self(hex::encode(Sha256::digest(bytes)))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for Checksum {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::Missing { field: "checksum" });
        }
        if trimmed.len() != 64 || !trimmed.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(ValidationError::Unsupported {
                field: "checksum",
                value: trimmed.to_owned(),
                allowed: "64 hexadecimal characters",
            });
        }
        Ok(Self(trimmed.to_ascii_lowercase()))
    }
}

impl fmt::Display for Checksum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Relative location of a blob under the storage root.
///
/// Always `{purpose_dir}/{name}`; never absolute and never escaping the root.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StoragePath(String);

impl StoragePath {
    /// Allocate a fresh path for an upload, keeping the original extension.
    ///
    /// # Examples
    /// ```
    /// use food_backend::domain::{FilePurpose, StoragePath};
    ///
    /// let path = StoragePath::allocate(FilePurpose::MenuImage, "lunch.PNG");
    /// assert!(path.as_str().starts_with("menu_images/"));
    /// assert!(path.as_str().ends_with(".png"));
    /// ```
    #[must_use]
    pub fn allocate(purpose: FilePurpose, original_name: &str) -> Self {
        let extension = Path::new(original_name)
            .extension()
            .and_then(|ext| ext.to_str())
            .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()))
            .map(|ext| format!(".{}", ext.to_ascii_lowercase()))
            .unwrap_or_default();
        Self(format!(
            "{}/{}{}",
            purpose.dir_name(),
            Uuid::new_v4().simple(),
            extension
        ))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for StoragePath {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::Missing {
                field: "storage_path",
            });
        }
        let escapes = trimmed.starts_with('/')
            || trimmed.contains('\\')
            || trimmed
                .split('/')
                .any(|segment| segment.is_empty() || segment == "." || segment == "..");
        if escapes {
            return Err(ValidationError::Unsupported {
                field: "storage_path",
                value: trimmed.to_owned(),
                allowed: "relative paths without '.' or '..' segments",
            });
        }
        Ok(Self(trimmed.to_owned()))
    }
}

impl fmt::Display for StoragePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Pixel size read from an image header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageDimensions {
    pub width: u32,
    pub height: u32,
}

impl ImageDimensions {
    /// JSON form stored on the record; `{}` when unknown.
    #[must_use]
    pub fn to_json(dimensions: Option<Self>) -> Value {
        dimensions.map_or_else(
            || Value::Object(Map::new()),
            |dims| json!({ "width": dims.width, "height": dims.height }),
        )
    }

    /// Read width and height from the image header without decoding pixels.
    ///
    /// Returns `None` for content whose format cannot be recognised.
    #[must_use]
    pub fn detect(content: &[u8]) -> Option<Self> {
        let (width, height) = image::ImageReader::new(Cursor::new(content))
            .with_guessed_format()
            .ok()?
            .into_dimensions()
            .ok()?;
        Some(Self { width, height })
    }

    /// Parse the stored JSON form. Anything other than a width/height pair is
    /// treated as unknown.
    #[must_use]
    pub fn from_json(value: &Value) -> Option<Self> {
        let width = value.get("width")?.as_u64()?;
        let height = value.get("height")?.as_u64()?;
        Some(Self {
            width: u32::try_from(width).ok()?,
            height: u32::try_from(height).ok()?,
        })
    }
}

/// Content descriptor for a stored blob.
#[derive(Debug, Clone, PartialEq)]
pub struct FileRecord {
    pub uploader_id: EntityId,
    pub storage_path: StoragePath,
    pub filename: String,
    pub mime_type: String,
    pub size_bytes: i64,
    pub checksum: Checksum,
    pub purpose: FilePurpose,
    pub is_public: bool,
    pub dimensions: Option<ImageDimensions>,
}

impl EntityData for FileRecord {
    type Filter = FileFilter;
    const KIND: EntityKind = EntityKind::File;
}

impl FileRecord {
    #[must_use]
    pub fn is_image(&self) -> bool {
        is_image_mime(&self.mime_type)
    }
}

/// Whether a declared MIME type names image content.
#[must_use]
pub fn is_image_mime(mime_type: &str) -> bool {
    mime_type.trim().to_ascii_lowercase().starts_with("image/")
}

pub fn validate_file(file: &FileRecord) -> Result<(), ValidationError> {
    require_text("filename", &file.filename)?;
    require_text("mime_type", &file.mime_type)?;
    if file.size_bytes <= 0 {
        return Err(ValidationError::NotPositive {
            field: "size_bytes",
        });
    }
    Ok(())
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileFilter {
    pub scope: FilterScope,
    pub uploader_id: Option<EntityId>,
    pub purpose: Option<FilePurpose>,
    pub checksum: Option<Checksum>,
    pub storage_path: Option<StoragePath>,
    pub mime_type: Option<String>,
    pub is_public: Option<bool>,
}

impl FileFilter {
    /// Active files sharing a checksum; the dedup lookup.
    #[must_use]
    pub fn by_checksum(checksum: Checksum) -> Self {
        Self {
            checksum: Some(checksum),
            ..Self::default()
        }
    }

    /// Active files holding a blob location.
    #[must_use]
    pub fn by_storage_path(storage_path: StoragePath) -> Self {
        Self {
            storage_path: Some(storage_path),
            ..Self::default()
        }
    }
}

impl RecordFilter<FileRecord> for FileFilter {
    fn scope(&self) -> &FilterScope {
        &self.scope
    }

    fn scope_mut(&mut self) -> &mut FilterScope {
        &mut self.scope
    }

    fn matches_data(&self, data: &FileRecord) -> bool {
        eq_or_any(self.uploader_id.as_ref(), &data.uploader_id)
            && eq_or_any(self.purpose.as_ref(), &data.purpose)
            && eq_or_any(self.checksum.as_ref(), &data.checksum)
            && eq_or_any(self.storage_path.as_ref(), &data.storage_path)
            && eq_or_any(self.mime_type.as_deref(), data.mime_type.as_str())
            && eq_or_any(self.is_public.as_ref(), &data.is_public)
    }
}

/// Editable file attributes. Content-derived fields are immutable.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilePatch {
    pub filename: Option<String>,
    pub purpose: Option<FilePurpose>,
    pub is_public: Option<bool>,
    pub meta: Option<Value>,
}

impl FilePatch {
    #[must_use]
    pub fn apply(&self, mut file: FileRecord) -> FileRecord {
        if let Some(filename) = &self.filename {
            file.filename.clone_from(filename);
        }
        if let Some(purpose) = self.purpose {
            file.purpose = purpose;
        }
        if let Some(is_public) = self.is_public {
            file.is_public = is_public;
        }
        file
    }
}
