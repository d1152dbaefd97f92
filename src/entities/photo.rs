// 📷 Property Photos
//
// Stored inline as base64 data URLs, like the rest of the local store.
// The SHA-256 fingerprint identifies identical uploads.

use crate::error::PhotoError;
use base64::Engine;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

pub const MAX_PHOTO_BYTES: usize = 5 * 1024 * 1024;
pub const MAX_PHOTOS: usize = 20;
pub const ALLOWED_TYPES: [&str; 4] = ["image/jpeg", "image/jpg", "image/png", "image/webp"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyPhoto {
    pub id: String,
    /// `data:<mime>;base64,<payload>`
    pub src: String,
    pub name: String,
    pub size: usize,
    pub uploaded_at: DateTime<Utc>,
    #[serde(default)]
    pub fingerprint: String,
}

impl PropertyPhoto {
    pub fn mime_type(&self) -> Option<&str> {
        self.src
            .strip_prefix("data:")
            .and_then(|rest| rest.split(';').next())
    }

    /// Decode the embedded payload back to raw bytes.
    pub fn bytes(&self) -> Option<Vec<u8>> {
        let (_, payload) = self.src.split_once(";base64,")?;
        base64::engine::general_purpose::STANDARD.decode(payload).ok()
    }
}

pub fn fingerprint(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PhotoGallery {
    photos: Vec<PropertyPhoto>,
}

impl PhotoGallery {
    pub fn from_photos(photos: Vec<PropertyPhoto>) -> Self {
        PhotoGallery { photos }
    }

    /// Validate and embed an uploaded image.
    pub fn add(&mut self, name: &str, mime_type: &str, bytes: &[u8]) -> Result<&PropertyPhoto, PhotoError> {
        if bytes.len() > MAX_PHOTO_BYTES {
            return Err(PhotoError::TooLarge(bytes.len()));
        }
        let mime = mime_type.trim().to_ascii_lowercase();
        if !ALLOWED_TYPES.contains(&mime.as_str()) {
            return Err(PhotoError::UnsupportedType(mime));
        }
        if self.photos.len() >= MAX_PHOTOS {
            return Err(PhotoError::LimitReached);
        }

        let digest = fingerprint(bytes);
        if self.photos.iter().any(|p| p.fingerprint == digest) {
            return Err(PhotoError::Duplicate);
        }

        let encoded = base64::engine::general_purpose::STANDARD.encode(bytes);
        self.photos.push(PropertyPhoto {
            id: uuid::Uuid::new_v4().to_string(),
            src: format!("data:{};base64,{}", mime, encoded),
            name: name.to_string(),
            size: bytes.len(),
            uploaded_at: Utc::now(),
            fingerprint: digest,
        });

        Ok(&self.photos[self.photos.len() - 1])
    }

    pub fn remove(&mut self, id: &str) -> Result<PropertyPhoto, PhotoError> {
        let index = self
            .photos
            .iter()
            .position(|p| p.id == id)
            .ok_or_else(|| PhotoError::NotFound(id.to_string()))?;
        Ok(self.photos.remove(index))
    }

    pub fn photos(&self) -> &[PropertyPhoto] {
        &self.photos
    }

    pub fn len(&self) -> usize {
        self.photos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.photos.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_embeds_data_url() {
        let mut gallery = PhotoGallery::default();
        let photo = gallery.add("front.png", "image/png", b"fake-png-bytes").unwrap();

        assert!(photo.src.starts_with("data:image/png;base64,"));
        assert_eq!(photo.mime_type(), Some("image/png"));
        assert_eq!(photo.bytes().unwrap(), b"fake-png-bytes".to_vec());
        assert_eq!(photo.size, 14);
        assert_eq!(photo.fingerprint.len(), 64);
    }

    #[test]
    fn test_rejects_wrong_type_and_size() {
        let mut gallery = PhotoGallery::default();

        assert_eq!(
            gallery.add("doc.pdf", "application/pdf", b"x").unwrap_err(),
            PhotoError::UnsupportedType("application/pdf".to_string())
        );

        let big = vec![0u8; MAX_PHOTO_BYTES + 1];
        assert!(matches!(
            gallery.add("big.jpg", "image/jpeg", &big),
            Err(PhotoError::TooLarge(_))
        ));
        assert!(gallery.is_empty());
    }

    #[test]
    fn test_limit_and_duplicates() {
        let mut gallery = PhotoGallery::default();
        for i in 0..MAX_PHOTOS {
            let bytes = format!("photo-{}", i).into_bytes();
            gallery.add(&format!("{}.webp", i), "image/webp", &bytes).unwrap();
        }

        assert_eq!(
            gallery.add("extra.webp", "image/webp", b"extra").unwrap_err(),
            PhotoError::LimitReached
        );

        let id = gallery.photos()[0].id.clone();
        gallery.remove(&id).unwrap();
        assert_eq!(
            gallery.add("again.webp", "image/webp", b"photo-1").unwrap_err(),
            PhotoError::Duplicate
        );
        assert!(gallery.remove(&id).is_err());
    }
}
