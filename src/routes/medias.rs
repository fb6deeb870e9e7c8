use rocket::{
    fs::{NamedFile, TempFile},
    tokio::fs,
    State,
};
use std::path::PathBuf;
use tracing::{info, warn};
use yatube_common::utils::random_hex;
use yatube_models::{validation::invalid, Result};

/// Where uploaded files are stored
pub struct MediaDir(pub PathBuf);

/// Uploaded post images go in this sub directory
const POSTS_DIRECTORY: &str = "posts";

#[get("/media/<file..>")]
pub async fn details(file: PathBuf, media: &State<MediaDir>) -> Option<NamedFile> {
    NamedFile::open(media.0.join(file)).await.ok()
}

fn extension(file: &TempFile<'_>) -> Option<String> {
    file.content_type()
        .and_then(|ct| ct.extension())
        .map(|ext| ext.as_str().to_owned())
        .or_else(|| {
            file.raw_name()
                .and_then(|name| name.dangerous_unsafe_unsanitized_raw().as_str().rsplit_once('.'))
                .map(|(_, ext)| ext.to_owned())
        })
        .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()))
}

/// Stores an uploaded image, and gives back its path relative to the media directory.
///
/// Empty uploads (a file input left blank) give `None`.
pub async fn save_image(file: &mut TempFile<'_>, media: &MediaDir) -> Result<Option<String>> {
    if file.len() == 0 {
        return Ok(None);
    }
    let is_image = file
        .content_type()
        .map(|ct| ct.top() == "image")
        .unwrap_or(false);
    let ext = match extension(file) {
        Some(ext) if is_image => ext,
        _ => {
            warn!("refused an upload that is not an image");
            return Err(invalid(
                "image",
                "invalid_image",
                "Upload a valid image. The file you uploaded was either not an image or a corrupted image.",
            ));
        }
    };

    fs::create_dir_all(media.0.join(POSTS_DIRECTORY)).await?;
    let name = format!("{}/{}.{}", POSTS_DIRECTORY, &random_hex()[..32], ext);
    file.copy_to(media.0.join(&name)).await?;
    info!("stored upload as {}", name);
    Ok(Some(name))
}

/// Removes a stored image that ended up unused
pub async fn discard_image(name: &str, media: &MediaDir) {
    if let Err(e) = fs::remove_file(media.0.join(name)).await {
        warn!("couldn't remove {}: {}", name, e);
    }
}
