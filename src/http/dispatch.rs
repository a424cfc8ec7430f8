//! Content-type driven body decoding.
//!
//! Maps a media type to a [`Surface`] that turns raw bytes into the matching
//! [`ContentData`] variant. Media and archive types stream to a new file in
//! the given folder; textual types are buffered into a string; anything not
//! recognised is buffered as raw bytes and keeps its original content type.

use crate::base::neterror::NetError;
use crate::http::content::{decode_form, ContentData};
use crate::http::mime::ContentType;
use crate::io::folder::{FileRef, Folder};
use crate::io::source::BytesSource;
use crate::io::surface::{BytesSurface, FileSurface, StringSurface, Surface, SurfaceExt};

pub type DataSurface = Box<dyn Surface<Output = ContentData>>;

pub fn surface_for(content_type: &ContentType, folder: &Folder) -> Result<DataSurface, NetError> {
    let primary = content_type.primary.to_ascii_lowercase();
    let lower_subtype = content_type.subtype.to_ascii_lowercase();
    let subtype = content_type.subtype.clone();

    let surface: DataSurface = match (primary.as_str(), lower_subtype.as_str()) {
        ("audio", _) => file_surface(folder, None, move |file| ContentData::Audio { subtype, file })?,
        ("image", _) => file_surface(folder, None, move |file| ContentData::Image { subtype, file })?,
        ("video", _) => file_surface(folder, None, move |file| ContentData::Video { subtype, file })?,
        ("application", "pdf") => file_surface(folder, Some("pdf"), ContentData::Pdf)?,
        ("application", "zip") => file_surface(folder, Some("zip"), ContentData::Zip)?,
        ("application", "octet-stream") => file_surface(folder, None, ContentData::Binary)?,
        ("text", "plain") => string_surface(ContentData::Text),
        ("text", "html") => string_surface(ContentData::Html),
        ("text", "xml") | ("application", "xml") => string_surface(ContentData::Xml),
        ("application", "json") => string_surface(ContentData::Json),
        ("application", "x-www-form-urlencoded") => {
            string_surface(|text| ContentData::Form(decode_form(&text)))
        }
        _ => {
            let content_type = content_type.clone();
            Box::new(BytesSurface::new().map(move |bytes| {
                Ok(ContentData::Other {
                    content_type,
                    source: Box::new(BytesSource::new(bytes)),
                })
            }))
        }
    };
    Ok(surface)
}

fn file_surface<F>(folder: &Folder, extension: Option<&str>, wrap: F) -> Result<DataSurface, NetError>
where
    F: FnOnce(FileRef) -> ContentData + Send + 'static,
{
    let file = folder.new_file(extension)?;
    Ok(Box::new(FileSurface::new(file).map(move |file| Ok(wrap(file)))))
}

fn string_surface<F>(wrap: F) -> DataSurface
where
    F: FnOnce(String) -> ContentData + Send + 'static,
{
    Box::new(StringSurface::new().map(move |text| Ok(wrap(text))))
}
