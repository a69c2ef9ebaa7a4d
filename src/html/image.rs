use std::collections::HashMap;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use image::ImageFormat;

use crate::error::ConversionError;
use crate::model::{Drawing, MediaPart};

/// Formats a browser can show from a data URI.
fn is_displayable(format: ImageFormat) -> bool {
    matches!(
        format,
        ImageFormat::Png
            | ImageFormat::Jpeg
            | ImageFormat::Gif
            | ImageFormat::Bmp
            | ImageFormat::WebP
            | ImageFormat::Ico
            | ImageFormat::Avif
    )
}

pub fn render_drawing(
    drawing: &Drawing,
    media: &HashMap<String, MediaPart>,
) -> Result<String, ConversionError> {
    let part = media
        .get(&drawing.rel_id)
        .ok_or_else(|| ConversionError::MissingImage(drawing.rel_id.clone()))?;

    let format = match image::guess_format(&part.data) {
        Ok(format) if is_displayable(format) => format,
        Ok(format) => {
            return Err(ConversionError::UnsupportedImage {
                rel_id: drawing.rel_id.clone(),
                reason: format!("{format:?} in {}", part.part_name),
            });
        }
        Err(_) => {
            return Err(ConversionError::UnsupportedImage {
                rel_id: drawing.rel_id.clone(),
                reason: format!("unrecognized data in {}", part.part_name),
            });
        }
    };

    let mime = part
        .content_type
        .as_deref()
        .filter(|ct| ct.starts_with("image/"))
        .unwrap_or_else(|| format.to_mime_type());

    let mut html = format!(
        "<img src=\"data:{};base64,{}\"",
        html_escape::encode_double_quoted_attribute(mime),
        STANDARD.encode(&part.data)
    );
    if let Some(w) = drawing.width_px {
        html.push_str(&format!(" width=\"{w}\""));
    }
    if let Some(h) = drawing.height_px {
        html.push_str(&format!(" height=\"{h}\""));
    }
    html.push('>');
    log::debug!("Embedded {} ({} bytes) as {mime}", part.part_name, part.data.len());
    Ok(html)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_MAGIC: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR";

    fn media(data: &[u8], content_type: Option<&str>) -> HashMap<String, MediaPart> {
        HashMap::from([(
            "rId5".to_string(),
            MediaPart {
                part_name: "word/media/image1.png".into(),
                content_type: content_type.map(str::to_string),
                data: data.to_vec(),
            },
        )])
    }

    fn drawing() -> Drawing {
        Drawing {
            rel_id: "rId5".into(),
            width_px: Some(96),
            height_px: None,
        }
    }

    #[test]
    fn png_becomes_data_uri() {
        let html = render_drawing(&drawing(), &media(PNG_MAGIC, Some("image/png"))).unwrap();
        let expected = format!(
            "<img src=\"data:image/png;base64,{}\" width=\"96\">",
            STANDARD.encode(PNG_MAGIC)
        );
        assert_eq!(html, expected);
    }

    #[test]
    fn sniffed_type_when_declared_type_is_missing() {
        let html = render_drawing(&drawing(), &media(PNG_MAGIC, None)).unwrap();
        assert!(html.starts_with("<img src=\"data:image/png;base64,"));
    }

    #[test]
    fn unknown_bytes_are_unsupported() {
        let err = render_drawing(&drawing(), &media(b"not an image", Some("image/x-emf")))
            .unwrap_err();
        assert!(matches!(err, ConversionError::UnsupportedImage { .. }));
    }

    #[test]
    fn missing_part() {
        let err = render_drawing(&drawing(), &HashMap::new()).unwrap_err();
        assert_eq!(err, ConversionError::MissingImage("rId5".into()));
    }
}
