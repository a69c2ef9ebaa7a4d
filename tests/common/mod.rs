#![allow(dead_code)]

use std::io::{Cursor, Write};

use zip::ZipWriter;
use zip::write::SimpleFileOptions;

pub const W_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";
pub const R_NS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const IMAGE_REL: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/image";
const HYPERLINK_REL: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/hyperlink";

/// Smallest PNG header `image::guess_format` recognizes.
pub const PNG_BYTES: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR\0\0\0\x01\0\0\0\x01\x08\x02\0\0\0";

/// Assembles a .docx package in memory.
#[derive(Default)]
pub struct DocxBuilder {
    body: String,
    styles: Option<String>,
    numbering: Option<String>,
    rels: Vec<String>,
    media: Vec<(String, Vec<u8>)>,
}

impl DocxBuilder {
    pub fn new(body: &str) -> Self {
        Self {
            body: body.to_string(),
            ..Self::default()
        }
    }

    /// Inner content of `w:styles`.
    pub fn styles(mut self, styles: &str) -> Self {
        self.styles = Some(styles.to_string());
        self
    }

    /// Inner content of `w:numbering`.
    pub fn numbering(mut self, numbering: &str) -> Self {
        self.numbering = Some(numbering.to_string());
        self
    }

    pub fn image(mut self, rel_id: &str, file_name: &str, data: &[u8]) -> Self {
        self.rels.push(format!(
            r#"<Relationship Id="{rel_id}" Type="{IMAGE_REL}" Target="media/{file_name}"/>"#
        ));
        self.media
            .push((format!("word/media/{file_name}"), data.to_vec()));
        self
    }

    pub fn hyperlink(mut self, rel_id: &str, url: &str) -> Self {
        self.rels.push(format!(
            r#"<Relationship Id="{rel_id}" Type="{HYPERLINK_REL}" Target="{url}" TargetMode="External"/>"#
        ));
        self
    }

    pub fn build(self) -> Vec<u8> {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let opts = SimpleFileOptions::default().compression_method(zip::CompressionMethod::Stored);
        let mut add = |name: &str, data: &[u8]| {
            zip.start_file(name, opts).unwrap();
            zip.write_all(data).unwrap();
        };

        add(
            "[Content_Types].xml",
            br#"<?xml version="1.0" encoding="UTF-8"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
<Default Extension="xml" ContentType="application/xml"/>
<Default Extension="png" ContentType="image/png"/>
<Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/>
</Types>"#,
        );
        add(
            "_rels/.rels",
            br#"<?xml version="1.0" encoding="UTF-8"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/>
</Relationships>"#,
        );

        let document = format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<w:document xmlns:w="{W_NS}" xmlns:r="{R_NS}" xmlns:wp="http://schemas.openxmlformats.org/drawingml/2006/wordprocessingDrawing" xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:pic="http://schemas.openxmlformats.org/drawingml/2006/picture"><w:body>{}</w:body></w:document>"#,
            self.body
        );
        add("word/document.xml", document.as_bytes());

        let rels = format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">{}</Relationships>"#,
            self.rels.concat()
        );
        add("word/_rels/document.xml.rels", rels.as_bytes());

        if let Some(styles) = &self.styles {
            let xml = format!(r#"<w:styles xmlns:w="{W_NS}">{styles}</w:styles>"#);
            add("word/styles.xml", xml.as_bytes());
        }
        if let Some(numbering) = &self.numbering {
            let xml = format!(r#"<w:numbering xmlns:w="{W_NS}">{numbering}</w:numbering>"#);
            add("word/numbering.xml", xml.as_bytes());
        }
        for (name, data) in &self.media {
            add(name, data);
        }

        zip.finish().unwrap().into_inner()
    }
}

pub fn para(text: &str) -> String {
    format!(r#"<w:p><w:r><w:t xml:space="preserve">{text}</w:t></w:r></w:p>"#)
}

pub fn cell(tc_pr: &str, content: &str) -> String {
    format!("<w:tc><w:tcPr>{tc_pr}</w:tcPr>{content}</w:tc>")
}

pub fn inline_image(rel_id: &str, cx: u32, cy: u32) -> String {
    format!(
        r#"<w:drawing><wp:inline><wp:extent cx="{cx}" cy="{cy}"/><a:graphic><a:graphicData><pic:pic><pic:blipFill><a:blip r:embed="{rel_id}"/></pic:blipFill></pic:pic></a:graphicData></a:graphic></wp:inline></w:drawing>"#
    )
}

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}
