use std::fmt;
use std::path::Path;

/// Output formats the engine knows how to build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Format {
    PlainText,
    Json,
    Csv,
    Xml,
    Yaml,
    Pdf,
    Png,
    Jpeg,
    Zip,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Family {
    Text,
    Binary,
}

impl Format {
    pub const ALL: [Format; 9] = [
        Format::PlainText,
        Format::Json,
        Format::Csv,
        Format::Xml,
        Format::Yaml,
        Format::Pdf,
        Format::Png,
        Format::Jpeg,
        Format::Zip,
    ];

    /// Infers the format from a file name's extension, ignoring case.
    /// Unknown or missing extensions fall back to plain text.
    pub fn from_file_name(file_name: &str) -> Format {
        let ext = Path::new(file_name)
            .extension()
            .map(|e| e.to_string_lossy().to_ascii_lowercase())
            .unwrap_or_default();
        Format::from_extension(&ext)
    }

    pub fn from_extension(ext: &str) -> Format {
        match ext.to_ascii_lowercase().as_str() {
            "json" => Format::Json,
            "csv" => Format::Csv,
            "xml" => Format::Xml,
            "yaml" | "yml" => Format::Yaml,
            "pdf" => Format::Pdf,
            "png" => Format::Png,
            "jpg" | "jpeg" => Format::Jpeg,
            "zip" => Format::Zip,
            _ => Format::PlainText,
        }
    }

    pub fn family(self) -> Family {
        match self {
            Format::PlainText | Format::Json | Format::Csv | Format::Xml | Format::Yaml => {
                Family::Text
            }
            Format::Pdf | Format::Png | Format::Jpeg | Format::Zip => Family::Binary,
        }
    }

    pub fn is_text(self) -> bool {
        self.family() == Family::Text
    }

    pub fn extension(self) -> &'static str {
        match self {
            Format::PlainText => "txt",
            Format::Json => "json",
            Format::Csv => "csv",
            Format::Xml => "xml",
            Format::Yaml => "yaml",
            Format::Pdf => "pdf",
            Format::Png => "png",
            Format::Jpeg => "jpg",
            Format::Zip => "zip",
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            Format::PlainText => "text/plain",
            Format::Json => "application/json",
            Format::Csv => "text/csv",
            Format::Xml => "application/xml",
            Format::Yaml => "application/x-yaml",
            Format::Pdf => "application/pdf",
            Format::Png => "image/png",
            Format::Jpeg => "image/jpeg",
            Format::Zip => "application/zip",
        }
    }
}

impl fmt::Display for Format {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        let name = match self {
            Format::PlainText => "plain text",
            Format::Json => "JSON",
            Format::Csv => "CSV",
            Format::Xml => "XML",
            Format::Yaml => "YAML",
            Format::Pdf => "PDF",
            Format::Png => "PNG",
            Format::Jpeg => "JPEG",
            Format::Zip => "ZIP",
        };
        f.write_str(name)
    }
}
