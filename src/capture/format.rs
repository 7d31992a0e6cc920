//! Barcode symbologies and decoded results

/// Symbology of a decoded code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BarcodeFormat {
    QrCode,
    Ean13,
    Ean8,
    UpcA,
    UpcE,
    Isbn10,
    Isbn13,
    Itf,
    Code39,
    Code93,
    Code128,
    Codabar,
    Pdf417,
    DataBar,
    DataBarExpanded,
    /// The decoder did not name the symbology
    Unknown,
}

impl BarcodeFormat {
    /// Map a zbar symbol type name (as posted in `barcode` bus messages)
    pub fn from_zbar(type_name: &str) -> Self {
        match type_name.trim().to_ascii_uppercase().as_str() {
            "QR-CODE" | "QRCODE" => BarcodeFormat::QrCode,
            "EAN-13" => BarcodeFormat::Ean13,
            "EAN-8" => BarcodeFormat::Ean8,
            "UPC-A" => BarcodeFormat::UpcA,
            "UPC-E" => BarcodeFormat::UpcE,
            "ISBN-10" => BarcodeFormat::Isbn10,
            "ISBN-13" => BarcodeFormat::Isbn13,
            "I2/5" => BarcodeFormat::Itf,
            "CODE-39" => BarcodeFormat::Code39,
            "CODE-93" => BarcodeFormat::Code93,
            "CODE-128" => BarcodeFormat::Code128,
            "CODABAR" => BarcodeFormat::Codabar,
            "PDF417" => BarcodeFormat::Pdf417,
            "DATABAR" => BarcodeFormat::DataBar,
            "DATABAR-EXP" => BarcodeFormat::DataBarExpanded,
            other => {
                log::debug!("Unrecognized zbar symbol type: {:?}", other);
                BarcodeFormat::Unknown
            }
        }
    }

    /// Name shown next to the decoded text
    pub fn label(self) -> &'static str {
        match self {
            BarcodeFormat::QrCode => "QR_CODE",
            BarcodeFormat::Ean13 => "EAN_13",
            BarcodeFormat::Ean8 => "EAN_8",
            BarcodeFormat::UpcA => "UPC_A",
            BarcodeFormat::UpcE => "UPC_E",
            BarcodeFormat::Isbn10 => "ISBN_10",
            BarcodeFormat::Isbn13 => "ISBN_13",
            BarcodeFormat::Itf => "ITF",
            BarcodeFormat::Code39 => "CODE_39",
            BarcodeFormat::Code93 => "CODE_93",
            BarcodeFormat::Code128 => "CODE_128",
            BarcodeFormat::Codabar => "CODABAR",
            BarcodeFormat::Pdf417 => "PDF_417",
            BarcodeFormat::DataBar => "RSS_14",
            BarcodeFormat::DataBarExpanded => "RSS_EXPANDED",
            BarcodeFormat::Unknown => "Unknown",
        }
    }
}

impl std::fmt::Display for BarcodeFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// A code found by one of the decoders
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannedCode {
    /// Decoded payload
    pub text: String,
    pub format: BarcodeFormat,
}

impl ScannedCode {
    pub fn new(text: impl Into<String>, format: BarcodeFormat) -> Self {
        Self {
            text: text.into(),
            format,
        }
    }
}
