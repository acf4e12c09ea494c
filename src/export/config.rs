//! Configuration for data export

/// Configuration options for CSV export and the text view
#[derive(Debug, Clone, PartialEq)]
pub struct ExportConfig {
    /// Digits after the decimal point (significant digits for extreme values)
    pub precision: usize,

    /// Field delimiter byte for CSV output
    pub separator: u8,

    /// Whether CSV output starts with a header row
    pub header: bool,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            precision: 4,
            separator: b',',
            header: false,
        }
    }
}

impl ExportConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_precision(mut self, precision: usize) -> Self {
        self.precision = precision;
        self
    }

    pub fn with_separator(mut self, separator: u8) -> Self {
        self.separator = separator;
        self
    }

    pub fn with_header(mut self, header: bool) -> Self {
        self.header = header;
        self
    }
}
