/// Series marker of NSE equity-segment rows
pub const EQUITY_SERIES: &str = "EQ";

/// File name prefix of the BSE scrip-code to ISIN mapping file
pub const MAPPING_FILE_PREFIX: &str = "EQ_MAP_CC_";

/// Marker written to exports where a change has no defined value
pub const NO_VALUE_MARKER: &str = "NA";

/// Decimal precision for display
pub const DISPLAY_DECIMAL_PRECISION: u32 = 2;

// NSE legacy bhavcopy headers
pub const NSE_SYMBOL: &str = "SYMBOL";
pub const NSE_SERIES: &str = "SERIES";
pub const NSE_CLOSE: &str = "CLOSE";
pub const NSE_VOLUME: &str = "TOTTRDQTY";
pub const NSE_ISIN: &str = "ISIN";

// BSE legacy bhavcopy headers
pub const BSE_SCRIP_CODE: &str = "SC_CODE";
pub const BSE_SCRIP_NAME: &str = "SC_NAME";
pub const BSE_CLOSE: &str = "CLOSE";
pub const BSE_VOLUME: &str = "NO_OF_SHRS";

// Mapping table headers
pub const MAP_SCRIP_CODE: &str = "SC_CODE";
pub const MAP_SCRIP_NAME: &str = "SC_NAME";
pub const MAP_ISIN: &str = "ISIN";
