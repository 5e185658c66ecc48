/// Minimum number of fractional digits kept by a division
pub const DIVISION_MIN_SCALE: u32 = 6;

/// Largest scale a fixed-point decimal can carry
pub const MAX_SCALE: u32 = 28;

/// Default settings file name, looked up next to the data file
pub const SETTINGS_FILE_NAME: &str = "conversion.json";
