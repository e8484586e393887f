/// Max distinct product ids in one booking check.
pub const MAX_PRODUCT_IDS_PER_REQUEST: usize = 1024;

/// Max length of a requested rental window, in inclusive days (ten years).
pub const MAX_RANGE_DAYS: i64 = 3_660;

/// Days either side of a heavily blocked request used for alternative windows.
pub const ALTERNATIVE_WINDOW_GAP_DAYS: i64 = 7;
