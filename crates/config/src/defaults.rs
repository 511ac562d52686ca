//! Default values for configuration fields

pub fn default_enabled() -> bool {
    true
}

pub fn default_house_name() -> String {
    "OpenAuction".to_string()
}

pub fn default_full_projection_ttl_seconds() -> u64 {
    600
}

pub fn default_recent_bids_ttl_seconds() -> u64 {
    10
}

pub fn default_max_entries() -> u64 {
    10000
}

pub fn default_recent_limit() -> usize {
    20
}

pub fn default_log_format() -> String {
    "pretty".to_string()
}
