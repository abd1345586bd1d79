//! Logger module
//!
//! Timestamped stderr logging for the degraded paths of response
//! construction. The embedding server owns access logging.

use chrono::Local;

fn timestamp() -> String {
    Local::now().format("%Y-%m-%d %H:%M:%S%.3f").to_string()
}

pub fn log_error(message: &str) {
    eprintln!("[{}] [ERROR] {}", timestamp(), message);
}

pub fn log_warning(message: &str) {
    eprintln!("[{}] [WARN] {}", timestamp(), message);
}
