//! Configuration access port trait.
//!
//! Values come back as raw strings; callers parse and validate them so a
//! malformed value is reported instead of replaced by a default.

pub trait ConfigPort {
    fn get_string(&self, section: &str, key: &str) -> Option<String>;
    /// Section names in file order.
    fn sections(&self) -> Vec<String>;
}
