//! Configuration access port.

pub trait ConfigPort {
    /// Value of `[section] key`, or `None` when absent or blank. Typed
    /// parsing happens in the domain so malformed values can be reported.
    fn get_string(&self, section: &str, key: &str) -> Option<String>;
}
