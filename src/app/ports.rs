use crate::error::Result;

/// Where the extractor gets its HTML from.
pub trait PageSource {
    /// Returns the body of the page at `url`. Non-success statuses are errors.
    fn fetch(&self, url: &str) -> Result<String>;
}
