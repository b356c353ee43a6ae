/// Turns stored relative paths into absolute URLs served under `/media`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaUrls {
    base_url: String,
}

impl MediaUrls {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { base_url }
    }

    pub fn absolute(&self, relative: &str) -> String {
        format!("{}/media/{}", self.base_url, relative.trim_start_matches('/'))
    }

    /// Absolute URL, or an empty string when nothing is stored.
    pub fn absolute_or_empty(&self, relative: Option<&str>) -> String {
        match relative {
            Some(path) if !path.is_empty() => self.absolute(path),
            _ => String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn joins_without_doubled_slashes() {
        let urls = MediaUrls::new("https://www.tradepayafrica.com/");
        assert_eq!(
            urls.absolute("/user_main/beans.png"),
            "https://www.tradepayafrica.com/media/user_main/beans.png"
        );
        assert_eq!(urls.absolute_or_empty(None), "");
        assert_eq!(urls.absolute_or_empty(Some("")), "");
    }
}
