use url::form_urlencoded;

pub const HARD_BLOCK_PAGE: &str = "warning.html";
pub const SOFT_BLOCK_PAGE: &str = "checking.html";
pub const UNKNOWN_STATUS: &str = "unknown";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageKind {
    HardBlock,
    SoftBlock,
}

/// What an interstitial page URL carries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub kind: PageKind,
    pub original_url: String,
    pub status: Option<String>,
}

/// Builds and recognizes the internal interstitial page URLs.
#[derive(Debug, Clone)]
pub struct InterstitialPages {
    base: String,
}

impl InterstitialPages {
    pub fn new(base: &str) -> Self {
        let mut base = base.to_string();
        if !base.ends_with('/') {
            base.push('/');
        }
        Self { base }
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    pub fn hard_block_url(&self, original_url: &str) -> String {
        let query = form_urlencoded::Serializer::new(String::new())
            .append_pair("url", original_url)
            .finish();
        format!("{}{}?{}", self.base, HARD_BLOCK_PAGE, query)
    }

    pub fn soft_block_url(&self, original_url: &str) -> String {
        let query = form_urlencoded::Serializer::new(String::new())
            .append_pair("url", original_url)
            .append_pair("status", UNKNOWN_STATUS)
            .finish();
        format!("{}{}?{}", self.base, SOFT_BLOCK_PAGE, query)
    }

    pub fn is_own_page(&self, url: &str) -> bool {
        url.starts_with(&self.base)
    }

    /// Recovers the original URL from an interstitial page URL. `None` for
    /// foreign URLs, unknown pages, or a missing `url` parameter.
    pub fn parse(&self, page_url: &str) -> Option<PageRequest> {
        let rest = page_url.strip_prefix(&self.base)?;
        let (path, query) = rest.split_once('?').unwrap_or((rest, ""));
        let query = query.split('#').next().unwrap_or_default();

        let kind = match path {
            HARD_BLOCK_PAGE => PageKind::HardBlock,
            SOFT_BLOCK_PAGE => PageKind::SoftBlock,
            _ => return None,
        };

        let mut original_url = None;
        let mut status = None;
        for (key, value) in form_urlencoded::parse(query.as_bytes()) {
            match key.as_ref() {
                "url" => original_url = Some(value.into_owned()),
                "status" => status = Some(value.into_owned()),
                _ => {}
            }
        }

        Some(PageRequest {
            kind,
            original_url: original_url?,
            status,
        })
    }
}
