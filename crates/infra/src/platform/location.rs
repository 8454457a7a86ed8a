use parking_lot::Mutex;
use storefront_core::Location;
use tracing::info;
use url::Url;

/// Current address of the running application.
///
/// Seeded with the address the process was launched for; navigations replace
/// it and are logged so the host can follow them.
pub struct ProcessLocation {
    href: Mutex<String>,
    last_navigation: Mutex<Option<String>>,
}

impl ProcessLocation {
    pub fn new(href: impl Into<String>) -> Self {
        Self { href: Mutex::new(href.into()), last_navigation: Mutex::new(None) }
    }

    pub fn last_navigation(&self) -> Option<String> {
        self.last_navigation.lock().clone()
    }
}

impl Location for ProcessLocation {
    fn href(&self) -> String {
        self.href.lock().clone()
    }

    fn fragment(&self) -> Option<String> {
        let href = self.href.lock();
        match Url::parse(&href) {
            Ok(url) => url.fragment().map(str::to_string),
            Err(_) => href.split_once('#').map(|(_, fragment)| fragment.to_string()),
        }
    }

    fn strip_fragment(&self) {
        let mut href = self.href.lock();
        if let Some(index) = href.find('#') {
            href.truncate(index);
        }
    }

    fn navigate(&self, url: &str) {
        info!(url, "navigating");
        *self.last_navigation.lock() = Some(url.to_string());
        *self.href.lock() = url.to_string();
    }
}
