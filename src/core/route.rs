//! Route-derived data directory and asset URLs

/// First non-empty segment of a URL path, naming the document whose assets
/// are shown
pub fn data_dir_from_path(path: &str) -> Option<&str> {
    let path = path.split(['?', '#']).next().unwrap_or_default();
    path.split('/').find(|segment| !segment.is_empty())
}

/// Builds asset URLs under the current data directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetPaths {
    data_dir: Option<String>,
}

impl AssetPaths {
    pub fn from_route(path: &str) -> Self {
        Self {
            data_dir: data_dir_from_path(path).map(str::to_string),
        }
    }

    pub fn data_dir(&self) -> Option<&str> {
        self.data_dir.as_deref()
    }

    /// `/{data-dir}/{image path}`, or `None` without a data directory
    pub fn page_image(&self, src: &str) -> Option<String> {
        let dir = self.data_dir.as_deref()?;
        Some(format!("/{dir}/{}", src.trim_start_matches('/')))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_segment() {
        assert_eq!(data_dir_from_path("/census-1913/page/4"), Some("census-1913"));
        assert_eq!(data_dir_from_path("//census-1913/"), Some("census-1913"));
        assert_eq!(data_dir_from_path("census?page=4"), Some("census"));
    }

    #[test]
    fn test_no_segment() {
        assert_eq!(data_dir_from_path("/"), None);
        assert_eq!(data_dir_from_path(""), None);
        assert_eq!(data_dir_from_path("/?page=4"), None);
    }

    #[test]
    fn test_asset_urls() {
        let assets = AssetPaths::from_route("/census-1913/ocr");
        assert_eq!(assets.page_image("scans/p1.jpg").as_deref(), Some("/census-1913/scans/p1.jpg"));
        assert_eq!(assets.page_image("/p1.jpg").as_deref(), Some("/census-1913/p1.jpg"));

        let nowhere = AssetPaths::from_route("/");
        assert_eq!(nowhere.data_dir(), None);
        assert_eq!(nowhere.page_image("p1.jpg"), None);
    }
}
