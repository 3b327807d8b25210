//! Region identity and the fixed directory of supported regions.

use url::Url;

use crate::error::CoreError;

/// One supported region: display name, internal domain key, and the
/// canonical status page URL.
///
/// `domain` values are globally unique and serve as the sole key into
/// caches and watch registries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionInfo {
    pub domain: String,
    pub region: String,
    pub url: Url,
}

impl RegionInfo {
    pub fn new(domain: &str, region: &str, url: Url) -> Self {
        Self {
            domain: domain.to_owned(),
            region: region.to_owned(),
            url,
        }
    }
}

/// Static mapping from region names and domain keys to [`RegionInfo`].
///
/// Unknown input yields `None` -- a caller-input problem, never a
/// system fault.
#[derive(Debug, Clone)]
pub struct RegionDirectory {
    regions: Vec<RegionInfo>,
}

impl RegionDirectory {
    /// The fixed table of supported public regions.
    pub fn builtin() -> Result<Self, CoreError> {
        let table = [
            ("ng", "US South"),
            ("eu-gb", "United Kingdom"),
            ("au-syd", "Sydney"),
        ];

        let mut regions = Vec::with_capacity(table.len());
        for (domain, region) in table {
            let url = Url::parse(&format!("http://estado.{domain}.bluemix.net/")).map_err(
                |e| CoreError::Config {
                    message: format!("bad builtin status URL for {domain}: {e}"),
                },
            )?;
            regions.push(RegionInfo::new(domain, region, url));
        }
        Ok(Self { regions })
    }

    /// A directory over an explicit region set (tests, private stacks).
    pub fn with_regions(regions: Vec<RegionInfo>) -> Self {
        Self { regions }
    }

    /// All known regions, in table order.
    pub fn regions(&self) -> &[RegionInfo] {
        &self.regions
    }

    /// Resolve by display name, case-insensitively.
    pub fn by_region_name(&self, name: &str) -> Option<&RegionInfo> {
        let wanted = name.to_lowercase();
        self.regions
            .iter()
            .find(|ri| ri.region.to_lowercase() == wanted)
    }

    /// Resolve by domain key (exact match).
    pub fn by_domain(&self, domain: &str) -> Option<&RegionInfo> {
        self.regions.iter().find(|ri| ri.domain == domain)
    }

    /// Determine the home region from a configured platform API
    /// endpoint by matching the `.{domain}.` substring.
    pub fn from_endpoint(&self, endpoint: &str) -> Option<&RegionInfo> {
        self.regions
            .iter()
            .find(|ri| endpoint.contains(&format!(".{}.", ri.domain)))
    }
}
