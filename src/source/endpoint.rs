use serde::Deserialize;
use url::Url;

use crate::error::SourceError;
use crate::source::payload::PayloadShape;

/// One way of reaching a collection on the blog, with the parser for its answer.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Endpoint {
    pub url: String,
    #[serde(default)]
    pub shape: PayloadShape,
}

impl Endpoint {
    pub fn new(url: impl Into<String>, shape: PayloadShape) -> Self {
        Endpoint {
            url: url.into(),
            shape,
        }
    }

    /// URL for the given page. Page 1 is the configured URL untouched.
    pub fn page_url(&self, page: u32) -> Result<String, SourceError> {
        if page <= 1 {
            return Ok(self.url.clone());
        }

        let mut url = parse_url(&self.url)?;
        let pairs: Vec<(String, String)> = url.query_pairs()
            .filter(|(k, _)| k != "page")
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        url.query_pairs_mut()
            .clear()
            .extend_pairs(pairs)
            .append_pair("page", &page.to_string());
        Ok(url.to_string())
    }
}

fn parse_url(url: &str) -> Result<Url, SourceError> {
    Url::parse(url).map_err(|e| SourceError::InvalidEndpoint {
        url: url.to_string(),
        reason: e.to_string(),
    })
}

fn site_parts(site: &str) -> Result<(String, String), SourceError> {
    let url = parse_url(site)?;
    let host = match url.host_str() {
        Some(host) => host.to_string(),
        None => return Err(SourceError::InvalidEndpoint {
            url: site.to_string(),
            reason: "site has no host".to_string(),
        }),
    };
    Ok((site.trim_end_matches('/').to_string(), host))
}

/// Known ways a WordPress site exposes `resource` (`posts` or `categories`), most direct first.
fn default_endpoints(site: &str, resource: &str, filter: &str, per_page: u32) -> Result<Vec<Endpoint>, SourceError> {
    let (base, host) = site_parts(site)?;
    Ok(vec![
        Endpoint::new(format!("{}/wp-json/wp/v2/{}?per_page={}{}", base, resource, per_page, filter), PayloadShape::Array),
        Endpoint::new(format!("{}/?rest_route=/wp/v2/{}&per_page={}{}", base, resource, per_page, filter), PayloadShape::Array),
        Endpoint::new(format!("{}/wp-json/wp/v2/{}?per_page={}{}&_envelope", base, resource, per_page, filter), PayloadShape::Envelope),
        Endpoint::new(format!("https://public-api.wordpress.com/rest/v1.1/sites/{}/{}/?number={}", host, resource, per_page), PayloadShape::Keyed),
    ])
}

pub fn default_post_endpoints(site: &str, per_page: u32) -> Result<Vec<Endpoint>, SourceError> {
    default_endpoints(site, "posts", "&status=publish", per_page)
}

pub fn default_category_endpoints(site: &str, per_page: u32) -> Result<Vec<Endpoint>, SourceError> {
    default_endpoints(site, "categories", "", per_page)
}
