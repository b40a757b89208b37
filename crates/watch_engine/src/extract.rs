use scraper::{ElementRef, Html, Selector};
use url::Url;
use watch_core::{ItemId, Record, Snapshot};

const PRODUCT_SELECTOR: &str = ".product_wrapper";
const LINK_SELECTOR: &str = r#"[data-list="Search Results"]"#;
const IMAGE_SELECTOR: &str = ".SearchResultProductImage";
const PRICE_SELECTOR: &str = ".price-label";
const ORIGINAL_PRICE_SELECTOR: &str = ".ObStrike";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExtractError {
    #[error("invalid selector {0}")]
    Selector(&'static str),
    #[error("product #{index}: missing {field}")]
    MissingField { index: usize, field: &'static str },
    #[error("product #{index}: cannot read {field} from {raw:?}")]
    InvalidPrice {
        index: usize,
        field: &'static str,
        raw: String,
    },
    #[error("product #{index}: invalid link {raw:?}")]
    InvalidLink { index: usize, raw: String },
}

/// Turns a search results page into catalog records.
///
/// Every `.product_wrapper` must yield a complete record; one malformed
/// product fails the whole page.
#[derive(Debug, Clone)]
pub struct ProductExtractor {
    base_url: Option<Url>,
}

impl ProductExtractor {
    /// Relative product and image links are resolved against `base_url`.
    pub fn new(base_url: Option<Url>) -> Self {
        Self { base_url }
    }

    pub fn extract(&self, html: &str) -> Result<Snapshot, ExtractError> {
        let doc = Html::parse_document(html);
        let product_sel = selector(PRODUCT_SELECTOR)?;
        let link_sel = selector(LINK_SELECTOR)?;
        let image_sel = selector(IMAGE_SELECTOR)?;
        let price_sel = selector(PRICE_SELECTOR)?;
        let original_sel = selector(ORIGINAL_PRICE_SELECTOR)?;

        doc.select(&product_sel)
            .enumerate()
            .map(|(index, item)| {
                let missing = |field| ExtractError::MissingField { index, field };

                let link = item.select(&link_sel).next().ok_or_else(|| missing("product link"))?;
                let name = attr(link, "data-name").ok_or_else(|| missing("data-name"))?;
                let id = attr(link, "data-id").ok_or_else(|| missing("data-id"))?;
                let href = attr(link, "href").ok_or_else(|| missing("href"))?;
                let image = item
                    .select(&image_sel)
                    .next()
                    .and_then(|node| attr(node, "src"))
                    .ok_or_else(|| missing("image"))?;

                // The sale price is the first child element of the price label.
                let price_text = item
                    .select(&price_sel)
                    .next()
                    .and_then(|label| label.children().filter_map(ElementRef::wrap).next())
                    .map(element_text)
                    .ok_or_else(|| missing("price"))?;
                let original_text = item
                    .select(&original_sel)
                    .next()
                    .map(element_text)
                    .ok_or_else(|| missing("original price"))?;

                Ok(Record {
                    price: parse_price(&price_text, index, "price")?,
                    original_price: parse_price(&original_text, index, "original price")?,
                    url: self.resolve(&href, index)?,
                    image: self.resolve(&image, index)?,
                    ..Record::new(name, ItemId::new(id), 0.0)
                })
            })
            .collect()
    }

    fn resolve(&self, raw: &str, index: usize) -> Result<String, ExtractError> {
        let invalid = || ExtractError::InvalidLink {
            index,
            raw: raw.to_string(),
        };
        match &self.base_url {
            Some(base) => base.join(raw).map(String::from).map_err(|_| invalid()),
            None => Url::parse(raw).map(String::from).map_err(|_| invalid()),
        }
    }
}

fn selector(css: &'static str) -> Result<Selector, ExtractError> {
    Selector::parse(css).map_err(|_| ExtractError::Selector(css))
}

fn attr(element: ElementRef<'_>, name: &str) -> Option<String> {
    element
        .value()
        .attr(name)
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(ToOwned::to_owned)
}

fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

/// Parses "$1,299.99" style labels. Negative or non-finite amounts are rejected.
fn parse_price(raw: &str, index: usize, field: &'static str) -> Result<f64, ExtractError> {
    let cleaned: String = raw
        .chars()
        .filter(|c| !matches!(c, '$' | ',') && !c.is_whitespace())
        .collect();
    cleaned
        .parse::<f64>()
        .ok()
        .filter(|price| price.is_finite() && *price >= 0.0)
        .ok_or_else(|| ExtractError::InvalidPrice {
            index,
            field,
            raw: raw.to_string(),
        })
}
