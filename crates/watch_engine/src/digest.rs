use std::fmt::Write;

use html_escape::{encode_double_quoted_attribute as attr, encode_text};
use url::{form_urlencoded, Url};
use watch_core::{ItemId, Record};

const SUBJECT: &str = "Open-box discount change";

/// Human-readable summary of a batch of differences.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Digest {
    pub subject: String,
    pub html: String,
}

impl Digest {
    /// Renders one table row per difference with an ignore link of
    /// `ignore_base_url` followed by the item id.
    pub fn build(differences: &[Record], ignore_base_url: &str) -> Self {
        let subject = match differences.len() {
            1 => format!("{SUBJECT} (1 item)"),
            n => format!("{SUBJECT} ({n} items)"),
        };

        let mut html = String::from("<table border='1' style=\"border-collapse:collapse;\">");
        html.push_str("<tr><th>Item</th><th>Price</th><th>Prev Price</th><th>Orig Price</th><th>Ignore</th></tr>");
        for item in differences {
            let previous = item.old_price.map(dollars).unwrap_or_default();
            // Writing into a String cannot fail.
            let _ = write!(
                html,
                "<tr><td><img width=\"120px\" src=\"{image}\"/><br clear=\"all\"/><a href=\"{url}\">{name}</a></td>\
                 <td><b>{price}</b></td><td>{previous}</td><td>{original}</td>\
                 <td><a href=\"{ignore}\">Ignore</a></td></tr>",
                image = attr(&item.image),
                url = attr(&item.url),
                name = encode_text(&item.name),
                price = dollars(item.price),
                original = dollars(item.original_price),
                ignore = attr(&ignore_link(ignore_base_url, &item.id)),
            );
        }
        html.push_str("</table>");

        Self { subject, html }
    }
}

fn dollars(amount: f64) -> String {
    format!("${amount}")
}

/// Appends `id` to `base` as one percent-encoded path segment.
fn ignore_link(base: &str, id: &ItemId) -> String {
    match Url::parse(base) {
        Ok(mut url) if !url.cannot_be_a_base() => {
            if let Ok(mut segments) = url.path_segments_mut() {
                segments.pop_if_empty().push(id.as_str());
            }
            url.into()
        }
        _ => {
            let segment: String = form_urlencoded::byte_serialize(id.as_str().as_bytes()).collect();
            format!("{base}{segment}")
        }
    }
}
