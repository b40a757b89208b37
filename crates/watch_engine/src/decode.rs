use chardetng::EncodingDetector;
use encoding_rs::Encoding;
use watch_logging::watch_warn;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedPage {
    pub html: String,
    pub encoding_label: &'static str,
    /// True when malformed sequences were replaced with U+FFFD.
    pub lossy: bool,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum DecodeError {
    #[error("page body is empty")]
    Empty,
}

/// Decodes a downloaded page into UTF-8.
///
/// Encoding is chosen from the byte order mark, then the Content-Type charset,
/// then content sniffing. Malformed sequences are replaced, not rejected.
pub fn decode_page(bytes: &[u8], content_type: Option<&str>) -> Result<DecodedPage, DecodeError> {
    if bytes.is_empty() {
        return Err(DecodeError::Empty);
    }

    let encoding = Encoding::for_bom(bytes)
        .map(|(encoding, _)| encoding)
        .or_else(|| {
            content_type
                .and_then(charset_param)
                .and_then(|label| Encoding::for_label(label.as_bytes()))
        })
        .unwrap_or_else(|| sniff(bytes));

    let (text, used, had_errors) = encoding.decode(bytes);
    if had_errors {
        watch_warn!("Page contained malformed {} sequences", used.name());
    }
    Ok(DecodedPage {
        html: text.into_owned(),
        encoding_label: used.name(),
        lossy: had_errors,
    })
}

fn charset_param(content_type: &str) -> Option<String> {
    content_type.split(';').skip(1).find_map(|param| {
        let (key, value) = param.split_once('=')?;
        key.trim()
            .eq_ignore_ascii_case("charset")
            .then(|| value.trim().trim_matches(['"', '\'']).to_string())
    })
}

fn sniff(bytes: &[u8]) -> &'static Encoding {
    let mut detector = EncodingDetector::new();
    detector.feed(bytes, true);
    detector.guess(None, true)
}
