//! Building caller-facing payloads from parsed model output.

use crate::models::{CandidateList, ProductCandidate, ProductInfo, ProductLinks};

pub const AMAZON_WEB_SEARCH: &str = "https://www.amazon.com/s?k=";
/// Amazon shopping app scheme; opens the app directly on iOS and Android.
pub const AMAZON_APP_SEARCH: &str = "com.amazon.mobile.shopping://amazon.com/s?k=";

/// Marks `encodeURIComponent` leaves alone but `urlencoding` escapes.
const UNRESERVED_MARKS: [(&str, &str); 5] = [
    ("%21", "!"),
    ("%27", "'"),
    ("%28", "("),
    ("%29", ")"),
    ("%2A", "*"),
];

/// Percent-encode a query component the way JavaScript's `encodeURIComponent` does.
///
/// Every `%` in `urlencoding` output starts an escape triple (a literal `%`
/// becomes `%25`), so restoring the marks cannot touch other escapes.
pub fn encode_uri_component(input: &str) -> String {
    UNRESERVED_MARKS
        .iter()
        .fold(urlencoding::encode(input).into_owned(), |acc, &(escaped, mark)| {
            acc.replace(escaped, mark)
        })
}

/// Expand an identified product into Amazon web and app search links.
pub fn product_links(info: ProductInfo) -> ProductLinks {
    let query = info.effective_query().to_string();
    let encoded = encode_uri_component(&query);

    ProductLinks {
        amazon_app_url: format!("{}{}", AMAZON_APP_SEARCH, encoded),
        amazon_web_url: format!("{}{}", AMAZON_WEB_SEARCH, encoded),
        product: info.name,
        search_query: query,
    }
}

pub fn candidate_list(products: Vec<ProductCandidate>) -> CandidateList {
    CandidateList { products }
}
