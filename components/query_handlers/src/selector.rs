//! Selector strings: `name/arg` or a bare CSS selector

/// A selector string split into its handler prefix and argument
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParsedSelector<'a> {
    /// Native CSS, resolved by the default handler
    Css(&'a str),
    /// `name/arg`; `arg` is everything after the first `/`, verbatim
    Handler { name: &'a str, arg: &'a str },
}

/// Split a selector string
///
/// A selector addresses a handler when it starts with one or more ASCII
/// letters followed by `/`. Anything else is CSS.
///
/// # Example
/// ```
/// use query_handlers::{parse_selector, ParsedSelector};
///
/// assert_eq!(
///     parse_selector("aria/Submit&button"),
///     ParsedSelector::Handler { name: "aria", arg: "Submit&button" }
/// );
/// assert_eq!(parse_selector("div > span"), ParsedSelector::Css("div > span"));
/// ```
pub fn parse_selector(selector: &str) -> ParsedSelector<'_> {
    let prefix_len = selector
        .bytes()
        .take_while(|b| b.is_ascii_alphabetic())
        .count();

    if prefix_len > 0 && selector.as_bytes().get(prefix_len) == Some(&b'/') {
        ParsedSelector::Handler {
            name: &selector[..prefix_len],
            arg: &selector[prefix_len + 1..],
        }
    } else {
        ParsedSelector::Css(selector)
    }
}
