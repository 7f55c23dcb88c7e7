//! Phrase parser: turns "milk 85.50 pesos" into a name and a price.
//!
//! The last number in the phrase is the price and everything else is the
//! name, so "2 liter coke 100" is a 100 peso "2 liter coke". Price may come
//! first ("100 sugar") and currency words may appear anywhere.

use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

/// Currency words and symbols standing alone.
static CURRENCY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"₱|\$|\b(?:php|pesos?|piso)\b").expect("currency pattern is valid")
});

/// Currency words glued after a number, as in "100php".
static GLUED_CURRENCY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?P<digit>\d)(?:php|pesos?|piso)\b").expect("glued currency pattern is valid")
});

/// Currency words glued before a number, as in "php100".
static LEADING_CURRENCY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:php|pesos?|piso)(?P<digit>\d)").expect("leading currency pattern is valid")
});

static NUMBER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?P<sign>-)?(?P<num>\d{1,3}(?:,\d{3})+(?:\.\d+)?|\d+(?:\.\d+)?)")
        .expect("number pattern is valid")
});

/// Characters left dangling around the name once the price is cut out.
const NAME_TRIM: &[char] = &[',', '.', ';', ':', '-', '@', '='];

#[derive(Debug, Clone, PartialEq)]
pub struct ParsedItem {
    /// Lowercase. Title-casing is a display concern.
    pub name: String,
    pub price: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("nothing was said or typed")]
    Empty,

    #[error("no price found")]
    NoPrice,

    #[error("no item name found")]
    EmptyName,

    #[error("price is not a valid amount")]
    InvalidPrice,
}

/// Parse a spoken or typed phrase into an item name and price.
pub fn parse(raw: &str) -> Result<ParsedItem, ParseError> {
    let text = collapse_whitespace(&raw.to_lowercase());
    if text.is_empty() {
        return Err(ParseError::Empty);
    }

    let cleaned = strip_currency(&text);

    let Some(caps) = NUMBER_RE.captures_iter(&cleaned).last() else {
        return Err(ParseError::NoPrice);
    };
    let Some(num) = caps.name("num") else {
        return Err(ParseError::NoPrice);
    };

    if let Some(sign) = caps.name("sign") {
        // "milk -5" is a negative price; "2-pack" is just a hyphen.
        let before = cleaned[..sign.start()].chars().next_back();
        if before.map_or(true, char::is_whitespace) {
            return Err(ParseError::InvalidPrice);
        }
    }

    let price: f64 = num
        .as_str()
        .replace(',', "")
        .parse()
        .map_err(|_| ParseError::InvalidPrice)?;
    if !price.is_finite() || price < 0.0 {
        return Err(ParseError::InvalidPrice);
    }

    let rest = format!("{} {}", &cleaned[..num.start()], &cleaned[num.end()..]);
    let name = collapse_whitespace(&rest)
        .trim_matches(|c: char| c.is_whitespace() || NAME_TRIM.contains(&c))
        .to_string();
    if name.is_empty() {
        return Err(ParseError::EmptyName);
    }

    Ok(ParsedItem { name, price })
}

fn strip_currency(text: &str) -> String {
    let unglued = GLUED_CURRENCY_RE.replace_all(text, "${digit} ");
    let unglued = LEADING_CURRENCY_RE.replace_all(&unglued, " ${digit}");
    let stripped = CURRENCY_RE.replace_all(&unglued, " ");
    collapse_whitespace(&stripped)
}

pub(crate) fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
