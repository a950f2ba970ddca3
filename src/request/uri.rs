//! BIP21-style payment URI parsing and formatting.
//!
//! `bitcoin:<address>?amount=<btc>&label=..&message=..&r=<url>`
//! Amounts are decimal BTC on the wire and satoshis everywhere else.

/// Parsed form of a `bitcoin:` URI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentUri {
    pub address: String,
    pub amount_sat: Option<u64>,
    pub label: Option<String>,
    pub message: Option<String>,
    /// BIP72 `r=` parameter: a remote payment-protocol request to fetch.
    pub request_url: Option<String>,
}

/// Parse a `bitcoin:` URI. Returns None if the scheme is absent or a
/// parameter is malformed. The address part may be empty when `r=` is
/// present (a pure protocol-request link).
pub fn parse(input: &str) -> Option<PaymentUri> {
    let rest = strip_scheme(input)?;
    let (address, query) = match rest.split_once('?') {
        Some((a, q)) => (a, Some(q)),
        None => (rest, None),
    };

    let mut uri = PaymentUri {
        address: address.to_string(),
        amount_sat: None,
        label: None,
        message: None,
        request_url: None,
    };

    if let Some(query) = query {
        for pair in query.split('&').filter(|p| !p.is_empty()) {
            let (key, value) = pair.split_once('=')?;
            match key {
                "amount" => uri.amount_sat = Some(parse_btc_amount(value)?),
                "label" => uri.label = Some(percent_decode(value)?),
                "message" => uri.message = Some(percent_decode(value)?),
                "r" => uri.request_url = Some(percent_decode(value)?),
                // BIP21: required unknown params (req-*) must fail
                _ if key.starts_with("req-") => return None,
                _ => {}
            }
        }
    }

    if uri.address.is_empty() && uri.request_url.is_none() {
        return None;
    }
    Some(uri)
}

/// Format an address plus optional amount/label/message as a `bitcoin:` URI.
pub fn format(address: &str, amount_sat: Option<u64>, label: Option<&str>, message: Option<&str>) -> String {
    let mut uri = format!("bitcoin:{}", address);
    let mut query = Vec::new();
    if let Some(amount) = amount_sat {
        query.push(format!("amount={}", format_btc_amount(amount)));
    }
    if let Some(label) = label {
        query.push(format!("label={}", percent_encode(label)));
    }
    if let Some(message) = message {
        query.push(format!("message={}", percent_encode(message)));
    }
    if !query.is_empty() {
        uri.push('?');
        uri.push_str(&query.join("&"));
    }
    uri
}

fn strip_scheme(input: &str) -> Option<&str> {
    let (scheme, rest) = input.split_once(':')?;
    if scheme.eq_ignore_ascii_case("bitcoin") {
        Some(rest)
    } else {
        None
    }
}

pub(crate) fn format_btc_amount(amount_sat: u64) -> String {
    let whole = amount_sat / 100_000_000;
    let frac = amount_sat % 100_000_000;
    format!("{}.{:08}", whole, frac)
}

/// Decimal BTC string to satoshis. At most 8 fractional digits.
pub(crate) fn parse_btc_amount(value: &str) -> Option<u64> {
    let (whole, frac) = match value.split_once('.') {
        Some((w, f)) => (w, f),
        None => (value, ""),
    };
    if whole.is_empty() && frac.is_empty() {
        return None;
    }
    if frac.len() > 8 || !frac.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let whole_sat = if whole.is_empty() {
        0
    } else {
        whole.parse::<u64>().ok()?.checked_mul(100_000_000)?
    };
    let frac_sat = if frac.is_empty() {
        0
    } else {
        // right-pad to 8 digits: "05" -> 05000000
        frac.parse::<u64>().ok()? * 10u64.pow(8 - frac.len() as u32)
    };
    whole_sat.checked_add(frac_sat)
}

fn percent_encode(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for &b in value.as_bytes() {
        match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(b as char);
            }
            b' ' => out.push_str("%20"),
            _ => out.push_str(&format!("%{:02X}", b)),
        }
    }
    out
}

fn percent_decode(value: &str) -> Option<String> {
    let bytes = value.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'%' => {
                let hex = bytes.get(i + 1..i + 3)?;
                let hex = std::str::from_utf8(hex).ok()?;
                out.push(u8::from_str_radix(hex, 16).ok()?);
                i += 3;
            }
            b'+' => {
                out.push(b' ');
                i += 1;
            }
            b => {
                out.push(b);
                i += 1;
            }
        }
    }
    String::from_utf8(out).ok()
}
