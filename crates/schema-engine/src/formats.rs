//! The two `format` values this engine asserts directly (§4.G Non-goals): everything else is
//! annotation-only.
use std::net::Ipv4Addr;
use std::str::FromStr;

use crate::ir::StringFormat;

pub(crate) fn conforms(format: StringFormat, value: &str) -> bool {
    match format {
        StringFormat::Uri => url::Url::parse(value).is_ok(),
        StringFormat::Ipv4 => Ipv4Addr::from_str(value).is_ok(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uri_requires_a_scheme() {
        assert!(conforms(StringFormat::Uri, "https://example.com/x"));
        assert!(!conforms(StringFormat::Uri, "not a uri"));
    }

    #[test]
    fn ipv4_rejects_out_of_range_octets() {
        assert!(conforms(StringFormat::Ipv4, "127.0.0.1"));
        assert!(!conforms(StringFormat::Ipv4, "999.0.0.1"));
    }
}
