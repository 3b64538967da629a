#![no_main]

use libfuzzer_sys::fuzz_target;

use infrastructure::config::{parse_firewall_rule, parse_route_rule};

// Rule text must parse or fail cleanly, never panic. Parsed networks are
// always stored pre-masked.
fuzz_target!(|data: &[u8]| {
    let Ok(line) = std::str::from_utf8(data) else {
        return;
    };
    if line.len() > 256 {
        return;
    }

    if let Ok(spec) = parse_firewall_rule(line) {
        for cidr in [spec.src, spec.dst].into_iter().flatten() {
            assert_eq!(cidr.network() & cidr.mask(), cidr.network());
        }
    }

    if let Ok(spec) = parse_route_rule(line) {
        assert_ne!(spec.gateway.port(), 0);
        assert_eq!(spec.src.network() & spec.src.mask(), spec.src.network());
        assert_eq!(spec.dst.network() & spec.dst.mask(), spec.dst.network());
    }
});
