#![no_main]

use libfuzzer_sys::fuzz_target;

use infrastructure::config::AgentConfig;

// Arbitrary YAML through deserialization, validation and engine building.
// A config that validates must also build.
fuzz_target!(|data: &[u8]| {
    if let Ok(yaml) = std::str::from_utf8(data)
        && yaml.len() <= 64 * 1024
        && let Ok(config) = AgentConfig::from_yaml(yaml)
    {
        assert!(config.firewall_engine().is_ok());
        assert!(config.route_engine().is_ok());
    }
});
