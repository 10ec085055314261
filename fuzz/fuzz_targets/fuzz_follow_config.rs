#![no_main]

use libfuzzer_sys::fuzz_target;
use socratic_core::FollowConfig;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    if text.len() > 4096 {
        return;
    }

    for parsed in [FollowConfig::from_toml_str(text), FollowConfig::from_json_str(text)] {
        if let Ok(config) = parsed {
            // validate() and the JSONL dump must never panic.
            let problems = config.validate();
            let line = config.to_jsonl();
            assert!(!line.contains('\n'));
            assert_eq!(config.validated().is_ok(), problems.is_empty());
        }
    }
});
