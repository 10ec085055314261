#![no_main]

use libfuzzer_sys::fuzz_target;
use socratic_core::{Dialogue, DialogueLimits, dialogue::validate_diagram};

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    if text.len() > 16 * 1024 {
        return;
    }

    let limits = DialogueLimits::default();
    // Parsing and validation must never panic.
    if let Ok(dialogue) = Dialogue::from_json_str(text, &limits) {
        // An accepted dialogue stays accepted.
        assert!(dialogue.validate(&limits).is_ok());
        assert_eq!(dialogue.turns.len(), limits.min_turns);
        for turn in &dialogue.turns {
            for block in turn.diagram_blocks() {
                assert!(validate_diagram(block, limits.max_diagram_chars).is_ok());
            }
        }
    }

    // Raw text as a diagram block must never panic either.
    let _ = validate_diagram(text, limits.max_diagram_chars);
});
