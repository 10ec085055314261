#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use socratic_core::{NavKey, ScrollOwner};
use socratic_harness::Scenario;

#[derive(Debug, Arbitrary)]
enum Op {
    Append(u8),
    Wheel(i16),
    Touch(i16),
    Key(u8),
    ScrollTo(u16),
    ScrollBottom,
    Resize(u16),
    Frames(u8),
    Remount,
}

fuzz_target!(|ops: Vec<Op>| {
    if ops.len() > 64 {
        return;
    }
    let mut scenario = Scenario::new();
    for op in ops {
        match op {
            Op::Append(n) => scenario.append_turns(usize::from(n % 4)),
            Op::Wheel(d) => scenario.manual_scroll(f64::from(d)),
            Op::Touch(d) => scenario.touch_scroll(f64::from(d)),
            Op::Key(k) => scenario.press(match k % 6 {
                0 => NavKey::PageUp,
                1 => NavKey::PageDown,
                2 => NavKey::Home,
                3 => NavKey::End,
                4 => NavKey::ArrowUp,
                _ => NavKey::ArrowDown,
            }),
            Op::ScrollTo(top) => scenario.scroll_to(f64::from(top)),
            Op::ScrollBottom => scenario.scroll_to_bottom(),
            Op::Resize(h) => scenario.resize_viewport(f64::from(h.max(1))),
            Op::Frames(n) => scenario.run_for(u64::from(n) * 16),
            Op::Remount => {
                if let Some(viewport) = scenario.unmount() {
                    scenario.mount(viewport);
                }
            }
        }
        let sample = scenario.sample();
        assert!((0.0..=1.0).contains(&sample.intensity));
        assert!(sample.scroll_top >= 0.0);
    }

    // Left alone, the surface always comes to rest.
    assert!(scenario.settle());
    assert!(!scenario.is_restoring());

    // Following resumes on the next append once the reader is at the bottom.
    scenario.scroll_to_bottom();
    scenario.append_turns(1);
    assert!(scenario.settle());
    assert_eq!(scenario.owner(), ScrollOwner::MachineOwned);
    assert!(scenario.is_at_bottom(5.0));
});
