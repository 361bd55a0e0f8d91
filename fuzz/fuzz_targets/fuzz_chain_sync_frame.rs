#![no_main]

use libfuzzer_sys::fuzz_target;
use oracle_types::ChainPoint;
use oracle_vrf::{protocol, ChainSyncSession, Step};

fuzz_target!(|frames: Vec<String>| {
    let _ = protocol::parse_reply(frames.first().map(String::as_str).unwrap_or(""));

    // Feed every frame to a live session: it must end at most once and
    // never panic, whatever the endpoint sends.
    let target = ChainPoint::new(100, "cafe");
    let mut session = ChainSyncSession::new(target.clone(), target, 3);
    session.begin_connect();
    let _ = session.on_open();
    let mut finished = 0;
    for frame in &frames {
        if session.on_frame(frame) == Step::Finished {
            finished += 1;
        }
    }
    assert!(finished <= 1);
    if finished == 1 {
        assert!(session.take_outcome().is_some());
        assert!(session.take_outcome().is_none());
    }
});
