#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(text) = std::str::from_utf8(data) {
        if let Ok(config) = memexec::LoaderConfig::from_json_str(text) {
            let json = config.to_json().expect("serializable");
            let _ = memexec::LoaderConfig::from_json_str(&json).expect("round trip");
        }
    }
});
