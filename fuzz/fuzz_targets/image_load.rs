#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    match memexec::LoadedBinary::new(data.to_vec()) {
        Ok(binary) => {
            let path = binary.pseudo_path().expect("open after load");
            assert_eq!(std::fs::read(path).expect("readable"), data);
        }
        Err(memexec::LoaderError::EmptyImage) => assert!(data.is_empty()),
        Err(e) => panic!("unexpected load error: {e}"),
    }
});
