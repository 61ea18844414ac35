#![no_main]
use libfuzzer_sys::fuzz_target;
use wavix::WaveletMatrix;

// The decoder must reject garbage with an error, never a panic, and
// anything it accepts must survive a re-encode cycle.
fuzz_target!(|data: &[u8]| {
    if let Ok(wm) = WaveletMatrix::from_bytes(data) {
        let bytes = wm.to_bytes().expect("re-encode decoded matrix");
        let again = WaveletMatrix::from_bytes(&bytes).expect("re-decode encoded matrix");
        assert_eq!(again.len(), wm.len());
        assert_eq!(again.dim(), wm.dim());
        assert_eq!(again.width(), wm.width());
        if !wm.is_empty() {
            assert_eq!(again.access(0), wm.access(0));
            assert_eq!(again.access(wm.len() - 1), wm.access(wm.len() - 1));
        }
    }
});
