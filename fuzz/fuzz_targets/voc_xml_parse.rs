//! Fuzz target for VOC XML object parsing.

#![no_main]

use annoverify::decode::corner::from_voc_xml_slice;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Cap input size to avoid excessive memory usage.
    if data.len() > 10 * 1024 * 1024 {
        return;
    }

    if let Ok(objects) = from_voc_xml_slice(data) {
        for object in objects {
            let _ = object.bbox.truncate_to_rect();
        }
    }
});
