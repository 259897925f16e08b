#![no_main]

use classscope::ClassFile;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(class) = ClassFile::from_mem(data.to_vec()) {
        let _ = class.decode_methods();
        for (index, _) in class.constant_pool.iter() {
            let _ = class.constant_pool.render(index);
        }
    }
});
