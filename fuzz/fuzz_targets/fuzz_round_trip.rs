#![no_main]
use datapack::{DataPack, Encoding};
use libfuzzer_sys::{fuzz_target, arbitrary::{Arbitrary, Unstructured}};

#[derive(Debug, Arbitrary)]
struct Resource {
    id: u16,
    data: Vec<u8>,
}

fuzz_target!(|input: &[u8]| {
    let mut u = Unstructured::new(input);

    let resources: Vec<Resource> = match u.arbitrary() {
        Ok(resources) => resources,
        Err(_) => return,
    };
    let encoding = match u.int_in_range(0u8..=2) {
        Ok(tag) => Encoding::from_u8(tag).unwrap(),
        Err(_) => return,
    };

    let mut pack = DataPack::new(encoding);
    for resource in resources {
        pack.insert(resource.id, resource.data);
    }

    let bytes = pack.to_bytes().unwrap();
    assert_eq!(DataPack::from_bytes(&bytes).unwrap(), pack);
});
