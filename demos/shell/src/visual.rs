//! The `disk` command: prints every cluster's FAT linkage state and a
//! control-character-scrubbed preview of its payload.

use fat32_sim::{ClusterAddress, Engine};

fn scrub(byte: u8) -> char {
    match byte {
        0x07 | 0x08 | 0x09 | 0x0A | 0x0B | 0x0C | 0x0D => ' ',
        0x20..=0x7E => byte as char,
        _ => ' ',
    }
}

fn fat_state(addr: ClusterAddress) -> String {
    if addr.is_null() {
        "free".to_string()
    } else if addr.is_eoc() {
        "EOC".to_string()
    } else {
        format!("-> {}", addr.index())
    }
}

pub fn print_disk<const CLUSTER_BYTES: usize, const CLUSTER_COUNT: usize>(
    engine: &Engine<CLUSTER_BYTES, CLUSTER_COUNT>,
) {
    for index in 0..CLUSTER_COUNT as u32 {
        let fat = engine.fat_get(index);
        let mut preview = String::with_capacity(CLUSTER_BYTES);
        if !fat.is_null() {
            for &byte in engine.cluster_bytes(index) {
                preview.push(scrub(byte));
            }
        } else {
            preview.push_str(&" ".repeat(CLUSTER_BYTES));
        }
        println!("{index:>4} [{fat:<6}] [{preview}]", fat = fat_state(fat));
    }
}
