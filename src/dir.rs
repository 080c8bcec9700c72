//! Directory operations: a directory is a file whose cluster chain holds
//! a packed sequence of 32-byte `DirEntry` records.

use crate::clock::Clock;
use crate::disk::ClusterAddress;
use crate::engine::Engine;
use crate::entry::{Attributes, DirEntry, ENTRY_SIZE};
use crate::error::DirError;
use crate::name as name_codec;
use crate::stream::{FileStream, Whence, UNBOUNDED_SIZE};

/// Open a stream over a directory's chain, positioned at the start.
pub fn open<const CLUSTER_BYTES: usize>(start: ClusterAddress) -> FileStream<CLUSTER_BYTES> {
    FileStream::open(start, UNBOUNDED_SIZE)
}

/// Rewind `dir` and collect every non-deleted entry, including `..`.
/// Filtering `..` out of a listing is a CLI concern, not a core one.
pub fn list<const CLUSTER_BYTES: usize, const CLUSTER_COUNT: usize>(
    engine: &Engine<CLUSTER_BYTES, CLUSTER_COUNT>,
    dir: &mut FileStream<CLUSTER_BYTES>,
) -> Vec<DirEntry> {
    dir.rewind();
    let mut buf = [0u8; ENTRY_SIZE];
    let mut entries = Vec::new();
    while dir.read(engine, &mut buf) == ENTRY_SIZE {
        let entry = DirEntry::decode(&buf);
        if !entry.is_deleted() {
            entries.push(entry);
        }
    }
    entries
}

/// Rewind `dir` and scan for the first non-deleted entry whose name
/// matches. On a match, the stream is left rewound to that entry's start
/// so the caller can overwrite it in place.
pub fn get_entry<const CLUSTER_BYTES: usize, const CLUSTER_COUNT: usize>(
    engine: &Engine<CLUSTER_BYTES, CLUSTER_COUNT>,
    dir: &mut FileStream<CLUSTER_BYTES>,
    target: &str,
) -> Option<DirEntry> {
    let (target_name, target_ext) = name_codec::parse(target);
    dir.rewind();
    let mut buf = [0u8; ENTRY_SIZE];
    loop {
        let pos = dir.tell();
        if dir.read(engine, &mut buf) < ENTRY_SIZE {
            return None;
        }
        let entry = DirEntry::decode(&buf);
        if entry.is_deleted() {
            continue;
        }
        if name_codec::compare(&entry.name, &entry.ext, &target_name, &target_ext) {
            dir.seek(engine, pos as i64, Whence::Set).ok();
            return Some(entry);
        }
    }
}

/// Rewind `dir` and scan for the first entry whose assembled first
/// cluster address matches. Unlike `get_entry`, the stream is left
/// wherever the scan ends — no rewind-to-entry on match.
pub fn get_entry_by_address<const CLUSTER_BYTES: usize, const CLUSTER_COUNT: usize>(
    engine: &Engine<CLUSTER_BYTES, CLUSTER_COUNT>,
    dir: &mut FileStream<CLUSTER_BYTES>,
    address: ClusterAddress,
) -> Option<DirEntry> {
    dir.rewind();
    let mut buf = [0u8; ENTRY_SIZE];
    loop {
        if dir.read(engine, &mut buf) < ENTRY_SIZE {
            return None;
        }
        let entry = DirEntry::decode(&buf);
        if !entry.is_deleted() && entry.first_cluster() == address {
            return Some(entry);
        }
    }
}

/// Assemble a stream from `entry`'s first cluster. Directories open with
/// an unbounded logical size; files open with their recorded size.
/// Opening a non-directory entry updates `last_access_date` on the
/// caller's copy — the caller is responsible for writing it back to the
/// directory.
pub fn open_entry<const CLUSTER_BYTES: usize>(
    entry: &mut DirEntry,
    clock: &dyn Clock,
) -> FileStream<CLUSTER_BYTES> {
    let size = if entry.is_directory() {
        UNBOUNDED_SIZE
    } else {
        entry.size as u64
    };
    if !entry.is_directory() {
        entry.set_last_access_date(&clock.now());
    }
    FileStream::open(entry.first_cluster(), size)
}

/// Like `open_entry`, but for callers that need to descend into `entry`
/// as a directory (a `cd`-style seam): refuses a non-directory entry
/// instead of silently opening it.
pub fn enter<const CLUSTER_BYTES: usize>(
    entry: &mut DirEntry,
    clock: &dyn Clock,
) -> Result<FileStream<CLUSTER_BYTES>, DirError> {
    if !entry.is_directory() {
        return Err(DirError::NotADirectory(entry.display_name()));
    }
    Ok(open_entry(entry, clock))
}

/// Finalize a non-directory entry against the stream it was opened with:
/// seek to end and record `tell()` as `size`; if the stream was modified,
/// stamp `last_modified_{date,time}`. The caller still owns writing the
/// mutated entry back to its directory.
pub fn close_entry<const CLUSTER_BYTES: usize, const CLUSTER_COUNT: usize>(
    engine: &Engine<CLUSTER_BYTES, CLUSTER_COUNT>,
    entry: &mut DirEntry,
    mut file: FileStream<CLUSTER_BYTES>,
    clock: &dyn Clock,
) {
    if !entry.is_directory() {
        file.seek(engine, 0, Whence::End).ok();
        entry.size = file.tell() as u32;
    }
    if file.modified() {
        entry.set_last_modified(&clock.now());
    }
}

/// Create a new entry in `dir`: the earliest deleted slot is reused, or
/// the record is appended (the write extends the chain as needed). The
/// `..` entry for a fresh subdirectory is NOT written here — that is the
/// caller's (CLI's) responsibility.
pub fn new_entry<const CLUSTER_BYTES: usize, const CLUSTER_COUNT: usize>(
    engine: &mut Engine<CLUSTER_BYTES, CLUSTER_COUNT>,
    dir: &mut FileStream<CLUSTER_BYTES>,
    name: &str,
    attribs: Attributes,
    clock: &dyn Clock,
) -> DirEntry {
    dir.rewind();
    let mut buf = [0u8; ENTRY_SIZE];
    let mut insertion_pos = None;
    let target_pos;
    loop {
        let pos = dir.tell();
        if dir.read(engine, &mut buf) < ENTRY_SIZE {
            target_pos = insertion_pos.unwrap_or(pos);
            break;
        }
        let existing = DirEntry::decode(&buf);
        if existing.is_deleted() && insertion_pos.is_none() {
            insertion_pos = Some(pos);
        }
    }

    let (parsed_name, parsed_ext) = name_codec::parse(name);
    let mut entry = DirEntry::empty();
    entry.name = parsed_name;
    entry.ext = parsed_ext;
    entry.attribs = attribs;
    entry.size = 0;
    let now = clock.now();
    entry.set_create_time(&now);
    entry.last_access_date = entry.create_date;
    let cluster = engine.allocate_cluster();
    entry.set_first_cluster(cluster);

    dir.seek(engine, target_pos as i64, Whence::Set).ok();
    dir.write(engine, &entry.encode());
    dir.seek(engine, target_pos as i64, Whence::Set).ok();
    entry
}

/// Look up `name` in `dir`, refuse to remove a SYSTEM-protected entry,
/// otherwise recursively free its contents (see `delete_entry`) and zero
/// its 32-byte slot in place.
pub fn remove_entry<const CLUSTER_BYTES: usize, const CLUSTER_COUNT: usize>(
    engine: &mut Engine<CLUSTER_BYTES, CLUSTER_COUNT>,
    dir: &mut FileStream<CLUSTER_BYTES>,
    name: &str,
) -> Result<(), DirError> {
    let entry = get_entry(engine, dir, name).ok_or_else(|| DirError::NotFound(name.to_string()))?;
    if entry.attribs.contains(Attributes::SYSTEM) {
        return Err(DirError::Protected(name.to_string()));
    }
    delete_entry(engine, &entry);
    dir.write(engine, &DirEntry::empty().encode());
    Ok(())
}

/// Internal, recursive: if `entry` is a subdirectory, recursively delete
/// every non-SYSTEM child, then free the entry's own chain. Does not
/// touch the entry's on-disk record; the caller zeroes that slot.
fn delete_entry<const CLUSTER_BYTES: usize, const CLUSTER_COUNT: usize>(
    engine: &mut Engine<CLUSTER_BYTES, CLUSTER_COUNT>,
    entry: &DirEntry,
) {
    if entry.is_directory() {
        let mut child_stream: FileStream<CLUSTER_BYTES> =
            FileStream::open(entry.first_cluster(), UNBOUNDED_SIZE);
        let mut buf = [0u8; ENTRY_SIZE];
        loop {
            if child_stream.read(engine, &mut buf) < ENTRY_SIZE {
                break;
            }
            let child = DirEntry::decode(&buf);
            if child.is_deleted() || child.attribs.contains(Attributes::SYSTEM) {
                continue;
            }
            delete_entry(engine, &child);
        }
    }
    engine.free_chain(entry.first_cluster());
}

/// Free `entry`'s contents (as `delete_entry`), then reset it to an
/// empty file with a freshly allocated cluster. The caller writes the
/// mutated entry back to its directory.
pub fn clear_entry<const CLUSTER_BYTES: usize, const CLUSTER_COUNT: usize>(
    engine: &mut Engine<CLUSTER_BYTES, CLUSTER_COUNT>,
    entry: &mut DirEntry,
    clock: &dyn Clock,
) {
    delete_entry(engine, entry);
    entry.size = 0;
    entry.set_last_modified(&clock.now());
    let cluster = engine.allocate_cluster();
    entry.set_first_cluster(cluster);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;

    fn root_stream<const CB: usize, const CC: usize>(engine: &Engine<CB, CC>) -> FileStream<CB> {
        open(engine.root_address())
    }

    #[test]
    fn new_entry_then_lookup_round_trip() {
        let mut engine: Engine<8, 64> = Engine::new();
        let clock = FixedClock::default();
        let mut root = root_stream(&engine);

        let created = new_entry(&mut engine, &mut root, "A", Attributes::empty(), &clock);
        let found = get_entry(&engine, &mut root, "A").expect("A should be found");
        assert_eq!(found.name, created.name);
        assert_eq!(found.first_cluster(), created.first_cluster());
    }

    #[test]
    fn deleted_slot_is_reused() {
        let mut engine: Engine<8, 64> = Engine::new();
        let clock = FixedClock::default();
        let mut root = root_stream(&engine);

        new_entry(&mut engine, &mut root, "A", Attributes::empty(), &clock);
        new_entry(&mut engine, &mut root, "B", Attributes::empty(), &clock);
        root.rewind();
        remove_entry(&mut engine, &mut root, "A").unwrap();

        root.rewind();
        let a_pos = {
            let mut buf = [0u8; ENTRY_SIZE];
            let pos = root.tell();
            root.read(&engine, &mut buf);
            assert!(DirEntry::decode(&buf).is_deleted());
            pos
        };

        new_entry(&mut engine, &mut root, "C", Attributes::empty(), &clock);
        root.rewind();
        let mut buf = [0u8; ENTRY_SIZE];
        let pos = root.tell();
        root.read(&engine, &mut buf);
        let c = DirEntry::decode(&buf);
        assert_eq!(pos, a_pos);
        assert_eq!(c.display_name(), "C");
    }

    #[test]
    fn remove_protects_system_entries() {
        let mut engine: Engine<8, 64> = Engine::new();
        let clock = FixedClock::default();
        let mut root = root_stream(&engine);
        new_entry(
            &mut engine,
            &mut root,
            "..",
            Attributes::SYSTEM | Attributes::SUBDIRECTORY,
            &clock,
        );

        let result = remove_entry(&mut engine, &mut root, "..");
        assert!(matches!(result, Err(DirError::Protected(_))));
    }

    #[test]
    fn remove_missing_entry_is_not_found() {
        let mut engine: Engine<8, 64> = Engine::new();
        let mut root = root_stream(&engine);
        let result = remove_entry(&mut engine, &mut root, "GHOST");
        assert!(matches!(result, Err(DirError::NotFound(_))));
    }

    #[test]
    fn recursive_delete_frees_entire_subtree() {
        let mut engine: Engine<8, 64> = Engine::new();
        let clock = FixedClock::default();
        let mut root = root_stream(&engine);

        let free_before = free_count(&engine);

        let dir_entry = new_entry(&mut engine, &mut root, "D", Attributes::SUBDIRECTORY, &clock);
        let mut dir_stream: FileStream<8> = open(dir_entry.first_cluster());
        new_entry(&mut engine, &mut dir_stream, "X", Attributes::empty(), &clock);

        root.rewind();
        remove_entry(&mut engine, &mut root, "D").unwrap();

        // D's and X's own chains are fully reclaimed; root's chain grew
        // from 1 to 4 clusters to fit D's 32-byte record in the first
        // place, and that growth outlives the removal.
        let free_after = free_count(&engine);
        assert_eq!(free_before - free_after, 3);
    }

    #[test]
    fn get_entry_by_address_finds_assembled_cluster() {
        let mut engine: Engine<8, 64> = Engine::new();
        let clock = FixedClock::default();
        let mut root = root_stream(&engine);
        let created = new_entry(&mut engine, &mut root, "A", Attributes::empty(), &clock);

        let found = get_entry_by_address(&engine, &mut root, created.first_cluster())
            .expect("should find by address");
        assert_eq!(found.display_name(), "A");
    }

    #[test]
    fn get_entry_by_address_missing_returns_none() {
        let mut engine: Engine<8, 64> = Engine::new();
        let mut root = root_stream(&engine);
        assert!(get_entry_by_address(&engine, &mut root, ClusterAddress::new(40)).is_none());
    }

    #[test]
    fn enter_rejects_a_non_directory() {
        let mut engine: Engine<8, 64> = Engine::new();
        let clock = FixedClock::default();
        let mut root = root_stream(&engine);
        let mut file = new_entry(&mut engine, &mut root, "A", Attributes::empty(), &clock);

        let result: Result<FileStream<8>, DirError> = enter(&mut file, &clock);
        assert!(matches!(result, Err(DirError::NotADirectory(_))));
    }

    #[test]
    fn list_includes_dotdot_and_skips_deleted() {
        let mut engine: Engine<8, 64> = Engine::new();
        let clock = FixedClock::default();
        let mut root = root_stream(&engine);

        new_entry(
            &mut engine,
            &mut root,
            "..",
            Attributes::SYSTEM | Attributes::SUBDIRECTORY,
            &clock,
        );
        new_entry(&mut engine, &mut root, "A", Attributes::empty(), &clock);
        new_entry(&mut engine, &mut root, "B", Attributes::empty(), &clock);
        root.rewind();
        remove_entry(&mut engine, &mut root, "A").unwrap();

        let names: Vec<String> = list(&engine, &mut root).iter().map(DirEntry::display_name).collect();
        assert_eq!(names, vec!["..".to_string(), "B".to_string()]);
    }

    fn free_count<const CB: usize, const CC: usize>(engine: &Engine<CB, CC>) -> usize {
        (0..CC as u32).filter(|&i| engine.fat_get(i).is_null()).count()
    }
}
