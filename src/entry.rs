//! The 32-byte on-disk directory entry record and its packed fields.

use crate::clock::ClockTime;
use crate::disk::ClusterAddress;
use crate::name;
use bitflags::bitflags;

/// Size in bytes of one on-disk directory entry record.
pub const ENTRY_SIZE: usize = 32;

bitflags! {
    /// The directory entry attribute byte.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Attributes: u8 {
        const READ_ONLY    = 0x01;
        const HIDDEN       = 0x02;
        const SYSTEM       = 0x04;
        const SUBDIRECTORY = 0x10;
    }
}

/// A packed 16-bit time: `hours(5) | minutes(6) | seconds_div2(5)`.
fn pack_time(t: &ClockTime) -> u16 {
    ((t.hour as u16) << 11) | ((t.minute as u16) << 5) | ((t.second as u16) / 2)
}

fn unpack_time(raw: u16) -> (u8, u8, u8) {
    let hour = (raw >> 11) as u8 & 0x1F;
    let minute = (raw >> 5) as u8 & 0x3F;
    let second = (raw & 0x1F) as u8 * 2;
    (hour, minute, second)
}

/// A packed 16-bit date: `year_minus_1980(7) | month(4) | day(5)`.
fn pack_date(t: &ClockTime) -> u16 {
    (t.year.saturating_sub(1980) << 9) | ((t.month as u16) << 5) | (t.day as u16)
}

fn unpack_date(raw: u16) -> (u16, u8, u8) {
    let year = 1980 + (raw >> 9);
    let month = (raw >> 5) as u8 & 0x0F;
    let day = (raw & 0x1F) as u8;
    (year, month, day)
}

/// A 32-byte directory entry record, held as a value copy once read from
/// disk. Mutations are invisible to the containing directory until the
/// caller writes the record back through the directory's stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DirEntry {
    pub name: [u8; 8],
    pub ext: [u8; 3],
    pub attribs: Attributes,
    reserved: u8,
    pub create_time_fine: u8,
    pub create_time: u16,
    pub create_date: u16,
    pub last_access_date: u16,
    first_cluster_index_high: u16,
    pub last_modified_time: u16,
    pub last_modified_date: u16,
    first_cluster_index_low: u16,
    pub size: u32,
}

impl DirEntry {
    /// A zeroed, deleted entry.
    pub fn empty() -> Self {
        DirEntry {
            name: [0; 8],
            ext: [0; 3],
            attribs: Attributes::empty(),
            reserved: 0,
            create_time_fine: 0,
            create_time: 0,
            create_date: 0,
            last_access_date: 0,
            first_cluster_index_high: 0,
            last_modified_time: 0,
            last_modified_date: 0,
            first_cluster_index_low: 0,
            size: 0,
        }
    }

    /// A slot is deleted/empty iff its first name byte is 0x00.
    pub fn is_deleted(&self) -> bool {
        self.name[0] == 0x00
    }

    pub fn is_directory(&self) -> bool {
        self.attribs.contains(Attributes::SUBDIRECTORY)
    }

    pub fn display_name(&self) -> String {
        name::format(&self.name, &self.ext)
    }

    pub fn first_cluster(&self) -> ClusterAddress {
        ClusterAddress::from_parts(self.first_cluster_index_high, self.first_cluster_index_low)
    }

    pub fn set_first_cluster(&mut self, addr: ClusterAddress) {
        let (high, low) = addr.into_parts();
        self.first_cluster_index_high = high;
        self.first_cluster_index_low = low;
    }

    pub fn set_create_time(&mut self, t: &ClockTime) {
        self.create_time_fine = 0;
        self.create_time = pack_time(t);
        self.create_date = pack_date(t);
    }

    pub fn set_last_access_date(&mut self, t: &ClockTime) {
        self.last_access_date = pack_date(t);
    }

    pub fn set_last_modified(&mut self, t: &ClockTime) {
        self.last_modified_time = pack_time(t);
        self.last_modified_date = pack_date(t);
    }

    /// Broken-down `(hour, minute, second)` for `create_time`.
    pub fn create_time_parts(&self) -> (u8, u8, u8) {
        unpack_time(self.create_time)
    }

    /// Broken-down `(year, month, day)` for `create_date`.
    pub fn create_date_parts(&self) -> (u16, u8, u8) {
        unpack_date(self.create_date)
    }

    /// Decode a 32-byte on-disk record. Explicit little-endian field
    /// reads, never relying on in-memory struct layout.
    pub fn decode(bytes: &[u8; ENTRY_SIZE]) -> Self {
        let mut name = [0u8; 8];
        name.copy_from_slice(&bytes[0..8]);
        let mut ext = [0u8; 3];
        ext.copy_from_slice(&bytes[8..11]);

        DirEntry {
            name,
            ext,
            attribs: Attributes::from_bits_truncate(bytes[11]),
            reserved: bytes[12],
            create_time_fine: bytes[13],
            create_time: u16::from_le_bytes([bytes[14], bytes[15]]),
            create_date: u16::from_le_bytes([bytes[16], bytes[17]]),
            last_access_date: u16::from_le_bytes([bytes[18], bytes[19]]),
            first_cluster_index_high: u16::from_le_bytes([bytes[20], bytes[21]]),
            last_modified_time: u16::from_le_bytes([bytes[22], bytes[23]]),
            last_modified_date: u16::from_le_bytes([bytes[24], bytes[25]]),
            first_cluster_index_low: u16::from_le_bytes([bytes[26], bytes[27]]),
            size: u32::from_le_bytes([bytes[28], bytes[29], bytes[30], bytes[31]]),
        }
    }

    /// Encode into a 32-byte on-disk record.
    pub fn encode(&self) -> [u8; ENTRY_SIZE] {
        let mut out = [0u8; ENTRY_SIZE];
        out[0..8].copy_from_slice(&self.name);
        out[8..11].copy_from_slice(&self.ext);
        out[11] = self.attribs.bits();
        out[12] = self.reserved;
        out[13] = self.create_time_fine;
        out[14..16].copy_from_slice(&self.create_time.to_le_bytes());
        out[16..18].copy_from_slice(&self.create_date.to_le_bytes());
        out[18..20].copy_from_slice(&self.last_access_date.to_le_bytes());
        out[20..22].copy_from_slice(&self.first_cluster_index_high.to_le_bytes());
        out[22..24].copy_from_slice(&self.last_modified_time.to_le_bytes());
        out[24..26].copy_from_slice(&self.last_modified_date.to_le_bytes());
        out[26..28].copy_from_slice(&self.first_cluster_index_low.to_le_bytes());
        out[28..32].copy_from_slice(&self.size.to_le_bytes());
        out
    }
}
