//! Conversion between a user-visible `NAME[.EXT]` string and the fixed
//! 8+3 space-padded on-disk form. Byte-exact, no case folding.

/// Maximum visible characters in a `NAME[.EXT]` string (8 + '.' + 3).
pub const MAX_DISPLAY_LEN: usize = 12;

/// Split `path` into a space-padded 8-byte name and 3-byte extension.
///
/// Copies up to 8 characters into `name`, stopping at `.` or the string's
/// end; the remainder is space-padded. If parsing stopped at `.`, up to
/// 3 further characters are copied into `ext`, likewise space-padded.
pub fn parse(path: &str) -> ([u8; 8], [u8; 3]) {
    let mut name = [b' '; 8];
    let mut ext = [b' '; 3];

    let bytes = path.as_bytes();
    let mut i = 0;
    let mut n = 0;
    while i < bytes.len() && n < 8 && bytes[i] != b'.' {
        name[n] = bytes[i];
        n += 1;
        i += 1;
    }
    if i < bytes.len() && bytes[i] == b'.' {
        i += 1;
    }
    let mut e = 0;
    while i < bytes.len() && e < 3 {
        ext[e] = bytes[i];
        e += 1;
        i += 1;
    }
    (name, ext)
}

/// Render a padded 8+3 on-disk name back into a `NAME[.EXT]` string.
///
/// Appends `name` bytes up to the first space; if `ext[0]` is not a
/// space, appends `.` then `ext` bytes up to the first space.
pub fn format(name: &[u8; 8], ext: &[u8; 3]) -> String {
    let mut out = String::with_capacity(MAX_DISPLAY_LEN);
    for &b in name {
        if b == b' ' {
            break;
        }
        out.push(b as char);
    }
    if ext[0] != b' ' {
        out.push('.');
        for &b in ext {
            if b == b' ' {
                break;
            }
            out.push(b as char);
        }
    }
    out
}

/// Byte-exact comparison of the padded name and extension fields.
pub fn compare(a_name: &[u8; 8], a_ext: &[u8; 3], b_name: &[u8; 8], b_ext: &[u8; 3]) -> bool {
    a_name == b_name && a_ext == b_ext
}
