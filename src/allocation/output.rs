//! Writer for the plain-text allocation format.
//!
//! ```text
//! N                          number of non-empty caches
//! c v_0 v_1 ...              one line per non-empty cache, ascending ids
//! ```

use std::fmt;
use std::io::{self, Write};

use super::types::Allocation;

impl fmt::Display for Allocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.non_empty_caches().count())?;
        for (cache, videos) in self.iter().filter(|(_, v)| !v.is_empty()) {
            write!(f, "{cache}")?;
            for video in videos {
                write!(f, " {video}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Writes `allocation` to `out`.
pub fn write_allocation<W: Write>(allocation: &Allocation, mut out: W) -> io::Result<()> {
    write!(out, "{allocation}")
}

/// Renders `allocation` as a string.
pub fn format_allocation(allocation: &Allocation) -> String {
    allocation.to_string()
}
