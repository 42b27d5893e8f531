//! Fixed-width little-endian binary record formats for the pre-processed
//! taxi and flight datasets.
//!
//! Uses `byteorder` for explicit little-endian decode/encode rather than
//! `from_ne_bytes`, since the wire format is little-endian regardless of
//! host endianness.

use std::io::{self, Read, Write};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

/// `{distance*100, fare*100, total*100}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaxiRecord {
    pub distance: u64,
    pub fare: u64,
    pub total: u64,
}

impl TaxiRecord {
    pub const BYTE_LEN: usize = 24;

    pub fn read_from(r: &mut impl Read) -> io::Result<Self> {
        Ok(TaxiRecord {
            distance: r.read_u64::<LittleEndian>()?,
            fare: r.read_u64::<LittleEndian>()?,
            total: r.read_u64::<LittleEndian>()?,
        })
    }

    pub fn write_to(&self, w: &mut impl Write) -> io::Result<()> {
        w.write_u64::<LittleEndian>(self.distance)?;
        w.write_u64::<LittleEndian>(self.fare)?;
        w.write_u64::<LittleEndian>(self.total)?;
        Ok(())
    }
}

/// `{elapsed_time, air_time, distance}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlightRecord {
    pub elapsed_time: u64,
    pub air_time: u64,
    pub distance: u64,
}

impl FlightRecord {
    pub const BYTE_LEN: usize = 24;

    pub fn read_from(r: &mut impl Read) -> io::Result<Self> {
        Ok(FlightRecord {
            elapsed_time: r.read_u64::<LittleEndian>()?,
            air_time: r.read_u64::<LittleEndian>()?,
            distance: r.read_u64::<LittleEndian>()?,
        })
    }

    pub fn write_to(&self, w: &mut impl Write) -> io::Result<()> {
        w.write_u64::<LittleEndian>(self.elapsed_time)?;
        w.write_u64::<LittleEndian>(self.air_time)?;
        w.write_u64::<LittleEndian>(self.distance)?;
        Ok(())
    }

    /// The harness filters flight records with `air_time < 20`.
    pub fn passes_filter(&self) -> bool {
        self.air_time >= 20
    }
}
