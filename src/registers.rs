//! Register map of the MAX31856.
//!
//! Every register has a read address in `0x00..=0x0F`.  Writable registers are written through
//! the same address with the top bit set.

/// A device register, identified by its read and write addresses.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Register {
    pub read_address: u8,
    pub write_address: u8,
}

impl Register {
    pub(crate) const fn new(read_address: u8) -> Self {
        Self {
            read_address,
            write_address: read_address | 0x80,
        }
    }
}

pub const CR0: Register = Register::new(0x00);
pub const CR1: Register = Register::new(0x01);
pub const MASK: Register = Register::new(0x02);
pub const CJHF: Register = Register::new(0x03);
pub const CJLF: Register = Register::new(0x04);
pub const LTHFTH: Register = Register::new(0x05);
pub const LTHFTL: Register = Register::new(0x06);
pub const LTLFTH: Register = Register::new(0x07);
pub const LTLFTL: Register = Register::new(0x08);
pub const CJTO: Register = Register::new(0x09);
pub const CJTH: Register = Register::new(0x0A);
pub const CJTL: Register = Register::new(0x0B);
pub const LTCBH: Register = Register::new(0x0C);
pub const LTCBM: Register = Register::new(0x0D);
pub const LTCBL: Register = Register::new(0x0E);
pub const SR: Register = Register::new(0x0F);

/// Number of registers exposed by the device.
pub const COUNT: usize = 16;

/// A bit-field living inside a shared control register.
///
/// Implementors are `#[repr(u8)]` enums whose discriminants are already shifted into position, so
/// `u8::from(value)` can be OR-ed straight into the register.  [`Field::MASK`] covers exactly the
/// bits the field owns; everything outside it is preserved by a read-modify-write.
pub trait Field: Copy + Into<u8> {
    const REGISTER: Register;
    const MASK: u8;

    /// The mask that zeroes this field and keeps every other bit of the register.
    #[must_use]
    fn clear_mask() -> u8 {
        !Self::MASK
    }
}
