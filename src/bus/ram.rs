/*!
RAM module: the 2 KiB CPU work RAM with mirrored access.

CPU address map for internal RAM:
- $0000-$07FF: 2 KiB internal RAM
- $0800-$1FFF: Mirrors of $0000-$07FF (mask with & 0x07FF)
*/

/// Size of CPU internal RAM (in bytes).
pub const CPU_RAM_SIZE: usize = 0x0800;

/// CPU internal RAM. Callers pass CPU addresses; mirroring is applied here.
pub struct Ram {
    data: [u8; CPU_RAM_SIZE],
}

impl Default for Ram {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl Ram {
    #[inline]
    pub fn new() -> Self {
        Self {
            data: [0; CPU_RAM_SIZE],
        }
    }

    #[inline]
    pub fn read(&self, addr: u16) -> u8 {
        self.data[Self::mirror_index(addr)]
    }

    #[inline]
    pub fn write(&mut self, addr: u16, value: u8) {
        self.data[Self::mirror_index(addr)] = value;
    }

    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    /// Physical RAM index for a CPU address.
    #[inline]
    pub fn mirror_index(addr: u16) -> usize {
        (addr as usize) & (CPU_RAM_SIZE - 1)
    }
}

#[cfg(test)]
mod tests {
    use super::{CPU_RAM_SIZE, Ram};

    #[test]
    fn size_and_init() {
        let r = Ram::new();
        assert_eq!(r.as_slice().len(), CPU_RAM_SIZE);
        assert!(r.as_slice().iter().all(|&b| b == 0));
    }

    #[test]
    fn every_address_is_visible_at_all_mirrors() {
        let mut r = Ram::new();
        for addr in 0x0000u16..=0x1FFF {
            let value = (addr ^ (addr >> 8)) as u8;
            r.write(addr, value);
            for mirror in 0..4u16 {
                let alias = (addr & 0x07FF) + mirror * 0x0800;
                assert_eq!(r.read(alias), value, "write ${addr:04X}, read ${alias:04X}");
            }
        }
    }
}
