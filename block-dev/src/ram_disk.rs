use alloc::vec;
use alloc::vec::Vec;
use core::sync::atomic::{AtomicUsize, Ordering};

use spin::Mutex;

use crate::{BlockDevice, BLOCK_SIZE};

/// 位于内存的块设备，并记录读写次数
#[derive(Debug)]
pub struct RamDisk {
    data: Mutex<Vec<u8>>,
    blocks: usize,
    reads: AtomicUsize,
    writes: AtomicUsize,
}

impl RamDisk {
    pub fn new(blocks: usize) -> Self {
        Self {
            data: Mutex::new(vec![0; blocks * BLOCK_SIZE]),
            blocks,
            reads: AtomicUsize::new(0),
            writes: AtomicUsize::new(0),
        }
    }

    #[inline]
    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::Relaxed)
    }

    fn range(&self, block_id: usize, len: usize) -> core::ops::Range<usize> {
        assert!(
            block_id < self.blocks,
            "block {block_id} out of range (disk has {} blocks)",
            self.blocks
        );
        assert_eq!(len, BLOCK_SIZE, "not a complete block!");

        block_id * BLOCK_SIZE..(block_id + 1) * BLOCK_SIZE
    }
}

impl BlockDevice for RamDisk {
    fn read_block(&self, block_id: usize, buf: &mut [u8]) {
        let range = self.range(block_id, buf.len());
        buf.copy_from_slice(&self.data.lock()[range]);
        self.reads.fetch_add(1, Ordering::Relaxed);
    }

    fn write_block(&self, block_id: usize, buf: &[u8]) {
        let range = self.range(block_id, buf.len());
        self.data.lock()[range].copy_from_slice(buf);
        self.writes.fetch_add(1, Ordering::Relaxed);
    }

    fn num_blocks(&self) -> usize {
        self.blocks
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_back() {
        let disk = RamDisk::new(4);
        let block = [0x42; BLOCK_SIZE];
        disk.write_block(3, &block);

        let mut buf = [0; BLOCK_SIZE];
        disk.read_block(3, &mut buf);
        assert_eq!(buf, block);
        disk.read_block(2, &mut buf);
        assert_eq!(buf, [0; BLOCK_SIZE]);

        assert_eq!(disk.reads(), 2);
        assert_eq!(disk.writes(), 1);
        assert_eq!(disk.num_blocks(), 4);
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn out_of_range() {
        let disk = RamDisk::new(2);
        disk.write_block(2, &[0; BLOCK_SIZE]);
    }
}
