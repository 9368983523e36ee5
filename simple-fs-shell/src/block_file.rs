use std::cell::{Cell, RefCell};
use std::fs::{File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::Path;

use block_dev::{BlockDevice, BLOCK_SIZE};
use send_wrapper::SendWrapper;

/// A disk image on the host file system, accessed one block at a time.
#[derive(Debug)]
pub struct BlockFile {
    inner: SendWrapper<RefCell<File>>,
    blocks: usize,
    reads: SendWrapper<Cell<usize>>,
    writes: SendWrapper<Cell<usize>>,
}

impl BlockFile {
    pub fn new(fd: File, blocks: usize) -> Self {
        Self {
            inner: SendWrapper::new(RefCell::new(fd)),
            blocks,
            reads: SendWrapper::new(Cell::new(0)),
            writes: SendWrapper::new(Cell::new(0)),
        }
    }

    /// Opens the image at `path`, creating it if needed, and sets its length to `blocks` blocks.
    pub fn open(path: impl AsRef<Path>, blocks: usize) -> io::Result<Self> {
        let fd = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)?;
        fd.set_len((blocks * BLOCK_SIZE) as u64)?;

        Ok(Self::new(fd, blocks))
    }

    pub fn reads(&self) -> usize {
        self.reads.get()
    }

    pub fn writes(&self) -> usize {
        self.writes.get()
    }

    fn seek(&self, file: &mut File, block_id: usize) {
        assert!(
            block_id < self.blocks,
            "block {block_id} out of range (image has {} blocks)",
            self.blocks
        );
        file.seek(SeekFrom::Start((block_id * BLOCK_SIZE) as u64))
            .expect("seeking error");
    }
}

impl BlockDevice for BlockFile {
    fn read_block(&self, block_id: usize, buf: &mut [u8]) {
        let mut file = self.inner.borrow_mut();
        self.seek(&mut file, block_id);
        file.read_exact(buf).expect("not a complete block!");
        self.reads.set(self.reads.get() + 1);
    }

    fn write_block(&self, block_id: usize, buf: &[u8]) {
        let mut file = self.inner.borrow_mut();
        self.seek(&mut file, block_id);
        file.write_all(buf).expect("not a complete block!");
        self.writes.set(self.writes.get() + 1);
    }

    fn num_blocks(&self) -> usize {
        self.blocks
    }
}
