//! # 文件操作层
//!
//! 文件以 inode 编号标识，数据只能存放在直接索引块中。
//! 所有操作都作用于已挂载的文件系统，位图的变化只发生在内存里。

use crate::block::Block;
use crate::inode_table;
use crate::layout::DiskInode;
use crate::sfs::SimpleFileSystem;
use crate::{DataBlock, Error, Result, BLOCK_SIZE, POINTERS_PER_INODE};

impl SimpleFileSystem {
    /// 创建空文件，返回编号最小的空闲 inode
    pub fn create(&mut self) -> Result<u32> {
        let mounted = self.mounted()?;
        let inode_blocks = mounted.super_block.ninodeblocks as usize;

        let inumber =
            inode_table::claim_free(&self.block_device, inode_blocks).ok_or(Error::NoFreeInode)?;
        log::debug!("create: inode {inumber}");
        Ok(inumber)
    }

    /// 删除文件：清除有效位并归还其数据块，
    /// 大小与直接索引不会从磁盘上抹去
    pub fn delete(&mut self, inumber: u32) -> Result<()> {
        let Self {
            block_device,
            mounted,
        } = self;
        let mounted = mounted.as_mut().ok_or(Error::NotMounted)?;

        let mut inode = mounted.valid_inode(block_device, inumber)?;
        inode.invalidate();
        inode_table::save(block_device, inumber, &inode);

        for block_id in inode.blocks() {
            // 挂载时越过磁盘末尾的索引从未记入位图
            if mounted.bitmap.contains(block_id) {
                mounted.bitmap.dealloc(block_id);
            }
        }
        log::debug!("delete: inode {inumber}, {} blocks released", inode.blocks().count());
        Ok(())
    }

    /// 文件的字节数；编号越界或 inode 无效时返回错误而不是 0
    pub fn file_size(&self, inumber: u32) -> Result<u32> {
        let mounted = self.mounted()?;
        Ok(mounted.valid_inode(&self.block_device, inumber)?.size)
    }

    /// 从 `offset` 处读出数据填充 `buf`，不会越过文件末尾，返回读到的字节数
    pub fn read(&self, inumber: u32, buf: &mut [u8], offset: usize) -> Result<usize> {
        let mounted = self.mounted()?;
        let inode = mounted.valid_inode(&self.block_device, inumber)?;

        let size = inode.size as usize;
        if offset > size {
            return Err(Error::OffsetPastEnd { offset, size });
        }

        let mut start = offset;
        let end = (start + buf.len()).min(size);
        // 已读取多少字节
        let mut read_size = 0;
        while start < end {
            let block_index = start / BLOCK_SIZE;
            // 当前块的末地址(字节)
            let current_block_end = ((block_index + 1) * BLOCK_SIZE).min(end);
            let block_read_size = current_block_end - start;
            let dest = &mut buf[read_size..read_size + block_read_size];

            let block_id = inode.direct[block_index];
            if mounted.bitmap.contains(block_id) {
                Block::read(block_id as usize, &self.block_device).map(
                    0,
                    |data_block: &DataBlock| {
                        // 绝对地址 % 块大小 = 块内偏移
                        let src =
                            &data_block[start % BLOCK_SIZE..start % BLOCK_SIZE + block_read_size];
                        dest.copy_from_slice(src);
                    },
                );
            } else {
                log::warn!("read: inode {inumber}: block {block_id} is past the end of disk");
                dest.fill(0);
            }

            read_size += block_read_size;
            start = current_block_end;
        }

        log::debug!("read: inode {inumber}, {read_size} bytes at {offset}");
        Ok(read_size)
    }

    /// 从 `offset` 处写入 `buf`，新的文件末尾即为写入的终点，
    /// 原先位于其后的数据块一律归还。
    ///
    /// 文件达到直接索引的上限或磁盘已满时提前停止，
    /// 返回实际写入的字节数，可能小于 `buf.len()`。
    pub fn write(&mut self, inumber: u32, buf: &[u8], offset: usize) -> Result<usize> {
        let Self {
            block_device,
            mounted,
        } = self;
        let mounted = mounted.as_mut().ok_or(Error::NotMounted)?;
        let mut inode = mounted.valid_inode(block_device, inumber)?;

        let size = inode.size as usize;
        if offset > size {
            return Err(Error::OffsetPastEnd { offset, size });
        }

        let mut start = offset;
        let end = start + buf.len();
        let mut written_size = 0;
        while start < end {
            let block_index = start / BLOCK_SIZE;
            if block_index >= POINTERS_PER_INODE {
                log::warn!("write: inode {inumber} reached the maximum file size");
                break;
            }

            let mut block = match inode.direct[block_index] {
                // 保留块内不被覆盖的字节
                block_id if block_id != 0 && mounted.bitmap.contains(block_id) => {
                    Block::read(block_id as usize, block_device)
                }
                // 未分配，或索引越过了磁盘末尾
                _ => {
                    let Some(block_id) = mounted.bitmap.alloc() else {
                        log::warn!("write: no free block left for inode {inumber}");
                        break;
                    };
                    inode.direct[block_index] = block_id;
                    Block::zeroed(block_id as usize, block_device)
                }
            };

            let current_block_end = ((block_index + 1) * BLOCK_SIZE).min(end);
            let block_write_size = current_block_end - start;
            block.map_mut(0, |data_block: &mut DataBlock| {
                let src = &buf[written_size..written_size + block_write_size];
                let dest =
                    &mut data_block[start % BLOCK_SIZE..start % BLOCK_SIZE + block_write_size];
                dest.copy_from_slice(src);
            });

            written_size += block_write_size;
            start = current_block_end;
        }

        // 截断：新末尾之后的索引全部归还
        let new_size = offset + written_size;
        for block_id in &mut inode.direct[DiskInode::count_data_block(new_size)..] {
            if *block_id != 0 {
                if mounted.bitmap.contains(*block_id) {
                    mounted.bitmap.dealloc(*block_id);
                }
                *block_id = 0;
            }
        }
        inode.size = new_size as u32;
        inode_table::save(block_device, inumber, &inode);

        log::debug!("write: inode {inumber}, {written_size}/{} bytes at {offset}", buf.len());
        Ok(written_size)
    }
}
