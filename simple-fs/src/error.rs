use core::fmt;

pub type Result<T> = core::result::Result<T, Error>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// 尚未挂载文件系统
    NotMounted,
    /// 已挂载的文件系统不能格式化
    AlreadyMounted,
    /// 0 号块的魔数不符
    BadMagic,
    /// 块设备连超级块和一个索引节点块都放不下
    DiskTooSmall,
    /// 超级块记录的块数多于块设备实际的块数
    DiskSizeMismatch { nblocks: u32, device_blocks: usize },
    InodeOutOfRange { inumber: u32, ninodes: u32 },
    /// inode 未被创建或已删除
    InvalidInode(u32),
    /// 偏移越过了文件末尾，不支持稀疏文件
    OffsetPastEnd { offset: usize, size: usize },
    /// 所有 inode 都已占用
    NoFreeInode,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotMounted => write!(f, "file system is not mounted"),
            Self::AlreadyMounted => write!(f, "file system is already mounted"),
            Self::BadMagic => write!(f, "magic number is invalid"),
            Self::DiskTooSmall => write!(f, "disk is too small to hold a file system"),
            Self::DiskSizeMismatch {
                nblocks,
                device_blocks,
            } => write!(
                f,
                "file system spans {nblocks} blocks but the disk has only {device_blocks}"
            ),
            Self::InodeOutOfRange { inumber, ninodes } => {
                write!(f, "inode {inumber} out of range (0..{ninodes})")
            }
            Self::InvalidInode(inumber) => write!(f, "inode {inumber} is not valid"),
            Self::OffsetPastEnd { offset, size } => {
                write!(f, "offset {offset} is past the end of file ({size} bytes)")
            }
            Self::NoFreeInode => write!(f, "no free inode"),
        }
    }
}

impl core::error::Error for Error {}
