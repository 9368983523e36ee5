use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use block_dev::{BlockDevice, RamDisk, BLOCK_SIZE};

use crate::{BlockFile, Shell};

fn scratch(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("simple-fs-{}-{name}", std::process::id()))
}

fn run(shell: &mut Shell, script: &str) -> String {
    let mut out = Vec::new();
    shell.run(script.as_bytes(), &mut out).unwrap();
    String::from_utf8(out).unwrap()
}

#[test]
fn session() {
    let mut shell = Shell::new(Arc::new(RamDisk::new(20)));
    let out = run(
        &mut shell,
        "mount\nformat\nmount\ncreate\ncreate\ndelete 0\ngetsize 0\ngetsize 1\ndebug\nquit\ncreate\n",
    );

    assert!(out.contains("mount failed: magic number is invalid"));
    assert!(out.contains("disk formatted."));
    assert!(out.contains("disk mounted."));
    assert!(out.contains("created inode 0"));
    assert!(out.contains("created inode 1"));
    assert!(out.contains("inode 0 deleted."));
    assert!(out.contains("getsize failed: inode 0 is not valid"));
    assert!(out.contains("inode 1 has size 0"));
    assert!(out.contains("    256 inodes"));
    // quit 之后的命令不再执行
    assert!(!out.contains("created inode 2"));
    assert_eq!(shell.fs().file_size(1), Ok(0));
}

#[test]
fn bad_input_keeps_running() {
    let mut shell = Shell::new(Arc::new(RamDisk::new(20)));
    let out = run(&mut shell, "frobnicate\ndelete\n\nformat\n");

    assert!(out.contains("frobnicate"));
    assert!(out.contains("disk formatted."));
    assert!(!shell.fs().is_mounted());
}

#[test]
fn copy_round_trip() {
    let source = scratch("copyin.txt");
    let target = scratch("copyout.txt");
    let data: Vec<u8> = (0..3 * BLOCK_SIZE + 17).map(|i| (i % 253) as u8).collect();
    fs::write(&source, &data).unwrap();

    let mut shell = Shell::new(Arc::new(RamDisk::new(20)));
    let script = format!(
        "format\nmount\ncreate\ncopyin {} 0\ncopyout 0 {}\n",
        source.display(),
        target.display()
    );
    let out = run(&mut shell, &script);

    assert_eq!(out.matches(&format!("{} bytes copied", data.len())).count(), 2);
    assert_eq!(fs::read(&target).unwrap(), data);

    fs::remove_file(source).unwrap();
    fs::remove_file(target).unwrap();
}

#[test]
fn copyin_too_large() {
    let source = scratch("large.bin");
    fs::write(&source, vec![7u8; 7 * BLOCK_SIZE]).unwrap();

    let mut shell = Shell::new(Arc::new(RamDisk::new(20)));
    let script = format!("format\nmount\ncreate\ncopyin {} 0\n", source.display());
    let out = run(&mut shell, &script);

    assert!(out.contains("WARNING: write only wrote"));
    assert!(out.contains(&format!("{} bytes copied", simple_fs::MAX_FILE_SIZE)));

    fs::remove_file(source).unwrap();
}

#[test]
fn cat() {
    let mut shell = Shell::new(Arc::new(RamDisk::new(20)));
    run(&mut shell, "format\nmount\ncreate\n");

    let mut out = Vec::new();
    shell.run_line("cat 0", &mut out).unwrap();
    assert!(out.is_empty());

    shell.run_line("cat 5", &mut out).unwrap();
    assert_eq!(String::from_utf8(out).unwrap(), "cat failed: inode 5 is not valid\n");
}

#[test]
fn block_file() {
    let image = scratch("disk.img");
    {
        let disk = BlockFile::open(&image, 8).unwrap();
        assert_eq!(disk.num_blocks(), 8);

        let block = [0x42; BLOCK_SIZE];
        disk.write_block(7, &block);
        let mut buf = [0; BLOCK_SIZE];
        disk.read_block(7, &mut buf);
        assert_eq!(buf, block);
        disk.read_block(0, &mut buf);
        assert_eq!(buf, [0; BLOCK_SIZE]);

        assert_eq!((disk.reads(), disk.writes()), (2, 1));
    }

    // 文件系统随镜像文件保留下来
    {
        let mut shell = Shell::new(Arc::new(BlockFile::open(&image, 8).unwrap()));
        run(&mut shell, "format\nmount\ncreate\n");
    }
    let mut shell = Shell::new(Arc::new(BlockFile::open(&image, 8).unwrap()));
    let out = run(&mut shell, "mount\ngetsize 0\n");
    assert!(out.contains("inode 0 has size 0"));

    fs::remove_file(image).unwrap();
}

#[test]
fn shrunk_image_refuses_mount() {
    let image = scratch("shrunk.img");
    {
        let mut shell = Shell::new(Arc::new(BlockFile::open(&image, 100).unwrap()));
        run(&mut shell, "format\n");
    }

    let mut shell = Shell::new(Arc::new(BlockFile::open(&image, 20).unwrap()));
    let out = run(&mut shell, "mount\ncreate\n");
    assert!(out.contains("mount failed: file system spans 100 blocks but the disk has only 20"));
    assert!(out.contains("create failed: file system is not mounted"));
    assert!(!shell.fs().is_mounted());

    fs::remove_file(image).unwrap();
}
