use std::fs::File;
use std::io::{self, BufRead, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use block_dev::BlockDevice;
use clap::{Parser, Subcommand};
use simple_fs::SimpleFileSystem;
use typed_bytesize::ByteSizeIec;

const PROMPT: &str = "simplefs> ";

/// One line typed at the shell prompt.
#[derive(Debug, Parser)]
#[command(no_binary_name = true, disable_version_flag = true)]
pub struct Line {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Write a fresh, empty file system to the disk
    Format,
    /// Mount the file system on the disk
    Mount,
    /// Unmount the file system
    Unmount,
    /// Print the superblock and every valid inode
    Debug,
    /// Create an empty file
    Create,
    /// Delete a file
    Delete { inumber: u32 },
    /// Print the size of a file
    Getsize { inumber: u32 },
    /// Print the contents of a file
    Cat { inumber: u32 },
    /// Copy a host file into a file
    Copyin { file: PathBuf, inumber: u32 },
    /// Copy a file out to a host file
    Copyout { inumber: u32, file: PathBuf },
    /// Leave the shell
    #[command(alias = "exit")]
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

pub struct Shell {
    fs: SimpleFileSystem,
}

impl Shell {
    pub fn new(block_device: Arc<dyn BlockDevice>) -> Self {
        Self {
            fs: SimpleFileSystem::new(block_device),
        }
    }

    pub fn fs(&self) -> &SimpleFileSystem {
        &self.fs
    }

    /// Reads commands from `input` until `quit` or end of input.
    pub fn run(&mut self, mut input: impl BufRead, out: &mut impl Write) -> io::Result<()> {
        let mut line = String::new();
        loop {
            write!(out, "{PROMPT}")?;
            out.flush()?;

            line.clear();
            if input.read_line(&mut line)? == 0 {
                writeln!(out)?;
                return Ok(());
            }

            if self.run_line(&line, out)? == Flow::Quit {
                return Ok(());
            }
        }
    }

    pub fn run_line(&mut self, line: &str, out: &mut impl Write) -> io::Result<Flow> {
        let words: Vec<&str> = line.split_whitespace().collect();
        if words.is_empty() {
            return Ok(Flow::Continue);
        }

        match Line::try_parse_from(words) {
            Ok(Line { command }) => self.execute(command, out),
            Err(err) => {
                write!(out, "{err}")?;
                Ok(Flow::Continue)
            }
        }
    }

    pub fn execute(&mut self, command: Command, out: &mut impl Write) -> io::Result<Flow> {
        log::debug!("command: {command:?}");

        match command {
            Command::Format => match self.fs.format() {
                Ok(()) => writeln!(out, "disk formatted.")?,
                Err(err) => writeln!(out, "format failed: {err}")?,
            },
            Command::Mount => match self.fs.mount() {
                Ok(()) => writeln!(out, "disk mounted.")?,
                Err(err) => writeln!(out, "mount failed: {err}")?,
            },
            Command::Unmount => match self.fs.unmount() {
                Ok(()) => writeln!(out, "disk unmounted.")?,
                Err(err) => writeln!(out, "unmount failed: {err}")?,
            },
            Command::Debug => write!(out, "{}", self.fs.debug())?,
            Command::Create => match self.fs.create() {
                Ok(inumber) => writeln!(out, "created inode {inumber}")?,
                Err(err) => writeln!(out, "create failed: {err}")?,
            },
            Command::Delete { inumber } => match self.fs.delete(inumber) {
                Ok(()) => writeln!(out, "inode {inumber} deleted.")?,
                Err(err) => writeln!(out, "delete failed: {err}")?,
            },
            Command::Getsize { inumber } => match self.fs.file_size(inumber) {
                Ok(size) => writeln!(out, "inode {inumber} has size {size}")?,
                Err(err) => writeln!(out, "getsize failed: {err}")?,
            },
            Command::Cat { inumber } => {
                if let Err(err) = self.copy_out(inumber, out) {
                    writeln!(out, "cat failed: {err}")?;
                }
            }
            Command::Copyin { file, inumber } => self.copyin(&file, inumber, out)?,
            Command::Copyout { inumber, file } => {
                let copied = File::create(&file).and_then(|mut host| self.copy_out(inumber, &mut host));
                match copied {
                    Ok(size) => writeln!(out, "{size} bytes copied")?,
                    Err(err) => writeln!(out, "copy failed: {err}")?,
                }
            }
            Command::Quit => return Ok(Flow::Quit),
        }

        Ok(Flow::Continue)
    }
}

impl Shell {
    fn copyin(&mut self, path: &Path, inumber: u32, out: &mut impl Write) -> io::Result<()> {
        let mut host = match File::open(path) {
            Ok(host) => host,
            Err(err) => return writeln!(out, "couldn't open {}: {err}", path.display()),
        };

        let mut buf = vec![0; chunk_size()];
        let mut offset = 0;
        loop {
            let len = match host.read(&mut buf) {
                Ok(0) => break,
                Ok(len) => len,
                Err(err) => return writeln!(out, "copy failed: {err}"),
            };

            match self.fs.write(inumber, &buf[..len], offset) {
                Ok(written) => {
                    offset += written;
                    if written != len {
                        writeln!(out, "WARNING: write only wrote {written} bytes, not {len} bytes")?;
                        break;
                    }
                }
                Err(err) => return writeln!(out, "copy failed: {err}"),
            }
        }

        writeln!(out, "{offset} bytes copied")
    }

    /// Streams the whole file into `dest`, returning the number of bytes copied.
    fn copy_out(&self, inumber: u32, dest: &mut impl Write) -> io::Result<usize> {
        let mut buf = vec![0; chunk_size()];
        let mut offset = 0;
        loop {
            let len = self
                .fs
                .read(inumber, &mut buf, offset)
                .map_err(io::Error::other)?;
            if len == 0 {
                return Ok(offset);
            }

            dest.write_all(&buf[..len])?;
            offset += len;
        }
    }
}

#[inline]
fn chunk_size() -> usize {
    ByteSizeIec::kib(16).0 as usize
}
