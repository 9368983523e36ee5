use clap::Parser;
use std::path::PathBuf;

#[derive(Parser)]
#[command(version, about = "Interactive shell over a simple-fs disk image")]
pub struct Cli {
    /// Disk image file, created if it doesn't exist
    pub image: PathBuf,

    /// Number of blocks in the disk image
    #[arg(long, short)]
    pub blocks: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blocks_is_a_flag() {
        let cli = Cli::try_parse_from(["simple-fs-shell", "disk.img", "--blocks", "20"]).unwrap();
        assert_eq!((cli.image, cli.blocks), (PathBuf::from("disk.img"), 20));

        let cli = Cli::try_parse_from(["simple-fs-shell", "-b", "8", "disk.img"]).unwrap();
        assert_eq!(cli.blocks, 8);

        assert!(Cli::try_parse_from(["simple-fs-shell", "disk.img", "20"]).is_err());
    }
}
