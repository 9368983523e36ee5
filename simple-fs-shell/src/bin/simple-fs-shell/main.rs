mod cli;

use std::io;
use std::sync::Arc;

use clap::Parser;
use cli::Cli;
use simple_fs_shell::{BlockFile, Shell};

fn main() -> io::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let disk = Arc::new(BlockFile::open(&cli.image, cli.blocks)?);
    println!(
        "opened emulated disk image {} with {} blocks",
        cli.image.display(),
        cli.blocks
    );

    let mut shell = Shell::new(disk.clone());
    shell.run(io::stdin().lock(), &mut io::stdout())?;

    println!("closing emulated disk.");
    println!("{} disk block reads", disk.reads());
    println!("{} disk block writes", disk.writes());

    Ok(())
}
