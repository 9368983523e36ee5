#[cfg(test)]
mod tests;

mod block_file;
mod shell;

pub use self::{
    block_file::BlockFile,
    shell::{Command, Flow, Line, Shell},
};
