use crate::io::FileDesc;
use crate::sys;
use crate::IntoInner;
use std::io::Result as IoResult;

/// A wrapper for a reader and writer OS pipe pair.
///
/// Each end is meant to be moved into exactly one consumer: the writer into
/// the stage producing output, the reader into the stage consuming it. A
/// reader only observes end-of-stream after every copy of the writer has
/// been closed.
#[derive(Debug)]
pub struct Pipe {
    /// The reader end of the pipe. Anything written to the writer end can be read here.
    pub reader: FileDesc,
    /// The writer end of the pipe. Anything written here can be read from the reader end.
    pub writer: FileDesc,
}

impl Pipe {
    /// Creates and returns a new pipe pair.
    /// Both file descriptors of the pipe will have their CLOEXEC flags set,
    /// however, note that the setting of the flags is nonatomic on BSD systems.
    pub fn new() -> IoResult<Pipe> {
        let (reader, writer) = sys::io::pipe()?;
        Ok(Pipe {
            reader: FileDesc::from_inner(reader),
            writer: FileDesc::from_inner(writer),
        })
    }
}
