//! Frame reassembly for the `*...#` text protocol
//!
//! TCP gives no message boundaries, so a read may hold part of a frame,
//! several frames, or several frames plus the start of the next one. The
//! decoder keeps whatever follows the last `#` and prepends it to the next
//! read.
//!
//! ```text
//!  read 1: "*HQ,816,D1,09300"        -> (nothing)
//!  read 2: "0,015,1#*HQ,816,R7#*HQ"  -> "*HQ,816,D1,093000,015,1#", "*HQ,816,R7#"
//!  read 3: ",816,R12#"               -> "*HQ,816,R12#"
//! ```

use std::fmt;

use bytes::{Buf, BytesMut};
use tracing::{debug, trace};

/// Start sentinel
pub const FRAME_START: u8 = b'*';

/// End sentinel
pub const FRAME_END: u8 = b'#';

/// One complete `*...#` unit, sentinels included
#[derive(Clone, PartialEq, Eq)]
pub struct Frame(String);

impl Frame {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl AsRef<str> for Frame {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Frame({:?})", self.0)
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Incremental frame splitter
///
/// No maximum frame length is enforced. Chunks that end in `#` but do not
/// start with `*` (after leading whitespace) are discarded without error.
///
/// # Examples
///
/// ```
/// use hqtrack_core::FrameDecoder;
///
/// let mut decoder = FrameDecoder::new();
/// assert_eq!(decoder.feed(b"*HQ,1,V0").count(), 0);
///
/// let frames: Vec<_> = decoder.feed(b"#*HQ,1,R7#").collect();
/// assert_eq!(frames[0].as_str(), "*HQ,1,V0#");
/// assert_eq!(frames[1].as_str(), "*HQ,1,R7#");
/// ```
#[derive(Debug, Default)]
pub struct FrameDecoder {
    buf: BytesMut,
}

impl FrameDecoder {
    pub fn new() -> Self {
        Self {
            buf: BytesMut::with_capacity(1024),
        }
    }

    /// Append received bytes and iterate over the frames now complete
    ///
    /// The iterator is lazy: frames are cut out of the buffer as it is
    /// advanced. Anything left unread stays buffered for the next call.
    pub fn feed(&mut self, data: &[u8]) -> Frames<'_> {
        self.buf.extend_from_slice(data);
        trace!("Buffered {} bytes ({} pending)", data.len(), self.buf.len());
        Frames { decoder: self }
    }

    /// Cut the next complete frame out of the buffer
    pub fn next_frame(&mut self) -> Option<Frame> {
        loop {
            let end = self.buf.iter().position(|&b| b == FRAME_END)?;
            let chunk = self.buf.split_to(end + 1);

            let skip = chunk
                .iter()
                .take_while(|b| b.is_ascii_whitespace())
                .count();
            let mut chunk = chunk.freeze();
            chunk.advance(skip);

            if chunk.first() != Some(&FRAME_START) {
                debug!("Discarding unframed data: {:?}", String::from_utf8_lossy(&chunk));
                continue;
            }

            // Non-ASCII bytes are dropped, the wire format is plain ASCII
            let text: String = chunk
                .iter()
                .filter(|b| b.is_ascii())
                .map(|&b| char::from(b))
                .collect();

            return Some(Frame(text));
        }
    }

    /// Bytes held back waiting for a closing `#`
    pub fn pending(&self) -> usize {
        self.buf.len()
    }
}

/// Frames completed by one [`FrameDecoder::feed`] call
#[derive(Debug)]
pub struct Frames<'a> {
    decoder: &'a mut FrameDecoder,
}

impl Iterator for Frames<'_> {
    type Item = Frame;

    fn next(&mut self) -> Option<Frame> {
        self.decoder.next_frame()
    }
}
