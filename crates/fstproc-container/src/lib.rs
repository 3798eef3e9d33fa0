//! fstproc-container — the binary bundle format (C5): magic, header,
//! alphabet blob, and one or more named transducer blobs.
//!
//! ```text
//! magic:    4 bytes, b"FSTB"
//! version:  1 byte
//! transducer_count: multibyte integer
//! alphabet blob
//! for each transducer:
//!     name: length-prefixed UTF-16 string
//!     transducer blob
//! ```
//!
//! The reader accepts any bundle written by this or an earlier writer of
//! the same major version; the writer always emits the current format.

#![deny(missing_docs)]

use std::io::{Read, Write};

use fstproc_alphabet::Alphabet;
use fstproc_core::varint::{read_u16string, read_uint, write_u16string, write_uint};
use fstproc_transducer::Transducer;

const MAGIC: [u8; 4] = *b"FSTB";
const VERSION: u8 = 1;

/// Errors that can arise while loading or saving a [`Bundle`].
#[derive(Debug, thiserror::Error)]
pub enum ContainerError {
    /// The first four bytes were not the expected magic.
    #[error("bad magic: expected {MAGIC:?}")]
    BadMagic,

    /// The version byte names a format this reader does not understand.
    #[error("unsupported bundle version: {found}")]
    UnsupportedVersion {
        /// The version byte actually read.
        found: u8,
    },

    /// A transducer's out-edges reference a pair code the bundle's
    /// alphabet does not define.
    #[error("transducer {name:?} references undefined pair code {pair_code}")]
    UndefinedPairCode {
        /// Name of the offending transducer.
        name: String,
        /// The pair code that has no entry in the alphabet.
        pair_code: u32,
    },

    /// Lower-level codec failure (truncated stream, bad varint, bad UTF-16).
    #[error(transparent)]
    Core(#[from] fstproc_core::CoreError),
}

/// Result alias for container operations.
pub type ContainerResult<T> = Result<T, ContainerError>;

/// A loaded bundle: one alphabet shared by every transducer in it, plus the
/// transducers themselves, each addressed by name.
#[derive(Debug)]
pub struct Bundle {
    /// The alphabet shared by all of this bundle's transducers.
    pub alphabet: Alphabet,
    /// The bundle's transducers, in the order they appear on disk.
    pub transducers: Vec<(String, Transducer)>,
}

impl Bundle {
    /// Creates an empty bundle around `alphabet`.
    #[must_use]
    pub fn new(alphabet: Alphabet) -> Self {
        Self { alphabet, transducers: Vec::new() }
    }

    /// Appends a named transducer to the bundle.
    pub fn add_transducer(&mut self, name: impl Into<String>, transducer: Transducer) {
        self.transducers.push((name.into(), transducer));
    }

    /// Looks up a transducer by name.
    #[must_use]
    pub fn transducer(&self, name: &str) -> Option<&Transducer> {
        self.transducers.iter().find(|(n, _)| n == name).map(|(_, t)| t)
    }

    /// Writes the bundle in the current format.
    pub fn save<W: Write>(&self, w: &mut W) -> ContainerResult<()> {
        w.write_all(&MAGIC).map_err(fstproc_core::CoreError::Io)?;
        w.write_all(&[VERSION]).map_err(fstproc_core::CoreError::Io)?;

        write_uint(w, self.transducers.len() as u32)?;
        self.alphabet.write(w)?;
        for (name, transducer) in &self.transducers {
            write_u16string(w, name)?;
            transducer.write(w)?;
        }
        Ok(())
    }

    /// Reads a bundle, validating that every transducer's referenced pair
    /// codes exist in the bundle's alphabet.
    pub fn load<R: Read>(r: &mut R) -> ContainerResult<Self> {
        let mut magic = [0u8; 4];
        r.read_exact(&mut magic).map_err(|_| ContainerError::BadMagic)?;
        if magic != MAGIC {
            return Err(ContainerError::BadMagic);
        }

        let mut version = [0u8; 1];
        r.read_exact(&mut version).map_err(|_| ContainerError::UnsupportedVersion { found: 0 })?;
        if version[0] != VERSION {
            return Err(ContainerError::UnsupportedVersion { found: version[0] });
        }

        let transducer_count = read_uint(r)? as usize;
        let alphabet = Alphabet::read(r)?;

        let mut transducers = Vec::with_capacity(transducer_count);
        for _ in 0..transducer_count {
            let name = read_u16string(r)?;
            let transducer = Transducer::read(r)?;

            let pair_count = alphabet.pair_count() as u32;
            if let Some(bad) = transducer.referenced_pair_codes().find(|&code| code >= pair_count) {
                return Err(ContainerError::UndefinedPairCode { name, pair_code: bad });
            }

            #[cfg(feature = "trace")]
            log::debug!("loaded transducer {name:?} with {} states", transducer.num_states());

            transducers.push((name, transducer));
        }

        Ok(Self { alphabet, transducers })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn sample_bundle() -> Bundle {
        let mut alphabet = Alphabet::new();
        let n = alphabet.intern_tag("<n>");
        let c = alphabet.encode_pair('c' as i32, 'c' as i32);
        let _n_pair = alphabet.encode_pair(n, n);

        let mut t = Transducer::with_states(2);
        t.add_edge(0, c, 1, 0.0);
        t.set_final(1, 0.0);

        let mut bundle = Bundle::new(alphabet);
        bundle.add_transducer("main", t);
        bundle
    }

    #[test]
    fn roundtrip_preserves_alphabet_and_transducers() {
        let bundle = sample_bundle();
        let mut buf = Vec::new();
        bundle.save(&mut buf).unwrap();

        let mut cur = Cursor::new(buf);
        let loaded = Bundle::load(&mut cur).unwrap();
        assert_eq!(loaded.transducers.len(), 1);
        assert!(loaded.transducer("main").is_some());
        assert_eq!(loaded.alphabet.pair_count(), bundle.alphabet.pair_count());
    }

    #[test]
    fn bad_magic_is_rejected() {
        let buf = vec![0u8; 16];
        let mut cur = Cursor::new(buf);
        assert!(matches!(Bundle::load(&mut cur), Err(ContainerError::BadMagic)));
    }

    #[test]
    fn undefined_pair_code_is_rejected() {
        let mut t = Transducer::with_states(2);
        t.add_edge(0, 999, 1, 0.0); // pair code never registered in alphabet
        t.set_final(1, 0.0);

        let mut bundle = Bundle::new(Alphabet::new());
        bundle.add_transducer("bad", t);
        let mut buf = Vec::new();
        bundle.save(&mut buf).unwrap();

        let mut cur = Cursor::new(buf);
        assert!(matches!(Bundle::load(&mut cur), Err(ContainerError::UndefinedPairCode { .. })));
    }
}
