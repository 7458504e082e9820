//! SHA-256 digests of file contents.
use std::io::Read;

use sha2::Digest;
use sha2::Sha256;

use crate::errors::Error;

pub(crate) trait Sha256Builder {
    fn sha256_build(&mut self, what: &str) -> Result<Sha256, Error>;
}

pub(crate) trait Sha256String {
    fn sha256_string(self) -> String;
}

impl Sha256String for Sha256 {
    fn sha256_string(self) -> String {
        format!("{:x}", self.finalize())
    }
}

impl<R: Read + ?Sized> Sha256Builder for R {
    fn sha256_build(&mut self, what: &str) -> Result<Sha256, Error> {
        let mut context = Sha256::new();
        let mut buffer = vec![0; 4096]; // Read in chunks

        loop {
            let bytes_read = self.read(&mut buffer).map_err(|e| Error::Read {
                what: what.to_string(),
                how: e.to_string(),
            })?;

            if bytes_read == 0 {
                break; // End of file
            }
            context.update(&buffer[..bytes_read]);
        }
        Ok(context)
    }
}

/// Hex digest of `bytes`.
pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut context = Sha256::new();
    context.update(bytes);
    context.sha256_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    const HELLO: &str = "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824";

    #[test]
    fn digest_of_bytes() {
        assert_eq!(sha256_hex(b"hello"), HELLO);
    }

    #[test]
    fn chunked_digest_matches() {
        let mut reader: &[u8] = b"hello";
        assert_eq!(reader.sha256_build("bytes").unwrap().sha256_string(), HELLO);

        let big = vec![7u8; 10_000];
        let mut reader: &[u8] = &big;
        assert_eq!(
            reader.sha256_build("big").unwrap().sha256_string(),
            sha256_hex(&big)
        );
    }
}
