//! Systematic encoders for the supported codes.
//!
//! All supported codes are systematic: the codeword is the k message bits
//! followed by n-k parity bits. The parity part of the generator matrix is
//! stored in compact circulant form (one row per b-row block), and there
//! are two ways to use it:
//!
//! - [`encode_compact`] reads the compact constants directly. Slowest, but
//!   needs no working memory beyond the codeword — the right choice on a
//!   small flight computer.
//! - [`Generator`] expands the constants once into k full rows and then
//!   encodes by XORing rows, trading k·(n-k)/8 bytes for much higher
//!   throughput.
//!
//! Both produce identical codewords.
//!
//! ## Example
//!
//! ```rust
//! use ccsds_ldpc::{encode_compact, Generator, LdpcCode};
//!
//! let code = LdpcCode::N128K64;
//! let message: Vec<u8> = (0..8).map(|i| !i as u8).collect();
//!
//! let mut slow = [0u8; 16];
//! encode_compact(code, &message, &mut slow).unwrap();
//!
//! let generator = Generator::new(code);
//! let mut fast = [0u8; 16];
//! generator.encode(&message, &mut fast).unwrap();
//!
//! assert_eq!(slow, fast);
//! assert_eq!(&slow[..8], &message[..]); // systematic prefix
//! ```

use crate::bits;
use crate::codes::{CodeParams, LdpcCode};
use crate::llr::check_len;
use crate::tables;
use crate::CodecError;

/// Encode a message using the compact generator constants directly.
///
/// `data` must hold k/8 bytes, `codeword` n/8 bytes. Runs in O(k·(n-k))
/// bit operations with no table expansion.
pub fn encode_compact(code: LdpcCode, data: &[u8], codeword: &mut [u8]) -> Result<(), CodecError> {
    let params = CodeParams::for_code(code);
    let gc = tables::compact_generator(code).ok_or(CodecError::NoCode)?;
    check_len(data.len(), params.data_len())?;
    check_len(codeword.len(), params.codeword_len())?;

    let (k, b) = (params.k, params.b);
    let r = params.n - params.k;
    let words = r / 32;

    codeword[..params.data_len()].copy_from_slice(&data[..params.data_len()]);
    codeword[params.data_len()..params.codeword_len()].fill(0);

    for i in 0..r {
        let mut parity = 0u32;
        for j in 0..k {
            if bits::get(data, j) == 0 {
                continue;
            }
            // Generator row j is the first row of its circulant block
            // rotated right j % b times, so bit (j, i) sits at column
            // i - (j % b), wrapped within i's own b-bit block.
            let mut offset = (j % b) as isize;
            if offset > (i % b) as isize {
                offset -= b as isize;
            }
            let col = (i as isize - offset) as usize;
            let word = gc[(j / b) * words + col / 32];
            parity += (word >> (31 - (col % 32))) & 1;
        }
        if parity & 1 == 1 {
            bits::set(codeword, k + i);
        }
    }
    Ok(())
}

/// Right circular shift by one bit within a multi-byte block.
fn rotate_right_one(block: &mut [u8]) {
    let mut carry = block[block.len() - 1] & 1;
    for byte in block.iter_mut() {
        let next = *byte & 1;
        *byte = (carry << 7) | (*byte >> 1);
        carry = next;
    }
}

/// Expanded generator matrix for fast encoding.
///
/// Holds the parity part only, k rows of (n-k)/8 bytes, since the
/// systematic part is an identity and never needs storing.
#[derive(Debug, Clone)]
pub struct Generator {
    code: LdpcCode,
    row_len: usize,
    rows: Box<[u8]>,
}

impl Generator {
    /// Expand the compact circulant constants for `code`.
    ///
    /// The sentinel yields an empty generator whose
    /// [`encode`](Self::encode) fails with
    /// [`NoCode`](CodecError::NoCode).
    pub fn new(code: LdpcCode) -> Generator {
        let params = CodeParams::for_code(code);
        let Some(gc) = tables::compact_generator(code) else {
            return Generator { code, row_len: 0, rows: Box::default() };
        };

        let r = params.n - params.k;
        let row_len = r / 8;
        let block_len = params.b / 8;
        let words = r / 32;
        let mut rows = vec![0u8; params.k * row_len].into_boxed_slice();

        for i in 0..params.k {
            if i % params.b == 0 {
                // Block start: seed from the stored circulant first row.
                let row = &mut rows[i * row_len..(i + 1) * row_len];
                for (w, chunk) in row.chunks_exact_mut(4).enumerate() {
                    chunk.copy_from_slice(&gc[(i / params.b) * words + w].to_be_bytes());
                }
            } else {
                // Copy the row above and rotate every circulant block.
                let (prev, cur) = rows.split_at_mut(i * row_len);
                let row = &mut cur[..row_len];
                row.copy_from_slice(&prev[(i - 1) * row_len..]);
                for block in row.chunks_exact_mut(block_len) {
                    rotate_right_one(block);
                }
            }
        }

        Generator { code, row_len, rows }
    }

    /// The code this generator encodes for.
    pub fn code(&self) -> LdpcCode {
        self.code
    }

    /// Encode a message by XORing the rows of set data bits.
    ///
    /// `data` must hold k/8 bytes, `codeword` n/8 bytes.
    pub fn encode(&self, data: &[u8], codeword: &mut [u8]) -> Result<(), CodecError> {
        if self.code == LdpcCode::None {
            return Err(CodecError::NoCode);
        }
        let params = CodeParams::for_code(self.code);
        check_len(data.len(), params.data_len())?;
        check_len(codeword.len(), params.codeword_len())?;

        let dlen = params.data_len();
        codeword[..dlen].copy_from_slice(&data[..dlen]);
        codeword[dlen..params.codeword_len()].fill(0);

        for i in 0..params.k {
            if bits::get(data, i) == 1 {
                let row = &self.rows[i * self.row_len..(i + 1) * self.row_len];
                for (c, &g) in codeword[dlen..dlen + self.row_len].iter_mut().zip(row) {
                    *c ^= g;
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::SparseGraph;

    fn message(params: &CodeParams) -> Vec<u8> {
        (0..params.data_len()).map(|i| !(i as u8)).collect()
    }

    #[test]
    fn test_rotate_right_one_wraps() {
        let mut block = [0x01u8, 0x00];
        rotate_right_one(&mut block);
        assert_eq!(block, [0x00, 0x80]);

        let mut block = [0x00u8, 0x01];
        rotate_right_one(&mut block);
        assert_eq!(block, [0x80, 0x00]);
    }

    #[test]
    fn test_compact_and_expanded_agree() {
        for &code in LdpcCode::all() {
            let params = CodeParams::for_code(code);
            let data = message(&params);

            let mut slow = vec![0u8; params.codeword_len()];
            encode_compact(code, &data, &mut slow).unwrap();

            let generator = Generator::new(code);
            let mut fast = vec![0u8; params.codeword_len()];
            generator.encode(&data, &mut fast).unwrap();

            assert_eq!(slow, fast, "{code:?}");
        }
    }

    #[test]
    fn test_codeword_is_systematic() {
        let code = LdpcCode::N512K256;
        let params = CodeParams::for_code(code);
        let data = message(&params);
        let mut codeword = vec![0u8; params.codeword_len()];
        encode_compact(code, &data, &mut codeword).unwrap();
        assert_eq!(&codeword[..params.data_len()], &data[..]);
    }

    #[test]
    fn test_unpunctured_codewords_satisfy_checks() {
        // For the telecommand codes the whole codeword is transmitted, so
        // it must satisfy every parity equation directly.
        for &code in &[LdpcCode::N128K64, LdpcCode::N256K128, LdpcCode::N512K256] {
            let params = CodeParams::for_code(code);
            let graph = SparseGraph::new(code);
            let data = message(&params);
            let mut codeword = vec![0u8; params.codeword_len()];
            encode_compact(code, &data, &mut codeword).unwrap();
            assert!(graph.is_valid_codeword(&codeword), "{code:?}");
        }
    }

    #[test]
    fn test_zero_message_zero_parity() {
        let code = LdpcCode::N128K64;
        let params = CodeParams::for_code(code);
        let data = vec![0u8; params.data_len()];
        let mut codeword = vec![0xFFu8; params.codeword_len()];
        encode_compact(code, &data, &mut codeword).unwrap();
        assert!(codeword.iter().all(|&b| b == 0));
    }

    #[test]
    fn test_sentinel_rejected() {
        let mut codeword = [0u8; 1];
        assert_eq!(
            encode_compact(LdpcCode::None, &[0u8; 1], &mut codeword),
            Err(CodecError::NoCode)
        );
        assert_eq!(
            Generator::new(LdpcCode::None).encode(&[0u8; 1], &mut codeword),
            Err(CodecError::NoCode)
        );
    }
}
