//! Obfuscated payload codec
//!
//! The document host serves its page index as an opaque string: a base64
//! variant over a deliberately scrambled 64-symbol alphabet. [`decode`]
//! unpacks the 6-bit codes back into bytes, renders each byte as a `%xx`
//! escape, and percent-decodes the escape string into the underlying JSON
//! text. [`encode`] is the exact inverse, mainly useful for fabricating
//! payloads in tests.

use std::fmt::Write as _;

/// The scrambled alphabet, indexed by 6-bit code. Not standard base64 order;
/// the permutation is fixed by the host and must match exactly.
const ALPHABET: &[u8; 64] = b"PJKLMNOI3yxz012wvprqstuoBHCDEFGAhnijklmgfZabcdeYXRSTUVWQ!56789+4";

/// Reverse lookup: input byte to 6-bit code, `None` for bytes outside the
/// alphabet. Presence-checked so 'P' (the one symbol mapping to code 0) needs
/// no special handling.
const REVERSE: [Option<u8>; 256] = {
    let mut table = [None; 256];
    let mut i = 0;
    while i < 64 {
        table[ALPHABET[i] as usize] = Some(i as u8);
        i += 1;
    }
    table
};

/// Decode an opaque payload into bytes.
///
/// Input characters outside the alphabet are skipped as noise. Codes are
/// consumed four at a time; each quantum yields up to three bytes, and a
/// quantum missing its third or fourth code is the final one. Fewer than two
/// decodable codes yield an empty vec. Decoding is total: every input maps to
/// exactly one output and the function never fails.
pub fn decode(opaque: &str) -> Vec<u8> {
    let mut codes = opaque.bytes().filter_map(|b| REVERSE[b as usize]);
    let mut escaped = String::new();

    while let (Some(c0), Some(c1)) = (codes.next(), codes.next()) {
        let c2 = codes.next();
        let c3 = codes.next();
        push_escaped(&mut escaped, (c0 << 2) | (c1 >> 4));
        let Some(c2) = c2 else { break };
        push_escaped(&mut escaped, (c1 << 4) | (c2 >> 2));
        let Some(c3) = c3 else { break };
        push_escaped(&mut escaped, (c2 << 6) | c3);
    }

    urlencoding::decode_binary(escaped.as_bytes()).into_owned()
}

/// Encode bytes into an opaque payload string, the inverse of [`decode`].
///
/// Every byte is first rendered as a `%xx` escape; the escape string is then
/// packed three bytes at a time into four alphabet symbols. There is no
/// padding symbol: a short final group simply ends the string.
pub fn encode(data: &[u8]) -> String {
    let mut escaped = String::with_capacity(data.len() * 3);
    for &byte in data {
        push_escaped(&mut escaped, byte);
    }

    let mut out = String::with_capacity(escaped.len().div_ceil(3) * 4);
    for group in escaped.as_bytes().chunks(3) {
        let a = group[0];
        out.push(ALPHABET[(a >> 2) as usize] as char);
        match (group.get(1), group.get(2)) {
            (None, _) => out.push(ALPHABET[((a & 0x03) << 4) as usize] as char),
            (Some(&b), None) => {
                out.push(ALPHABET[(((a & 0x03) << 4) | (b >> 4)) as usize] as char);
                out.push(ALPHABET[((b & 0x0f) << 2) as usize] as char);
            }
            (Some(&b), Some(&c)) => {
                out.push(ALPHABET[(((a & 0x03) << 4) | (b >> 4)) as usize] as char);
                out.push(ALPHABET[(((b & 0x0f) << 2) | (c >> 6)) as usize] as char);
                out.push(ALPHABET[(c & 0x3f) as usize] as char);
            }
        }
    }
    out
}

/// Append one byte as a lowercase two-digit percent escape.
fn push_escaped(out: &mut String, byte: u8) {
    let _ = write!(out, "%{byte:02x}");
}
