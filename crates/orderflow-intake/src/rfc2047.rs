// SPDX-License-Identifier: MIT OR Apache-2.0
//! RFC 2047 encoded-word decoding for attachment filenames (§4.3).
//!
//! Supports the two encodings the MIME filename parameter actually uses in
//! practice — `Q` (quoted-printable-ish) and `B` (base64) — falling back to
//! the raw input for anything else so a decode failure never panics or
//! drops data.

/// Decode a (possibly encoded-word) filename. Strings with no `=?...?=`
/// marker are returned unchanged.
#[must_use]
pub fn decode_filename(raw: &str) -> String {
    let mut out = String::new();
    let mut rest = raw;
    while let Some(start) = rest.find("=?") {
        out.push_str(&rest[..start]);
        match decode_one_word(&rest[start..]) {
            Some((decoded, consumed)) => {
                out.push_str(&decoded);
                rest = &rest[start + consumed..];
            }
            None => {
                // Not a valid encoded word after all; emit verbatim and move on.
                out.push_str(&rest[start..start + 2]);
                rest = &rest[start + 2..];
            }
        }
    }
    out.push_str(rest);
    out
}

/// Attempt to decode one `=?charset?enc?text?=` word starting at the
/// beginning of `s`. Returns the decoded text and the number of bytes of
/// `s` consumed.
fn decode_one_word(s: &str) -> Option<(String, usize)> {
    let s = s.strip_prefix("=?")?;
    let mut parts = s.splitn(4, '?');
    let charset = parts.next()?;
    let enc = parts.next()?;
    let remainder = parts.next()?; // text?=...rest, rejoined below
    let text_and_tail = format!("{remainder}?{}", parts.next().unwrap_or_default());
    let end = text_and_tail.find("?=")?;
    let text = &text_and_tail[..end];

    let decoded_bytes = match enc.eq_ignore_ascii_case("b") {
        true => decode_base64(text)?,
        false if enc.eq_ignore_ascii_case("q") => decode_quoted_printable_word(text),
        false => return None,
    };
    let decoded = bytes_to_string(&decoded_bytes, charset);

    let consumed = 2 // "=?"
        + charset.len() + 1
        + enc.len() + 1
        + end
        + 2; // "?="
    Some((decoded, consumed))
}

fn bytes_to_string(bytes: &[u8], charset: &str) -> String {
    if charset.eq_ignore_ascii_case("utf-8") || charset.eq_ignore_ascii_case("utf8") {
        String::from_utf8_lossy(bytes).into_owned()
    } else {
        // ISO-8859-1 / Windows-1252 and friends: every byte maps 1:1 to a
        // Unicode scalar in the Latin-1 range, which covers the vast
        // majority of filenames seen in practice.
        bytes.iter().map(|&b| b as char).collect()
    }
}

fn decode_quoted_printable_word(text: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(text.len());
    let bytes = text.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'_' => {
                out.push(b' ');
                i += 1;
            }
            b'=' if i + 2 < bytes.len() => {
                let hex = std::str::from_utf8(&bytes[i + 1..i + 3]).ok();
                if let Some(h) = hex.and_then(|h| u8::from_str_radix(h, 16).ok()) {
                    out.push(h);
                    i += 3;
                } else {
                    out.push(bytes[i]);
                    i += 1;
                }
            }
            b => {
                out.push(b);
                i += 1;
            }
        }
    }
    out
}

fn decode_base64(text: &str) -> Option<Vec<u8>> {
    const TABLE: &[u8; 64] =
        b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/";
    let mut lut = [255u8; 256];
    for (i, &c) in TABLE.iter().enumerate() {
        lut[c as usize] = i as u8;
    }

    let clean: Vec<u8> = text.bytes().filter(|&b| b != b'=').collect();
    let mut out = Vec::with_capacity(clean.len() * 3 / 4 + 3);
    let mut acc: u32 = 0;
    let mut bits = 0u32;
    for b in clean {
        let v = lut[b as usize];
        if v == 255 {
            return None;
        }
        acc = (acc << 6) | v as u32;
        bits += 6;
        if bits >= 8 {
            bits -= 8;
            out.push(((acc >> bits) & 0xFF) as u8);
        }
    }
    Some(out)
}
