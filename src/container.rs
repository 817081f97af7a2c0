use std::borrow::Cow;

use tracing::debug;

use crate::error::ConvertError;

/// Bytes every PNG stream starts with.
pub const PNG_SIGNATURE: [u8; 8] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];

/// Type tag of the final PNG chunk. The extracted blob ends right after it.
pub const PNG_TERMINATOR: [u8; 4] = *b"IEND";

/// CRC of an `IEND` chunk. The chunk carries no data, so this is the same in every PNG.
pub const IEND_CRC: [u8; 4] = [0xAE, 0x42, 0x60, 0x82];

/// Find the first PNG embedded in a `.tom` container.
///
/// Returns the slice from the start of the signature up to and including the first
/// `IEND` tag that follows it. Any later images in the container are ignored.
pub fn extract_png(data: &[u8]) -> Result<&[u8], ConvertError> {
    let start = find(data, &PNG_SIGNATURE).ok_or(ConvertError::SignatureNotFound)?;

    // Search from the signature onwards, an earlier stray "IEND" doesn't count
    let end = find(&data[start..], &PNG_TERMINATOR)
        .map(|offset| start + offset + PNG_TERMINATOR.len())
        .ok_or(ConvertError::TerminatorNotFound { signature_offset: start })?;

    debug!("Found embedded PNG at bytes {}..{}", start, end);
    Ok(&data[start..end])
}

/// Restore the `IEND` CRC that [`extract_png`] cuts off, so strict decoders accept the stream
pub fn complete_png(blob: &[u8]) -> Cow<'_, [u8]> {
    if blob.ends_with(&PNG_TERMINATOR) {
        let mut png = Vec::with_capacity(blob.len() + IEND_CRC.len());
        png.extend_from_slice(blob);
        png.extend_from_slice(&IEND_CRC);
        Cow::Owned(png)
    } else {
        Cow::Borrowed(blob)
    }
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|window| window == needle)
}
