#[inline]
pub(crate) fn get_split<const N: usize>(data: &[u8]) -> Option<([u8; N], &[u8])> {
    data.split_first_chunk::<N>().map(|(head, rest)| (*head, rest))
}

#[inline]
pub(crate) fn le_i32(data: [u8; 4]) -> i32 {
    i32::from_le_bytes(data)
}

/// Splits a NUL terminated string off the front of the data. The terminator
/// is part of neither half.
#[inline]
pub(crate) fn split_cstr(data: &[u8]) -> Option<(&[u8], &[u8])> {
    let end = data.iter().position(|&x| x == 0)?;
    Some((&data[..end], &data[end + 1..]))
}
