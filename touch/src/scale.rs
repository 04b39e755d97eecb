use crate::READING_SCALE;

/// Map a raw charge-transfer count onto the `0..=READING_SCALE` reading scale
///
/// `idle` is the pad's count with nothing near it and `touched` its count under a firm touch.
/// Counts at or above `idle` read `READING_SCALE`, counts at or below `touched` read 0, and
/// anything in between is linear. A pad whose `touched` level is not below `idle` always reads
/// `READING_SCALE` and so can never register a touch.
pub fn proximity(count: u16, idle: u16, touched: u16) -> u16 {
    if touched >= idle || count >= idle {
        return READING_SCALE;
    }
    if count <= touched {
        return 0;
    }
    // Span is at most 16 bits and READING_SCALE is small, so u32 can't overflow
    ((count - touched) as u32 * READING_SCALE as u32 / (idle - touched) as u32) as u16
}
