pub const DEFAULT_WINDOW_SIZE: u32 = 10;

pub fn page_window(current: u32, total: u32, size: u32) -> Vec<u32> {
    if size == 0 || total == 0 {
        return Vec::new();
    }
    if total <= size {
        return (1..=total).collect();
    }

    let half = size / 2;
    let lead = half.saturating_sub(1);
    if current <= size.div_ceil(2) {
        return (1..=size).collect();
    }
    if current >= total.saturating_sub(lead) {
        return (total - size + 1..=total).collect();
    }

    let start = current.saturating_sub(lead).clamp(1, total - size + 1);
    (start..=start + (size - 1)).collect()
}

#[cfg(test)]
#[path = "tests/pagination_tests.rs"]
mod tests;
