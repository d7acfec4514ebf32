/// Resident set size of the current process, in bytes. Reads
/// `/proc/self/status` directly rather than pulling in a whole
/// system-info crate for one field; returns `0` wherever that file
/// doesn't exist (non-Linux, sandboxed environments without `/proc`).
pub fn current_rss_bytes() -> u64 {
    let Ok(contents) = std::fs::read_to_string("/proc/self/status") else {
        return 0;
    };
    for line in contents.lines() {
        if let Some(rest) = line.strip_prefix("VmRSS:") {
            let digits: String = rest.chars().filter(|c| c.is_ascii_digit()).collect();
            if let Ok(kib) = digits.parse::<u64>() {
                return kib * 1024;
            }
        }
    }
    0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_a_nonzero_rss_on_linux_or_falls_back_to_zero() {
        // Either this process has a /proc/self/status with a VmRSS line
        // (Linux) or the function degrades to 0 — both are valid, the
        // point is it never panics.
        let _ = current_rss_bytes();
    }
}
