use rayon::ThreadPoolBuilder;

/// Size the global rayon pool from `auto` or a thread count.
pub fn configure_threads(setting: &str) {
    let count = if setting.eq_ignore_ascii_case("auto") {
        num_cpus::get()
    } else {
        setting
            .parse()
            .ok()
            .filter(|&n: &usize| n > 0)
            .unwrap_or_else(num_cpus::get)
    };
    let _ = ThreadPoolBuilder::new().num_threads(count).build_global();
}

/// Split a comma-separated id list, dropping empty entries.
pub fn parse_ids<S: AsRef<str>>(items: &[S]) -> Vec<String> {
    items
        .iter()
        .flat_map(|item| item.as_ref().split(','))
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_ids_trims_and_drops_empties() {
        assert_eq!(parse_ids(&[" L1 ,,L2", "L3"]), vec!["L1", "L2", "L3"]);
        assert!(parse_ids::<&str>(&[]).is_empty());
    }
}
