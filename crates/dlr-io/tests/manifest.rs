use std::fs;

fn manifest() -> String {
    fs::read_to_string(concat!(env!("CARGO_MANIFEST_DIR"), "/Cargo.toml"))
        .expect("Failed to read dlr-io Cargo.toml")
}

#[test]
fn http_feature_owns_its_dependencies() {
    let manifest = manifest();
    assert!(manifest.contains(r#"http = ["ureq", "anyhow"]"#));
    assert!(manifest.contains(r#"anyhow = { version = "1.0", optional = true }"#));
}

#[test]
fn anyhow_is_only_used_by_the_http_source() {
    let src = concat!(env!("CARGO_MANIFEST_DIR"), "/src");
    for entry in fs::read_dir(src).unwrap() {
        let path = entry.unwrap().path();
        let text = fs::read_to_string(&path).unwrap();
        let uses = text.matches("anyhow").count();
        if path.file_name().unwrap() == "weather.rs" {
            let gated = text
                .split("#[cfg(feature = \"http\")]")
                .skip(1)
                .map(|block| block.matches("anyhow").count())
                .sum::<usize>();
            assert!(uses > 0 && uses == gated, "ungated anyhow in weather.rs");
        } else {
            assert_eq!(uses, 0, "anyhow used in {}", path.display());
        }
    }
}
