//! Basic usage examples for tagkb.

use std::io::Write;

use tagkb::{report, Config, SharedIndex};

const KNOWLEDGE_BASE: &str = r#"[
    {"tag": "foo", "ip_network": "192.0.2.0/24"},
    {"tag": "bar", "ip_network": "192.0.2.8/29"},
    {"tag": "bar", "ip_network": "10.20.0.0/16"},
    {"tag": "SPAM", "ip_network": "10.20.30.40/32"}
]"#;

const UPDATED: &str = r#"[
    {"tag": "foo", "ip_network": "192.0.2.0/24"},
    {"tag": "quarantine", "ip_network": "10.0.0.0/8"}
]"#;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut file = tempfile::NamedTempFile::new()?;
    file.write_all(KNOWLEDGE_BASE.as_bytes())?;
    let config = Config {
        knowledge_base: file.path().to_path_buf(),
        ..Config::default()
    };

    println!("=== Initial knowledge base ===\n");
    let shared = SharedIndex::load(&config)?;
    print_tags(&shared, &["192.0.2.7", "192.0.2.9", "10.20.30.40", "10.120.30.40"])?;

    println!("\n=== HTML report ===\n");
    let index = shared.current();
    let tags = index.lookup_str("192.0.2.9")?;
    println!("{}", report::tags_html("192.0.2.9", &tags));

    println!("=== After reload ===\n");
    std::fs::write(file.path(), UPDATED)?;
    let generation = shared.reload(&config)?;
    println!("generation {generation}");
    print_tags(&shared, &["192.0.2.9", "10.20.30.40"])?;

    // The snapshot taken before the reload still answers from the old data.
    println!("\nold snapshot: {}", report::tags_json(&index.lookup_str("10.20.30.40")?));

    Ok(())
}

fn print_tags(shared: &SharedIndex, addresses: &[&str]) -> Result<(), prefix_tags::Error> {
    let index = shared.current();
    for addr in addresses {
        let tags = index.lookup_str(addr)?;
        println!("{}", report::tags_text(addr, &tags));
    }
    Ok(())
}
