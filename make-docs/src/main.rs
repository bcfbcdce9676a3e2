//! Regenerate `src/scripts.rs` from the `--help` of every check
//!
//! Run from the repository root after `cargo build`:
//!
//! ```text
//! cargo run --manifest-path make-docs/Cargo.toml > src/scripts.rs
//! ```

use std::process::Command;

struct Check {
    name: &'static str,
    about: &'static str,
}

const CHECKS: [Check; 3] = [
    Check {
        name: "check-ent-pools",
        about: "Shared processor partitions, and dedicated partitions that donate idle cycles.",
    },
    Check {
        name: "check-entitlement",
        about: "Shared processor partitions, and dedicated partitions that donate idle cycles.",
    },
    Check {
        name: "check-cpu-pools",
        about: "Shared processor partitions whose profile allows collecting pool utilization.",
    },
];

fn main() {
    let mut lines = vec![
        "Documentation about the various scripts contained herein".to_string(),
        String::new(),
    ];
    lines.extend(CHECKS.iter().map(|c| format!("- [{0}](#{0})", c.name)));

    for check in &CHECKS {
        let output = Command::new(format!("target/debug/{}", check.name))
            .arg("--help")
            .output()
            .unwrap_or_else(|e| panic!("Couldn't execute {}: {}", check.name, e));
        let help = String::from_utf8(output.stdout)
            .unwrap_or_else(|_| panic!("{} --help is not utf8", check.name));

        lines.push(String::new());
        lines.push(format!("# {}", check.name));
        lines.push(String::new());
        lines.push(check.about.to_string());
        lines.push(String::new());
        lines.push("```plain".to_string());
        lines.push(format!("$ {} --help", check.name));
        lines.extend(help.trim_end().lines().map(String::from));
        lines.push("```".to_string());
    }
    println!("{}", module_doc(&lines));
}

/// Turn lines into a `//!` comment block without trailing whitespace
fn module_doc<S: AsRef<str>>(lines: &[S]) -> String {
    lines
        .iter()
        .map(|l| format!("//! {}", l.as_ref()).trim_end().to_string())
        .collect::<Vec<_>>()
        .join("\n")
}

#[test]
fn module_doc_has_no_trailing_space() {
    assert_eq!(module_doc(&["a", "", "  b  "]), "//! a\n//!\n//!   b");
}
