use std::fs;
use std::path::{Path, PathBuf};

const HTTP_ALLOWED: &[&str] = &["src/adapters/", "src/error.rs"];

/// Computation modules: no network, no runtime.
const PURE_MODULES: &[&str] = &[
    "src/pricing/",
    "src/orderbook/",
    "src/strike/",
    "src/rows/",
    "src/slate/",
    "src/dashboard/",
    "src/ev.rs",
    "src/bundle.rs",
];

fn collect_rust_files(root: &Path, out: &mut Vec<PathBuf>) {
    let Ok(entries) = fs::read_dir(root) else {
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            collect_rust_files(&path, out);
            continue;
        }
        if path.extension().and_then(|s| s.to_str()) == Some("rs") {
            out.push(path);
        }
    }
}

fn source_files() -> Vec<(String, String)> {
    let repo_root = Path::new(env!("CARGO_MANIFEST_DIR"));
    let mut files = Vec::new();
    collect_rust_files(&repo_root.join("src"), &mut files);

    files
        .into_iter()
        .map(|file| {
            let rel = file
                .strip_prefix(repo_root)
                .unwrap_or(&file)
                .to_string_lossy()
                .replace('\\', "/");
            let content = fs::read_to_string(&file).unwrap_or_default();
            (rel, content)
        })
        .collect()
}

fn offending_lines(rel: &str, content: &str, needles: &[&str]) -> Vec<String> {
    content
        .lines()
        .enumerate()
        .filter(|(_, line)| {
            let trimmed = line.trim();
            !trimmed.starts_with("//") && needles.iter().any(|n| trimmed.contains(n))
        })
        .map(|(idx, line)| format!("{rel}:{}: {}", idx + 1, line.trim()))
        .collect()
}

#[test]
fn http_client_is_limited_to_adapters() {
    let mut offenders = Vec::new();
    for (rel, content) in source_files() {
        if HTTP_ALLOWED.iter().any(|allowed| rel.starts_with(allowed)) {
            continue;
        }
        offenders.extend(offending_lines(&rel, &content, &["reqwest::", "use reqwest"]));
    }

    assert!(
        offenders.is_empty(),
        "http client used outside adapters:\n{}",
        offenders.join("\n")
    );
}

#[test]
fn computation_modules_stay_synchronous() {
    let mut offenders = Vec::new();
    for (rel, content) in source_files() {
        if !PURE_MODULES.iter().any(|m| rel.starts_with(m)) {
            continue;
        }
        offenders.extend(offending_lines(&rel, &content, &["async fn", "tokio::", ".await"]));
    }

    assert!(
        offenders.is_empty(),
        "async code in computation modules:\n{}",
        offenders.join("\n")
    );
}
