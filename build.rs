use std::process::Command;

fn run_git(args: &[&str]) -> Option<String> {
    let output = Command::new("git").args(args).output().ok()?;

    if !output.status.success() {
        return None;
    }

    let output = String::from_utf8(output.stdout).ok()?;
    let output = output.trim();

    if output.is_empty() {
        None
    } else {
        Some(output.to_owned())
    }
}

fn main() {
    let commit_hash = run_git(&["rev-parse", "HEAD"])
        .map(|hash| hash.chars().take(9).collect::<String>())
        .unwrap_or_else(|| "unknown".to_owned());
    println!("cargo:rustc-env=COMMIT_HASH={}", commit_hash);

    let commit_date = run_git(&["show", "-s", "--format=%cd", "--date=short", "HEAD"])
        .unwrap_or_else(|| "unknown".to_owned());
    println!("cargo:rustc-env=COMMIT_DATE={}", commit_date);

    println!("cargo:rerun-if-changed=static/index.html");
}
