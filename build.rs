use std::process::Command;

fn git(args: &[&str]) -> Option<String> {
    let output = Command::new("git").args(args).output().ok()?;
    if !output.status.success() {
        return None;
    }
    let text = String::from_utf8(output.stdout).ok()?;
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-changed=assets");

    // Exact tag on a release build, otherwise the short commit.
    let label = git(&["describe", "--tags", "--exact-match"])
        .or_else(|| git(&["rev-parse", "--short", "HEAD"]));
    if let Some(label) = label {
        println!("cargo:rustc-env=GIT_TAG={label}");
    }
}
