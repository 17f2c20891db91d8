use std::process::Command;

const DEFAULT_VERSION: &str = "???";

fn main() {
    println!("cargo:rustc-env=GIT_HASH={}", determine_git_version());
}

/// Asks git for the short hash of HEAD, falling back to a placeholder when the
/// build happens outside a git checkout (or git itself is unavailable).
fn determine_git_version() -> String {
    let output = match Command::new("git")
        .args(["rev-parse", "--short", "HEAD"])
        .output()
    {
        Ok(output) => output,
        Err(err) => {
            println!("cargo:warning=unable to execute git command... {:?}", err);
            return DEFAULT_VERSION.to_string();
        }
    };

    if !output.status.success() {
        println!("cargo:warning=got non-0 exit code from git... {}", output.status);
        return DEFAULT_VERSION.to_string();
    }

    match String::from_utf8(output.stdout) {
        Ok(hash) if !hash.trim().is_empty() => hash.trim().to_ascii_lowercase(),
        Ok(_) => {
            println!("cargo:warning=no version returned from git??");
            DEFAULT_VERSION.to_string()
        }
        Err(err) => {
            println!("cargo:warning=failed to read git output (not utf8??)... {:?}", err);
            DEFAULT_VERSION.to_string()
        }
    }
}
