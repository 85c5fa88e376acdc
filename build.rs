use std::process::Command;

fn main() {
    let version = match std::env::var("RANGEWATCH_VERSION") {
        Ok(v) => v,
        Err(_) => {
            let version = "$Format:%(describe)$"; // Replaced by git-archive.
            let version = if version.starts_with('$') {
                match Command::new("git").args(["describe", "--tags"]).output() {
                    Ok(o) if o.status.success() => {
                        String::from_utf8_lossy(&o.stdout).trim().to_string()
                    }
                    _ => env!("CARGO_PKG_VERSION").to_string(),
                }
            } else {
                version.to_string()
            };

            let version = version.strip_prefix('v').unwrap_or(&version);
            println!("cargo:rustc-env=RANGEWATCH_VERSION={version}");
            version.to_string()
        }
    };

    let parts = version
        .split(|c: char| !c.is_ascii_digit())
        .collect::<Vec<_>>();

    if parts.len() < 3 {
        panic!("Unable to parse 'major.minor.patch' from version: {version}");
    }

    println!("cargo:rustc-env=RANGEWATCH_VERSION_MAJOR={}", parts[0]);
    println!("cargo:rustc-env=RANGEWATCH_VERSION_MINOR={}", parts[1]);
    println!("cargo:rustc-env=RANGEWATCH_VERSION_PATCH={}", parts[2]);
}
