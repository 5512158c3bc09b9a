use std::process::Command;

fn main() {
    // Prefer STO_VERSION if the release pipeline sets it, otherwise describe
    // the working tree.
    if let Ok(version) = std::env::var("STO_VERSION") {
        println!("cargo:rustc-env=STO_VERSION={version}");
    } else if let Ok(output) = Command::new("git")
        .args(["describe", "--tags", "--always", "--dirty"])
        .output()
        && output.status.success()
    {
        let version = String::from_utf8_lossy(&output.stdout).trim().to_string();
        println!("cargo:rustc-env=STO_VERSION={version}");
    }

    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-changed=.git/refs/");
    println!("cargo:rerun-if-env-changed=STO_VERSION");
}
