//! File for defining how we locate and link against `Mapnik`.

use std::path::{Path, PathBuf};
use std::process::Command;
use std::{env, fs};

use walkdir::WalkDir;

/// Compiler and linker settings reported by `mapnik-config`.
#[derive(Debug, Default)]
struct MapnikInstall {
    version: String,
    include_dirs: Vec<PathBuf>,
    defines: Vec<(String, Option<String>)>,
    cxx_flags: Vec<String>,
    link_search: Vec<PathBuf>,
    link_libs: Vec<String>,
    input_plugins: String,
    fonts: String,
}

impl MapnikInstall {
    /// Splits compiler flags into include dirs, defines and everything else.
    fn add_cflags(&mut self, flags: &str) {
        for flag in flags.split_whitespace() {
            if let Some(dir) = flag.strip_prefix("-I") {
                self.include_dirs.push(PathBuf::from(dir));
            } else if let Some(define) = flag.strip_prefix("-D") {
                match define.split_once('=') {
                    Some((key, value)) => {
                        self.defines.push((key.to_string(), Some(value.to_string())));
                    }
                    None => self.defines.push((define.to_string(), None)),
                }
            } else {
                self.cxx_flags.push(flag.to_string());
            }
        }
    }

    /// Splits linker flags into search paths and library names.
    fn add_libs(&mut self, flags: &str) {
        for flag in flags.split_whitespace() {
            if let Some(dir) = flag.strip_prefix("-L") {
                self.link_search.push(PathBuf::from(dir));
            } else if let Some(lib) = flag.strip_prefix("-l") {
                self.link_libs.push(lib.to_string());
            }
        }
    }
}

/// Runs `mapnik-config` with one argument and returns its trimmed stdout.
fn mapnik_config(tool: &str, arg: &str) -> String {
    let output = Command::new(tool)
        .arg(arg)
        .output()
        .unwrap_or_else(|e| {
            panic!(
                "Failed to run `{tool} {arg}`: {e}. Install Mapnik or point MAPNIK_CONFIG at its mapnik-config script."
            )
        });
    assert!(
        output.status.success(),
        "`{tool} {arg}` exited with {}",
        output.status
    );
    String::from_utf8_lossy(&output.stdout).trim().to_owned()
}

/// Reads `package.metadata.mapnik.minimum-version` from the manifest.
fn minimum_version(root: &Path) -> Option<String> {
    let manifest = fs::read_to_string(root.join("Cargo.toml")).ok()?;
    let manifest: toml::Table = manifest.parse().ok()?;
    manifest
        .get("package")?
        .get("metadata")?
        .get("mapnik")?
        .get("minimum-version")?
        .as_str()
        .map(ToOwned::to_owned)
}

fn parse_version(version: &str) -> Vec<u32> {
    version
        .trim_start_matches('v')
        .split(|c: char| !c.is_ascii_digit())
        .filter(|part| !part.is_empty())
        .take(3)
        .filter_map(|part| part.parse().ok())
        .collect()
}

/// Query the installed engine through `mapnik-config`.
///
/// Search path defaults can be overridden with `MAPNIK_INPUT_PLUGINS_DIR` and `MAPNIK_FONTS_DIR`.
fn resolve_mapnik(root: &Path) -> MapnikInstall {
    println!("cargo:rerun-if-env-changed=MAPNIK_CONFIG");
    println!("cargo:rerun-if-env-changed=MAPNIK_INPUT_PLUGINS_DIR");
    println!("cargo:rerun-if-env-changed=MAPNIK_FONTS_DIR");

    let tool = env::var("MAPNIK_CONFIG").unwrap_or_else(|_| "mapnik-config".to_string());
    let mut install = MapnikInstall {
        version: mapnik_config(&tool, "--version"),
        ..MapnikInstall::default()
    };

    if let Some(minimum) = minimum_version(root) {
        if parse_version(&install.version) < parse_version(&minimum) {
            println!(
                "cargo:warning=Mapnik {} is older than the supported minimum {minimum}",
                install.version
            );
        }
    }

    install.add_cflags(&mapnik_config(&tool, "--cflags"));
    install.add_cflags(&mapnik_config(&tool, "--dep-includes"));
    install.add_libs(&mapnik_config(&tool, "--libs"));

    install.input_plugins = env::var("MAPNIK_INPUT_PLUGINS_DIR")
        .unwrap_or_else(|_| mapnik_config(&tool, "--input-plugins"));
    install.fonts =
        env::var("MAPNIK_FONTS_DIR").unwrap_or_else(|_| mapnik_config(&tool, "--fonts"));
    install
}

/// Gather include directories and build the C++ bridge using `cxx_build`.
fn build_bridge(root: &Path, install: &MapnikInstall) {
    println!("cargo:rerun-if-changed=src/renderer/bridge.rs");
    println!("cargo:rerun-if-changed=src/renderer/bridge.cpp");
    for entry in WalkDir::new(root.join("include"))
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file())
    {
        println!("cargo:rerun-if-changed={}", entry.path().display());
    }

    let mut bridge = cxx_build::bridge("src/renderer/bridge.rs");
    bridge
        .include(root.join("include"))
        .includes(&install.include_dirs)
        .file("src/renderer/bridge.cpp")
        .flag_if_supported("-std=c++17");
    for (key, value) in &install.defines {
        bridge.define(key, value.as_deref());
    }
    for flag in &install.cxx_flags {
        // mapnik-config pins its own -std and optimisation flags
        if flag.starts_with("-std=") || flag.starts_with("-O") {
            continue;
        }
        bridge.flag_if_supported(flag);
    }
    bridge.compile("mapnik_rust_bridge");

    // Link the engine after the bridge - or else `cargo test` won't be able to find the symbols.
    for dir in &install.link_search {
        println!("cargo:rustc-link-search=native={}", dir.display());
    }
    for lib in &install.link_libs {
        println!("cargo:rustc-link-lib={lib}");
    }
}

fn build_mapnik() {
    let root = PathBuf::from(env::var("CARGO_MANIFEST_DIR").expect("CARGO_MANIFEST_DIR not set"));
    let install = resolve_mapnik(&root);
    println!(
        "cargo:warning=Building against Mapnik {} (plugins: {}, fonts: {})",
        install.version, install.input_plugins, install.fonts
    );
    println!(
        "cargo:rustc-env=MAPNIK_DEFAULT_INPUT_PLUGINS={}",
        install.input_plugins
    );
    println!("cargo:rustc-env=MAPNIK_DEFAULT_FONTS={}", install.fonts);
    build_bridge(&root, &install);
}

fn main() {
    println!("cargo:rerun-if-env-changed=DOCS_RS");
    println!("cargo:rustc-check-cfg=cfg(docsrs)");
    if env::var("DOCS_RS").is_ok() {
        println!("cargo:warning=Skipping build.rs when building for docs.rs");
        println!("cargo::rustc-cfg=docsrs");
        println!("cargo:rustc-env=MAPNIK_DEFAULT_INPUT_PLUGINS=/usr/local/lib/mapnik/input");
        println!("cargo:rustc-env=MAPNIK_DEFAULT_FONTS=/usr/local/lib/mapnik/fonts");
    } else {
        build_mapnik();
    }
}
