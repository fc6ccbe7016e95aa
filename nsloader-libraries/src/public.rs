//! The process-wide public library sets and their configuration files.
//!
//! Configuration can come from a single TOML file or from a partition root
//! laid out like a device image:
//!
//! ```text
//! <root>/system/etc/public.libraries.txt            default
//! <root>/system/etc/public.libraries-<company>.txt  extended
//! <root>/system/etc/llndk.libraries.txt             llndk
//! <root>/system/etc/vndksp.libraries.txt            vndksp
//! <root>/vendor/etc/public.libraries.txt            vendor
//! ```

use crate::error::{LibraryConfigError, LibraryResult};
use crate::set::LibrarySet;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Libraries exported by the runtime namespace when nothing else is configured.
pub const DEFAULT_RUNTIME_PUBLIC_LIBRARIES: &str = "libicuuc.so:libicui18n.so";

/// File name prefix of company-specific extended public library lists.
pub const EXTENDED_CONFIG_PREFIX: &str = "public.libraries-";

const DEFAULT_CONFIG: &str = "system/etc/public.libraries.txt";
const EXTENDED_CONFIG_DIR: &str = "system/etc";
const LLNDK_CONFIG: &str = "system/etc/llndk.libraries.txt";
const VNDKSP_CONFIG: &str = "system/etc/vndksp.libraries.txt";
const VENDOR_CONFIG: &str = "vendor/etc/public.libraries.txt";

/// All library sets consulted when a class-loader namespace is linked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PublicLibraries {
    default: LibrarySet,
    extended: LibrarySet,
    runtime: LibrarySet,
    vendor: LibrarySet,
    vndksp: LibrarySet,
    llndk: LibrarySet,
}

impl Default for PublicLibraries {
    fn default() -> Self {
        Self {
            default: LibrarySet::new(),
            extended: LibrarySet::new(),
            runtime: LibrarySet::parse(DEFAULT_RUNTIME_PUBLIC_LIBRARIES),
            vendor: LibrarySet::new(),
            vndksp: LibrarySet::new(),
            llndk: LibrarySet::new(),
        }
    }
}

impl PublicLibraries {
    /// Parses a TOML document with one array per set.
    ///
    /// ```toml
    /// default = ["libc.so", "libm.so"]
    /// llndk = ["libvndksupport.so"]
    /// ```
    pub fn from_toml_str(contents: &str) -> LibraryResult<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Loads the sets from a TOML file.
    pub fn load_from(path: &Path) -> LibraryResult<Self> {
        let contents = read_optional(path)?
            .ok_or_else(|| LibraryConfigError::MissingConfig(path.to_path_buf()))?;
        let libraries = Self::from_toml_str(&contents)?;
        info!(path = %path.display(), "Loaded public library sets");
        Ok(libraries)
    }

    /// Loads the sets from `public.libraries.txt`-style files under a
    /// partition root. Only the default list is required.
    pub fn from_partition_root(root: &Path) -> LibraryResult<Self> {
        let default_path = root.join(DEFAULT_CONFIG);
        let default = match read_optional(&default_path)? {
            Some(contents) => parse_config(&default_path.display().to_string(), &contents)?,
            None => return Err(LibraryConfigError::MissingConfig(default_path)),
        };

        let libraries = Self {
            default,
            extended: load_extended(&root.join(EXTENDED_CONFIG_DIR))?,
            runtime: LibrarySet::parse(DEFAULT_RUNTIME_PUBLIC_LIBRARIES),
            vendor: load_optional(&root.join(VENDOR_CONFIG))?,
            vndksp: load_optional(&root.join(VNDKSP_CONFIG))?,
            llndk: load_optional(&root.join(LLNDK_CONFIG))?,
        };

        info!(
            root = %root.display(),
            default = libraries.default.len(),
            extended = libraries.extended.len(),
            vendor = libraries.vendor.len(),
            "Loaded public library configuration"
        );
        Ok(libraries)
    }

    pub fn with_default(mut self, set: LibrarySet) -> Self {
        self.default = set;
        self
    }

    pub fn with_extended(mut self, set: LibrarySet) -> Self {
        self.extended = set;
        self
    }

    pub fn with_runtime(mut self, set: LibrarySet) -> Self {
        self.runtime = set;
        self
    }

    pub fn with_vendor(mut self, set: LibrarySet) -> Self {
        self.vendor = set;
        self
    }

    pub fn with_vndksp(mut self, set: LibrarySet) -> Self {
        self.vndksp = set;
        self
    }

    pub fn with_llndk(mut self, set: LibrarySet) -> Self {
        self.llndk = set;
        self
    }

    /// Libraries every namespace can see; preloaded at startup.
    pub fn default_public(&self) -> &LibrarySet {
        &self.default
    }

    /// Company-specific additions to the platform set for bundled apps.
    pub fn extended_public(&self) -> &LibrarySet {
        &self.extended
    }

    pub fn runtime_public(&self) -> &LibrarySet {
        &self.runtime
    }

    pub fn vendor_public(&self) -> &LibrarySet {
        &self.vendor
    }

    pub fn vndksp(&self) -> &LibrarySet {
        &self.vndksp
    }

    pub fn llndk(&self) -> &LibrarySet {
        &self.llndk
    }
}

/// Parses a `public.libraries.txt` document.
///
/// Each non-comment line holds a soname optionally followed by `32` or `64`;
/// qualified entries are kept only on targets of that pointer width.
pub fn parse_config(source_name: &str, contents: &str) -> LibraryResult<LibrarySet> {
    let mut set = LibrarySet::new();

    for (idx, raw) in contents.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let invalid = |reason: String| LibraryConfigError::InvalidLine {
            source_name: source_name.to_string(),
            line: idx + 1,
            reason,
        };

        let mut tokens = line.split_whitespace();
        let Some(soname) = tokens.next() else {
            continue;
        };
        let bitness = tokens.next();
        if let Some(extra) = tokens.next() {
            return Err(invalid(format!("unexpected token '{extra}'")));
        }

        match bitness {
            None => set.push(soname),
            Some("32") | Some("64") => {
                if bitness == Some(target_bitness()) {
                    set.push(soname);
                } else {
                    debug!(soname, "Skipping library for other bitness");
                }
            }
            Some(other) => return Err(invalid(format!("invalid bitness '{other}'"))),
        }
    }

    Ok(set)
}

fn target_bitness() -> &'static str {
    if cfg!(target_pointer_width = "64") {
        "64"
    } else {
        "32"
    }
}

fn read_optional(path: &Path) -> LibraryResult<Option<String>> {
    match std::fs::read_to_string(path) {
        Ok(contents) => Ok(Some(contents)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(source) => Err(LibraryConfigError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}

fn load_optional(path: &Path) -> LibraryResult<LibrarySet> {
    match read_optional(path)? {
        Some(contents) => parse_config(&path.display().to_string(), &contents),
        None => {
            debug!(path = %path.display(), "Optional library config absent");
            Ok(LibrarySet::new())
        }
    }
}

/// Reads every `public.libraries-<company>.txt` in `dir`, in file name
/// order. Each soname must carry its company suffix.
fn load_extended(dir: &Path) -> LibraryResult<LibrarySet> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(LibrarySet::new()),
        Err(source) => {
            return Err(LibraryConfigError::Io {
                path: dir.to_path_buf(),
                source,
            });
        }
    };

    let mut files: Vec<(String, PathBuf)> = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| LibraryConfigError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
        let file_name = entry.file_name().to_string_lossy().into_owned();
        let company = file_name
            .strip_prefix(EXTENDED_CONFIG_PREFIX)
            .and_then(|rest| rest.strip_suffix(".txt"))
            .filter(|company| !company.is_empty());
        if let Some(company) = company {
            files.push((company.to_string(), entry.path()));
        }
    }
    files.sort();

    let mut extended = LibrarySet::new();
    for (company, path) in files {
        let source_name = path.display().to_string();
        let Some(contents) = read_optional(&path)? else {
            continue;
        };
        let set = parse_config(&source_name, &contents)?;
        let suffix = format!(".{company}.so");
        if let Some(soname) = set.iter().find(|soname| !soname.ends_with(&suffix)) {
            return Err(LibraryConfigError::InvalidCompanyLibrary {
                source_name,
                soname: soname.to_string(),
                company,
            });
        }
        extended = extended.concat(&set);
    }

    Ok(extended)
}
